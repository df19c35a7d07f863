//! Effective parameters for a headless run.
//!
//! Layers, lowest first: built-in defaults, the `--config` JSON file, the dedicated flags
//! (`--width`, `--boids`, ...), then every `--set key=value` in order.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use boids_core::{ParamKey, Parameters};

/// Values given through dedicated flags. `None` leaves the lower layer alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub boids: Option<usize>,
    pub bounce: bool,
}

/// Parse a `key=value` assignment for `--set`. Booleans may be spelled `true`/`false`.
pub fn parse_assignment(s: &str) -> Result<(ParamKey, f32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key: ParamKey = key.parse().map_err(|e| format!("{e}"))?;
    let value = match value.trim() {
        "true" => 1.0,
        "false" => 0.0,
        v => v
            .parse::<f32>()
            .map_err(|e| format!("invalid value for {key}: {e}"))?,
    };
    Ok((key, value))
}

/// Read a (possibly partial) parameter file. Missing fields take their defaults.
pub fn load(path: &Path) -> Result<Parameters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

pub fn resolve(
    config: Option<&Path>,
    overrides: &Overrides,
    sets: &[(ParamKey, f32)],
) -> Result<Parameters> {
    let mut params = match config {
        Some(path) => load(path)?,
        None => Parameters::default(),
    };

    if let Some(width) = overrides.width {
        params.window_width = width as f32;
    }
    if let Some(height) = overrides.height {
        params.window_height = height as f32;
    }
    if let Some(boids) = overrides.boids {
        params
            .set(ParamKey::NumberOfBoids, boids as f32)
            .context("--boids")?;
    }
    if overrides.bounce {
        params.bounce_off_walls = true;
    }

    for &(key, value) in sets {
        params
            .set(key, value)
            .with_context(|| format!("--set {key}={value}"))?;
    }

    params.validate().context("invalid parameters")?;
    Ok(params)
}
