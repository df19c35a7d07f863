//! Exercises the `build-*.sh` scripts at the workspace root through `/bin/sh`, with stub
//! `cargo` and `wasm-bindgen` executables on `PATH` that record their arguments.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

use tempfile::TempDir;

const SCRIPTS: [(&str, &str); 3] = [
    ("build-gh-pages.sh", "./gh-pages"),
    ("build-docs.sh", "./docs"),
    ("build-wasm.sh", "./wasm"),
];

// Writing an executable while another thread forks can fail with ETXTBSY.
static SPAWN: Mutex<()> = Mutex::new(());

fn script_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(name)
}

fn read_script(name: &str) -> String {
    fs::read_to_string(script_path(name)).unwrap()
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(cargo_status: i32, bindgen_status: i32) -> Self {
        let dir = TempDir::new().unwrap();
        let sandbox = Self { dir };
        sandbox.stub("cargo", cargo_status);
        sandbox.stub("wasm-bindgen", bindgen_status);
        sandbox
    }

    fn stub(&self, name: &str, status: i32) {
        let path = self.dir.path().join(name);
        let body = format!("#!/bin/sh\nprintf '%s\\n' \"{name} $*\" >> \"$STUB_LOG\"\nexit {status}\n");
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    fn run(&self, script: &str) -> Output {
        Command::new("/bin/sh")
            .arg(script_path(script))
            .current_dir(self.dir.path())
            .env_clear()
            .env("PATH", self.dir.path())
            .env("STUB_LOG", self.log_path())
            .output()
            .unwrap()
    }

    fn calls(&self) -> Vec<Vec<String>> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(|line| line.split_whitespace().map(str::to_owned).collect())
            .collect()
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[test]
fn scripts_differ_only_in_out_dir() {
    let normalized: Vec<String> = SCRIPTS
        .iter()
        .map(|(name, out_dir)| {
            let text = read_script(name);
            let needle = format!("--out-dir {out_dir} ");
            assert_eq!(text.matches(&needle).count(), 1, "{name}: {text}");
            text.replace(&needle, "--out-dir OUT ")
        })
        .collect();
    assert_eq!(normalized[0], normalized[1]);
    assert_eq!(normalized[1], normalized[2]);
}

#[test]
fn successful_run_invokes_bindgen_with_literal_out_dir() {
    let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
    for (name, out_dir) in SCRIPTS {
        let sandbox = Sandbox::new(0, 0);
        let output = sandbox.run(name);
        assert!(output.status.success(), "{name}: {output:?}");
        // Nothing of their own on stdout.
        assert!(output.stdout.is_empty(), "{name}: {output:?}");

        let calls = sandbox.calls();
        assert_eq!(calls.len(), 2, "{name}: {calls:?}");

        let cargo = &calls[0];
        assert_eq!(cargo[0], "cargo");
        assert!(cargo.iter().any(|a| a == "--release"));
        assert_eq!(flag_value(cargo, "--target"), Some("wasm32-unknown-unknown"));

        let bindgen = &calls[1];
        assert_eq!(bindgen[0], "wasm-bindgen");
        assert_eq!(flag_value(bindgen, "--target"), Some("web"));
        assert!(bindgen.iter().any(|a| a == "--no-typescript"));
        assert_eq!(flag_value(bindgen, "--out-dir"), Some(out_dir));
        assert_eq!(flag_value(bindgen, "--out-name"), Some("boids"));
        assert_eq!(
            bindgen.last().map(String::as_str),
            Some("target/wasm32-unknown-unknown/release/boids.wasm")
        );
    }
}

#[test]
fn failing_compile_skips_bindgen() {
    let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
    for (name, _) in SCRIPTS {
        let sandbox = Sandbox::new(101, 0);
        let output = sandbox.run(name);
        assert_eq!(output.status.code(), Some(101), "{name}");

        let calls = sandbox.calls();
        assert_eq!(calls.len(), 1, "{name}: {calls:?}");
        assert_eq!(calls[0][0], "cargo");
    }
}

#[test]
fn exit_status_is_that_of_bindgen() {
    let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
    for (name, _) in SCRIPTS {
        let sandbox = Sandbox::new(0, 3);
        let output = sandbox.run(name);
        assert_eq!(output.status.code(), Some(3), "{name}");
        assert_eq!(sandbox.calls().len(), 2);
    }
}
