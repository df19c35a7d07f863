//! The flock: every boid, the parameters and the RNG, advanced one frame at a time.
//!
//! One frame runs, in order:
//! 1. [`Flock::adjust_population`] (no-op unless `number_of_boids` changed)
//! 2. [`Flock::flock`] cohesion / separation / alignment over all pairs in view
//! 3. [`Flock::steer_pointer`] attraction or repulsion around a pressed pointer
//! 4. [`Flock::handle_walls`] wrap around or bounce off the window edges
//! 5. [`Flock::fly`] turn towards the velocity and integrate the position

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::f32::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::boid::{Boid, Calculations};
use crate::error::{FlockError, ParamError, StepError};
use crate::input::Pointer;
use crate::math::{Vec2, powf, signum};
use crate::params::{ParamKey, Parameters, window_has_area};

/// Rate of the exponential distribution boid weights are drawn from.
const WEIGHT_RATE: f32 = 20.0;

/// Pair distances are floored here before dividing.
const MIN_DISTANCE: f32 = 0.001;

/// The pointer reaches this many view distances.
const POINTER_REACH: f32 = 4.0;

pub struct Flock {
    params: Parameters,
    boids: Vec<Boid>,
    calcs: Vec<Calculations>,
    rng: SmallRng,
    weights: Exp<f32>,
}

/// Aggregate numbers for logging and tests.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlockStats {
    pub count: usize,
    pub mean_speed: f32,
    /// Length of the mean unit velocity: 1.0 when every boid flies the same way, near 0.0 when
    /// headings are spread out.
    pub polarization: f32,
    pub centroid: Vec2,
}

impl Flock {
    /// Build a flock of `params.number_of_boids` randomly placed boids.
    pub fn new(params: Parameters, seed: u64) -> Result<Self, FlockError> {
        params.validate()?;
        let mut flock = Self::empty(params, seed)?;
        flock.spawn(flock.params.number_of_boids);
        Ok(flock)
    }

    /// Build a flock from explicit boids. `number_of_boids` is set to `boids.len()`.
    pub fn with_boids(
        mut params: Parameters,
        boids: Vec<Boid>,
        seed: u64,
    ) -> Result<Self, FlockError> {
        params.validate_dynamics()?;
        params.number_of_boids = boids.len();
        let mut flock = Self::empty(params, seed)?;
        flock.calcs = alloc::vec![Calculations::default(); boids.len()];
        flock.boids = boids;
        Ok(flock)
    }

    fn empty(params: Parameters, seed: u64) -> Result<Self, FlockError> {
        let weights = Exp::new(WEIGHT_RATE).map_err(|_| FlockError::WeightDistribution)?;
        Ok(Self {
            params,
            boids: Vec::new(),
            calcs: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            weights,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Mutable access to the boids. The population itself only changes through parameters.
    pub fn boids_mut(&mut self) -> &mut [Boid] {
        &mut self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Update one parameter. Changing `number_of_boids` spawns or drops boids right away.
    pub fn set_param(&mut self, key: ParamKey, value: f32) -> Result<(), ParamError> {
        self.params.set(key, value)?;
        if key == ParamKey::NumberOfBoids {
            self.adjust_population();
        }
        Ok(())
    }

    /// Replace every tunable parameter. The window size is owned by [`resize`](Self::resize)
    /// and is kept.
    pub fn set_params(&mut self, mut params: Parameters) -> Result<(), ParamError> {
        params.window_width = self.params.window_width;
        params.window_height = self.params.window_height;
        params.validate()?;
        self.params = params;
        self.adjust_population();
        Ok(())
    }

    /// Advance one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32, pointer: Option<&Pointer>) -> Result<(), StepError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(StepError::InvalidDelta(dt));
        }
        self.adjust_population();
        self.flock();
        if let Some(pointer) = pointer {
            self.steer_pointer(pointer);
        }
        self.handle_walls();
        self.fly(dt);
        Ok(())
    }

    /// Spawn `how_many` boids. Boid `i` of the batch gets hue `360 * i / how_many`.
    pub fn spawn(&mut self, how_many: usize) {
        self.boids.reserve(how_many);
        self.calcs.reserve(how_many);
        for i in 1..=how_many {
            let weight = 1.0 + self.weights.sample(&mut self.rng) * 10.0;
            let mut boid = Boid::new(self.random_position(), self.random_velocity(), weight);
            boid.hue = 360.0 * i as f32 / how_many as f32;
            self.boids.push(boid);
            self.calcs.push(Calculations::default());
        }
    }

    /// Spawn the shortfall or drop the excess to match `number_of_boids`.
    pub fn adjust_population(&mut self) {
        let target = self.params.number_of_boids;
        match self.boids.len().cmp(&target) {
            Ordering::Less => self.spawn(target - self.boids.len()),
            Ordering::Greater => {
                self.boids.truncate(target);
                self.calcs.truncate(target);
            }
            Ordering::Equal => {}
        }
    }

    /// Accumulate neighbour sums over every pair in view, then steer each boid.
    pub fn flock(&mut self) {
        let Parameters {
            view_distance,
            separation_bias,
            alignment_bias: bias,
            fidelity,
            steering_force,
            cohesion_force,
            separation_force,
            alignment_force,
            min_speed,
            max_speed,
            ..
        } = self.params;

        // Normalizes `bias^similarity` so the preferred direction maps to 1.0.
        let alignment_norm = if bias > 1.0 { bias } else { 1.0 / bias };

        let n = self.boids.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.rng.gen_range(0.0f32..=1.0) > fidelity {
                    continue;
                }

                let (b1, b2) = (&self.boids[i], &self.boids[j]);
                let distance = b1.position.distance(b2.position);
                if distance > view_distance {
                    continue;
                }
                let distance = distance.max(MIN_DISTANCE);
                let (p1, p2) = (b1.position, b2.position);
                let (v1, v2) = (b1.velocity, b2.velocity);

                // Closer boids push harder.
                let separation_factor = 1.0 / powf(distance, separation_bias);

                // bias > 1 favours boids flying the same way, bias < 1 the opposite way.
                let alignment_factor = powf(bias, cosine_similarity(v1, v2)) / alignment_norm;

                // Heavier boids have a stronger influence.
                let (m1, m2) = (b1.weight * b1.weight, b2.weight * b2.weight);
                let (b1w, b2w) = (m1 / m2, m2 / m1);

                let c1 = &mut self.calcs[i];
                c1.neighbours += 1;
                c1.cohesion += p2 * b2w;
                c1.separation += (p1 - p2) * separation_factor * b2w;
                c1.alignment += v2 * alignment_factor * b2w;

                let c2 = &mut self.calcs[j];
                c2.neighbours += 1;
                c2.cohesion += p1 * b1w;
                c2.separation += (p2 - p1) * separation_factor * b1w;
                c2.alignment += v1 * alignment_factor * b1w;
            }
        }

        for (boid, calc) in self.boids.iter_mut().zip(self.calcs.iter_mut()) {
            if calc.neighbours == 0 {
                continue;
            }

            let cohesion =
                -(calc.cohesion / calc.neighbours as f32).clamp_length_max(steering_force);
            let separation = calc.separation.clamp_length_max(steering_force);
            let alignment = calc.alignment.clamp_length_max(steering_force);

            boid.velocity = (boid.velocity
                + cohesion_force * cohesion
                + separation_force * separation
                + alignment_force * alignment)
                .clamp_length(min_speed, max_speed);
            calc.reset();
        }
    }

    /// Pull boids towards (primary button) or push them away from (secondary) the pointer.
    pub fn steer_pointer(&mut self, pointer: &Pointer) {
        let Some(action) = pointer.action() else {
            return;
        };
        let reach = self.params.view_distance * POINTER_REACH;
        let gain = self.params.steering_force * self.params.cohesion_force * 0.5;
        let max_speed = self.params.max_speed;

        for boid in &mut self.boids {
            if boid.position.distance(pointer.position) > reach {
                continue;
            }
            let target = (pointer.position - boid.position) * action.direction();
            boid.velocity = (boid.velocity + target * gain).clamp_length_max(max_speed);
        }
    }

    /// Boids leaving the window either bounce back or reappear on the opposite side.
    pub fn handle_walls(&mut self) {
        let x_range = self.params.window_x_range();
        let y_range = self.params.window_y_range();
        let bounce = self.params.bounce_off_walls;

        for boid in &mut self.boids {
            let x = boid.position.x;
            if !x_range.contains(&x) && signum(boid.velocity.x) == signum(x) {
                if bounce {
                    boid.velocity.x *= -1.0;
                } else {
                    boid.position.x *= -1.0;
                }
            }
            let y = boid.position.y;
            if !y_range.contains(&y) && signum(boid.velocity.y) == signum(y) {
                if bounce {
                    boid.velocity.y *= -1.0;
                } else {
                    boid.position.y *= -1.0;
                }
            }
        }
    }

    /// Turn every boid towards its velocity, colour it by heading and move it.
    pub fn fly(&mut self, dt: f32) {
        for boid in &mut self.boids {
            let target = boid.velocity.normalize_or_zero();
            if target != Vec2::ZERO {
                boid.heading = target;
                boid.hue = heading_hue(target);
            }
            boid.position += boid.velocity * dt;
        }
    }

    /// Scatter every boid to a new random position.
    pub fn restart(&mut self) {
        for i in 0..self.boids.len() {
            let position = self.random_position();
            self.boids[i].position = position;
        }
    }

    /// Follow a window resize, clamping boids into the new bounds.
    ///
    /// Returns `false` when the size is unchanged or has no area.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !window_has_area(width, height) {
            return false;
        }
        if self.params.window_width == width && self.params.window_height == height {
            return false;
        }
        self.params.window_width = width;
        self.params.window_height = height;

        let (min, max) = (self.params.min_position(), self.params.max_position());
        for boid in &mut self.boids {
            boid.position = boid.position.clamp(min, max);
        }
        true
    }

    pub fn stats(&self) -> FlockStats {
        let count = self.boids.len();
        if count == 0 {
            return FlockStats::default();
        }
        let n = count as f32;
        let mut speed = 0.0;
        let mut direction = Vec2::ZERO;
        let mut centroid = Vec2::ZERO;
        for boid in &self.boids {
            speed += boid.velocity.length();
            direction += boid.velocity.normalize_or_zero();
            centroid += boid.position;
        }
        FlockStats {
            count,
            mean_speed: speed / n,
            polarization: (direction / n).length(),
            centroid: centroid / n,
        }
    }

    fn random_position(&mut self) -> Vec2 {
        let x = self.rng.gen_range(self.params.window_x_range());
        let y = self.rng.gen_range(self.params.window_y_range());
        Vec2::new(x, y)
    }

    fn random_velocity(&mut self) -> Vec2 {
        let max = self.params.max_speed;
        Vec2::new(self.rng.gen_range(-max..max), self.rng.gen_range(-max..max))
    }
}

/// Cosine similarity: 1.0 for the same direction, -1.0 for opposite, 0.0 if either is still.
fn cosine_similarity(a: Vec2, b: Vec2) -> f32 {
    let lengths = a.length() * b.length();
    if lengths > 0.0 {
        a.dot(b) / lengths
    } else {
        0.0
    }
}

/// Hue in degrees for a unit heading: straight up is 180, east is 270, west is 90.
fn heading_hue(heading: Vec2) -> f32 {
    360.0 * (heading.angle_to(Vec2::Y) + PI) / (2.0 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButtons;
    use alloc::vec;

    fn params() -> Parameters {
        Parameters {
            window_width: 640.0,
            window_height: 480.0,
            ..Parameters::default()
        }
    }

    fn pair(a: Boid, b: Boid) -> Flock {
        let params = Parameters {
            fidelity: 1.0,
            ..params()
        };
        Flock::with_boids(params, vec![a, b], 7).unwrap()
    }

    #[test]
    fn spawns_inside_window_with_bounded_velocity() {
        let flock = Flock::new(params(), 1).unwrap();
        assert_eq!(flock.len(), 512);
        let p = flock.params();
        for b in flock.boids() {
            assert!(p.window_x_range().contains(&b.position.x));
            assert!(p.window_y_range().contains(&b.position.y));
            assert!(b.velocity.x.abs() <= p.max_speed && b.velocity.y.abs() <= p.max_speed);
            assert!(b.weight >= 1.0);
            assert!(b.hue > 0.0 && b.hue <= 360.0);
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = Flock::new(params(), 42).unwrap();
        let mut b = Flock::new(params(), 42).unwrap();
        for _ in 0..5 {
            a.step(1.0 / 60.0, None).unwrap();
            b.step(1.0 / 60.0, None).unwrap();
        }
        assert_eq!(a.boids(), b.boids());
    }

    #[test]
    fn population_follows_parameter() {
        let mut flock = Flock::new(params(), 3).unwrap();
        flock.set_param(ParamKey::NumberOfBoids, 600.0).unwrap();
        assert_eq!(flock.len(), 600);
        flock.set_param(ParamKey::NumberOfBoids, 8.0).unwrap();
        assert_eq!(flock.len(), 8);
        assert!(flock.set_param(ParamKey::NumberOfBoids, 4.0).is_err());
        assert_eq!(flock.len(), 8);
    }

    #[test]
    fn separation_pushes_close_boids_apart() {
        let mut flock = pair(
            Boid::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
        );
        flock.params.cohesion_force = 0.0;
        flock.params.alignment_force = 0.0;
        flock.flock();
        let [a, b] = [&flock.boids()[0], &flock.boids()[1]];
        assert!(a.velocity.x < 0.0, "left boid should veer left: {:?}", a.velocity);
        assert!(b.velocity.x > 0.0, "right boid should veer right: {:?}", b.velocity);
        assert!(flock.calcs.iter().all(|c| *c == Calculations::default()));
    }

    #[test]
    fn boids_out_of_view_are_left_alone() {
        let mut flock = pair(
            Boid::new(Vec2::new(-200.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
            Boid::new(Vec2::new(200.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
        );
        flock.flock();
        assert_eq!(flock.boids()[0].velocity, Vec2::new(0.0, 50.0));
        assert_eq!(flock.boids()[1].velocity, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn steered_speed_stays_within_limits() {
        let mut flock = pair(
            Boid::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 1.0),
            Boid::new(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0), 3.0),
        );
        flock.flock();
        for b in flock.boids() {
            let speed = b.velocity.length();
            assert!((25.0 - 1e-3..=100.0 + 1e-3).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn walls_wrap_outgoing_boids() {
        let mut flock = pair(
            Boid::new(Vec2::new(330.0, 0.0), Vec2::new(10.0, 0.0), 1.0),
            Boid::new(Vec2::new(0.0, -250.0), Vec2::new(0.0, -10.0), 1.0),
        );
        flock.handle_walls();
        assert_eq!(flock.boids()[0].position, Vec2::new(-330.0, 0.0));
        assert_eq!(flock.boids()[1].position, Vec2::new(0.0, 250.0));
    }

    #[test]
    fn walls_bounce_when_enabled() {
        let mut flock = pair(
            Boid::new(Vec2::new(330.0, 0.0), Vec2::new(10.0, 5.0), 1.0),
            Boid::new(Vec2::new(-330.0, 0.0), Vec2::new(10.0, 5.0), 1.0),
        );
        flock.params.bounce_off_walls = true;
        flock.handle_walls();
        assert_eq!(flock.boids()[0].velocity, Vec2::new(-10.0, 5.0));
        // Already heading back inside: untouched.
        assert_eq!(flock.boids()[1].velocity, Vec2::new(10.0, 5.0));
        assert_eq!(flock.boids()[1].position, Vec2::new(-330.0, 0.0));
    }

    #[test]
    fn pointer_attracts_and_repels_within_reach() {
        let start = || {
            pair(
                Boid::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 30.0), 1.0),
                Boid::new(Vec2::new(310.0, 230.0), Vec2::new(0.0, 30.0), 1.0),
            )
        };
        let near = Vec2::new(20.0, 0.0);
        let mut flock = start();
        flock.params.view_distance = 10.0;
        flock.steer_pointer(&Pointer::new(near, PointerButtons::Primary as u32));
        assert!(flock.boids()[0].velocity.x > 0.0);
        // Out of reach (4 * 10 units).
        assert_eq!(flock.boids()[1].velocity, Vec2::new(0.0, 30.0));

        let mut flock = start();
        flock.params.view_distance = 10.0;
        flock.steer_pointer(&Pointer::new(near, PointerButtons::Secondary as u32));
        assert!(flock.boids()[0].velocity.x < 0.0);

        let mut flock = start();
        flock.steer_pointer(&Pointer::new(near, 0));
        assert_eq!(flock.boids()[0].velocity, Vec2::new(0.0, 30.0));
    }

    #[test]
    fn fly_integrates_and_turns() {
        let mut flock = pair(
            Boid::new(Vec2::ZERO, Vec2::new(60.0, 0.0), 1.0),
            Boid::new(Vec2::new(5.0, 5.0), Vec2::ZERO, 1.0),
        );
        flock.fly(0.5);
        let moving = &flock.boids()[0];
        assert_eq!(moving.position, Vec2::new(30.0, 0.0));
        assert_eq!(moving.heading, Vec2::X);
        assert!((moving.hue - 270.0).abs() < 1e-3, "hue {}", moving.hue);

        let still = &flock.boids()[1];
        assert_eq!(still.heading, Vec2::Y);
        assert!(still.position.is_finite());
    }

    #[test]
    fn resize_clamps_into_new_window() {
        let mut flock = pair(
            Boid::new(Vec2::new(300.0, 200.0), Vec2::X, 1.0),
            Boid::new(Vec2::new(-10.0, -5.0), Vec2::X, 1.0),
        );
        assert!(flock.resize(100.0, 50.0));
        assert_eq!(flock.boids()[0].position, Vec2::new(50.0, 25.0));
        assert_eq!(flock.boids()[1].position, Vec2::new(-10.0, -5.0));
        assert!(!flock.resize(100.0, 50.0));
        assert!(!flock.resize(0.0, 50.0));
        assert!(!flock.resize(1e-45, 50.0));
        assert_eq!(flock.params().window_width, 100.0);
    }

    #[test]
    fn new_rejects_window_without_half_extent() {
        let params = Parameters {
            window_width: 1e-45,
            ..params()
        };
        assert!(matches!(
            Flock::new(params, 1),
            Err(FlockError::Params(ParamError::EmptyWindow { .. }))
        ));
    }

    #[test]
    fn heavier_boid_pulls_harder() {
        let start = Vec2::new(0.0, 50.0);
        let mut flock = pair(
            Boid::new(Vec2::new(0.0, 0.0), start, 1.0),
            Boid::new(Vec2::new(50.0, 0.0), start, 3.0),
        );
        flock.params.cohesion_force = 0.0;
        flock.params.alignment_force = 0.0;
        flock.flock();
        let light = (flock.boids()[0].velocity - start).length();
        let heavy = (flock.boids()[1].velocity - start).length();
        assert!(light > heavy, "light moved {light}, heavy moved {heavy}");
        assert!(heavy > 0.0);
    }

    #[test]
    fn still_neighbour_does_not_poison_velocities() {
        let mut flock = pair(
            Boid::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 1.0),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
        );
        assert_eq!(cosine_similarity(Vec2::ZERO, Vec2::new(0.0, 50.0)), 0.0);
        flock.flock();
        for b in flock.boids() {
            assert!(b.velocity.is_finite(), "{:?}", b.velocity);
            assert!(b.velocity.length() >= 25.0 - 1e-3);
        }
    }

    #[test]
    fn alignment_bias_picks_which_neighbours_count() {
        // The middle boid flies up between one neighbour flying up and one flying down.
        let middle_after = |bias: f32| {
            let params = Parameters {
                fidelity: 1.0,
                cohesion_force: 0.0,
                separation_force: 0.0,
                alignment_bias: bias,
                ..params()
            };
            let boids = vec![
                Boid::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
                Boid::new(Vec2::new(-20.0, 0.0), Vec2::new(0.0, 50.0), 1.0),
                Boid::new(Vec2::new(20.0, 0.0), Vec2::new(0.0, -50.0), 1.0),
            ];
            let mut flock = Flock::with_boids(params, boids, 3).unwrap();
            flock.flock();
            flock.boids()[0].velocity
        };

        // bias > 1: boids flying the same way dominate.
        assert!(middle_after(1.5).y > 50.0);
        // bias < 1: boids flying the opposite way dominate.
        assert!(middle_after(0.5).y < 50.0);
    }

    #[test]
    fn restart_keeps_population_inside_window() {
        let mut flock = Flock::new(params(), 9).unwrap();
        let before: Vec<_> = flock.boids().iter().map(|b| b.position).collect();
        flock.restart();
        assert_eq!(flock.len(), before.len());
        assert!(flock.boids().iter().zip(&before).any(|(b, p)| b.position != *p));
        let p = flock.params().clone();
        assert!(flock.boids().iter().all(|b| p.window_x_range().contains(&b.position.x)));
    }

    #[test]
    fn step_rejects_bad_delta() {
        let mut flock = Flock::new(params(), 5).unwrap();
        assert_eq!(flock.step(-1.0, None), Err(StepError::InvalidDelta(-1.0)));
        assert!(flock.step(f32::NAN, None).is_err());
        assert!(flock.step(0.0, None).is_ok());
    }

    #[test]
    fn stats_of_aligned_flock() {
        let mut flock = pair(
            Boid::new(Vec2::new(-10.0, 0.0), Vec2::new(30.0, 0.0), 1.0),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::new(50.0, 0.0), 1.0),
        );
        let stats = flock.stats();
        assert_eq!(stats.count, 2);
        assert!((stats.mean_speed - 40.0).abs() < 1e-4);
        assert!((stats.polarization - 1.0).abs() < 1e-4);
        assert_eq!(stats.centroid, Vec2::ZERO);

        flock.boids_mut()[1].velocity = Vec2::new(-50.0, 0.0);
        assert!(flock.stats().polarization < 1e-4);
    }

    #[test]
    fn set_params_keeps_window() {
        let mut flock = Flock::new(params(), 2).unwrap();
        let next = Parameters {
            window_width: 1.0,
            number_of_boids: 16,
            ..Parameters::default()
        };
        flock.set_params(next).unwrap();
        assert_eq!(flock.params().window_width, 640.0);
        assert_eq!(flock.len(), 16);
    }
}
