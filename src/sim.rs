//! Deterministic first-order motor model.
//!
//! Stands in for the real bus drivers in the demo binary and in closed-loop
//! tests: commanded drive sets a steady-state speed, the speed relaxes
//! toward it, and the encoder integrates the speed and wraps at the
//! resolution. Time comes from the injected clock, so tests can step it
//! exactly.

use crate::clock::Clock;
use crate::motor::GimbalMotor;

/// Steady-state RPM reached per unit of commanded drive output.
const RPM_PER_OUTPUT: f32 = 0.01;
/// Speed relaxation time constant, milliseconds.
const SPEED_TAU_MS: f32 = 50.0;

pub struct SimMotor {
    id: u8,
    resolution: u32,
    clock: Box<dyn Clock>,
    output: f32,
    speed_rpm: f32,
    position_counts: f64,
    last_step_ms: u32,
}

impl SimMotor {
    pub fn new(id: u8, resolution: u32, starting_count: u32, clock: Box<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            id,
            resolution,
            clock,
            output: 0.0,
            speed_rpm: 0.0,
            position_counts: starting_count as f64,
            last_step_ms: now,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Advances the model to the clock's current time.
    fn step(&mut self) {
        let now = self.clock.now_ms();
        let dt_ms = now.wrapping_sub(self.last_step_ms);
        self.last_step_ms = now;
        if dt_ms == 0 {
            return;
        }

        let steady_rpm = self.output * RPM_PER_OUTPUT;
        let alpha = (dt_ms as f32 / SPEED_TAU_MS).min(1.0);
        self.speed_rpm += (steady_rpm - self.speed_rpm) * alpha;

        let counts_per_ms = self.speed_rpm as f64 * self.resolution as f64 / 60_000.0;
        self.position_counts = (self.position_counts + counts_per_ms * dt_ms as f64)
            .rem_euclid(self.resolution as f64);
    }
}

impl GimbalMotor for SimMotor {
    fn initialize(&mut self) {
        self.last_step_ms = self.clock.now_ms();
    }

    fn is_online(&self) -> bool {
        // the simulated bus is always reachable
        true
    }

    fn set_desired_output(&mut self, output: f32) {
        self.step();
        self.output = output;
    }

    fn encoder_wrapped(&mut self) -> u32 {
        self.step();
        (self.position_counts as u32).min(self.resolution - 1)
    }

    fn rotational_speed(&mut self) -> f32 {
        self.step();
        self.speed_rpm
    }
}
