//! Speed-PID stage consumed by both gimbal axes.
//!
//! The stage keeps integrator and derivative memory across calls; the axis
//! controllers feed it a speed setpoint derived from angular error and the
//! measured motor speed, once per refresh tick.

/// Gains and output bound for one PID stage.
#[derive(Debug, Clone, Copy)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Output magnitude limit; the integrator is clamped against it too.
    pub max_output: f32,
}

pub struct SpeedPid {
    gains: PidGains,
    integral: f32,
    last_error: f32,
    output: f32,
}

impl SpeedPid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            last_error: 0.0,
            output: 0.0,
        }
    }

    /// Runs the controller for one tick of `elapsed_ms` milliseconds.
    ///
    /// Durations are unsigned and can never be negative. A zero duration
    /// contributes only the proportional term and leaves integrator and
    /// derivative memory untouched.
    pub fn run_controller(&mut self, setpoint: f32, measurement: f32, elapsed_ms: u32) {
        let error = setpoint - measurement;
        let dt = elapsed_ms as f32 / 1000.0;

        let mut output = self.gains.kp * error;

        if dt > 0.0 {
            self.integral += error * dt;
            if self.gains.ki != 0.0 {
                let i_max = self.gains.max_output.abs() / self.gains.ki.abs();
                self.integral = self.integral.clamp(-i_max, i_max);
            }
            output += self.gains.ki * self.integral;
            output += self.gains.kd * (error - self.last_error) / dt;
            self.last_error = error;
        }

        self.output = output.clamp(-self.gains.max_output, self.gains.max_output);
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    /// Clears integrator, derivative memory, and the held output.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.output = 0.0;
    }
}
