//! Collaborator interface for one gimbal motor.
//!
//! The real bus driver (transport framing, encoder decoding, online
//! detection) lives outside this crate. The controller only needs this
//! narrow surface; [`crate::sim::SimMotor`] implements it for the demo
//! binary and the test mocks implement it for the test suite.

pub trait GimbalMotor: Send {
    /// Prepares the motor driver. Called once before the first refresh.
    fn initialize(&mut self);

    /// Whether the motor currently reports on the bus.
    fn is_online(&self) -> bool;

    /// Commands the signed drive output for the next control interval.
    fn set_desired_output(&mut self, output: f32);

    /// Latest wrapped encoder position, in counts within `[0, resolution)`.
    fn encoder_wrapped(&mut self) -> u32;

    /// Latest rotational speed, in RPM.
    fn rotational_speed(&mut self) -> f32;
}
