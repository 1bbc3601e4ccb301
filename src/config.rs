use std::f32::consts::{FRAC_PI_2, PI};

use crate::pid::PidGains;

// ** MOTOR / BUS CONFIGURATION ** //

/// Bus identifiers for the two gimbal motors.
pub const YAW_MOTOR_ID: u8 = 5;
pub const PITCH_MOTOR_ID: u8 = 6;
pub const CAN_BUS_MOTORS: u8 = 1;
/// Encoder counts per mechanical revolution.
pub const ENCODER_RESOLUTION: u32 = 8192;

// ** CONTROL LOOP CONFIGURATION ** //

/// Refresh cadence of the scheduler, 500 Hz.
pub const REFRESH_PERIOD_MS: u64 = 2;
/// Yaw errors strictly beyond this magnitude take the shorter way around
/// the wrap.
pub const MAX_YAW_ERROR: f32 = PI;
/// Angular dead-zones; errors inside them command no motion.
pub const YAW_MINIMUM_RADS: f32 = 0.05;
pub const PITCH_MINIMUM_RADS: f32 = 0.05;
/// Angular error (radians) to speed setpoint (RPM) factor.
pub const MOTOR_SPEED_FACTOR: f32 = 100.0;
/// Drive output limits, raw motor units.
pub const MAX_YAW_SPEED: f32 = 24_000.0;
pub const MIN_YAW_SPEED: f32 = 400.0;
pub const MAX_PITCH_SPEED: f32 = 20_000.0;
pub const MIN_PITCH_SPEED: f32 = 400.0;

/// Speed-loop gains per axis. Ki and Kd are disabled for now; the
/// proportional term alone holds the loop stable at the demo cadence.
pub const YAW_PID: PidGains = PidGains {
    kp: 60.0,
    ki: 0.0,
    kd: 0.0,
    max_output: MAX_YAW_SPEED,
};
pub const PITCH_PID: PidGains = PidGains {
    kp: 55.0,
    ki: 0.0,
    kd: 0.0,
    max_output: MAX_PITCH_SPEED,
};

// ** INPUT CONFIGURATION ** //

/// Each operator delta moves the target by `delta * scale` radians.
pub const YAW_SCALE: f32 = 0.01;
pub const PITCH_SCALE: f32 = 0.01;

// ** POSE CONFIGURATION ** //

/// Encoder angle at which the pitch arm sits level.
pub const LEVEL_ANGLE: f32 = FRAC_PI_2;
/// Pitch pose assumed at power-on, relative to level.
pub const STARTING_PITCH: f32 = 0.0;
/// Drive output holding the arm against gravity when level, raw motor units.
pub const GRAVITY_COMPENSATION_SCALAR: f32 = 1_200.0;

/// Immutable controller configuration, built once at startup and handed to
/// [`crate::gimbal::GimbalController`] at construction.
#[derive(Debug, Clone)]
pub struct GimbalConfig {
    pub yaw_motor_id: u8,
    pub pitch_motor_id: u8,
    pub encoder_resolution: u32,
    pub yaw_pid: PidGains,
    pub pitch_pid: PidGains,
    pub max_yaw_error: f32,
    pub yaw_deadzone: f32,
    pub pitch_deadzone: f32,
    pub motor_speed_factor: f32,
    pub max_yaw_speed: f32,
    pub min_yaw_speed: f32,
    pub max_pitch_speed: f32,
    pub min_pitch_speed: f32,
    pub yaw_input_scale: f32,
    pub pitch_input_scale: f32,
    pub gravity_compensation_scalar: f32,
    pub level_angle: f32,
    pub starting_pitch: f32,
}

impl Default for GimbalConfig {
    fn default() -> Self {
        Self {
            yaw_motor_id: YAW_MOTOR_ID,
            pitch_motor_id: PITCH_MOTOR_ID,
            encoder_resolution: ENCODER_RESOLUTION,
            yaw_pid: YAW_PID,
            pitch_pid: PITCH_PID,
            max_yaw_error: MAX_YAW_ERROR,
            yaw_deadzone: YAW_MINIMUM_RADS,
            pitch_deadzone: PITCH_MINIMUM_RADS,
            motor_speed_factor: MOTOR_SPEED_FACTOR,
            max_yaw_speed: MAX_YAW_SPEED,
            min_yaw_speed: MIN_YAW_SPEED,
            max_pitch_speed: MAX_PITCH_SPEED,
            min_pitch_speed: MIN_PITCH_SPEED,
            yaw_input_scale: YAW_SCALE,
            pitch_input_scale: PITCH_SCALE,
            gravity_compensation_scalar: GRAVITY_COMPENSATION_SCALAR,
            level_angle: LEVEL_ANGLE,
            starting_pitch: STARTING_PITCH,
        }
    }
}
