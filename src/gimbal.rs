//! Closed-loop two-axis gimbal orientation controller.
//!
//! Once per refresh tick the controller reads elapsed time and motor state,
//! updates each axis's error and speed-PID stage, and writes a bounded drive
//! command back to the motors. Input adapters run from the command-processing
//! path and only move target angles; they never compute drive directly.
//!
//! Failure is degraded operation, not an error: an offline motor is skipped
//! for the tick, and with no live command source both targets hold the
//! current pose.

use std::f32::consts::{PI, TAU};

use log::info;

use crate::angle::{shortest_rotation, wrapped_encoder_to_radians};
use crate::clock::Clock;
use crate::config::GimbalConfig;
use crate::indicator::Indicator;
use crate::motor::GimbalMotor;
use crate::pid::SpeedPid;
use crate::scheduler::Periodic;

/// Per-axis controller state. Angles in radians; `output` in raw motor
/// units.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisState {
    pub target: f32,
    pub current: f32,
    pub error: f32,
    pub output: f32,
}

pub struct GimbalController {
    config: GimbalConfig,
    yaw_motor: Box<dyn GimbalMotor>,
    pitch_motor: Box<dyn GimbalMotor>,
    indicator: Box<dyn Indicator>,
    clock: Box<dyn Clock>,
    yaw_pid: SpeedPid,
    pitch_pid: SpeedPid,
    yaw: AxisState,
    pitch: AxisState,
    starting_yaw: f32,
    starting_pitch: f32,
    imu_yaw: f32,
    imu_pitch: f32,
    inputs_found: bool,
    past_time_ms: u32,
    elapsed_ms: u32,
}

impl GimbalController {
    pub fn new(
        config: GimbalConfig,
        yaw_motor: Box<dyn GimbalMotor>,
        pitch_motor: Box<dyn GimbalMotor>,
        indicator: Box<dyn Indicator>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let yaw_pid = SpeedPid::new(config.yaw_pid);
        let pitch_pid = SpeedPid::new(config.pitch_pid);

        Self {
            config,
            yaw_motor,
            pitch_motor,
            indicator,
            clock,
            yaw_pid,
            pitch_pid,
            yaw: AxisState::default(),
            pitch: AxisState::default(),
            starting_yaw: 0.0,
            starting_pitch: 0.0,
            imu_yaw: 0.0,
            imu_pitch: 0.0,
            inputs_found: false,
            past_time_ms: 0,
            elapsed_ms: 0,
        }
    }

    /// Brings both motors up unpowered and adopts the sampled pose as both
    /// the target and the starting pose.
    pub fn initialize(&mut self) {
        self.past_time_ms = self.clock.now_ms();
        self.set_imu_reference(0.0, self.config.starting_pitch + self.config.level_angle);

        self.yaw_motor.initialize();
        self.yaw_motor.set_desired_output(0.0);
        self.pitch_motor.initialize();
        self.pitch_motor.set_desired_output(0.0);

        let yaw_encoder = self.yaw_motor.encoder_wrapped();
        let pitch_encoder = self.pitch_motor.encoder_wrapped();
        self.starting_yaw = wrapped_encoder_to_radians(yaw_encoder, self.config.encoder_resolution);
        self.starting_pitch =
            wrapped_encoder_to_radians(pitch_encoder, self.config.encoder_resolution);

        self.yaw.current = self.starting_yaw;
        self.yaw.target = self.starting_yaw;
        self.pitch.current = self.starting_pitch;
        self.pitch.target = self.starting_pitch;

        info!(
            "gimbal initialized at yaw {:.3} rad, pitch {:.3} rad",
            self.starting_yaw, self.starting_pitch
        );
    }

    /// One control tick.
    ///
    /// Elapsed-time bookkeeping and fault indication run every tick. With a
    /// live command source each online axis is updated from fresh encoder
    /// and speed reads; an offline axis keeps its stale pose and gets no
    /// command. With no command source both targets snap to the current
    /// pose.
    pub fn refresh(&mut self) {
        let now = self.clock.now_ms();
        self.elapsed_ms = now.wrapping_sub(self.past_time_ms);
        self.past_time_ms = now;

        self.indicator.set_yaw_fault(!self.yaw_motor.is_online());
        self.indicator.set_pitch_fault(!self.pitch_motor.is_online());

        if self.inputs_found {
            if self.yaw_motor.is_online() {
                let speed = self.yaw_motor.rotational_speed();
                let encoder = self.yaw_motor.encoder_wrapped();
                self.yaw.current =
                    wrapped_encoder_to_radians(encoder, self.config.encoder_resolution);
                self.update_yaw(speed);
            }
            if self.pitch_motor.is_online() {
                let speed = self.pitch_motor.rotational_speed();
                let encoder = self.pitch_motor.encoder_wrapped();
                self.pitch.current =
                    wrapped_encoder_to_radians(encoder, self.config.encoder_resolution);
                self.update_pitch(speed);
            }
        } else {
            // no command source, lock the gimbal on its current pose
            self.yaw.target = self.yaw.current;
            self.pitch.target = self.pitch.current;
        }
    }

    fn update_yaw(&mut self, motor_speed: f32) {
        self.yaw.error = shortest_rotation(
            self.yaw.target - self.yaw.current,
            self.config.max_yaw_error,
        );

        if -self.config.yaw_deadzone < self.yaw.error && self.yaw.error < self.config.yaw_deadzone
        {
            self.yaw.output = 0.0;
        } else {
            self.yaw_pid.run_controller(
                self.yaw.error * self.config.motor_speed_factor,
                motor_speed,
                self.elapsed_ms,
            );
            let mut output = self
                .yaw_pid
                .output()
                .clamp(-self.config.max_yaw_speed, self.config.max_yaw_speed);
            if -self.config.min_yaw_speed < output && output < self.config.min_yaw_speed {
                output = 0.0;
            }
            self.yaw.output = output;
        }
        // committed on every branch so the motor never coasts on a command
        // from two ticks ago
        self.yaw_motor.set_desired_output(self.yaw.output);
    }

    fn update_pitch(&mut self, motor_speed: f32) {
        self.pitch.error = self.pitch.target - self.pitch.current;

        // the stage runs every tick; the dead-zone only gates the command
        self.pitch_pid.run_controller(
            self.pitch.error * self.config.motor_speed_factor,
            motor_speed,
            self.elapsed_ms,
        );

        let mut output = if -self.config.pitch_deadzone < self.pitch.error
            && self.pitch.error < self.config.pitch_deadzone
        {
            0.0
        } else {
            self.pitch_pid
                .output()
                .clamp(-self.config.max_pitch_speed, self.config.max_pitch_speed)
        };

        output += self.gravity_compensation();

        if -self.config.min_pitch_speed < output && output < self.config.min_pitch_speed {
            self.pitch.output = 0.0;
        } else {
            self.pitch.output = output;
            self.pitch_motor.set_desired_output(output);
        }
    }

    /// Drive output holding the arm against gravity, as a cosine of the
    /// deviation from the calibrated level pose.
    fn gravity_compensation(&self) -> f32 {
        let deviation = (self.pitch.current - self.config.level_angle).clamp(-PI, PI);
        self.config.gravity_compensation_scalar * deviation.cos()
    }

    /// Operator delta input. Deltas are trusted small per-tick joystick
    /// values; no bounds are applied.
    pub fn operator_input(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw.target += yaw_delta * self.config.yaw_input_scale;
        self.pitch.target += pitch_delta * self.config.pitch_input_scale;
        self.inputs_found = true;
    }

    /// Vision offset input. Offsets are corrections from the true current
    /// pose, so they apply to `current` rather than a possibly stale
    /// target. Each offset is clamped to `[-2π, 2π]`.
    pub fn vision_input(&mut self, yaw_offset: f32, pitch_offset: f32) {
        let yaw_offset = yaw_offset.clamp(-TAU, TAU);
        let pitch_offset = pitch_offset.clamp(-TAU, TAU);

        self.yaw.target = self.yaw.current + yaw_offset;
        self.pitch.target = self.pitch.current + pitch_offset;
        self.inputs_found = true;
    }

    /// Safety stop: clears the command-presence flag and cuts drive on both
    /// motors immediately rather than waiting for the next tick. Idempotent.
    pub fn no_inputs(&mut self) {
        self.inputs_found = false;
        self.pitch_motor.set_desired_output(0.0);
        self.yaw_motor.set_desired_output(0.0);
    }

    fn set_imu_reference(&mut self, yaw: f32, pitch: f32) {
        self.imu_yaw = yaw;
        self.imu_pitch = pitch;
    }

    /// The controller's notion of level, set once at initialize.
    pub fn imu_reference(&self) -> (f32, f32) {
        (self.imu_yaw, self.imu_pitch)
    }

    pub fn yaw_axis(&self) -> &AxisState {
        &self.yaw
    }

    pub fn pitch_axis(&self) -> &AxisState {
        &self.pitch
    }

    pub fn inputs_found(&self) -> bool {
        self.inputs_found
    }

    /// Duration of the last tick, milliseconds.
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

impl Periodic for GimbalController {
    fn initialize(&mut self) {
        GimbalController::initialize(self);
    }

    fn refresh(&mut self) {
        GimbalController::refresh(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    use crate::config::{PITCH_MOTOR_ID, YAW_MOTOR_ID};
    use crate::mocks::mock_clock::{self, MockClock};
    use crate::mocks::mock_indicator::{self, MockIndicator};
    use crate::mocks::mock_motor::{self, MockMotor};

    // Gravity compensation is zeroed here so the dead-zone and hold-pose
    // properties are visible on the pitch axis; the gravity tests opt back
    // in explicitly.
    fn test_config() -> GimbalConfig {
        GimbalConfig {
            gravity_compensation_scalar: 0.0,
            ..GimbalConfig::default()
        }
    }

    fn controller_with(config: GimbalConfig) -> GimbalController {
        mock_motor::reset_mock_motors();
        mock_clock::reset_mock_clock();
        mock_indicator::reset_mock_indicator();

        GimbalController::new(
            config,
            Box::new(MockMotor::new(YAW_MOTOR_ID)),
            Box::new(MockMotor::new(PITCH_MOTOR_ID)),
            Box::new(MockIndicator),
            Box::new(MockClock),
        )
    }

    fn tick(controller: &mut GimbalController) {
        mock_clock::advance_mock_time_ms(2);
        controller.refresh();
    }

    #[test]
    fn test_initialize_adopts_current_pose() {
        let mut controller = controller_with(test_config());
        mock_motor::set_mock_encoder(YAW_MOTOR_ID, 2048);
        mock_motor::set_mock_encoder(PITCH_MOTOR_ID, 4096);

        controller.initialize();

        let yaw = controller.yaw_axis();
        assert!((yaw.current - FRAC_PI_2).abs() < 1e-5);
        assert_eq!(yaw.target, yaw.current);

        let pitch = controller.pitch_axis();
        assert!((pitch.current - PI).abs() < 1e-5);
        assert_eq!(pitch.target, pitch.current);

        // both motors held unpowered
        assert_eq!(mock_motor::get_mock_output(YAW_MOTOR_ID), 0.0);
        assert_eq!(mock_motor::get_mock_output(PITCH_MOTOR_ID), 0.0);

        let (imu_yaw, imu_pitch) = controller.imu_reference();
        assert_eq!(imu_yaw, 0.0);
        assert!((imu_pitch - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_uncommanded_until_first_input() {
        let mut controller = controller_with(test_config());
        controller.initialize();
        let writes_after_init = mock_motor::get_mock_output_writes(YAW_MOTOR_ID);

        for _ in 0..5 {
            tick(&mut controller);
        }

        assert!(!controller.inputs_found());
        // hold mode issues no drive commands
        assert_eq!(
            mock_motor::get_mock_output_writes(YAW_MOTOR_ID),
            writes_after_init
        );
    }

    #[test]
    fn test_yaw_wraparound_takes_shorter_path() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        // target 6.0 rad from current 0: raw error 6.0, shorter path is
        // negative
        controller.operator_input(600.0, 0.0);
        tick(&mut controller);

        let error = controller.yaw_axis().error;
        assert!((error - (6.0 - TAU)).abs() < 1e-5);
        assert!(mock_motor::get_mock_output(YAW_MOTOR_ID) < 0.0);
    }

    #[test]
    fn test_yaw_error_at_boundary_not_corrected() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        // error of exactly pi stays positive
        controller.vision_input(PI, 0.0);
        tick(&mut controller);

        assert_eq!(controller.yaw_axis().error, PI);
        assert!(mock_motor::get_mock_output(YAW_MOTOR_ID) > 0.0);
    }

    #[test]
    fn test_yaw_dead_zone_commands_zero_every_tick() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        // target within the dead-zone of the current pose
        controller.operator_input(1.0, 0.0);
        assert!((controller.yaw_axis().target - 0.01).abs() < 1e-6);

        for _ in 0..10 {
            let writes_before = mock_motor::get_mock_output_writes(YAW_MOTOR_ID);
            tick(&mut controller);
            assert_eq!(controller.yaw_axis().output, 0.0);
            assert_eq!(mock_motor::get_mock_output(YAW_MOTOR_ID), 0.0);
            // the zero is committed, not latched
            assert_eq!(
                mock_motor::get_mock_output_writes(YAW_MOTOR_ID),
                writes_before + 1
            );
        }
    }

    #[test]
    fn test_pitch_dead_zone_commands_nothing() {
        let mut controller = controller_with(test_config());
        controller.initialize();
        let writes_after_init = mock_motor::get_mock_output_writes(PITCH_MOTOR_ID);

        controller.operator_input(0.0, 1.0);
        for _ in 0..10 {
            tick(&mut controller);
            assert_eq!(controller.pitch_axis().output, 0.0);
            assert_eq!(mock_motor::get_mock_output(PITCH_MOTOR_ID), 0.0);
        }
        // with gravity zeroed the final output sits under the minimum speed
        // and the motor is left alone
        assert_eq!(
            mock_motor::get_mock_output_writes(PITCH_MOTOR_ID),
            writes_after_init
        );
    }

    #[test]
    fn test_pitch_gravity_hold_inside_dead_zone() {
        let mut controller = controller_with(GimbalConfig::default());
        // pitch level: deviation from the level pose is zero, cos is 1
        mock_motor::set_mock_encoder(PITCH_MOTOR_ID, 2048);
        controller.initialize();

        controller.operator_input(0.0, 0.0);
        tick(&mut controller);

        let expected = GimbalConfig::default().gravity_compensation_scalar;
        let commanded = mock_motor::get_mock_output(PITCH_MOTOR_ID);
        assert!((commanded - expected).abs() < 1.0);
    }

    #[test]
    fn test_gravity_compensation_bounded_by_scalar() {
        let mut controller = controller_with(GimbalConfig::default());
        let scalar = GimbalConfig::default().gravity_compensation_scalar;

        for i in -100..=100 {
            controller.pitch.current = i as f32 * 0.1;
            assert!(controller.gravity_compensation().abs() <= scalar + 1e-3);
        }
    }

    #[test]
    fn test_hold_pose_after_no_inputs() {
        let mut controller = controller_with(test_config());
        mock_motor::set_mock_encoder(YAW_MOTOR_ID, 1000);
        controller.initialize();

        // drive the target away from the pose, then release
        controller.operator_input(50.0, 30.0);
        tick(&mut controller);
        controller.no_inputs();

        for _ in 0..5 {
            tick(&mut controller);
            assert_eq!(controller.yaw_axis().target, controller.yaw_axis().current);
            assert_eq!(
                controller.pitch_axis().target,
                controller.pitch_axis().current
            );
        }
    }

    #[test]
    fn test_no_inputs_cuts_drive_immediately() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        controller.operator_input(200.0, 0.0);
        tick(&mut controller);
        assert!(mock_motor::get_mock_output(YAW_MOTOR_ID) != 0.0);

        // no refresh in between, the stop itself writes the zeros
        controller.no_inputs();
        assert_eq!(mock_motor::get_mock_output(YAW_MOTOR_ID), 0.0);
        assert_eq!(mock_motor::get_mock_output(PITCH_MOTOR_ID), 0.0);
        assert!(!controller.inputs_found());
    }

    #[test]
    fn test_vision_offsets_clamped_to_full_turn() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        controller.vision_input(10.0, 10.0);
        let clamped_yaw = controller.yaw_axis().target;
        let clamped_pitch = controller.pitch_axis().target;

        controller.vision_input(TAU, TAU);
        assert_eq!(controller.yaw_axis().target, clamped_yaw);
        assert_eq!(controller.pitch_axis().target, clamped_pitch);
    }

    #[test]
    fn test_operator_delta_within_dead_zone_scenario() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        // yaw scale 0.01: a unit delta moves the target to 0.01, inside the
        // 0.05 dead-zone
        controller.operator_input(1.0, 0.0);
        assert!((controller.yaw_axis().target - 0.01).abs() < 1e-6);

        tick(&mut controller);
        assert_eq!(controller.yaw_axis().output, 0.0);
        assert_eq!(mock_motor::get_mock_output(YAW_MOTOR_ID), 0.0);
    }

    #[test]
    fn test_offline_axis_is_skipped() {
        let mut controller = controller_with(test_config());
        mock_motor::set_mock_encoder(YAW_MOTOR_ID, 500);
        controller.initialize();
        let frozen = controller.yaw_axis().current;
        let writes_after_init = mock_motor::get_mock_output_writes(YAW_MOTOR_ID);

        controller.operator_input(100.0, 0.0);
        mock_motor::set_mock_online(YAW_MOTOR_ID, false);
        // encoder keeps moving but the axis must not see it
        mock_motor::set_mock_encoder(YAW_MOTOR_ID, 900);

        for _ in 0..5 {
            tick(&mut controller);
            assert_eq!(controller.yaw_axis().current, frozen);
        }
        assert_eq!(
            mock_motor::get_mock_output_writes(YAW_MOTOR_ID),
            writes_after_init
        );
        assert!(mock_indicator::get_mock_yaw_fault());
        assert!(!mock_indicator::get_mock_pitch_fault());

        // back online, control resumes with the fresh encoder value
        mock_motor::set_mock_online(YAW_MOTOR_ID, true);
        tick(&mut controller);
        assert!((controller.yaw_axis().current - frozen).abs() > 1e-3);
        assert!(!mock_indicator::get_mock_yaw_fault());
    }

    #[test]
    fn test_yaw_brakes_against_overspeed() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        // small positive error, but the motor is already spinning far past
        // the speed setpoint; the speed loop must command against it
        controller.operator_input(20.0, 0.0);
        mock_motor::set_mock_speed(YAW_MOTOR_ID, 1000.0);
        tick(&mut controller);

        assert!(mock_motor::get_mock_output(YAW_MOTOR_ID) < 0.0);
    }

    #[test]
    fn test_commanded_mode_reads_fresh_encoder() {
        let mut controller = controller_with(test_config());
        controller.initialize();

        controller.operator_input(0.0, 0.0);
        mock_motor::set_mock_encoder(YAW_MOTOR_ID, 4096);
        tick(&mut controller);

        assert!((controller.yaw_axis().current - PI).abs() < 1e-5);
    }

    #[test]
    fn test_elapsed_time_survives_clock_wrap() {
        let mut controller = controller_with(test_config());
        mock_clock::set_mock_time_ms(u32::MAX - 1);
        controller.initialize();

        mock_clock::advance_mock_time_ms(3);
        controller.refresh();

        assert_eq!(controller.elapsed_ms(), 3);
    }
}
