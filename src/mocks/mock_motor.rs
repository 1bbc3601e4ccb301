// This file is only compiled during tests

use std::cell::RefCell;
use std::collections::HashMap;

use crate::motor::GimbalMotor;

#[derive(Debug, Clone, Copy)]
struct MotorState {
    online: bool,
    encoder: u32,
    speed_rpm: f32,
    output: f32,
    output_writes: u32,
}

impl Default for MotorState {
    fn default() -> Self {
        Self {
            online: true,
            encoder: 0,
            speed_rpm: 0.0,
            output: 0.0,
            output_writes: 0,
        }
    }
}

thread_local! {
    static MOCK_MOTORS: RefCell<HashMap<u8, MotorState>> = RefCell::new(HashMap::new());
}

pub struct MockMotor {
    id: u8,
}

impl MockMotor {
    pub fn new(id: u8) -> Self {
        MOCK_MOTORS.with(|motors| {
            motors.borrow_mut().entry(id).or_default();
        });
        MockMotor { id }
    }
}

impl GimbalMotor for MockMotor {
    fn initialize(&mut self) {}

    fn is_online(&self) -> bool {
        MOCK_MOTORS.with(|motors| {
            motors
                .borrow()
                .get(&self.id)
                .map(|state| state.online)
                .unwrap_or(true)
        })
    }

    fn set_desired_output(&mut self, output: f32) {
        MOCK_MOTORS.with(|motors| {
            let mut motors = motors.borrow_mut();
            let state = motors.entry(self.id).or_default();
            state.output = output;
            state.output_writes += 1;
        });
    }

    fn encoder_wrapped(&mut self) -> u32 {
        MOCK_MOTORS.with(|motors| {
            motors
                .borrow()
                .get(&self.id)
                .map(|state| state.encoder)
                .unwrap_or(0)
        })
    }

    fn rotational_speed(&mut self) -> f32 {
        MOCK_MOTORS.with(|motors| {
            motors
                .borrow()
                .get(&self.id)
                .map(|state| state.speed_rpm)
                .unwrap_or(0.0)
        })
    }
}

// test helpers to steer and inspect per-motor state

pub fn set_mock_online(id: u8, online: bool) {
    MOCK_MOTORS.with(|motors| {
        motors.borrow_mut().entry(id).or_default().online = online;
    });
}

pub fn set_mock_encoder(id: u8, count: u32) {
    MOCK_MOTORS.with(|motors| {
        motors.borrow_mut().entry(id).or_default().encoder = count;
    });
}

pub fn set_mock_speed(id: u8, rpm: f32) {
    MOCK_MOTORS.with(|motors| {
        motors.borrow_mut().entry(id).or_default().speed_rpm = rpm;
    });
}

pub fn get_mock_output(id: u8) -> f32 {
    MOCK_MOTORS.with(|motors| {
        motors
            .borrow()
            .get(&id)
            .map(|state| state.output)
            .unwrap_or(0.0)
    })
}

pub fn get_mock_output_writes(id: u8) -> u32 {
    MOCK_MOTORS.with(|motors| {
        motors
            .borrow()
            .get(&id)
            .map(|state| state.output_writes)
            .unwrap_or(0)
    })
}

pub fn reset_mock_motors() {
    MOCK_MOTORS.with(|motors| {
        motors.borrow_mut().clear();
    });
}
