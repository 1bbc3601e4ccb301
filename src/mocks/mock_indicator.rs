// This file is only compiled during tests

use std::cell::Cell;

use crate::indicator::Indicator;

thread_local! {
    static MOCK_YAW_FAULT: Cell<bool> = const { Cell::new(false) };
    static MOCK_PITCH_FAULT: Cell<bool> = const { Cell::new(false) };
}

pub struct MockIndicator;

impl Indicator for MockIndicator {
    fn set_yaw_fault(&mut self, fault: bool) {
        MOCK_YAW_FAULT.with(|state| state.set(fault));
    }

    fn set_pitch_fault(&mut self, fault: bool) {
        MOCK_PITCH_FAULT.with(|state| state.set(fault));
    }
}

pub fn get_mock_yaw_fault() -> bool {
    MOCK_YAW_FAULT.with(|state| state.get())
}

pub fn get_mock_pitch_fault() -> bool {
    MOCK_PITCH_FAULT.with(|state| state.get())
}

pub fn reset_mock_indicator() {
    MOCK_YAW_FAULT.with(|state| state.set(false));
    MOCK_PITCH_FAULT.with(|state| state.set(false));
}
