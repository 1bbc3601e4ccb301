// This file is only compiled during tests

use std::cell::Cell;

use crate::clock::Clock;

thread_local! {
    static MOCK_NOW_MS: Cell<u32> = const { Cell::new(0) };
}

pub struct MockClock;

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        MOCK_NOW_MS.with(|now| now.get())
    }
}

// test helpers to position and advance the clock

pub fn set_mock_time_ms(ms: u32) {
    MOCK_NOW_MS.with(|now| now.set(ms));
}

pub fn advance_mock_time_ms(ms: u32) {
    MOCK_NOW_MS.with(|now| now.set(now.get().wrapping_add(ms)));
}

pub fn reset_mock_clock() {
    set_mock_time_ms(0);
}
