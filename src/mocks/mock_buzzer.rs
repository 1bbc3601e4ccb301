// This file is only compiled during tests

use std::cell::Cell;

use crate::music::Buzzer;

thread_local! {
    // None means silent
    static MOCK_TONE: Cell<Option<f32>> = const { Cell::new(None) };
}

pub struct MockBuzzer;

impl Buzzer for MockBuzzer {
    fn play_frequency(&mut self, hz: f32) {
        MOCK_TONE.with(|tone| tone.set(Some(hz)));
    }

    fn silence(&mut self) {
        MOCK_TONE.with(|tone| tone.set(None));
    }
}

pub fn get_mock_tone() -> Option<f32> {
    MOCK_TONE.with(|tone| tone.get())
}

pub fn reset_mock_buzzer() {
    MOCK_TONE.with(|tone| tone.set(None));
}
