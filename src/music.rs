//! Sequenced-tone player driving a buzzer from a note/duration score.
//!
//! No feedback loop and no failure semantics beyond finished-or-not: the
//! player walks the score one note per timeout expiry, with a short
//! articulation rest between notes so repeated pitches stay distinct.

use std::error::Error;

use log::warn;
use rppal::pwm::{Channel, Polarity, Pwm};

use crate::clock::Clock;
use crate::scheduler::Periodic;

/// PWM channel wired to the piezo buzzer (GPIO 18, PWM0).
const BUZZER_PWM_CHANNEL: Channel = Channel::Pwm0;
const BUZZER_DUTY_CYCLE: f64 = 0.5;
/// Fraction of each note spent sounding; the remainder is the articulation
/// rest.
const NOTE_ON_FRACTION: f32 = 0.85;

// Equal-temperament pitches, Hz. A rest is frequency 0.
pub const REST: f32 = 0.0;
pub const NOTE_C4: f32 = 261.63;
pub const NOTE_D4: f32 = 293.66;
pub const NOTE_E4: f32 = 329.63;
pub const NOTE_F4: f32 = 349.23;
pub const NOTE_G4: f32 = 392.00;
pub const NOTE_A4: f32 = 440.00;
pub const NOTE_B4: f32 = 493.88;
pub const NOTE_C5: f32 = 523.25;

/// Buzzer collaborator: hold a tone or go quiet.
pub trait Buzzer: Send {
    fn play_frequency(&mut self, hz: f32);
    fn silence(&mut self);
}

/// One score entry: frequency in Hz and length in beats.
pub type Note = (f32, f32);

/// Short ascending jingle played at power-on.
pub fn startup_score() -> Vec<Note> {
    vec![
        (NOTE_C4, 0.25),
        (NOTE_E4, 0.25),
        (NOTE_G4, 0.25),
        (NOTE_C5, 0.5),
        (REST, 0.25),
        (NOTE_G4, 0.25),
        (NOTE_C5, 0.75),
    ]
}

pub struct MusicPlayer {
    buzzer: Box<dyn Buzzer>,
    clock: Box<dyn Clock>,
    score: Vec<Note>,
    tempo_bpm: u32,
    index: usize,
    resting: bool,
    finished: bool,
    phase_started_ms: u32,
    phase_len_ms: u32,
    gap_ms: u32,
}

impl MusicPlayer {
    pub fn new(
        buzzer: Box<dyn Buzzer>,
        clock: Box<dyn Clock>,
        score: Vec<Note>,
        tempo_bpm: u32,
    ) -> Self {
        Self {
            buzzer,
            clock,
            score,
            tempo_bpm,
            index: 0,
            resting: false,
            finished: true,
            phase_started_ms: 0,
            phase_len_ms: 0,
            gap_ms: 0,
        }
    }

    pub fn finished_song(&self) -> bool {
        self.finished
    }

    /// Rewinds to the first note and starts it at once.
    pub fn reset_song(&mut self) {
        self.index = 0;
        self.resting = false;
        self.finished = false;
        self.start_note();
    }

    /// Advances the score when the running phase has expired. Call once per
    /// scheduler tick.
    pub fn execute(&mut self) {
        if self.finished || !self.phase_expired() {
            return;
        }

        if self.resting {
            self.index += 1;
            self.start_note();
        } else {
            // the note is done sounding, rest out the remainder
            self.buzzer.silence();
            self.resting = true;
            self.phase_started_ms = self.clock.now_ms();
            self.phase_len_ms = self.gap_ms;
        }
    }

    fn start_note(&mut self) {
        match self.score.get(self.index) {
            Some(&(frequency, beats)) => {
                let full_len = self.note_len_ms(beats);
                if frequency > 0.0 {
                    self.buzzer.play_frequency(frequency);
                    self.phase_len_ms = (full_len as f32 * NOTE_ON_FRACTION) as u32;
                    self.gap_ms = full_len - self.phase_len_ms;
                    self.resting = false;
                } else {
                    // a written rest is all gap
                    self.buzzer.silence();
                    self.phase_len_ms = full_len;
                    self.gap_ms = 0;
                    self.resting = true;
                }
                self.phase_started_ms = self.clock.now_ms();
            }
            None => {
                self.buzzer.silence();
                self.finished = true;
            }
        }
    }

    fn note_len_ms(&self, beats: f32) -> u32 {
        (beats * 60_000.0 / self.tempo_bpm as f32) as u32
    }

    fn phase_expired(&self) -> bool {
        let now = self.clock.now_ms();
        now.wrapping_sub(self.phase_started_ms) >= self.phase_len_ms
    }
}

impl Periodic for MusicPlayer {
    fn initialize(&mut self) {
        self.reset_song();
    }

    fn refresh(&mut self) {
        self.execute();
    }
}

/// Piezo buzzer on hardware PWM. The tone frequency is the PWM frequency;
/// silence disables the channel. The channel is disabled again on drop.
pub struct PwmBuzzer {
    pwm: Pwm,
}

impl PwmBuzzer {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        // starts disabled; the first note enables the channel
        let pwm = Pwm::with_frequency(
            BUZZER_PWM_CHANNEL,
            NOTE_A4 as f64,
            BUZZER_DUTY_CYCLE,
            Polarity::Normal,
            false,
        )?;

        Ok(Self { pwm })
    }
}

impl Buzzer for PwmBuzzer {
    fn play_frequency(&mut self, hz: f32) {
        if hz <= 0.0 {
            self.silence();
            return;
        }
        if let Err(e) = self.pwm.set_frequency(hz as f64, BUZZER_DUTY_CYCLE) {
            warn!("buzzer frequency write failed: {}", e);
            return;
        }
        if let Err(e) = self.pwm.enable() {
            warn!("buzzer enable failed: {}", e);
        }
    }

    fn silence(&mut self) {
        if let Err(e) = self.pwm.disable() {
            warn!("buzzer disable failed: {}", e);
        }
    }
}

impl Drop for PwmBuzzer {
    fn drop(&mut self) {
        // leave the channel quiet
        let _ = self.pwm.disable();
    }
}
