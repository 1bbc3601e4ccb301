use std::error::Error;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{LevelFilter, info, warn};

use gimbal_rs::clock::SystemClock;
use gimbal_rs::config::{GimbalConfig, REFRESH_PERIOD_MS};
use gimbal_rs::gimbal::GimbalController;
use gimbal_rs::indicator::{Indicator, LedIndicator, LogIndicator};
use gimbal_rs::logger;
use gimbal_rs::music::{MusicPlayer, PwmBuzzer, startup_score};
use gimbal_rs::scheduler::{Periodic, Scheduler};
use gimbal_rs::sim::SimMotor;

/// Logs the gimbal pose once a second while the scheduler runs.
struct StatusReporter {
    controller: Arc<Mutex<GimbalController>>,
    last_report: Instant,
}

impl Periodic for StatusReporter {
    fn initialize(&mut self) {
        self.last_report = Instant::now();
    }

    fn refresh(&mut self) {
        if self.last_report.elapsed() < Duration::from_secs(1) {
            return;
        }
        self.last_report = Instant::now();

        if let Ok(gimbal) = self.controller.lock() {
            let yaw = gimbal.yaw_axis();
            let pitch = gimbal.pitch_axis();
            info!(
                "yaw {:.3} -> {:.3} rad, pitch {:.3} -> {:.3} rad, drive ({:.0}, {:.0})",
                yaw.current, yaw.target, pitch.current, pitch.target, yaw.output, pitch.output
            );
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init(LevelFilter::Info)?;
    info!("Starting gimbal control demo...");

    let config = GimbalConfig::default();

    // Simulated motors stand in for the bus drivers; on the robot the real
    // drivers implement the same trait.
    let yaw_motor = SimMotor::new(
        config.yaw_motor_id,
        config.encoder_resolution,
        2048,
        Box::new(SystemClock::new()),
    );
    let pitch_motor = SimMotor::new(
        config.pitch_motor_id,
        config.encoder_resolution,
        2048,
        Box::new(SystemClock::new()),
    );

    let indicator: Box<dyn Indicator> = match LedIndicator::new() {
        Ok(leds) => Box::new(leds),
        Err(e) => {
            warn!("fault LEDs unavailable ({}), logging faults instead", e);
            Box::new(LogIndicator::new())
        }
    };

    let controller = Arc::new(Mutex::new(GimbalController::new(
        config,
        Box::new(yaw_motor),
        Box::new(pitch_motor),
        indicator,
        Box::new(SystemClock::new()),
    )));

    let mut scheduler = Scheduler::new(Duration::from_millis(REFRESH_PERIOD_MS));
    scheduler.register(Box::new(Arc::clone(&controller)));
    scheduler.register(Box::new(StatusReporter {
        controller: Arc::clone(&controller),
        last_report: Instant::now(),
    }));

    match PwmBuzzer::new() {
        Ok(buzzer) => {
            scheduler.register(Box::new(MusicPlayer::new(
                Box::new(buzzer),
                Box::new(SystemClock::new()),
                startup_score(),
                140,
            )));
        }
        Err(e) => info!("buzzer unavailable ({}), skipping startup jingle", e),
    }

    scheduler.initialize_all();

    // Scripted command source: sweep the targets with operator deltas,
    // apply one vision correction, then release the gimbal to hold pose.
    let commands = Arc::clone(&controller);
    thread::spawn(move || {
        for _ in 0..100 {
            if let Ok(mut gimbal) = commands.lock() {
                gimbal.operator_input(1.0, 0.5);
            }
            thread::sleep(Duration::from_millis(20));
        }

        if let Ok(mut gimbal) = commands.lock() {
            gimbal.vision_input(-0.3, 0.1);
            info!("vision correction applied");
        }
        thread::sleep(Duration::from_millis(1500));

        if let Ok(mut gimbal) = commands.lock() {
            gimbal.no_inputs();
            info!("command source released, holding pose");
        }
    });

    scheduler.run_for(Duration::from_secs(5));

    if let Ok(gimbal) = controller.lock() {
        let yaw = gimbal.yaw_axis();
        let pitch = gimbal.pitch_axis();
        info!(
            "final pose: yaw {:.3} rad (target {:.3}), pitch {:.3} rad (target {:.3})",
            yaw.current, yaw.target, pitch.current, pitch.target
        );
    }
    info!("demo finished");

    Ok(())
}
