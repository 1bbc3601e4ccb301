use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Capability contract for anything the fixed-period scheduler can run.
///
/// Any type exposing `initialize` and `refresh` can be registered; no base
/// type is involved.
pub trait Periodic {
    fn initialize(&mut self);
    fn refresh(&mut self);
}

/// A shared task can be scheduled while other holders of the lock feed it
/// input between ticks. A poisoned lock skips the tick rather than
/// panicking the control loop.
impl<T: Periodic> Periodic for Arc<Mutex<T>> {
    fn initialize(&mut self) {
        if let Ok(mut task) = self.lock() {
            task.initialize();
        }
    }

    fn refresh(&mut self) {
        if let Ok(mut task) = self.lock() {
            task.refresh();
        }
    }
}

/// Fixed-period task list. Tasks refresh in registration order, once per
/// period.
pub struct Scheduler {
    tasks: Vec<Box<dyn Periodic>>,
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            period,
        }
    }

    pub fn register(&mut self, task: Box<dyn Periodic>) {
        self.tasks.push(task);
    }

    pub fn initialize_all(&mut self) {
        for task in &mut self.tasks {
            task.initialize();
        }
    }

    /// Runs one tick of every registered task.
    pub fn run_once(&mut self) {
        for task in &mut self.tasks {
            task.refresh();
        }
    }

    /// Ticks all tasks at the fixed period until `duration` has elapsed.
    pub fn run_for(&mut self, duration: Duration) {
        let start = Instant::now();
        while start.elapsed() < duration {
            self.run_once();
            thread::sleep(self.period);
        }
    }

    /// Ticks forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
            thread::sleep(self.period);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingTask {
        initialized: u32,
        refreshed: u32,
    }

    impl Periodic for CountingTask {
        fn initialize(&mut self) {
            self.initialized += 1;
        }

        fn refresh(&mut self) {
            self.refreshed += 1;
        }
    }

    #[test]
    fn test_tasks_tick_in_registration_order() {
        let first = Arc::new(Mutex::new(CountingTask::default()));
        let second = Arc::new(Mutex::new(CountingTask::default()));

        let mut scheduler = Scheduler::new(Duration::from_millis(1));
        scheduler.register(Box::new(Arc::clone(&first)));
        scheduler.register(Box::new(Arc::clone(&second)));

        scheduler.initialize_all();
        for _ in 0..3 {
            scheduler.run_once();
        }

        let first = first.lock().unwrap();
        let second = second.lock().unwrap();
        assert_eq!(first.initialized, 1);
        assert_eq!(second.initialized, 1);
        assert_eq!(first.refreshed, 3);
        assert_eq!(second.refreshed, 3);
    }

    #[test]
    fn test_shared_task_stays_accessible() {
        let task = Arc::new(Mutex::new(CountingTask::default()));

        let mut scheduler = Scheduler::new(Duration::from_millis(1));
        scheduler.register(Box::new(Arc::clone(&task)));
        scheduler.run_once();

        // the outside handle still sees the tick
        assert_eq!(task.lock().unwrap().refreshed, 1);
    }

    #[test]
    fn test_run_for_returns() {
        let task = Arc::new(Mutex::new(CountingTask::default()));

        let mut scheduler = Scheduler::new(Duration::from_millis(1));
        scheduler.register(Box::new(Arc::clone(&task)));
        scheduler.run_for(Duration::from_millis(20));

        assert!(task.lock().unwrap().refreshed > 1);
    }
}
