use std::sync::Mutex;
use std::time::Duration;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, d: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, d: Duration) {
        if let Ok(mut v) = self.slept.lock() {
            v.push(d);
        }
    }
}

/// Fixed minimum interval between successive tasks. The wait happens before
/// every task, including the first.
pub struct Pacer<'a> {
    interval: Duration,
    sleeper: &'a dyn Sleeper,
    issued: usize,
}

impl<'a> Pacer<'a> {
    pub fn new(interval: Duration, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            interval,
            sleeper,
            issued: 0,
        }
    }

    pub fn pace(&mut self) {
        if !self.interval.is_zero() {
            self.sleeper.sleep(self.interval);
        }
        self.issued += 1;
    }

    /// Number of tasks released so far.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Run `task` once per item in order, pacing before each. `task` returns
    /// `false` to stop the sequence early.
    pub fn run<T, F>(&mut self, items: &[T], mut task: F)
    where
        F: FnMut(&T) -> bool,
    {
        for item in items {
            self.pace();
            if !task(item) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleeps_once_per_task() {
        let s = RecordingSleeper::new();
        let mut p = Pacer::new(Duration::from_secs(1), &s);
        let mut seen = Vec::new();
        p.run(&[1, 2, 3], |x| {
            seen.push(*x);
            true
        });
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(s.sleeps(), vec![Duration::from_secs(1); 3]);
        assert_eq!(p.issued(), 3);
    }

    #[test]
    fn stop_early() {
        let s = RecordingSleeper::new();
        let mut p = Pacer::new(Duration::from_millis(250), &s);
        p.run(&["a", "b", "c", "d"], |x| *x != "b");
        assert_eq!(p.issued(), 2);
        assert_eq!(s.sleeps().len(), 2);
    }

    #[test]
    fn zero_interval_never_sleeps() {
        let s = RecordingSleeper::new();
        let mut p = Pacer::new(Duration::ZERO, &s);
        p.run(&[(); 4], |_| true);
        assert!(s.sleeps().is_empty());
        assert_eq!(p.issued(), 4);
    }
}
