//! 批次进度估算（仅用于日志，不影响计算结果）。

use std::time::{Duration, Instant};

/// 单次进度快照。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub estimated_total: Option<Duration>,
    pub remaining: Option<Duration>,
}

/// 按 `elapsed / (completed / total)` 估算总耗时。
pub fn estimate(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 || total == 0 {
        return None;
    }
    let fraction = completed as f64 / total as f64;
    Duration::try_from_secs_f64(elapsed.as_secs_f64() / fraction).ok()
}

pub struct ProgressTracker {
    started: Instant,
    completed: usize,
    total: usize,
}

impl ProgressTracker {
    pub fn start(total: usize) -> Self {
        Self {
            started: Instant::now(),
            completed: 0,
            total,
        }
    }

    /// 记录一个批次完成。
    pub fn batch_completed(&mut self) -> ProgressSnapshot {
        self.completed += 1;
        snapshot(self.started.elapsed(), self.completed, self.total)
    }
}

fn snapshot(elapsed: Duration, completed: usize, total: usize) -> ProgressSnapshot {
    let estimated_total = estimate(elapsed, completed, total);
    ProgressSnapshot {
        completed,
        total,
        elapsed,
        estimated_total,
        remaining: estimated_total.map(|estimated| estimated.saturating_sub(elapsed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_elapsed_by_fraction() {
        assert_eq!(
            estimate(Duration::from_secs(10), 1, 4),
            Some(Duration::from_secs(40))
        );
        assert_eq!(estimate(Duration::from_secs(10), 0, 4), None);
        assert_eq!(estimate(Duration::from_secs(10), 0, 0), None);
    }

    #[test]
    fn remaining_is_estimate_minus_elapsed() {
        let partway = snapshot(Duration::from_secs(30), 3, 4);
        assert_eq!(partway.estimated_total, Some(Duration::from_secs(40)));
        assert_eq!(partway.remaining, Some(Duration::from_secs(10)));

        let done = snapshot(Duration::from_secs(12), 2, 2);
        assert_eq!(done.remaining, Some(Duration::ZERO));
    }

    #[test]
    fn tracker_counts_batches() {
        let mut tracker = ProgressTracker::start(2);
        assert_eq!(tracker.batch_completed().completed, 1);
        let last = tracker.batch_completed();
        assert_eq!((last.completed, last.total), (2, 2));
        assert!(last.estimated_total.is_some());
    }
}
