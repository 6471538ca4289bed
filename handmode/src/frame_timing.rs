//! Frame timing instrumentation for the gesture frame loop.
//!
//! Tracks per-tick timing and maintains rolling statistics so slow
//! classification (ticks that overrun the frame budget) shows up in
//! diagnostics.

use std::collections::VecDeque;

/// Rolling tick timing statistics over a window of samples.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time spent fetching the frame from the source.
    pub fetch_times: VecDeque<f64>,
    /// Time spent in extraction, classification and state updates.
    pub process_times: VecDeque<f64>,
    /// Time spent in observer callbacks.
    pub publish_times: VecDeque<f64>,
    /// Per-tick total.
    pub total_times: VecDeque<f64>,
    /// Time between consecutive tick starts.
    pub tick_intervals: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    pub total_ticks: u64,
    /// Ticks that exceeded the budget.
    pub missed_ticks: u64,
    /// Frame budget in milliseconds (16.7 for 60Hz).
    pub budget_ms: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(600, 16.7)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            fetch_times: VecDeque::with_capacity(window_size),
            process_times: VecDeque::with_capacity(window_size),
            publish_times: VecDeque::with_capacity(window_size),
            total_times: VecDeque::with_capacity(window_size),
            tick_intervals: VecDeque::with_capacity(window_size),
            window_size,
            total_ticks: 0,
            missed_ticks: 0,
            budget_ms,
        }
    }

    /// Record one tick's timing data.
    pub fn record_tick(&mut self, fetch_ms: f64, process_ms: f64, publish_ms: f64) {
        let total = fetch_ms + process_ms + publish_ms;

        Self::push_sample(&mut self.fetch_times, fetch_ms, self.window_size);
        Self::push_sample(&mut self.process_times, process_ms, self.window_size);
        Self::push_sample(&mut self.publish_times, publish_ms, self.window_size);
        Self::push_sample(&mut self.total_times, total, self.window_size);

        self.total_ticks += 1;
        if total > self.budget_ms {
            self.missed_ticks += 1;
        }
    }

    /// Record the time since the previous tick started.
    pub fn record_interval(&mut self, interval_ms: f64) {
        Self::push_sample(&mut self.tick_intervals, interval_ms, self.window_size);
    }

    fn push_sample(samples: &mut VecDeque<f64>, value: f64, window_size: usize) {
        samples.push_back(value);
        while samples.len() > window_size {
            samples.pop_front();
        }
    }

    /// Percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn sorted(samples: &VecDeque<f64>) -> Vec<f64> {
        let mut v: Vec<f64> = samples.iter().copied().collect();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        v
    }

    /// Timing statistics as percentiles.
    pub fn stats(&self) -> FrameTimingStats {
        let fetch = Self::sorted(&self.fetch_times);
        let process = Self::sorted(&self.process_times);
        let total = Self::sorted(&self.total_times);

        FrameTimingStats {
            fetch_p50: Self::percentile(&fetch, 50.0),
            process_p50: Self::percentile(&process, 50.0),
            process_p99: Self::percentile(&process, 99.0),
            total_p50: Self::percentile(&total, 50.0),
            total_p95: Self::percentile(&total, 95.0),
            total_p99: Self::percentile(&total, 99.0),
            fps: if !self.tick_intervals.is_empty() {
                let mean = self.tick_intervals.iter().sum::<f64>() / self.tick_intervals.len() as f64;
                if mean > 0.0 { 1000.0 / mean } else { 0.0 }
            } else {
                0.0
            },
            missed_pct: if self.total_ticks > 0 {
                (self.missed_ticks as f64 / self.total_ticks as f64) * 100.0
            } else {
                0.0
            },
            total_ticks: self.total_ticks,
            missed_ticks: self.missed_ticks,
        }
    }

    /// Format stats as an s-expression.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:fetch-p50 {:.2} :process-p50 {:.2} :process-p99 {:.2} :total-p50 {:.2} :total-p99 {:.2} :missed-pct {:.1} :fps {:.0} :total-ticks {} :missed-ticks {})",
            s.fetch_p50, s.process_p50, s.process_p99, s.total_p50, s.total_p99,
            s.missed_pct, s.fps, s.total_ticks, s.missed_ticks,
        )
    }
}

/// Computed frame timing statistics.
#[derive(Debug, Clone)]
pub struct FrameTimingStats {
    pub fetch_p50: f64,
    pub process_p50: f64,
    pub process_p99: f64,
    pub total_p50: f64,
    pub total_p95: f64,
    pub total_p99: f64,
    /// Effective tick rate from tick start intervals.
    pub fps: f64,
    pub missed_pct: f64,
    pub total_ticks: u64,
    pub missed_ticks: u64,
}
