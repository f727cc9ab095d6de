use std::time::Duration;

/// One progress event from the encoder stream.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSample {
    pub elapsed_seconds: f64,
}

/// Derived display state for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub percent: f64,
    pub eta: Duration,
}

/// Derives a monotonically non-decreasing percentage and an ETA from the
/// encoder's (elapsed, total) samples.
///
/// VP8/VP9/AV1 encoders report native progress across two internal passes
/// that each span the full duration, so only half of the visible progress
/// corresponds to final output. Their percent is halved and the ETA counts
/// the second pass; without this the ETA roughly doubles.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last_percent: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_sample(
        &mut self,
        elapsed_seconds: f64,
        total_seconds: f64,
        two_pass: bool,
    ) -> ProgressReport {
        if total_seconds <= 0.0 {
            return ProgressReport {
                percent: self.last_percent,
                eta: Duration::ZERO,
            };
        }

        let elapsed = elapsed_seconds.clamp(0.0, total_seconds);
        let (raw_percent, remaining) = if two_pass {
            (elapsed / total_seconds * 50.0, total_seconds - elapsed / 2.0)
        } else {
            (elapsed / total_seconds * 100.0, total_seconds - elapsed)
        };

        let percent = raw_percent.min(100.0).max(self.last_percent);
        self.last_percent = percent;

        ProgressReport {
            percent,
            eta: Duration::from_secs_f64(remaining.max(0.0)),
        }
    }
}

/// Accumulates ffmpeg `-progress pipe:1` key=value lines into samples.
///
/// A block ends at a `progress=` line, at which point the latest elapsed
/// time is emitted as one sample.
#[derive(Debug, Default)]
pub struct ProgressParser {
    out_time_us: u64,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of progress output. Returns a sample at each block
    /// boundary, `None` otherwise.
    pub fn feed_line(&mut self, line: &str) -> Option<ProgressSample> {
        let line = line.trim();

        if let Some(value) = line.strip_prefix("out_time_us=") {
            if let Ok(us) = value.parse::<u64>() {
                self.out_time_us = us;
            }
            return None;
        }
        if let Some(value) = line.strip_prefix("out_time_ms=") {
            // out_time_ms holds microseconds despite the name
            if let Ok(us) = value.parse::<u64>() {
                self.out_time_us = us;
            }
            return None;
        }
        if line.starts_with("progress=") {
            return Some(ProgressSample {
                elapsed_seconds: self.out_time_us as f64 / 1_000_000.0,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pass_reaches_100_at_completion() {
        let mut tracker = ProgressTracker::new();
        let halfway = tracker.on_sample(50.0, 100.0, false);
        assert!((halfway.percent - 50.0).abs() < 1e-9);
        assert_eq!(halfway.eta, Duration::from_secs(50));

        let done = tracker.on_sample(100.0, 100.0, false);
        assert!((done.percent - 100.0).abs() < 1e-9);
        assert_eq!(done.eta, Duration::ZERO);
    }

    #[test]
    fn test_two_pass_caps_at_50_until_completion() {
        let mut tracker = ProgressTracker::new();
        for elapsed in [10.0, 40.0, 70.0, 99.0] {
            let report = tracker.on_sample(elapsed, 100.0, true);
            assert!(report.percent < 50.0, "elapsed {}", elapsed);
        }
        let done = tracker.on_sample(100.0, 100.0, true);
        assert!((done.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_pass_eta_counts_second_pass() {
        let mut tracker = ProgressTracker::new();
        let report = tracker.on_sample(60.0, 100.0, true);
        // 40s left in this pass plus half of the work already repeated.
        assert_eq!(report.eta, Duration::from_secs(70));

        let mut single = ProgressTracker::new();
        let report = single.on_sample(60.0, 100.0, false);
        assert_eq!(report.eta, Duration::from_secs(40));
    }

    #[test]
    fn test_percent_is_monotonic_across_regressing_samples() {
        let mut tracker = ProgressTracker::new();
        let first = tracker.on_sample(80.0, 100.0, false);
        let second = tracker.on_sample(20.0, 100.0, false);
        assert_eq!(second.percent, first.percent);
    }

    #[test]
    fn test_zero_total_yields_no_progress() {
        let mut tracker = ProgressTracker::new();
        let report = tracker.on_sample(10.0, 0.0, false);
        assert_eq!(report.percent, 0.0);
        assert_eq!(report.eta, Duration::ZERO);
    }

    #[test]
    fn test_parser_emits_sample_at_block_boundary() {
        let mut parser = ProgressParser::new();
        assert!(parser.feed_line("frame=100").is_none());
        assert!(parser.feed_line("fps=30.0").is_none());
        assert!(parser.feed_line("out_time_ms=5000000").is_none());
        let sample = parser.feed_line("progress=continue").unwrap();
        assert!((sample.elapsed_seconds - 5.0).abs() < 1e-9);

        assert!(parser.feed_line("out_time_us=7500000").is_none());
        let sample = parser.feed_line("progress=end").unwrap();
        assert!((sample.elapsed_seconds - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_parser_ignores_malformed_values() {
        let mut parser = ProgressParser::new();
        assert!(parser.feed_line("out_time_us=N/A").is_none());
        let sample = parser.feed_line("progress=continue").unwrap();
        assert_eq!(sample.elapsed_seconds, 0.0);
    }
}
