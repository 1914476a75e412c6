//! # Frame Statistics
//!
//! [`FpsCounter`] keeps a ring buffer of recent frame times and, once per report
//! interval, turns it into [`FrameStats`]: frames per second plus the average,
//! minimum and maximum frame time in the window.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use glade::performance::FpsCounter;
//!
//! let mut counter = FpsCounter::new();
//! for _ in 0..60 {
//!     counter.record_frame(Duration::from_millis(16));
//! }
//! assert!(counter.stats().fps > 60.0);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

/// Summary of the most recent report window
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// Frames per second over the last report window
    pub fps: f32,
    /// Average frame time of the samples in the ring buffer
    pub frame_time_ms: f32,
    pub min_frame_time_ms: f32,
    pub max_frame_time_ms: f32,
    /// Draw calls issued by the last frame
    pub draw_calls: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: f32::MAX,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
        }
    }
}

/// Rolling frame time statistics
#[derive(Debug, Clone)]
pub struct FpsCounter {
    /// Ring buffer of recent frame times for averaging
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    /// Frames and time accumulated since the last report
    window_frames: u32,
    window_elapsed: Duration,
    report_interval: Duration,
    stats: FrameStats,
    log_reports: bool,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_config(120, Duration::from_secs(1))
    }

    pub fn with_config(max_samples: usize, report_interval: Duration) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            window_frames: 0,
            window_elapsed: Duration::ZERO,
            report_interval,
            stats: FrameStats::default(),
            log_reports: false,
        }
    }

    /// Logs every report at debug level
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_reports = enabled;
        self
    }

    /// Adds one frame. Returns the new frames-per-second value when this frame
    /// closes a report window.
    pub fn record_frame(&mut self, frame_time: Duration) -> Option<f32> {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        self.window_frames += 1;
        self.window_elapsed += frame_time;
        if self.window_elapsed < self.report_interval {
            return None;
        }

        self.update_stats();
        self.window_frames = 0;
        self.window_elapsed = Duration::ZERO;
        if self.log_reports {
            log::debug!(
                "FPS: {:.1} ({:.2}ms avg)",
                self.stats.fps,
                self.stats.frame_time_ms
            );
        }
        Some(self.stats.fps)
    }

    fn update_stats(&mut self) {
        let window_secs = self.window_elapsed.as_secs_f32();
        self.stats.fps = if window_secs > 0.0 {
            self.window_frames as f32 / window_secs
        } else {
            0.0
        };

        if self.frame_times.is_empty() {
            return;
        }
        let total: Duration = self.frame_times.iter().sum();
        let average = total / self.frame_times.len() as u32;
        self.stats.frame_time_ms = average.as_secs_f32() * 1000.0;

        if let (Some(min), Some(max)) = (self.frame_times.iter().min(), self.frame_times.iter().max())
        {
            self.stats.min_frame_time_ms = min.as_secs_f32() * 1000.0;
            self.stats.max_frame_time_ms = max.as_secs_f32() * 1000.0;
        }
    }

    pub fn set_draw_calls(&mut self, draw_calls: u32) {
        self.stats.draw_calls = draw_calls;
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Frame times in milliseconds, oldest first
    pub fn frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|duration| duration.as_secs_f32() * 1000.0)
            .collect()
    }

    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.window_frames = 0;
        self.window_elapsed = Duration::ZERO;
        self.stats = FrameStats::default();
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
