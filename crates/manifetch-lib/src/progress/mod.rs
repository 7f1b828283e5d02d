//! Textual progress bar with a smoothed ETA.
//!
//! The bar overwrites itself in place using a carriage return and is finalised
//! exactly once, either by [`ProgressBar::done`] or when it is dropped, so an
//! early return through `?` still leaves a completed line behind.

mod style;

pub use style::{ProgressStyle, ProgressVisibility};

use std::collections::VecDeque;
use std::io::{IsTerminal, Stderr, Write};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("expected size not initialized")]
    UninitializedTotal,

    #[error("failed to write progress: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ProgressBar<W: Write> {
    label: String,
    style: ProgressStyle,
    hide: bool,
    sink: W,
    expected_size: Option<u64>,
    start: Instant,
    ittimes: VecDeque<f64>,
    eta_updated_at: Instant,
    eta_display: String,
    last_progress: u64,
    finished: bool,
}

impl ProgressBar<Stderr> {
    /// Creates a bar drawing to standard error, hidden when it is not a terminal
    /// unless `visibility` says otherwise.
    pub fn stderr(
        label: impl Into<String>,
        expected_size: Option<u64>,
        style: ProgressStyle,
        visibility: ProgressVisibility,
    ) -> Result<Self, ProgressError> {
        let stderr = std::io::stderr();
        let hide = visibility.hide(stderr.is_terminal());
        Self::new(label, expected_size, style, hide, stderr)
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn new(
        label: impl Into<String>,
        expected_size: Option<u64>,
        style: ProgressStyle,
        hide: bool,
        sink: W,
    ) -> Result<Self, ProgressError> {
        Self::with_start(label, expected_size, style, hide, sink, Instant::now())
    }

    pub(crate) fn with_start(
        label: impl Into<String>,
        expected_size: Option<u64>,
        style: ProgressStyle,
        hide: bool,
        sink: W,
        start: Instant,
    ) -> Result<Self, ProgressError> {
        let mut bar = Self {
            label: label.into(),
            style,
            hide,
            sink,
            expected_size,
            start,
            ittimes: VecDeque::new(),
            eta_updated_at: start,
            eta_display: format_time(0.0),
            last_progress: 0,
            finished: false,
        };
        if expected_size.is_some() {
            bar.show_at(0, None, start)?;
        }
        Ok(bar)
    }

    /// Records `progress` units as completed. A `count` replaces the expected size.
    pub fn show(&mut self, progress: u64, count: Option<u64>) -> Result<(), ProgressError> {
        self.show_at(progress, count, Instant::now())
    }

    pub(crate) fn show_at(
        &mut self,
        progress: u64,
        count: Option<u64>,
        now: Instant,
    ) -> Result<(), ProgressError> {
        if count.is_some() {
            self.expected_size = count;
        }
        let expected_size = self.expected_size.ok_or(ProgressError::UninitializedTotal)?;
        self.last_progress = progress;

        if now.saturating_duration_since(self.eta_updated_at) > self.style.eta_interval {
            self.eta_updated_at = now;
            let per_unit =
                now.saturating_duration_since(self.start).as_secs_f64() / (progress + 1) as f64;
            self.ittimes.push_back(per_unit);
            while self.ittimes.len() > self.style.eta_sma_window + 1 {
                self.ittimes.pop_front();
            }
            let average = self.ittimes.iter().sum::<f64>() / self.ittimes.len() as f64;
            let eta = average * expected_size.saturating_sub(progress) as f64;
            self.eta_display = format_time(eta);
        }

        let every = self.style.every.max(1);
        if !self.hide && (progress % every == 0 || progress == expected_size) {
            let filled = self.filled_width(progress, expected_size);
            let eta = self.eta_display.clone();
            self.render(filled, progress, expected_size, &eta)?;
        }
        Ok(())
    }

    /// Draws the completed bar with the total elapsed time and ends the line.
    pub fn done(&mut self) -> Result<(), ProgressError> {
        self.done_at(Instant::now())
    }

    pub(crate) fn done_at(&mut self, now: Instant) -> Result<(), ProgressError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if self.hide {
            return Ok(());
        }
        let elapsed = format_time(now.saturating_duration_since(self.start).as_secs_f64());
        let total = self.expected_size.unwrap_or(self.last_progress);
        self.render(self.style.width, total, total, &elapsed)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        Ok(())
    }

    fn filled_width(&self, progress: u64, expected_size: u64) -> usize {
        // Nothing left to do when nothing was expected.
        if expected_size == 0 {
            return self.style.width;
        }
        let filled = self.style.width as u128 * progress as u128 / expected_size as u128;
        filled.min(self.style.width as u128) as usize
    }

    fn render(
        &mut self,
        filled: usize,
        progress: u64,
        expected_size: u64,
        time: &str,
    ) -> Result<(), ProgressError> {
        let filled_part: String = std::iter::repeat_n(self.style.filled_char, filled).collect();
        let empty_part: String =
            std::iter::repeat_n(self.style.empty_char, self.style.width - filled).collect();
        write!(
            self.sink,
            "{}[{}{}] {}/{} - {}\r",
            self.label, filled_part, empty_part, progress, expected_size, time
        )?;
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for ProgressBar<W> {
    fn drop(&mut self) {
        if let Err(err) = self.done() {
            tracing::debug!("Failed to finalize progress bar: {}", err);
        }
    }
}

/// Formats seconds as `HH:MM:SS`, wrapping hours at a day.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let of_day = total % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        of_day / 3600,
        (of_day % 3600) / 60,
        of_day % 60
    )
}
