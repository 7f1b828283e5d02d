use std::time::Duration;

/// Appearance and smoothing parameters of a [`ProgressBar`](super::ProgressBar).
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressStyle {
    /// Number of glyphs between the brackets.
    pub width: usize,
    pub filled_char: char,
    pub empty_char: char,
    /// Minimum time between two ETA recalculations.
    pub eta_interval: Duration,
    /// How many previous per-unit samples (excluding the current one) feed the
    /// simple moving average.
    pub eta_sma_window: usize,
    /// Render only every `every` updates. Completion is always rendered.
    pub every: u64,
}

impl Default for ProgressStyle {
    fn default() -> Self {
        Self {
            width: 32,
            filled_char: '#',
            empty_char: ' ',
            eta_interval: Duration::from_secs(1),
            eta_sma_window: 9,
            every: 1,
        }
    }
}

/// Whether the bar is drawn at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressVisibility {
    /// Draw only when standard error is an interactive terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ProgressVisibility {
    pub fn hide(self, is_terminal: bool) -> bool {
        match self {
            ProgressVisibility::Auto => !is_terminal,
            ProgressVisibility::Always => false,
            ProgressVisibility::Never => true,
        }
    }
}
