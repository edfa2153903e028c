//! Terminal progress bar bridging batch events to indicatif.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use photo_picks_core::{ProgressEvent, ProgressSink};

/// Progress bar adapter for batch runs.
///
/// Hidden when the terminal is quiet or progress display is off; events are
/// still consumed so the analyzer never special-cases the sink.
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Creates a progress bar for `total` candidates.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, visible: bool) -> Self {
        let bar = if quiet || !visible {
            IndicatifBar::hidden()
        } else if let Some(total) = total {
            let bar = IndicatifBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
            );
            bar
        } else {
            IndicatifBar::new_spinner()
        };
        Self { bar }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { id, .. } => {
                self.bar.set_message(id.as_str().to_owned());
            }
            ProgressEvent::Completed { .. } | ProgressEvent::Skipped { .. } => {
                self.bar.inc(1);
            }
            ProgressEvent::Finished {
                completed,
                cancelled,
            } => {
                if cancelled {
                    self.bar
                        .abandon_with_message(format!("cancelled after {completed} photos"));
                } else {
                    self.bar.finish_with_message(format!("{completed} photos"));
                }
            }
        }
    }
}
