//! Progress indicators for cfprov CLI.

use declarative::{ProgressCallback, RefreshOutcome};
use indicatif::{ProgressBar, ProgressStyle};

/// Refresh progress rendered as a terminal bar
pub struct RefreshBar {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl RefreshBar {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }
}

impl ProgressCallback for RefreshBar {
    fn on_batch_start(&mut self, count: usize) {
        if self.quiet || count == 0 {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        self.bar = Some(bar);
    }

    fn on_resource_start(&mut self, address: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(address.to_string());
        }
    }

    fn on_resource_complete(&mut self, address: &str, outcome: &RefreshOutcome) {
        if let Some(bar) = &self.bar {
            if let RefreshOutcome::Failed { error } = outcome {
                bar.println(format!("  {address}: {error}"));
            }
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
