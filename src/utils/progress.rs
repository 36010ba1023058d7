use indicatif::{ProgressBar, ProgressStyle};

/// Progress over the tickers of one run. Disabled trackers are no-ops.
#[derive(Clone)]
pub struct ProgressTracker {
    progress_bar: Option<ProgressBar>,
}

impl ProgressTracker {
    pub fn new(total: u64, enabled: bool) -> Self {
        let progress_bar = enabled.then(|| {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });
        Self { progress_bar }
    }

    pub fn start(&self, ticker: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Processing {}", ticker));
        }
    }

    pub fn increment(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
        }
    }

    /// Prints above the bar instead of tearing it.
    pub fn println(&self, message: &str) {
        match &self.progress_bar {
            Some(pb) => pb.println(message),
            None => println!("{}", message),
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Complete");
        }
    }
}
