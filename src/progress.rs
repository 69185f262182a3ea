use indicatif::{ProgressBar, ProgressStyle};

/// Observational callbacks emitted by the scanner as it walks. Sinks must
/// never influence the scan outcome.
pub trait ProgressSink {
    fn begin(&self, total: usize);
    fn file_scanned(&self, index: usize, total: usize, name: &str);
    fn finish(&self);
}

/// Console progress bar for interactive runs.
pub struct ScanProgress {
    bar: ProgressBar,
}

impl ScanProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0).with_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files\n{msg}",
                )
                .unwrap()
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ScanProgress {
    fn begin(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn file_scanned(&self, index: usize, _total: usize, name: &str) {
        self.bar.set_position(index as u64);
        self.bar.set_message(format!("Scanning {name}"));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// No-op sink for --quiet runs and tests.
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn begin(&self, _total: usize) {}
    fn file_scanned(&self, _index: usize, _total: usize, _name: &str) {}
    fn finish(&self) {}
}
