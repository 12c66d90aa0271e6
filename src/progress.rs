use std::io::Write;

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar or spinner for a download.
///
/// # Arguments
/// * `file_size` - The size of the download in bytes, if the server sent one.
/// * `name` - The name of the target file.
///
/// # Returns
/// A `ProgressBar` instance.
pub fn setup_progress_log(file_size: Option<u64>, name: &str) -> ProgressBar {
    match file_size {
        Some(size) if size > 0 => progress_bar(size, name),
        _ => spinner(),
    }
}

/// Creates a progress bar for a download with a known size.
fn progress_bar(file_size: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(file_size);

    if let Ok(style) = ProgressStyle::default_bar()
        .template(&(name.to_owned() + " {bar:40.cyan} {percent:.cyan}% | {bytes}/{total_bytes} ({eta})"))
    {
        pb.set_style(style.progress_chars("=>-"));
    }

    pb
}

/// Creates a spinner for a download with an unknown size.
fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} Downloaded {bytes}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠏"));
    }

    pb
}

/// A writer that advances a progress bar by every chunk it forwards.
pub(crate) struct ProgressWriter<W: Write> {
    inner: W,
    pb: ProgressBar,
}

impl<W: Write> ProgressWriter<W> {
    pub(crate) fn new(inner: W, pb: ProgressBar) -> Self {
        Self { inner, pb }
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.pb.inc(written as u64);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Drop for ProgressWriter<W> {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_progress_log() {
        let pb = setup_progress_log(Some(100), "test");
        assert_eq!(pb.length(), Some(100));
    }

    #[test]
    fn test_spinner_for_unknown_size() {
        assert_eq!(setup_progress_log(None, "test").length(), None);
        assert_eq!(setup_progress_log(Some(0), "test").length(), None);
    }

    #[test]
    fn test_progress_writer_counts_bytes() {
        let pb = ProgressBar::hidden();
        let mut sink = Vec::new();
        {
            let mut writer = ProgressWriter::new(&mut sink, pb.clone());
            writer.write_all(b"hello").unwrap();
            writer.write_all(b" world").unwrap();
        }

        assert_eq!(sink, b"hello world");
        assert_eq!(pb.position(), 11);
    }
}
