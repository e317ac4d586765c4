//! Shared progress and logging helpers to keep progress bars pinned.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

pub fn add_progress_bar(len: u64) -> ProgressBar {
    multi_progress().add(ProgressBar::new(len))
}

/// Pinned bar for a batch of `len` items; `None` for empty batches
pub fn start_progress_bar(len: usize, message: &str) -> Option<ProgressBar> {
    if len == 0 {
        return None;
    }

    let pb = add_progress_bar(len as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

pub fn advance_progress(pb: &Option<ProgressBar>, delta: u64) {
    if let Some(pb) = pb {
        pb.inc(delta);
    }
}

pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Stage spinner for the analysis pipeline
pub fn start_stage_bar(stages: usize) -> ProgressBar {
    let pb = add_progress_bar(stages as u64);
    let style = ProgressStyle::with_template("{spinner:.green} [{pos}/{len}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[derive(Default, Clone)]
pub struct LogWriterFactory;

pub struct LogWriter {
    buffer: String,
}

impl LogWriter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = self.buffer.trim_end_matches('\n').trim_end_matches('\r');
        if line.is_empty() {
            let _ = multi_progress().println(String::new());
        } else {
            let _ = multi_progress().println(line.to_string());
        }
        self.buffer.clear();
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = String::from_utf8_lossy(buf);
        self.buffer.push_str(&chunk);

        while let Some(idx) = self.buffer.find('\n') {
            let line = self.buffer[..idx].trim_end_matches('\r');
            if line.is_empty() {
                let _ = multi_progress().println(String::new());
            } else {
                let _ = multi_progress().println(line.to_string());
            }
            self.buffer.drain(..idx + 1);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer();
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_has_no_bar() {
        assert!(start_progress_bar(0, "Storing posts").is_none());
        finish_progress(None, "done");
    }

    #[test]
    fn test_log_writer_buffers_partial_lines() {
        let mut writer = LogWriterFactory.make_writer();
        writer.write_all(b"partial").unwrap();
        assert_eq!(writer.buffer, "partial");
        writer.write_all(b" line\nnext").unwrap();
        assert_eq!(writer.buffer, "next");
        writer.flush().unwrap();
        assert!(writer.buffer.is_empty());
    }
}
