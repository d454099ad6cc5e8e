//! Transfer progress tracking and status display

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Bytes that must arrive between two status-line refreshes.
const RENDER_INTERVAL: u64 = 64 * 1024;

/// Progress tracker for a transfer of unknown total size
pub struct TransferProgress {
    received: u64,
    rendered: u64,
    start_time: Instant,
}

impl TransferProgress {
    /// Create a new progress tracker
    pub fn new() -> Self {
        Self {
            received: 0,
            rendered: 0,
            start_time: Instant::now(),
        }
    }

    /// Add received bytes to current progress
    pub fn add_bytes(&mut self, bytes: u64) {
        self.received += bytes;
    }

    /// Total bytes received so far
    pub fn bytes(&self) -> u64 {
        self.received
    }

    /// Get transfer speed in bytes per second
    pub fn speed_bps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.received as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Refresh the status line once enough new data has arrived since the
    /// last refresh.
    pub fn render(&mut self, filename: &str) {
        if self.received - self.rendered < RENDER_INTERVAL {
            return;
        }
        self.rendered = self.received;
        display_progress(filename, self.received, self.speed_bps());
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Display the single-line transfer status
pub fn display_progress(filename: &str, received: u64, speed_bps: f64) {
    print!(
        "\r{}: {} ({})",
        filename,
        format_bytes(received),
        format_speed(speed_bps)
    );

    if let Err(e) = io::stdout().flush() {
        eprintln!("\nError flushing stdout: {}", e);
    }
}

/// Clear the progress line and move to next line
pub fn finish_progress() {
    println!();
}

/// Format bytes as human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format speed as human readable string
pub fn format_speed(bps: f64) -> String {
    format!("{}/s", format_bytes(bps as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(1073741824), "1.0 GB");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(0.0), "0 B/s");
        assert_eq!(format_speed(1024.0), "1.0 KB/s");
        assert_eq!(format_speed(1048576.0), "1.0 MB/s");
    }

    #[test]
    fn tracker_accumulates_bytes() {
        let mut progress = TransferProgress::new();
        progress.add_bytes(4096);
        progress.add_bytes(4096);
        assert_eq!(progress.bytes(), 8192);
    }

    #[test]
    fn default_tracker_starts_empty() {
        let progress = TransferProgress::default();
        assert_eq!(progress.bytes(), 0);
    }
}
