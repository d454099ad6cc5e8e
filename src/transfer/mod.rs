//! File transfer module

pub mod download;
pub mod progress;

// Re-export main functions
pub use download::download_file;
pub use progress::format_bytes;
