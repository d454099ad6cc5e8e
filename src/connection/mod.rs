//! Connection management
//!
//! The control and data channels of one FTP session.

pub mod control;
pub mod data;

// Re-export main types
pub use control::ControlConnection;
pub use data::DataConnection;
