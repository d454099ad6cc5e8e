//! A minimal passive-mode FTP download client.
//!
//! Given a URL of the form `ftp://[user:password@]host/path`, the client
//! resolves the host, walks the control-channel handshake (greeting, USER,
//! PASS, PASV, RETR), streams the file over the passive data connection
//! into a local download directory, and ends the session with QUIT.

pub mod client;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod responses;
pub mod transfer;
pub mod url;

// Re-export main types
pub use client::{FtpClient, SessionState};
pub use config::ClientConfig;
pub use error::{FetchError, Result};
pub use url::FtpUrl;
