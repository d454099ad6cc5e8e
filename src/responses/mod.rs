//! FTP reply decoding and reading module

pub mod parser;
pub mod reader;
pub mod status_codes;

// Re-export main types
pub use parser::{Reply, ReplyLine, parse_passive_endpoint};
pub use reader::{read_reply, read_reply_line};
pub use status_codes::*;
