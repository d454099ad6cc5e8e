use std::fmt;

/// Main error type for the ftp-fetch client
#[derive(Debug)]
pub enum FetchError {
    // URL errors
    UrlParse(String),
    UnresolvableHost(String),

    // Connection errors
    ConnectionRefused(String),
    ConnectionTimeout(String),
    ConnectionLost(String),

    // Protocol errors
    TruncatedReply(String),
    MalformedPassiveReply(String),
    UnexpectedReply {
        step: &'static str,
        expected: &'static str,
        code: u16,
        text: String,
    },

    // Transfer errors
    TransferTruncated { received: u64, detail: String },

    // Configuration errors
    InvalidConfig(String),

    // IO errors
    Io(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // URL errors
            Self::UrlParse(msg) => write!(f, "Invalid URL: {}", msg),
            Self::UnresolvableHost(msg) => write!(f, "Unresolvable host: {}", msg),

            // Connection errors
            Self::ConnectionRefused(msg) => write!(f, "Connection refused: {}", msg),
            Self::ConnectionTimeout(msg) => write!(f, "Connection timeout: {}", msg),
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),

            // Protocol errors
            Self::TruncatedReply(msg) => write!(f, "Truncated reply: {}", msg),
            Self::MalformedPassiveReply(msg) => {
                write!(f, "Malformed passive-mode reply: {}", msg)
            }
            Self::UnexpectedReply {
                step,
                expected,
                text,
                ..
            } => write!(
                f,
                "Unexpected reply during {}: expected {}, got '{}'",
                step, expected, text
            ),

            // Transfer errors
            Self::TransferTruncated { received, detail } => {
                write!(f, "Transfer truncated after {} bytes: {}", received, detail)
            }

            // Configuration errors
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),

            // IO errors
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl FetchError {
    /// Tag a transport or framing failure with the handshake step it
    /// interrupted, so a failed session always names its offending step.
    pub(crate) fn at_step(self, step: &'static str) -> Self {
        match self {
            Self::TruncatedReply(msg) => Self::TruncatedReply(format!("{step}: {msg}")),
            Self::ConnectionTimeout(msg) => Self::ConnectionTimeout(format!("{step}: {msg}")),
            Self::ConnectionLost(msg) => Self::ConnectionLost(format!("{step}: {msg}")),
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), format!("{step}: {err}"))),
            other => other,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FetchError>;
