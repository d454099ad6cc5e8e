//! FTP command definitions

/// Control-channel commands a download session issues
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// USER - Username for authentication
    User(String),

    /// PASS - Password for authentication
    Pass(String),

    /// PASV - Request a passive-mode data endpoint
    Pasv,

    /// RETR - Retrieve a file from the server
    Retr(String),

    /// QUIT - End the session
    Quit,
}

impl Command {
    /// Convert command to its FTP wire string, without the terminator
    pub fn to_ftp_string(&self) -> String {
        match self {
            Command::User(username) => format!("USER {username}"),
            Command::Pass(password) => format!("PASS {password}"),
            Command::Pasv => "PASV".to_string(),
            Command::Retr(resource) => format!("RETR {resource}"),
            Command::Quit => "QUIT".to_string(),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::User(username) => write!(f, "USER {username}"),
            Command::Pass(_) => write!(f, "PASS [hidden]"),
            Command::Pasv => write!(f, "PASV"),
            Command::Retr(resource) => write!(f, "RETR {resource}"),
            Command::Quit => write!(f, "QUIT"),
        }
    }
}
