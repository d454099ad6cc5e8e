//! FTP status code definitions

// Transfer codes (1xx)
pub const ALREADY_OPEN: u16 = 125;
pub const OPENING_DATA_CONNECTION: u16 = 150;

// Success codes (2xx)
pub const SERVICE_READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const USER_LOGGED_IN: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;

// Intermediate codes (3xx)
pub const USER_NAME_OKAY_NEED_PASSWORD: u16 = 331;

/// Check if status code indicates a transient or permanent error
pub fn is_error(code: u16) -> bool {
    code >= 400
}
