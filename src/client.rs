//! FTP session driver
//!
//! Sequences the control-channel handshake for one download: greeting,
//! authentication, passive negotiation, transfer request, QUIT. Each step
//! reads one collapsed reply and checks it against the codes the protocol
//! allows there; the first unexpected reply fails the session and names
//! the step it happened at.

use log::{debug, error, info, warn};
use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::Command;
use crate::config::ClientConfig;
use crate::connection::{ControlConnection, DataConnection};
use crate::error::{FetchError, Result};
use crate::responses::{
    ALREADY_OPEN, FILE_ACTION_OK, GOODBYE, OPENING_DATA_CONNECTION, PASSIVE_MODE, Reply,
    SERVICE_READY, TRANSFER_COMPLETE, USER_LOGGED_IN, USER_NAME_OKAY_NEED_PASSWORD, is_error,
    parse_passive_endpoint,
};
use crate::transfer::download_file;
use crate::url::FtpUrl;

/// Protocol phase of the control connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Greeted,
    Authenticated,
    PassiveNegotiated,
    TransferRequested,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Connected => write!(f, "connected"),
            SessionState::Greeted => write!(f, "greeted"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::PassiveNegotiated => write!(f, "passive negotiated"),
            SessionState::TransferRequested => write!(f, "transfer requested"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// FTP download client driving one session over a control connection
#[derive(Debug)]
pub struct FtpClient {
    control: ControlConnection,
    state: SessionState,
    timeout: Duration,
}

impl FtpClient {
    /// Connect to the server and wait for its 220 greeting.
    ///
    /// Once the control connection is open the session owes the server a
    /// QUIT, so a rejected or unreadable greeting still ends with one.
    pub fn connect(addr: SocketAddrV4, config: &ClientConfig) -> Result<Self> {
        let timeout = config.timeout();
        let control = ControlConnection::connect(addr, timeout)?;
        let mut client = Self {
            control,
            state: SessionState::Connected,
            timeout,
        };

        let reply = match client.expect_reply("greeting", "220", &[SERVICE_READY]) {
            Ok(reply) => reply,
            Err(e) => {
                client.quit();
                return Err(e);
            }
        };

        info!("Server greeting: {}", reply.text.trim());
        client.set_state(SessionState::Greeted);
        Ok(client)
    }

    /// Authenticate with USER and PASS.
    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        self.control.send_command(&Command::User(user.to_string()))?;
        self.expect_reply("user", "331", &[USER_NAME_OKAY_NEED_PASSWORD])?;

        self.control
            .send_command(&Command::Pass(password.to_string()))?;
        self.expect_reply("pass", "230", &[USER_LOGGED_IN])?;

        self.set_state(SessionState::Authenticated);
        info!("Logged in as '{user}'");
        Ok(())
    }

    /// Negotiate a passive-mode data endpoint.
    pub fn enter_passive_mode(&mut self) -> Result<SocketAddrV4> {
        self.control.send_command(&Command::Pasv)?;
        let reply = self.expect_reply("pasv", "227", &[PASSIVE_MODE])?;

        let endpoint = parse_passive_endpoint(&reply.text)?;
        self.set_state(SessionState::PassiveNegotiated);
        info!("Passive endpoint: {endpoint}");
        Ok(endpoint)
    }

    /// Ask the server to start sending `resource` over the data connection.
    pub fn request_file(&mut self, resource: &str) -> Result<()> {
        self.control
            .send_command(&Command::Retr(resource.to_string()))?;
        self.expect_reply("retr", "150 or 125", &[OPENING_DATA_CONNECTION, ALREADY_OPEN])?;
        self.set_state(SessionState::TransferRequested);
        Ok(())
    }

    /// Download `url.resource` into `dir` over a passive data connection.
    ///
    /// Returns the local path and the number of bytes written.
    pub fn download(&mut self, url: &FtpUrl, dir: &Path) -> Result<(PathBuf, u64)> {
        let endpoint = self.enter_passive_mode()?;
        let mut data_connection = DataConnection::connect(endpoint, self.timeout)?;

        self.request_file(&url.resource)?;

        let local_path = dir.join(&url.file);
        let received = download_file(&mut data_connection, &local_path, &url.file)?;
        if let Err(e) = data_connection.close() {
            debug!("Data connection close: {e}");
        }

        self.finish_transfer(received)?;
        Ok((local_path, received))
    }

    /// Read the completion reply once the data stream has drained.
    ///
    /// An explicit failure code fails the download. A missing reply does
    /// not: the transfer already ended cleanly at end-of-stream, so server
    /// silence here is only worth a warning.
    fn finish_transfer(&mut self, received: u64) -> Result<()> {
        match self.control.read_reply() {
            Ok(reply) if is_error(reply.code) => {
                error!("Server reported transfer failure: {}", reply.text);
                Err(FetchError::TransferTruncated {
                    received,
                    detail: reply.text,
                })
            }
            Ok(reply) => {
                if reply.code == TRANSFER_COMPLETE || reply.code == FILE_ACTION_OK {
                    debug!("Transfer confirmed: {}", reply.text);
                } else {
                    warn!("Unexpected transfer completion reply: {}", reply.text);
                }
                Ok(())
            }
            Err(e) => {
                warn!("No completion reply after transfer: {e}");
                Ok(())
            }
        }
    }

    /// End the session with a best-effort QUIT.
    ///
    /// Runs on success and failure paths alike. A missing or odd goodbye
    /// reply is logged, never escalated.
    pub fn quit(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Err(e) = self.control.send_command(&Command::Quit) {
            warn!("Could not send QUIT: {e}");
        } else {
            match self.control.read_reply() {
                Ok(reply) if reply.code == GOODBYE => debug!("Server goodbye: {}", reply.text),
                Ok(reply) => warn!("Unexpected reply to QUIT: {}", reply.text),
                Err(e) => warn!("No goodbye reply: {e}"),
            }
        }

        self.control.shutdown();
        self.set_state(SessionState::Closed);
    }

    /// Get current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn set_state(&mut self, next: SessionState) {
        debug!("Session state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Read one collapsed reply and require its code to be one of `codes`.
    fn expect_reply(
        &mut self,
        step: &'static str,
        expected: &'static str,
        codes: &[u16],
    ) -> Result<Reply> {
        let reply = self.control.read_reply().map_err(|e| e.at_step(step))?;

        if codes.contains(&reply.code) {
            Ok(reply)
        } else {
            error!(
                "Step '{step}' failed: expected {expected}, got '{}'",
                reply.text
            );
            Err(FetchError::UnexpectedReply {
                step,
                expected,
                code: reply.code,
                text: reply.text,
            })
        }
    }
}
