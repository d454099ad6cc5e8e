//! Control connection management
//!
//! Handles the TCP connection carrying FTP commands and replies.

use log::{debug, info};
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;

use crate::command::Command;
use crate::error::{FetchError, Result};
use crate::responses::{Reply, read_reply};

/// The FTP control channel: commands out, replies in
#[derive(Debug)]
pub struct ControlConnection {
    stream: TcpStream,
}

impl ControlConnection {
    /// Open the control connection and install the timeout bound on all
    /// later reads and writes.
    pub fn connect(addr: SocketAddrV4, timeout: Duration) -> Result<Self> {
        debug!("Connecting to {addr}");

        let stream =
            TcpStream::connect_timeout(&SocketAddr::V4(addr), timeout).map_err(|e| {
                match e.kind() {
                    io::ErrorKind::TimedOut => {
                        FetchError::ConnectionTimeout(format!("connect to {addr} timed out"))
                    }
                    io::ErrorKind::ConnectionRefused => {
                        FetchError::ConnectionRefused(format!("{addr}"))
                    }
                    _ => FetchError::Io(e),
                }
            })?;

        stream
            .set_read_timeout(Some(timeout))
            .map_err(FetchError::Io)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(FetchError::Io)?;

        info!("Control connection established with {addr}");
        Ok(Self { stream })
    }

    /// Send one command, terminator added automatically.
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        debug!("C: {command}");

        let wire = format!("{}\r\n", command.to_ftp_string());
        let result = self
            .stream
            .write_all(wire.as_bytes())
            .and_then(|_| self.stream.flush());

        result.map_err(|e| match e.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset => {
                FetchError::ConnectionLost(format!("connection lost while sending {command}"))
            }
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                FetchError::ConnectionTimeout(format!("timed out sending {command}"))
            }
            _ => FetchError::Io(e),
        })
    }

    /// Read one complete, collapsed reply.
    pub fn read_reply(&mut self) -> Result<Reply> {
        read_reply(&mut self.stream)
    }

    /// Close both directions of the control connection.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("Control connection shutdown: {e}");
        }
    }
}

impl Drop for ControlConnection {
    fn drop(&mut self) {
        self.shutdown();
    }
}
