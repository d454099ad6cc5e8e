//! Data connection management for passive-mode transfers

use log::{debug, info};
use std::io::{self, Read};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;

use crate::error::{FetchError, Result};

/// The short-lived TCP connection carrying the file bytes
#[derive(Debug)]
pub struct DataConnection {
    stream: Option<TcpStream>,
}

impl DataConnection {
    /// Connect to the endpoint the server advertised in its 227 reply.
    pub fn connect(endpoint: SocketAddrV4, timeout: Duration) -> Result<Self> {
        info!("Opening data connection to {endpoint}");

        let stream = TcpStream::connect_timeout(&SocketAddr::V4(endpoint), timeout).map_err(
            |e| match e.kind() {
                io::ErrorKind::TimedOut => {
                    FetchError::ConnectionTimeout(format!("data connect to {endpoint} timed out"))
                }
                io::ErrorKind::ConnectionRefused => {
                    FetchError::ConnectionRefused(format!("data endpoint {endpoint}"))
                }
                _ => FetchError::Io(e),
            },
        )?;

        stream
            .set_read_timeout(Some(timeout))
            .map_err(FetchError::Io)?;

        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Read a chunk from the data stream. `Ok(0)` is clean end-of-stream,
    /// the only way the server signals the file is complete.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            FetchError::ConnectionLost("data connection already closed".to_string())
        })?;

        loop {
            match stream.read(buffer) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(match e.kind() {
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                            FetchError::ConnectionTimeout("data read timed out".to_string())
                        }
                        _ => FetchError::ConnectionLost(format!("data read failed: {e}")),
                    });
                }
            }
        }
    }

    /// Close the data connection. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream
                .shutdown(Shutdown::Both)
                .map_err(FetchError::Io)?;
            debug!("Data connection closed");
        }
        Ok(())
    }
}

impl Drop for DataConnection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
