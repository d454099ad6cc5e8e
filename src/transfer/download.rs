//! File download functionality

use log::{debug, error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::connection::DataConnection;
use crate::error::{FetchError, Result};
use crate::transfer::progress::{
    TransferProgress, display_progress, finish_progress, format_bytes, format_speed,
};

/// Read buffer size for the data connection copy loop.
const CHUNK_SIZE: usize = 8192;

/// Stream the data connection into `local_path` until end-of-stream.
///
/// Returns the number of bytes written. The server advertises no length up
/// front, so the only clean finish is the server closing the data stream;
/// any read failure before that counts as a truncated transfer.
pub fn download_file(
    data_connection: &mut DataConnection,
    local_path: &Path,
    filename: &str,
) -> Result<u64> {
    info!("Downloading '{}' to {}", filename, local_path.display());

    let file = File::create(local_path).map_err(FetchError::Io)?;
    let mut writer = BufWriter::new(file);
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut progress = TransferProgress::new();

    loop {
        let received = match data_connection.receive(&mut buffer) {
            Ok(0) => {
                debug!("End of data stream after {} bytes", progress.bytes());
                break;
            }
            Ok(received) => received,
            Err(e) => {
                error!("Data stream failed mid-transfer: {e}");
                finish_progress();
                return Err(FetchError::TransferTruncated {
                    received: progress.bytes(),
                    detail: e.to_string(),
                });
            }
        };

        if let Err(e) = writer.write_all(&buffer[..received]) {
            error!("Failed to write to local file: {e}");
            finish_progress();
            return Err(FetchError::Io(e));
        }

        progress.add_bytes(received as u64);
        progress.render(filename);
    }

    writer.flush().map_err(FetchError::Io)?;

    display_progress(filename, progress.bytes(), progress.speed_bps());
    finish_progress();
    info!(
        "Download completed: {} in {:.1?} ({})",
        format_bytes(progress.bytes()),
        progress.elapsed(),
        format_speed(progress.speed_bps())
    );

    Ok(progress.bytes())
}
