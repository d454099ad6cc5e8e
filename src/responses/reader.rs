//! Bounded reading of control-connection replies
//!
//! Lines are read one byte at a time so the reader never consumes input
//! past the CRLF that ends the current line; the control stream stays
//! positioned exactly at the start of the next reply.

use log::debug;
use std::io::{ErrorKind, Read};

use crate::error::{FetchError, Result};
use crate::responses::parser::{Reply, ReplyLine, decode_line};

/// Longest accepted reply line, terminator included. Anything longer is
/// treated as a broken or hostile server.
const MAX_REPLY_LINE: usize = 4096;

/// Most continuation text retained while collapsing a multi-line reply.
const MAX_REPLY_TEXT: usize = 64 * 1024;

/// Read exactly one CRLF-terminated reply line from the control stream.
pub fn read_reply_line<R: Read>(stream: &mut R) -> Result<ReplyLine> {
    let mut line: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match stream.read(&mut byte) {
            Ok(0) => {
                return Err(FetchError::TruncatedReply(format!(
                    "connection closed after {} bytes with no line terminator",
                    line.len()
                )));
            }
            Ok(_) => {
                line.push(byte[0]);
                if line.ends_with(b"\r\n") {
                    break;
                }
                if line.len() >= MAX_REPLY_LINE {
                    return Err(FetchError::TruncatedReply(format!(
                        "reply line exceeded {MAX_REPLY_LINE} bytes"
                    )));
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_read_error(e)),
        }
    }

    line.truncate(line.len() - 2);
    Ok(decode_line(String::from_utf8_lossy(&line).into_owned()))
}

/// Read one complete reply, collapsing the RFC 959 multi-line convention
/// down to the code of its final line.
///
/// Continuation lines, whether `code-` prefixed or bare text, are
/// accumulated until a line arrives carrying a reply code followed by the
/// space separator. That line's code is the reply's effective code. At
/// most `MAX_REPLY_TEXT` bytes of continuation text are retained; lines
/// past the cap are read but not kept.
pub fn read_reply<R: Read>(stream: &mut R) -> Result<Reply> {
    let mut text = String::new();

    loop {
        let line = read_reply_line(stream)?;
        debug!("S: {}", line.raw);

        if line.is_final {
            // decode_line only marks coded lines final
            let code = line.code.unwrap_or_default();
            text.push_str(&line.raw);
            return Ok(Reply { code, text });
        }

        if text.len() < MAX_REPLY_TEXT {
            text.push_str(&line.raw);
            text.push('\n');
        }
    }
}

fn map_read_error(e: std::io::Error) -> FetchError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => {
            FetchError::ConnectionTimeout("control read timed out".to_string())
        }
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::UnexpectedEof => {
            FetchError::ConnectionLost(format!("control read failed: {e}"))
        }
        _ => FetchError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Test reader that fails with the queued kinds before yielding data.
    struct FaultyStream {
        faults: std::vec::IntoIter<ErrorKind>,
        data: Cursor<Vec<u8>>,
    }

    impl FaultyStream {
        fn new(faults: Vec<ErrorKind>, data: &[u8]) -> Self {
            Self {
                faults: faults.into_iter(),
                data: Cursor::new(data.to_vec()),
            }
        }
    }

    impl Read for FaultyStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.faults.next() {
                Some(kind) => Err(io::Error::from(kind)),
                None => self.data.read(buf),
            }
        }
    }

    #[test]
    fn reads_single_line_reply() {
        let mut stream = Cursor::new(b"220 Service ready.\r\n".to_vec());
        let reply = read_reply(&mut stream).expect("reply should read");
        assert_eq!(reply.code, 220);
        assert_eq!(reply.text, "220 Service ready.");
    }

    #[test]
    fn reader_stops_at_the_terminator() {
        // Two pipelined replies: reading the first must leave the second
        // untouched on the stream.
        let mut stream = Cursor::new(b"150 Opening data connection.\r\n226 Done.\r\n".to_vec());
        let first = read_reply(&mut stream).expect("first reply should read");
        let second = read_reply(&mut stream).expect("second reply should read");
        assert_eq!(first.code, 150);
        assert_eq!(second.code, 226);
    }

    #[test]
    fn multiline_reply_yields_one_line_per_call() {
        let mut stream = Cursor::new(b"230-Welcome\r\n230 Done\r\n".to_vec());
        let first = read_reply_line(&mut stream).expect("first line should read");
        let second = read_reply_line(&mut stream).expect("second line should read");
        assert_eq!(first.code, Some(230));
        assert!(!first.is_final);
        assert_eq!(second.code, Some(230));
        assert!(second.is_final);
    }

    #[test]
    fn collapses_multiline_reply_to_final_code() {
        let mut stream = Cursor::new(
            b"220-Welcome to the server\r\n plain text banner\r\n220 Ready.\r\n".to_vec(),
        );
        let reply = read_reply(&mut stream).expect("reply should read");
        assert_eq!(reply.code, 220);
        assert_eq!(
            reply.text,
            "220-Welcome to the server\n plain text banner\n220 Ready."
        );
    }

    #[test]
    fn collapse_uses_the_last_coded_line() {
        // The final line's code wins even when it differs from the opener.
        let mut stream = Cursor::new(b"220-Hello\r\n230 Proceed.\r\n".to_vec());
        let reply = read_reply(&mut stream).expect("reply should read");
        assert_eq!(reply.code, 230);
    }

    #[test]
    fn preceding_bare_text_does_not_change_the_reply() {
        let mut plain = Cursor::new(b"230 Done.\r\n".to_vec());
        let mut noisy = Cursor::new(b"unrelated text\r\n230 Done.\r\n".to_vec());
        let a = read_reply(&mut plain).expect("reply should read");
        let b = read_reply(&mut noisy).expect("reply should read");
        assert_eq!(a.code, b.code);
    }

    #[test]
    fn code_without_separator_does_not_end_the_reply() {
        // "230\r\n" alone never terminates, so the reply ends only at the
        // properly separated line that follows.
        let mut stream = Cursor::new(b"230\r\n230 Done.\r\n".to_vec());
        let reply = read_reply(&mut stream).expect("reply should read");
        assert_eq!(reply.code, 230);
        assert_eq!(reply.text, "230\n230 Done.");
    }

    #[test]
    fn eof_before_terminator_is_truncated() {
        let mut stream = Cursor::new(b"220 Se".to_vec());
        match read_reply(&mut stream) {
            Err(FetchError::TruncatedReply(_)) => {}
            other => panic!("expected TruncatedReply, got {other:?}"),
        }
    }

    #[test]
    fn eof_mid_multiline_reply_is_truncated() {
        let mut stream = Cursor::new(b"220-Welcome\r\n".to_vec());
        match read_reply(&mut stream) {
            Err(FetchError::TruncatedReply(_)) => {}
            other => panic!("expected TruncatedReply, got {other:?}"),
        }
    }

    #[test]
    fn oversized_line_is_rejected() {
        let mut stream = Cursor::new(vec![b'x'; MAX_REPLY_LINE + 16]);
        match read_reply(&mut stream) {
            Err(FetchError::TruncatedReply(msg)) => assert!(msg.contains("exceeded")),
            other => panic!("expected TruncatedReply, got {other:?}"),
        }
    }

    #[test]
    fn line_of_exactly_the_bound_is_accepted() {
        let mut data = vec![b'2'; 3];
        data.push(b' ');
        data.resize(MAX_REPLY_LINE - 2, b'x');
        data.extend_from_slice(b"\r\n");
        let mut stream = Cursor::new(data);
        let reply = read_reply(&mut stream).expect("reply should read");
        assert_eq!(reply.code, 222);
    }

    #[test]
    fn continuation_text_is_bounded() {
        // The reply text stops growing once the cap is reached, while the
        // final line is still read and kept.
        let mut data = Vec::new();
        for _ in 0..65536 {
            data.extend_from_slice(b"220-banner line\r\n");
        }
        data.extend_from_slice(b"220 Done.\r\n");
        let mut stream = Cursor::new(data);
        let reply = read_reply(&mut stream).expect("reply should read");
        assert_eq!(reply.code, 220);
        assert!(reply.text.len() <= MAX_REPLY_TEXT + MAX_REPLY_LINE);
        assert!(reply.text.ends_with("220 Done."));
    }

    #[test]
    fn timed_out_reads_surface_as_connection_timeout() {
        for kind in [ErrorKind::WouldBlock, ErrorKind::TimedOut] {
            let mut stream = FaultyStream::new(vec![kind], b"");
            match read_reply_line(&mut stream) {
                Err(FetchError::ConnectionTimeout(_)) => {}
                other => panic!("expected ConnectionTimeout for {kind:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn lost_connection_reads_surface_as_connection_lost() {
        let kinds = [
            ErrorKind::ConnectionReset,
            ErrorKind::ConnectionAborted,
            ErrorKind::UnexpectedEof,
        ];
        for kind in kinds {
            let mut stream = FaultyStream::new(vec![kind], b"");
            match read_reply_line(&mut stream) {
                Err(FetchError::ConnectionLost(_)) => {}
                other => panic!("expected ConnectionLost for {kind:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut stream = FaultyStream::new(
            vec![ErrorKind::Interrupted, ErrorKind::Interrupted],
            b"230 Done.\r\n",
        );
        let line = read_reply_line(&mut stream).expect("line should read");
        assert_eq!(line.code, Some(230));
        assert!(line.is_final);
    }
}
