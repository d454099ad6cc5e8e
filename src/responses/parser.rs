//! FTP reply decoding
//!
//! Control replies are lines of the form `230 Done` or, for multi-line
//! replies, an opening `230-...` line followed by any number of
//! continuation lines and a closing `230 ...` line. Continuation lines are
//! free text and need not start with a code at all.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::{FetchError, Result};

/// One decoded control-connection line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyLine {
    /// Reply code, when the first three bytes are ASCII digits in the
    /// range RFC 959 assigns to reply codes.
    pub code: Option<u16>,

    /// True only for a coded line whose fourth byte is the space separator.
    pub is_final: bool,

    /// The line as received, terminator stripped.
    pub raw: String,
}

/// A complete server reply, collapsed to the code of its final line.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Effective reply code (e.g., 230, 530, 331)
    pub code: u16,

    /// Accumulated reply text, one line per received line
    pub text: String,
}

/// Decode one terminator-stripped control line.
pub fn decode_line(raw: String) -> ReplyLine {
    let code = line_code(&raw);
    let is_final = code.is_some() && raw.as_bytes().get(3) == Some(&b' ');
    ReplyLine {
        code,
        is_final,
        raw,
    }
}

fn line_code(raw: &str) -> Option<u16> {
    let bytes = raw.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let code = u16::from(bytes[0] - b'0') * 100
        + u16::from(bytes[1] - b'0') * 10
        + u16::from(bytes[2] - b'0');
    (100..=599).contains(&code).then_some(code)
}

/// Extract the data endpoint advertised by a 227 reply.
///
/// The accepted grammar is the parenthesized form of RFC 959:
/// `(h1,h2,h3,h4,p1,p2)` with six octet-sized integers, the data port
/// reassembled as `p1 * 256 + p2`. The address is used exactly as
/// advertised.
pub fn parse_passive_endpoint(text: &str) -> Result<SocketAddrV4> {
    let malformed = |detail: &str| FetchError::MalformedPassiveReply(format!("{detail}: '{text}'"));

    let Some(start) = text.find('(') else {
        return Err(malformed("missing '('"));
    };
    let tuple = &text[start + 1..];
    let Some(end) = tuple.find(')') else {
        return Err(malformed("missing ')'"));
    };

    let fields: Vec<&str> = tuple[..end].split(',').collect();
    if fields.len() != 6 {
        return Err(malformed("expected six comma-separated integers"));
    }

    let mut octets = [0u8; 6];
    for (slot, field) in octets.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse::<u8>()
            .map_err(|_| malformed("field is not an octet"))?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = u16::from(octets[4]) * 256 + u16::from(octets[5]);
    Ok(SocketAddrV4::new(ip, port))
}
