// SPDX-License-Identifier: MIT
//
// Screen geometry resolution.
//
// The driver query (`ioctl(TIOCGWINSZ)` in terminal.rs) is the primary
// mechanism. Some terminals don't support it, or answer with a zero-width
// winsize; for those we fall back to the cursor-position probe: push the
// cursor toward the bottom-right corner (the terminal clamps it to the
// last cell), ask for a Device Status Report, and parse the coordinates
// out of the reply.
//
// The probe takes its reader and writer as parameters so tests can run it
// against byte buffers instead of a real terminal — the clamping itself is
// the terminal's contract and is never simulated here.

use std::io::{self, Read, Write};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::terminal::{self, Size};

/// Upper bound on the cursor-position reply, including the `R` terminator.
/// A real reply is at most `ESC [ <5 digits> ; <5 digits> R` = 14 bytes;
/// 32 leaves slack without risking an unbounded read.
const REPLY_BUF_SIZE: usize = 32;

/// Resolve the terminal size: driver query first, cursor probe second.
///
/// Runs once at startup; geometry is fixed for the session. The probe
/// writes to stdout and reads the reply from stdin, so it only works
/// while raw mode is active (the reply must arrive unechoed and unbuffered).
///
/// # Errors
///
/// [`TermError::Geometry`] if the probe's I/O fails,
/// [`TermError::ProtocolParse`] if the terminal's reply is malformed.
pub fn resolve_size() -> Result<Size> {
    if let Some(size) = terminal::window_size() {
        return Ok(size);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    probe_size(&mut stdin.lock(), &mut stdout.lock())
}

/// Determine the screen size via the cursor-position probe.
///
/// Writes cursor-to-extreme then a DSR request to `w`, then reads the
/// reply from `r` one byte at a time until the `R` terminator or the
/// bounded buffer fills. Short writes are treated as probe failure — a
/// truncated escape sequence would leave the terminal in an unknown state.
///
/// # Errors
///
/// [`TermError::Geometry`] on any write/read failure or short write,
/// [`TermError::ProtocolParse`] if the reply doesn't parse.
pub fn probe_size(r: &mut impl Read, w: &mut impl Write) -> Result<Size> {
    let mut request = Vec::with_capacity(16);
    ansi::cursor_to_extreme(&mut request).map_err(TermError::Geometry)?;
    ansi::request_cursor_position(&mut request).map_err(TermError::Geometry)?;

    let written = w.write(&request).map_err(TermError::Geometry)?;
    if written != request.len() {
        return Err(TermError::Geometry(io::Error::new(
            io::ErrorKind::WriteZero,
            "short write sending cursor probe",
        )));
    }
    w.flush().map_err(TermError::Geometry)?;

    // Collect the reply up to (not including) the R terminator.
    let mut reply = [0u8; REPLY_BUF_SIZE];
    let mut len = 0;
    while len < reply.len() {
        let mut byte = [0u8; 1];
        match r.read(&mut byte) {
            // Timeout or EOF — parse whatever arrived.
            Ok(0) => break,
            Ok(_) => {
                if byte[0] == b'R' {
                    break;
                }
                reply[len] = byte[0];
                len += 1;
            }
            Err(e) => return Err(TermError::Geometry(e)),
        }
    }

    parse_cursor_report(&reply[..len])
}

/// Parse a cursor-position report body: `ESC [ <rows> ; <cols>`.
///
/// The `R` terminator has already been stripped by the probe's read loop.
///
/// # Errors
///
/// [`TermError::ProtocolParse`] if the lead-in is not `ESC [`, either
/// field is missing or non-decimal, or either dimension is zero.
pub fn parse_cursor_report(reply: &[u8]) -> Result<Size> {
    let body = reply
        .strip_prefix(b"\x1b[")
        .ok_or(TermError::ProtocolParse)?;

    let semi = body
        .iter()
        .position(|&b| b == b';')
        .ok_or(TermError::ProtocolParse)?;
    let rows = parse_decimal(&body[..semi])?;
    let cols = parse_decimal(&body[semi + 1..])?;

    if rows == 0 || cols == 0 {
        return Err(TermError::ProtocolParse);
    }

    Ok(Size { cols, rows })
}

/// Parse a non-empty ASCII-decimal field. No sign, no whitespace.
fn parse_decimal(field: &[u8]) -> Result<u16> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(TermError::ProtocolParse);
    }
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(TermError::ProtocolParse)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
