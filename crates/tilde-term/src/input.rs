// SPDX-License-Identifier: MIT
//
// Keyboard input — single-byte reads and keypress dispatch.
//
// Raw mode is configured with VMIN=0 / VTIME=10 (terminal.rs), so a read
// with no input returns zero bytes after one second instead of blocking
// forever. [`read_key_from`] treats that — and EAGAIN — as "no input yet"
// and retries; everything else is a hard failure.
//
// Dispatch is deliberately minimal: Ctrl+Q quits, every other byte is
// unrecognized and leaves the loop running. No escape-sequence decoding,
// no text input — single literal bytes only.

use std::io::{self, Read};

use crate::error::{Result, TermError};

/// Map a printable character to its control-code equivalent by clearing
/// the top three bits — `ctrl(b'q')` is `0x11`, the byte Ctrl+Q sends.
#[inline]
#[must_use]
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1f
}

/// The byte that terminates the session.
pub const QUIT: u8 = ctrl(b'q');

/// What the loop should do after a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running; repaint and read again.
    Continue,
    /// Quit observed — clear the screen and exit.
    Quit,
}

/// Read one key from stdin.
///
/// # Errors
///
/// [`TermError::Read`] if the read fails for a reason other than
/// transient unavailability.
pub fn read_key() -> Result<u8> {
    read_key_from(&mut io::stdin().lock())
}

/// Read one key from an arbitrary reader, retrying empty reads.
///
/// A zero-byte read is the VTIME timeout expiring (or, on a test reader,
/// "nothing queued yet") and is retried indefinitely; so are EAGAIN and
/// EINTR. Any other error is [`TermError::Read`].
pub fn read_key_from(r: &mut impl Read) -> Result<u8> {
    let mut byte = [0u8; 1];
    loop {
        match r.read(&mut byte) {
            Ok(0) => {}
            Ok(_) => return Ok(byte[0]),
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(TermError::Read(e)),
        }
    }
}

/// Dispatch a single keypress.
///
/// [`QUIT`] (Ctrl+Q) ends the session; every other byte is currently
/// unrecognized and produces no action.
#[must_use]
pub const fn process_keypress(key: u8) -> Action {
    match key {
        QUIT => Action::Quit,
        _ => Action::Continue,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Control transform ────────────────────────────────────────────

    #[test]
    fn ctrl_q_is_0x11() {
        assert_eq!(ctrl(b'q'), 0x11);
        assert_eq!(QUIT, 0x11);
    }

    #[test]
    fn ctrl_clears_top_three_bits() {
        assert_eq!(ctrl(b'a'), 0x01);
        assert_eq!(ctrl(b'z'), 0x1a);
        // Uppercase maps to the same control code.
        assert_eq!(ctrl(b'Q'), ctrl(b'q'));
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    #[test]
    fn quit_byte_quits() {
        assert_eq!(process_keypress(QUIT), Action::Quit);
    }

    #[test]
    fn other_bytes_continue() {
        for key in [b'q', b'Q', b'x', 0x00, 0x1b, 0x7f, 0xff] {
            assert_eq!(process_keypress(key), Action::Continue, "key {key:#04x}");
        }
    }

    // ── Read retry behavior ──────────────────────────────────────────

    /// Reader scripted with a sequence of results, one per `read` call.
    struct Scripted(Vec<io::Result<Option<u8>>>);

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.remove(0) {
                Ok(Some(b)) => {
                    buf[0] = b;
                    Ok(1)
                }
                Ok(None) => Ok(0),
                Err(e) => Err(e),
            }
        }
    }

    #[test]
    fn immediate_byte_is_returned() {
        let mut r = Scripted(vec![Ok(Some(b'x'))]);
        assert_eq!(read_key_from(&mut r).unwrap(), b'x');
    }

    #[test]
    fn empty_reads_are_retried() {
        let mut r = Scripted(vec![Ok(None), Ok(None), Ok(Some(QUIT))]);
        assert_eq!(read_key_from(&mut r).unwrap(), QUIT);
    }

    #[test]
    fn eagain_is_retried() {
        let mut r = Scripted(vec![
            Err(io::Error::from(io::ErrorKind::WouldBlock)),
            Ok(Some(b'k')),
        ]);
        assert_eq!(read_key_from(&mut r).unwrap(), b'k');
    }

    #[test]
    fn eintr_is_retried() {
        let mut r = Scripted(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(Some(b'j')),
        ]);
        assert_eq!(read_key_from(&mut r).unwrap(), b'j');
    }

    #[test]
    fn unrelated_error_is_fatal() {
        let mut r = Scripted(vec![Err(io::Error::other("input/output error"))]);
        assert!(matches!(read_key_from(&mut r), Err(TermError::Read(_))));
    }
}
