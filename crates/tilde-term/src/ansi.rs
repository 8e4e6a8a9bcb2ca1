// SPDX-License-Identifier: MIT
//
// VT100 escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — that's the caller's job. This module
// just knows the byte-level encoding of every terminal command we need.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to a `Vec<u8>` in tests.

use std::io::{self, Write};

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to the home position, row 1 column 1 (CUP with no
/// parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Push the cursor toward the bottom-right corner: 999 cells right (CUF),
/// then 999 cells down (CUD).
///
/// CUF and CUD clamp at the screen edge instead of scrolling, which is what
/// makes them safe here — where the cursor actually lands is the terminal's
/// contract, not ours. Used by the size probe when `TIOCGWINSZ` is
/// unavailable.
#[inline]
pub fn cursor_to_extreme(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The terminal answers on stdin with `ESC [ <row> ; <col> R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
