// SPDX-License-Identifier: MIT
//
// Frame output.
//
// Pure functions of "bytes to emit given a row count" over any
// `impl Write` — the device write is the caller's concern, which is what
// makes every frame testable against a `Vec<u8>`. The binary passes a
// locked stdout and flushes once per frame.
//
// No line-wrap suppression: if the terminal width is ever narrower than a
// row's content the last line may visually wrap. Known limitation.

use std::io::{self, Write};

use crate::ansi;

/// Placeholder marker for a content-less row, one per screen line.
const ROW_PLACEHOLDER: &[u8] = b"~\r\n";

/// Emit `rows` placeholder lines.
///
/// Each line is `~` followed by CR/LF — the carriage return matters
/// because raw mode disables output post-processing, so a bare `\n`
/// would only move down, not back to column 1.
pub fn draw_rows(w: &mut impl Write, rows: u16) -> io::Result<()> {
    for _ in 0..rows {
        w.write_all(ROW_PLACEHOLDER)?;
    }
    Ok(())
}

/// Paint one full frame.
///
/// Clear the screen, home the cursor, draw the rows, home the cursor
/// again so it sits at the top-left ready for the next frame. Every call
/// is a full repaint; there is no dirty-region tracking.
pub fn refresh(w: &mut impl Write, rows: u16) -> io::Result<()> {
    ansi::clear_screen(w)?;
    ansi::cursor_home(w)?;
    draw_rows(w, rows)?;
    ansi::cursor_home(w)
}

/// Blank the screen and home the cursor.
///
/// Runs immediately before any process termination — user quit and fatal
/// error alike — so the shell prompt returns to a clean screen instead of
/// a half-drawn frame.
pub fn clear(w: &mut impl Write) -> io::Result<()> {
    ansi::clear_screen(w)?;
    ansi::cursor_home(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
