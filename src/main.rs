// SPDX-License-Identifier: MIT
//
// tilde — a minimal raw-mode terminal viewport.
//
// The binary wires tilde-term into the run loop:
//
//   enter raw mode → resolve geometry → repeat { refresh, read key }
//
// Raw mode is held by an RAII guard for the whole session; the original
// termios is reinstalled on quit, on fatal error, and (via the panic hook
// inside tilde-term) on panic. Every termination path blanks the screen
// first so the shell prompt comes back clean.
//
// Exit codes: 0 on Ctrl+Q, 1 on any terminal, geometry, or I/O failure,
// with a perror-style diagnostic on stderr naming the failing operation.

use std::io::{self, Write};
use std::process;

use tilde_term::error::TermError;
use tilde_term::geometry;
use tilde_term::input::{self, Action};
use tilde_term::screen;
use tilde_term::terminal::{RawMode, Size};

// ─── Editor ─────────────────────────────────────────────────────────────────

/// Session state: the screen geometry, resolved once at startup and
/// read-only for the rest of the process.
struct Editor {
    size: Size,
}

impl Editor {
    /// Resolve geometry and build the session state.
    ///
    /// Must run after raw mode is active: the cursor-probe fallback needs
    /// the terminal's reply to arrive unechoed and unbuffered.
    fn new() -> Result<Self, TermError> {
        let size = geometry::resolve_size()?;
        Ok(Self { size })
    }

    /// The refresh / read cycle. Returns on the quit keystroke or the
    /// first fatal error; the caller owns screen cleanup and termios
    /// restoration either way.
    fn run(&self) -> Result<(), TermError> {
        loop {
            self.paint()?;
            let key = input::read_key()?;
            match input::process_keypress(key) {
                Action::Continue => {}
                Action::Quit => return Ok(()),
            }
        }
    }

    /// Paint one frame to stdout. Full repaint every time.
    fn paint(&self) -> Result<(), TermError> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        screen::refresh(&mut lock, self.size.rows).map_err(TermError::Write)?;
        lock.flush().map_err(TermError::Write)
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Blank the screen and home the cursor, best-effort.
///
/// Runs before every termination, so even a fatal error leaves the
/// terminal blank rather than mid-frame. Failures are ignored: if stdout
/// is already gone there is nothing further to clean.
fn blank_screen() {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    let _ = screen::clear(&mut lock);
    let _ = lock.flush();
}

fn main() {
    let mut raw = RawMode::enter().unwrap_or_else(|e| {
        blank_screen();
        eprintln!("tilde: {e}");
        process::exit(1);
    });

    let result = Editor::new().and_then(|editor| editor.run());

    // Same teardown on every path: blank screen, then give the shell its
    // termios back. `process::exit` skips destructors, so restore runs
    // explicitly before the error branches below.
    blank_screen();
    if let Err(e) = raw.restore() {
        eprintln!("tilde: {e}");
        process::exit(1);
    }

    if let Err(e) = result {
        eprintln!("tilde: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
