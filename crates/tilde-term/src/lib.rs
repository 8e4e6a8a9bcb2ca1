// SPDX-License-Identifier: MIT
//
// tilde-term — terminal control layer for tilde.
//
// Raw-mode negotiation, screen geometry, frame output, and single-byte
// key input, built directly on termios and VT100 escape sequences. This
// crate intentionally avoids external TUI frameworks (ratatui, crossterm)
// in favor of direct terminal control: every byte sent to the terminal is
// accounted for, and the original line-discipline attributes are restored
// on every exit path, panics included.

pub mod ansi;
pub mod error;
pub mod geometry;
pub mod input;
pub mod screen;
pub mod terminal;
