// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal control.
//
// Every failure here is unrecoverable by policy: the caller clears the
// screen, prints the message, and exits nonzero. The variants exist so
// the diagnostic names the operation that failed (the perror convention),
// not so anyone can handle them differently.

use std::io;

use thiserror::Error;

/// Terminal-control failure.
///
/// The `Display` text leads with the failing operation so the binary's
/// `tilde: {err}` diagnostic reads like a classic `perror` report.
#[derive(Debug, Error)]
pub enum TermError {
    /// `tcgetattr` failed — the terminal's attributes could not be read.
    #[error("tcgetattr: {0}")]
    TerminalQuery(#[source] io::Error),

    /// `tcsetattr` failed — raw mode could not be applied or restored.
    #[error("tcsetattr: {0}")]
    TerminalApply(#[source] io::Error),

    /// Both the driver size query and the cursor-position probe failed.
    #[error("get window size: {0}")]
    Geometry(#[source] io::Error),

    /// The cursor-position report did not match `ESC [ <row> ; <col> R`.
    #[error("malformed cursor position report")]
    ProtocolParse,

    /// A stdin read failed for a reason other than "no input yet".
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// A frame write to stdout failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TermError>;

// ─── Tests ───────────────────────────────────────────────────────────────────
