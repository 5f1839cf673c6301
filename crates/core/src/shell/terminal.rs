//! Raw terminal device underneath a shell

use std::io;
use std::time::Duration;

use super::{Key, Size};

/// Event produced by a terminal device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(Key),
    Resize(Size),
    /// The input side is closed and no further events will arrive.
    Eof,
}

/// Keystroke source and output sink a [`TerminalShell`](super::TerminalShell) drives.
///
/// Key decoding and raw-mode handling live here; the shell only composes
/// lines, pages output and tracks buffer state.
pub trait Terminal: Send {
    /// Wait up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<TerminalEvent>>;

    /// Write text; `\n` means "start of next line".
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn size(&self) -> io::Result<Size>;

    /// Returns whether the device switched screens.
    fn enter_alternate_screen(&mut self) -> io::Result<bool>;

    /// Returns whether the device switched screens.
    fn leave_alternate_screen(&mut self) -> io::Result<bool>;

    fn clear(&mut self) -> io::Result<()>;
}
