//! Interactive terminal I/O
//!
//! [`Shell`] is the contract every command talks to through its invocation
//! context. [`TerminalShell`] implements it on top of a raw [`Terminal`]
//! device, which is either the real terminal ([`CrosstermTerminal`]) or an
//! in-memory script ([`ScriptedTerminal`]).
//!
//! Reads are the only blocking operations. Their signatures carry the two
//! non-normal outcomes: `Err(Error::InterruptedRead)` when the read was
//! cancelled and `Ok(None)` when a timed read saw no input.

pub mod capture;
pub mod crossterm_terminal;
pub mod scripted;
pub mod terminal;
mod terminal_shell;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::Result;

pub use capture::CaptureShell;
pub use crossterm_terminal::CrosstermTerminal;
pub use scripted::ScriptedTerminal;
pub use terminal::{Terminal, TerminalEvent};
pub use terminal_shell::TerminalShell;

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

/// Which screen buffer the terminal is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    #[default]
    Main,
    Alternate,
}

/// Text shown before a read, optionally masking what the user types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    text: String,
    mask: Option<char>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mask: None,
        }
    }

    /// Echo `mask` instead of the typed characters.
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mask(&self) -> Option<char> {
        self.mask
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::new(text)
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::new(text)
    }
}

/// Cancellation signal for blocked reads.
///
/// Clones share the same flag, so a signal handler or another thread can
/// abort a read that is blocked inside the shell. Only a read in progress
/// observes the flag: each read clears it when it starts, and the read it
/// interrupts consumes it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Interactive character/line device used by running commands.
pub trait Shell: Send {
    /// Emit text. With `paging`, output taller than the terminal pauses until
    /// the user presses a key.
    fn write(&mut self, msg: &str, paging: bool) -> Result<()>;

    /// Emit a single character.
    fn write_char(&mut self, c: char, paging: bool) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write(c.encode_utf8(&mut buf), paging)
    }

    /// Emit text followed by a newline.
    fn writeln(&mut self, msg: &str, paging: bool) -> Result<()> {
        let mut line = String::with_capacity(msg.len() + 1);
        line.push_str(msg);
        line.push('\n');
        self.write(&line, paging)
    }

    /// Block until the user finishes a line with Enter.
    fn read_line(&mut self, prompt: Option<&Prompt>) -> Result<String>;

    /// Block until exactly one key is pressed.
    fn read_key(&mut self, prompt: Option<&Prompt>) -> Result<Key>;

    /// Wait up to `timeout` for one key; `Ok(None)` when nothing arrived.
    fn read_key_timeout(&mut self, timeout: Duration) -> Result<Option<Key>>;

    /// Switch to the alternate screen; false if already there or unsupported.
    fn enable_alternate_buffer(&mut self) -> Result<bool>;

    /// Switch back to the main screen; false if already there or unsupported.
    fn enable_main_buffer(&mut self) -> Result<bool>;

    fn buffer(&self) -> BufferState;

    /// Current terminal dimensions, queried live.
    fn size(&self) -> Result<Size>;

    fn clear(&mut self) -> Result<()>;

    /// Token that aborts the read currently blocked in this shell.
    fn interrupt_handle(&self) -> CancellationToken;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_is_shared_and_consumed() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.take());
        assert!(!clone.is_cancelled());
        assert!(!token.take());
    }

    #[test]
    fn test_prompt_mask() {
        let prompt = Prompt::new("password: ").with_mask('*');
        assert_eq!(prompt.text(), "password: ");
        assert_eq!(prompt.mask(), Some('*'));
        assert_eq!(Prompt::from("> ").mask(), None);
    }
}
