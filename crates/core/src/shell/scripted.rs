//! In-memory terminal driven by a scripted event queue
//!
//! Clones share state, so a test keeps one handle to feed keys and inspect
//! output while the shell owns the other.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::terminal::{Terminal, TerminalEvent};
use super::{Key, Size};

#[derive(Debug)]
struct State {
    events: VecDeque<TerminalEvent>,
    output: String,
    size: Size,
    alternate_supported: bool,
    alternate: bool,
    hold_open: bool,
    clears: usize,
}

#[derive(Debug, Clone)]
pub struct ScriptedTerminal {
    state: Arc<Mutex<State>>,
}

impl ScriptedTerminal {
    pub fn new(size: Size) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                events: VecDeque::new(),
                output: String::new(),
                size,
                alternate_supported: true,
                alternate: false,
                hold_open: false,
                clears: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_event(&self, event: TerminalEvent) -> &Self {
        self.state().events.push_back(event);
        self
    }

    pub fn push_key(&self, key: Key) -> &Self {
        self.push_event(TerminalEvent::Key(key))
    }

    /// Queue typed text; `\n` becomes [`Key::Enter`].
    pub fn push_text(&self, text: &str) -> &Self {
        let mut state = self.state();
        for c in text.chars() {
            let key = match c {
                '\n' => Key::Enter,
                '\t' => Key::Tab,
                c => Key::Char(c),
            };
            state.events.push_back(TerminalEvent::Key(key));
        }
        drop(state);
        self
    }

    /// Queue a full line followed by Enter.
    pub fn push_line(&self, line: &str) -> &Self {
        self.push_text(line).push_key(Key::Enter)
    }

    /// Change the reported size and queue the matching resize event.
    pub fn resize(&self, size: Size) -> &Self {
        let mut state = self.state();
        state.size = size;
        state.events.push_back(TerminalEvent::Resize(size));
        drop(state);
        self
    }

    /// Keep waiting instead of reporting end of input once the queue is empty.
    pub fn hold_open(&self, hold: bool) -> &Self {
        self.state().hold_open = hold;
        self
    }

    pub fn set_alternate_supported(&self, supported: bool) -> &Self {
        self.state().alternate_supported = supported;
        self
    }

    pub fn output(&self) -> String {
        self.state().output.clone()
    }

    pub fn take_output(&self) -> String {
        std::mem::take(&mut self.state().output)
    }

    pub fn pending_events(&self) -> usize {
        self.state().events.len()
    }

    pub fn clear_count(&self) -> usize {
        self.state().clears
    }

    pub fn is_alternate(&self) -> bool {
        self.state().alternate
    }
}

impl Default for ScriptedTerminal {
    fn default() -> Self {
        Self::new(Size::default())
    }
}

impl Terminal for ScriptedTerminal {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<TerminalEvent>> {
        let mut state = self.state();
        if let Some(event) = state.events.pop_front() {
            return Ok(Some(event));
        }
        if !state.hold_open {
            return Ok(Some(TerminalEvent::Eof));
        }
        drop(state);
        std::thread::sleep(timeout);
        Ok(None)
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.state().output.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn size(&self) -> io::Result<Size> {
        Ok(self.state().size)
    }

    fn enter_alternate_screen(&mut self) -> io::Result<bool> {
        let mut state = self.state();
        if !state.alternate_supported {
            return Ok(false);
        }
        state.alternate = true;
        Ok(true)
    }

    fn leave_alternate_screen(&mut self) -> io::Result<bool> {
        let mut state = self.state();
        if !state.alternate_supported {
            return Ok(false);
        }
        state.alternate = false;
        Ok(true)
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.clears += 1;
        state.output.clear();
        Ok(())
    }
}
