//! Terminal device backed by crossterm

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use super::terminal::{Terminal, TerminalEvent};
use super::{Key, Size};

/// The process's controlling terminal, in raw mode for as long as this value lives.
///
/// Dropping the value returns to the main screen if the alternate screen is
/// still active, then restores cooked mode.
pub struct CrosstermTerminal<W: Write + Send = Stdout> {
    out: W,
    raw: bool,
    alternate: bool,
}

impl CrosstermTerminal {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self {
            out: io::stdout(),
            raw: true,
            alternate: false,
        })
    }
}

impl<W: Write + Send> CrosstermTerminal<W> {
    /// Escape sequences go to `out`; raw mode is left untouched.
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            raw: false,
            alternate: false,
        }
    }
}

impl<W: Write + Send> Drop for CrosstermTerminal<W> {
    fn drop(&mut self) {
        if self.alternate {
            let _ = execute!(self.out, LeaveAlternateScreen);
        }
        let _ = self.out.flush();
        if self.raw {
            let _ = disable_raw_mode();
        }
    }
}

impl<W: Write + Send> Terminal for CrosstermTerminal<W> {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<TerminalEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = match event::read()? {
            // Windows reports both press and release for each keystroke
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                map_key(key).map(TerminalEvent::Key)
            }
            Event::Resize(width, height) => Some(TerminalEvent::Resize(Size::new(width, height))),
            _ => None,
        };
        Ok(event)
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        // Raw mode does not translate LF to CRLF
        let text = text.replace('\n', "\r\n");
        self.out.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn size(&self) -> io::Result<Size> {
        let (width, height) = terminal::size()?;
        Ok(Size::new(width, height))
    }

    fn enter_alternate_screen(&mut self) -> io::Result<bool> {
        execute!(self.out, EnterAlternateScreen)?;
        self.alternate = true;
        Ok(true)
    }

    fn leave_alternate_screen(&mut self) -> io::Result<bool> {
        execute!(self.out, LeaveAlternateScreen)?;
        self.alternate = false;
        Ok(true)
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }
}

fn map_key(event: KeyEvent) -> Option<Key> {
    let key = match event.code {
        KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Ctrl(c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    const LEAVE_ALTERNATE: &str = "\x1b[?1049l";

    #[derive(Clone, Default)]
    struct SharedOutput(Arc<Mutex<Vec<u8>>>);

    impl SharedOutput {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_drop_leaves_alternate_screen() {
        let output = SharedOutput::default();
        let mut terminal = CrosstermTerminal::with_writer(output.clone());
        assert!(terminal.enter_alternate_screen().unwrap());
        assert!(!output.text().contains(LEAVE_ALTERNATE));

        drop(terminal);
        assert!(output.text().ends_with(LEAVE_ALTERNATE));
    }

    #[test]
    fn test_drop_on_main_screen_writes_nothing() {
        let output = SharedOutput::default();
        let mut terminal = CrosstermTerminal::with_writer(output.clone());
        terminal.enter_alternate_screen().unwrap();
        terminal.leave_alternate_screen().unwrap();
        let before = output.text();

        drop(terminal);
        assert_eq!(output.text(), before);
        assert_eq!(before.matches(LEAVE_ALTERNATE).count(), 1);
    }

    #[test]
    fn test_map_control_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('C'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(Key::Ctrl('c')));

        let plain = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(map_key(plain), Some(Key::Char('x')));

        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(map_key(enter), Some(Key::Enter));

        let insert = KeyEvent::new(KeyCode::Insert, KeyModifiers::NONE);
        assert_eq!(map_key(insert), None);
    }
}
