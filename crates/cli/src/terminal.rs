//! Terminal device for input that is not an interactive terminal

use std::io::{self, BufRead, BufReader, Read, Stdout, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use shellkit_core::{Key, Size, Terminal, TerminalEvent};
use tracing::debug;

/// Lines from a reader turned into key events, output to stdout.
///
/// The reader runs on its own thread so reads stay pollable and therefore
/// cancellable. There is no alternate screen and clearing does nothing.
pub struct StdioTerminal {
    events: Receiver<TerminalEvent>,
    out: Stdout,
    size: Size,
}

impl StdioTerminal {
    pub fn new() -> Self {
        Self::from_reader(io::stdin())
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::sync_channel(1024);

        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => {
                        let _ = tx.send(TerminalEvent::Eof);
                        return;
                    }
                    Ok(_) => {
                        let keys = line
                            .trim_end_matches(['\r', '\n'])
                            .chars()
                            .map(Key::Char)
                            .chain([Key::Enter]);
                        for key in keys {
                            if tx.send(TerminalEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Self {
            events: rx,
            out: io::stdout(),
            size: size_from_env(),
        }
    }
}

impl Default for StdioTerminal {
    fn default() -> Self {
        Self::new()
    }
}

/// `COLUMNS` and `LINES` when both are set, otherwise 80x24.
fn size_from_env() -> Size {
    let read = |name: &str| std::env::var(name).ok()?.parse::<u16>().ok();
    match (read("COLUMNS"), read("LINES")) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Size::new(width, height),
        _ => Size::default(),
    }
}

impl Terminal for StdioTerminal {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<TerminalEvent>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Input reader finished");
                Ok(Some(TerminalEvent::Eof))
            }
        }
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn enter_alternate_screen(&mut self) -> io::Result<bool> {
        Ok(false)
    }

    fn leave_alternate_screen(&mut self) -> io::Result<bool> {
        Ok(false)
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}
