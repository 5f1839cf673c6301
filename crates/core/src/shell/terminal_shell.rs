use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::terminal::{Terminal, TerminalEvent};
use super::{BufferState, CancellationToken, Key, Prompt, Shell, Size};
use crate::config::Settings;
use crate::error::{Error, Result};

const DEFAULT_PAGER_PROMPT: &str = "--More--";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const ERASE_LINE: &str = "\r\x1b[2K";

enum PagerAction {
    Continue,
    Quit,
}

/// [`Shell`] implementation over any [`Terminal`] device.
pub struct TerminalShell<T: Terminal> {
    terminal: T,
    buffer: BufferState,
    interrupt: CancellationToken,
    pager_prompt: String,
    poll_interval: Duration,
    paging: bool,
    echo: bool,
}

impl<T: Terminal> TerminalShell<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            buffer: BufferState::Main,
            interrupt: CancellationToken::new(),
            pager_prompt: DEFAULT_PAGER_PROMPT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            paging: true,
            echo: true,
        }
    }

    /// Apply pager and polling settings.
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_pager_prompt(settings.pager_prompt.clone())
            .with_poll_interval(settings.read_poll_interval())
            .with_paging(settings.paging)
    }

    /// When disabled, paged writes are emitted without pausing.
    pub fn with_paging(mut self, enabled: bool) -> Self {
        self.paging = enabled;
        self
    }

    /// When disabled, reads show no prompt and do not echo what was typed.
    /// Meant for input that is not coming from a person at a keyboard.
    pub fn with_echo(mut self, enabled: bool) -> Self {
        self.echo = enabled;
        self
    }

    /// Text shown while paged output waits for a key.
    pub fn with_pager_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.pager_prompt = prompt.into();
        self
    }

    /// How often a blocked read checks its cancellation token.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.terminal.write_str(text)?;
        self.terminal.flush()?;
        Ok(())
    }

    fn show_prompt(&mut self, prompt: Option<&Prompt>) -> Result<()> {
        match prompt {
            Some(prompt) if !prompt.text().is_empty() => self.emit(prompt.text()),
            _ => Ok(()),
        }
    }

    /// Next event from the device, or `None` once `deadline` passes.
    fn next_event(&mut self, deadline: Option<Instant>) -> Result<Option<TerminalEvent>> {
        loop {
            if self.interrupt.take() {
                debug!("Blocked read cancelled");
                return Err(Error::InterruptedRead);
            }

            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    (deadline - now).min(self.poll_interval)
                }
                None => self.poll_interval,
            };

            if let Some(event) = self.terminal.poll_event(slice)? {
                return Ok(Some(event));
            }
        }
    }

    fn next_key(&mut self, deadline: Option<Instant>) -> Result<Option<Key>> {
        loop {
            match self.next_event(deadline)? {
                None => return Ok(None),
                Some(TerminalEvent::Key(Key::Ctrl('c'))) => {
                    debug!("Read interrupted by Ctrl-C");
                    return Err(Error::InterruptedRead);
                }
                Some(TerminalEvent::Key(key)) => return Ok(Some(key)),
                Some(TerminalEvent::Resize(size)) => {
                    trace!("Terminal resized to {}", size);
                }
                Some(TerminalEvent::Eof) => return Err(Error::EndOfInput),
            }
        }
    }

    fn blocking_key(&mut self) -> Result<Key> {
        loop {
            if let Some(key) = self.next_key(None)? {
                return Ok(key);
            }
        }
    }

    fn wait_for_pager(&mut self) -> Result<PagerAction> {
        self.begin_read();
        let prompt = self.pager_prompt.clone();
        self.emit(&prompt)?;
        let key = self.blocking_key();
        self.emit(ERASE_LINE)?;
        match key? {
            Key::Char('q') | Key::Escape => Ok(PagerAction::Quit),
            _ => Ok(PagerAction::Continue),
        }
    }

    fn write_paged(&mut self, msg: &str) -> Result<()> {
        let mut size = self.terminal.size()?;
        let mut rows_on_page = 0usize;

        for piece in msg.split_inclusive('\n') {
            let mut rest = piece;
            while !rest.is_empty() {
                if rows_on_page >= page_rows(size) {
                    match self.wait_for_pager()? {
                        PagerAction::Continue => {
                            rows_on_page = 0;
                            // The user may have resized while the pager waited
                            size = self.terminal.size()?;
                        }
                        PagerAction::Quit => {
                            debug!("Paged output discarded by user");
                            return Ok(());
                        }
                    }
                }

                let (row, tail) = split_row(rest, size.width);
                self.terminal.write_str(row)?;
                rows_on_page += 1;
                rest = tail;
            }
        }

        self.terminal.flush()?;
        Ok(())
    }

    /// Drop a cancellation nobody was waiting for.
    fn begin_read(&mut self) {
        if self.interrupt.take() {
            trace!("Discarded cancellation raised outside a read");
        }
    }
}

impl<T: Terminal> Shell for TerminalShell<T> {
    fn write(&mut self, msg: &str, paging: bool) -> Result<()> {
        if paging && self.paging {
            self.write_paged(msg)
        } else {
            self.emit(msg)
        }
    }

    fn read_line(&mut self, prompt: Option<&Prompt>) -> Result<String> {
        self.begin_read();
        if self.echo {
            self.show_prompt(prompt)?;
        }
        let mask = prompt.and_then(Prompt::mask);
        let mut line = String::new();

        loop {
            // The partial line is dropped on interrupt so nothing leaks into the next read
            match self.blocking_key()? {
                Key::Enter => {
                    if self.echo {
                        self.emit("\n")?;
                    }
                    return Ok(line);
                }
                Key::Ctrl('d') if line.is_empty() => return Err(Error::EndOfInput),
                Key::Backspace => {
                    if line.pop().is_some() && self.echo {
                        self.emit("\x08 \x08")?;
                    }
                }
                Key::Char(c) => {
                    line.push(c);
                    if self.echo {
                        let mut echo = [0u8; 4];
                        self.emit(mask.unwrap_or(c).encode_utf8(&mut echo))?;
                    }
                }
                _ => {}
            }
        }
    }

    fn read_key(&mut self, prompt: Option<&Prompt>) -> Result<Key> {
        self.begin_read();
        self.show_prompt(prompt)?;
        self.blocking_key()
    }

    fn read_key_timeout(&mut self, timeout: Duration) -> Result<Option<Key>> {
        self.begin_read();
        let deadline = Instant::now() + timeout;
        self.next_key(Some(deadline))
    }

    fn enable_alternate_buffer(&mut self) -> Result<bool> {
        if self.buffer == BufferState::Alternate {
            return Ok(false);
        }
        let switched = self.terminal.enter_alternate_screen()?;
        if switched {
            self.buffer = BufferState::Alternate;
        }
        Ok(switched)
    }

    fn enable_main_buffer(&mut self) -> Result<bool> {
        if self.buffer == BufferState::Main {
            return Ok(false);
        }
        let switched = self.terminal.leave_alternate_screen()?;
        if switched {
            self.buffer = BufferState::Main;
        }
        Ok(switched)
    }

    fn buffer(&self) -> BufferState {
        self.buffer
    }

    fn size(&self) -> Result<Size> {
        Ok(self.terminal.size()?)
    }

    fn clear(&mut self) -> Result<()> {
        self.terminal.clear()?;
        Ok(())
    }

    fn interrupt_handle(&self) -> CancellationToken {
        self.interrupt.clone()
    }
}

/// Rows available to output before the pager prompt takes the last one.
fn page_rows(size: Size) -> usize {
    usize::from(size.height.saturating_sub(1)).max(1)
}

/// Split off the first screen row of a single line soft-wrapped at `width`.
/// A newline that directly follows a full row stays on that row.
fn split_row(line: &str, width: u16) -> (&str, &str) {
    let width = usize::from(width.max(1));
    let end = line.char_indices().nth(width).map_or(line.len(), |(i, _)| i);
    match line.split_at(end) {
        (_, "\n") => (line, ""),
        split => split,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedTerminal;

    fn shell(size: Size) -> (TerminalShell<ScriptedTerminal>, ScriptedTerminal) {
        let terminal = ScriptedTerminal::new(size);
        let shell =
            TerminalShell::new(terminal.clone()).with_poll_interval(Duration::from_millis(1));
        (shell, terminal)
    }

    fn numbered(count: usize) -> String {
        (1..=count).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_split_row_wraps_at_width() {
        assert_eq!(split_row("\n", 10), ("\n", ""));
        assert_eq!(split_row("abc\n", 10), ("abc\n", ""));
        assert_eq!(split_row("0123456789\n", 10), ("0123456789\n", ""));
        assert_eq!(split_row("0123456789a\n", 10), ("0123456789", "a\n"));
        assert_eq!(split_row("abc", 0), ("a", "bc"));
        assert_eq!(split_row("ééé", 2), ("éé", "é"));
    }

    #[test]
    fn test_read_line_composes_and_echoes() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.push_text("helo").push_key(Key::Backspace).push_text("lo\n");

        let line = shell.read_line(Some(&Prompt::new("> "))).unwrap();
        assert_eq!(line, "hello");
        assert!(terminal.output().starts_with("> helo\x08 \x08lo"));
    }

    #[test]
    fn test_read_line_without_echo() {
        let (shell, terminal) = shell(Size::default());
        let mut shell = shell.with_echo(false);
        terminal.push_line("quiet");

        let line = shell.read_line(Some(&Prompt::new("$ "))).unwrap();
        assert_eq!(line, "quiet");
        assert_eq!(terminal.output(), "");
    }

    #[test]
    fn test_read_line_masks_input() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.push_line("secret");

        let prompt = Prompt::new("pw: ").with_mask('*');
        assert_eq!(shell.read_line(Some(&prompt)).unwrap(), "secret");
        assert_eq!(terminal.output(), "pw: ******\n");
    }

    #[test]
    fn test_interrupted_read_line_does_not_bleed() {
        let (mut shell, terminal) = shell(Size::default());
        terminal
            .push_text("partial")
            .push_key(Key::Ctrl('c'))
            .push_line("next");

        assert!(matches!(shell.read_line(None), Err(Error::InterruptedRead)));
        assert_eq!(shell.read_line(None).unwrap(), "next");
    }

    #[test]
    fn test_cancel_outside_a_read_is_dropped() {
        let (mut shell, terminal) = shell(Size::default());
        let token = shell.interrupt_handle();
        token.cancel();

        terminal.push_line("typed");
        assert_eq!(shell.read_line(None).unwrap(), "typed");
        assert!(!token.is_cancelled());

        token.cancel();
        terminal.push_key(Key::Char('k'));
        assert_eq!(shell.read_key(None).unwrap(), Key::Char('k'));
    }

    #[test]
    fn test_read_after_cancelled_read_continues() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.hold_open(true);
        let token = shell.interrupt_handle();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            token.cancel();
        });
        assert!(matches!(shell.read_line(None), Err(Error::InterruptedRead)));
        handle.join().unwrap();

        terminal.push_line("after");
        assert_eq!(shell.read_line(None).unwrap(), "after");
    }

    #[test]
    fn test_cancellation_from_another_thread() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.hold_open(true);
        let token = shell.interrupt_handle();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            token.cancel();
        });

        assert!(matches!(shell.read_key(None), Err(Error::InterruptedRead)));
        handle.join().unwrap();
    }

    #[test]
    fn test_ctrl_d_on_empty_line_is_end_of_input() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.push_key(Key::Ctrl('d'));
        assert!(matches!(shell.read_line(None), Err(Error::EndOfInput)));

        terminal.push_text("x").push_key(Key::Ctrl('d')).push_key(Key::Enter);
        assert_eq!(shell.read_line(None).unwrap(), "x");
    }

    #[test]
    fn test_exhausted_input_is_end_of_input() {
        let (mut shell, _terminal) = shell(Size::default());
        assert!(matches!(shell.read_key(None), Err(Error::EndOfInput)));
    }

    #[test]
    fn test_read_key_skips_resize_events() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.resize(Size::new(100, 40)).push_key(Key::Char('y'));

        assert_eq!(shell.read_key(Some(&Prompt::new("ok? "))).unwrap(), Key::Char('y'));
        assert_eq!(shell.size().unwrap(), Size::new(100, 40));
        assert_eq!(terminal.output(), "ok? ");
    }

    #[test]
    fn test_read_key_timeout_returns_none() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.hold_open(true);

        let started = Instant::now();
        let key = shell.read_key_timeout(Duration::from_millis(15)).unwrap();
        assert_eq!(key, None);
        assert!(started.elapsed() >= Duration::from_millis(15));

        terminal.push_key(Key::Tab);
        assert_eq!(
            shell.read_key_timeout(Duration::from_millis(15)).unwrap(),
            Some(Key::Tab)
        );
    }

    #[test]
    fn test_paging_pauses_at_terminal_height() {
        let (mut shell, terminal) = shell(Size::new(80, 5));
        terminal.push_key(Key::Char(' ')).push_key(Key::Char(' '));

        shell.write(&numbered(10), true).unwrap();

        let output = terminal.output();
        let first_page = output.split("--More--").next().unwrap();
        assert_eq!(first_page, numbered(4));
        assert_eq!(output.matches("--More--").count(), 2);
        assert!(output.contains("line 10\n"));
        assert_eq!(terminal.pending_events(), 0);
    }

    #[test]
    fn test_paging_counts_soft_wraps_within_one_line() {
        let (mut shell, terminal) = shell(Size::new(10, 5));
        for _ in 0..4 {
            terminal.push_key(Key::Char(' '));
        }

        // 20 rows at width 10, four rows per page
        shell.write(&"x".repeat(200), true).unwrap();

        let output = terminal.output();
        let first_page = output.split("--More--").next().unwrap();
        assert_eq!(first_page, "x".repeat(40));
        assert_eq!(output.matches("--More--").count(), 4);
        assert_eq!(output.matches('x').count(), 200);
        assert_eq!(terminal.pending_events(), 0);
    }

    #[test]
    fn test_paging_pauses_inside_a_tall_line() {
        let (mut shell, terminal) = shell(Size::new(10, 3));
        terminal.push_key(Key::Char('q'));

        shell.write(&format!("{}\nnext\n", "y".repeat(35)), true).unwrap();

        let output = terminal.output();
        assert_eq!(output.matches('y').count(), 20);
        assert!(!output.contains("next"));
    }

    #[test]
    fn test_paging_waits_for_acknowledgement() {
        let (mut shell, terminal) = shell(Size::new(80, 5));

        // No key queued: the pager blocks and sees the input close
        let result = shell.write(&numbered(10), true);
        assert!(matches!(result, Err(Error::EndOfInput)));
        assert!(!terminal.output().contains("line 5"));
    }

    #[test]
    fn test_paging_quit_discards_rest() {
        let (mut shell, terminal) = shell(Size::new(80, 5));
        terminal.push_key(Key::Char('q'));

        shell.write(&numbered(10), true).unwrap();
        let output = terminal.output();
        assert!(output.contains("line 4\n"));
        assert!(!output.contains("line 5"));
    }

    #[test]
    fn test_no_paging_never_pauses() {
        let (mut shell, terminal) = shell(Size::new(80, 5));
        shell.write(&numbered(100), false).unwrap();

        let output = terminal.output();
        assert!(!output.contains("--More--"));
        assert_eq!(output, numbered(100));
    }

    #[test]
    fn test_paging_disabled_by_settings() {
        let terminal = ScriptedTerminal::new(Size::new(80, 5));
        let settings = Settings {
            paging: false,
            ..Default::default()
        };
        let mut shell = TerminalShell::new(terminal.clone()).with_settings(&settings);

        shell.write(&numbered(20), true).unwrap();
        assert_eq!(terminal.output(), numbered(20));
    }

    #[test]
    fn test_custom_pager_prompt() {
        let (shell, terminal) = shell(Size::new(80, 3));
        let mut shell = shell.with_pager_prompt("[more]");
        terminal.push_key(Key::Enter);

        shell.write(&numbered(3), true).unwrap();
        assert!(terminal.output().contains("[more]"));
    }

    #[test]
    fn test_buffer_toggle_round_trip() {
        let (mut shell, terminal) = shell(Size::default());
        assert_eq!(shell.buffer(), BufferState::Main);
        assert!(!shell.enable_main_buffer().unwrap());

        assert!(shell.enable_alternate_buffer().unwrap());
        assert_eq!(shell.buffer(), BufferState::Alternate);
        assert!(terminal.is_alternate());
        assert!(!shell.enable_alternate_buffer().unwrap());

        terminal.resize(Size::new(120, 50));
        assert_eq!(shell.size().unwrap(), Size::new(120, 50));

        assert!(shell.enable_main_buffer().unwrap());
        assert_eq!(shell.buffer(), BufferState::Main);
        assert!(!terminal.is_alternate());

        terminal.resize(Size::new(60, 20));
        assert_eq!(shell.size().unwrap(), Size::new(60, 20));
    }

    #[test]
    fn test_unsupported_alternate_buffer() {
        let (mut shell, terminal) = shell(Size::default());
        terminal.set_alternate_supported(false);

        assert!(!shell.enable_alternate_buffer().unwrap());
        assert_eq!(shell.buffer(), BufferState::Main);
    }

    #[test]
    fn test_write_char() {
        let (mut shell, terminal) = shell(Size::default());
        for c in ['a', 'é', '\n'] {
            shell.write_char(c, false).unwrap();
        }
        assert_eq!(terminal.output(), "aé\n");
    }

    #[test]
    fn test_clear() {
        let (mut shell, terminal) = shell(Size::default());
        shell.writeln("hello", false).unwrap();
        shell.clear().unwrap();
        assert_eq!(terminal.clear_count(), 1);
        assert_eq!(terminal.output(), "");
    }
}
