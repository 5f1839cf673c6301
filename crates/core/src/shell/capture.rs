//! Shell wrapper that captures output for piping

use std::time::Duration;

use super::{BufferState, CancellationToken, Key, Prompt, Shell, Size};
use crate::error::Result;

/// Collects everything written instead of sending it to the terminal.
///
/// Reads, size and buffer state still go to the wrapped shell, so a command
/// on the left of `|` can still ask the user questions.
pub struct CaptureShell<'a> {
    inner: &'a mut dyn Shell,
    captured: String,
}

impl<'a> CaptureShell<'a> {
    pub fn new(inner: &'a mut dyn Shell) -> Self {
        Self {
            inner,
            captured: String::new(),
        }
    }

    pub fn captured(&self) -> &str {
        &self.captured
    }

    pub fn into_output(self) -> String {
        self.captured
    }
}

impl Shell for CaptureShell<'_> {
    fn write(&mut self, msg: &str, _paging: bool) -> Result<()> {
        self.captured.push_str(msg);
        Ok(())
    }

    fn read_line(&mut self, prompt: Option<&Prompt>) -> Result<String> {
        self.inner.read_line(prompt)
    }

    fn read_key(&mut self, prompt: Option<&Prompt>) -> Result<Key> {
        self.inner.read_key(prompt)
    }

    fn read_key_timeout(&mut self, timeout: Duration) -> Result<Option<Key>> {
        self.inner.read_key_timeout(timeout)
    }

    fn enable_alternate_buffer(&mut self) -> Result<bool> {
        self.inner.enable_alternate_buffer()
    }

    fn enable_main_buffer(&mut self) -> Result<bool> {
        self.inner.enable_main_buffer()
    }

    fn buffer(&self) -> BufferState {
        self.inner.buffer()
    }

    fn size(&self) -> Result<Size> {
        self.inner.size()
    }

    fn clear(&mut self) -> Result<()> {
        self.captured.clear();
        Ok(())
    }

    fn interrupt_handle(&self) -> CancellationToken {
        self.inner.interrupt_handle()
    }
}
