//! Line-oriented sink for user-facing messages.

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

use log::warn;

/// Writes one message per line to the shell's standard output.
pub struct Console {
    out: Box<dyn Write>,
}

impl Console {
    /// Wraps an arbitrary writer.
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    /// Console writing to the process standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Writes `text` followed by a newline and flushes.
    ///
    /// Write failures are logged and otherwise ignored; output problems never abort a command.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let result = writeln!(self.out, "{}", text.as_ref()).and_then(|()| self.out.flush());
        if let Err(err) = result {
            warn!("failed to write shell output: {err}");
        }
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory writer whose contents stay readable after it is handed to a [`Console`].
pub struct MemoryOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl MemoryOutput {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Console writing into a clone of this buffer.
    pub fn console(&self) -> Console {
        Console::new(Box::new(self.clone()))
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    /// Returns everything written so far and clears the buffer.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.buffer.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_land_in_shared_buffer() {
        let output = MemoryOutput::new();
        let mut console = output.console();
        console.line("first");
        console.line(String::from("second"));
        assert_eq!(output.take(), "first\nsecond\n");
        assert_eq!(output.contents(), "");
    }
}
