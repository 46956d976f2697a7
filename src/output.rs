use std::io;
use std::io::Write;

/// Destination for report lines.
pub trait OutputSink {
    fn emit(&mut self, text: &str) -> io::Result<()>;
}

/// Writes each line to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", text)?;
        handle.flush()
    }
}

impl OutputSink for Vec<String> {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        (**self).emit(text)
    }
}
