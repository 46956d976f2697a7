use crate::config::LogLevel;
use crate::extractor;
use crate::filter;
use crate::formatter;
use crate::output::OutputSink;
use crate::parser::{self, RawPacket};

/// Runs one captured frame through decode, filter, extract and format and
/// hands the resulting lines to the sink. Holds no per-packet state.
pub struct Pipeline<S: OutputSink> {
    log_level: LogLevel,
    sink: S,
}

impl<S: OutputSink> Pipeline<S> {
    pub fn new(log_level: LogLevel, sink: S) -> Self {
        Pipeline { log_level, sink }
    }

    /// Returns the number of report lines emitted for `packet`.
    pub fn process(&mut self, packet: &RawPacket) -> usize {
        let decoded = parser::decode(packet);
        if !filter::is_of_interest(&decoded) {
            return 0;
        }

        let reply = match extractor::extract(&decoded) {
            Some(reply) => reply,
            None => return 0,
        };

        if self.log_level == LogLevel::Verbose {
            let dump = format!("{} {}", decoded.get_ts().to_rfc3339(), reply.message());
            self.emit(&dump);
        }

        let lines = formatter::format_reply(&reply);
        for line in &lines {
            self.emit(&line.to_string());
        }
        lines.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, text: &str) {
        if let Err(error) = self.sink.emit(text) {
            log::error!("Failed to write output: {}", error);
        }
    }
}
