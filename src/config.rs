use clap::ValueEnum;

pub const DEFAULT_PORT: u16 = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Info,
    Verbose,
}

impl LogLevel {
    /// Default `env_logger` filter for this level; `RUST_LOG` overrides it.
    pub fn default_filter(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Verbose => "debug",
        }
    }
}

/// Settings for one snooping session, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnoopConfig {
    pub port: u16,
    pub log_level: LogLevel,
    pub device: usize,
}

impl SnoopConfig {
    pub fn new(port: u16, log_level: LogLevel, device: usize) -> Self {
        SnoopConfig {
            port,
            log_level,
            device,
        }
    }

    /// Capture filter installed on the device.
    pub fn filter_expression(&self) -> String {
        format!("udp and port {}", self.port)
    }
}

impl Default for SnoopConfig {
    fn default() -> Self {
        SnoopConfig::new(DEFAULT_PORT, LogLevel::Info, 0)
    }
}
