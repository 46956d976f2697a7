use crate::config::{LogLevel, SnoopConfig, DEFAULT_PORT};
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "dnsnoop")]
#[clap(version)]
#[clap(
    about = "Passive DNS traffic snooper",
    long_about = "dnsnoop listens on a capture device and prints, for every DNS message seen on the \
                  selected UDP port, the question, the server that answered it and the answer or \
                  status it returned."
)]
pub struct Cli {
    /// The port number to listen on ( Default is 53 )
    #[clap(short = 'p', long = "port")]
    port: Option<u16>,
    /// Log level ( Default is info )
    #[clap(short = 'l', long = "log-level", value_enum)]
    log_level: Option<LogLevel>,
    /// List all capture devices and exit
    #[clap(long = "list-devices")]
    list_devices: bool,
    /// Use the capture device at this index ( Default is 0 )
    #[clap(short = 'd', long = "device")]
    device: Option<usize>,
}

impl Cli {
    pub fn into_config(self) -> SnoopConfig {
        SnoopConfig::new(
            self.port.unwrap_or(DEFAULT_PORT),
            self.log_level.unwrap_or(LogLevel::Info),
            self.device.unwrap_or(0),
        )
    }

    pub fn list_devices(&self) -> bool {
        self.list_devices
    }
}
