pub mod cli;
pub mod config;
pub mod console;
pub mod dns;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod formatter;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod sniffer;

use crate::config::SnoopConfig;
use crate::error::CaptureError;
use crate::output::ConsoleSink;
use crate::pipeline::Pipeline;
use crate::sniffer::{CaptureStats, PcapSource};

/// Opens the configured device and reports DNS traffic until the operator
/// stops the session. Open failures are returned without retrying.
pub fn run(config: &SnoopConfig) -> Result<CaptureStats, CaptureError> {
    let device = sniffer::find_device(config.device)?;

    console::show_banner(&device, config.port);

    let source = PcapSource::open(device, &config.filter_expression())?;
    log::debug!("Capture filter: {}", config.filter_expression());

    let mut pipeline = Pipeline::new(config.log_level, ConsoleSink);

    console::show_headers();

    let subscription = sniffer::register(source, move |packet| {
        pipeline.process(&packet);
    })?;

    if let Err(error) = console::wait_for_stop() {
        log::warn!("Stopping after input error: {}", error);
    }

    Ok(subscription.stop())
}
