use crate::dns::RecordType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported record type: {0}")]
    UnsupportedRecordType(RecordType),

    #[error("Unrecognized record type: {0}")]
    UnrecognizedRecordType(RecordType),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture device error: {0}")]
    Pcap(#[from] pcap::Error),

    #[error("No capture device at index {0}")]
    NoSuchDevice(usize),

    #[error("Failed to start capture thread: {0}")]
    Thread(#[from] std::io::Error),
}
