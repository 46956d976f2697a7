use crate::error::CaptureError;
use crate::parser::RawPacket;
use pcap::Error::TimeoutExpired;
use pcap::{Active, Capture, Device};
use std::ffi::CStr;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::os::raw::c_char;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

const READ_TIMEOUT_MS: i32 = 1000;

/// Packets seen by the capture device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub received: u32,
    pub dropped: u32,
    pub if_dropped: u32,
}

impl Display for CaptureStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Pcap statistics] received: {}, dropped: {}, interface dropped: {}",
            self.received, self.dropped, self.if_dropped
        )
    }
}

/// A pull-based frame producer driven by the delivery thread.
pub trait FrameSource: Send + 'static {
    /// `Ok(None)` means nothing arrived before the read timeout.
    fn next_frame(&mut self) -> Result<Option<RawPacket>, CaptureError>;

    fn stats(&mut self) -> Result<CaptureStats, CaptureError>;
}

pub struct PcapSource {
    cap_handle: Capture<Active>,
}

impl PcapSource {
    /// Opens `device` and installs a `udp and port {port}` filter.
    pub fn open(device: Device, filter: &str) -> Result<PcapSource, CaptureError> {
        let mut cap_handle = Capture::from_device(device)?
            .promisc(true)
            .immediate_mode(true)
            .timeout(READ_TIMEOUT_MS)
            .open()?;

        cap_handle.filter(filter, true)?;

        Ok(PcapSource { cap_handle })
    }
}

impl FrameSource for PcapSource {
    fn next_frame(&mut self) -> Result<Option<RawPacket>, CaptureError> {
        match self.cap_handle.next_packet() {
            Ok(packet) => Ok(Some(RawPacket::from_capture(
                packet.data,
                packet.header.ts.tv_sec as i64,
                packet.header.ts.tv_usec as i64,
            ))),
            Err(TimeoutExpired) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn stats(&mut self) -> Result<CaptureStats, CaptureError> {
        let stat = self.cap_handle.stats()?;
        Ok(CaptureStats {
            received: stat.received,
            dropped: stat.dropped,
            if_dropped: stat.if_dropped,
        })
    }
}

/// Handle on a running delivery thread.
pub struct Subscription {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<CaptureStats>>,
}

impl Subscription {
    /// Stops further delivery. Safe to call any number of times.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Cancels, waits for the delivery thread and returns the device
    /// statistics. Never fails; missing statistics read as zero.
    pub fn stop(mut self) -> CaptureStats {
        self.cancel();
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(stats)) => stats,
            Some(Err(_)) => {
                log::error!("Capture thread panicked");
                CaptureStats::default()
            }
            None => CaptureStats::default(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Starts delivering frames from `source` to `handler` on a dedicated
/// thread, one at a time and in arrival order.
pub fn register<S, F>(mut source: S, mut handler: F) -> Result<Subscription, CaptureError>
where
    S: FrameSource,
    F: FnMut(RawPacket) + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = Arc::clone(&stop);

    let handle = thread::Builder::new()
        .name("CAPTURE".to_string())
        .spawn(move || {
            while !stop_clone.load(Ordering::SeqCst) {
                let packet = match source.next_frame() {
                    Ok(Some(packet)) => packet,
                    Ok(None) => continue,
                    Err(error) => {
                        log::error!("Capture stopped: {}", error);
                        break;
                    }
                };

                if stop_clone.load(Ordering::SeqCst) {
                    break;
                }
                handler(packet);
            }

            match source.stats() {
                Ok(stats) => stats,
                Err(error) => {
                    log::warn!("Capture statistics unavailable: {}", error);
                    CaptureStats::default()
                }
            }
        })?;

    Ok(Subscription {
        stop,
        handle: Some(handle),
    })
}

pub fn list_devices() -> Result<Vec<Device>, CaptureError> {
    Ok(Device::list()?)
}

pub fn find_device(index: usize) -> Result<Device, CaptureError> {
    list_devices()?
        .into_iter()
        .nth(index)
        .ok_or(CaptureError::NoSuchDevice(index))
}

extern "C" {
    fn pcap_lib_version() -> *const c_char;
}

/// Version banner of the linked libpcap, e.g. "libpcap version 1.10.4".
pub fn capture_library_version() -> String {
    // SAFETY: libpcap hands back a static NUL-terminated string.
    let raw = unsafe { pcap_lib_version() };
    if raw.is_null() {
        return "libpcap".to_string();
    }
    unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

pub fn device_label(device: &Device) -> &str {
    device.desc.as_deref().unwrap_or(&device.name)
}

pub fn device_ipv4(device: &Device) -> Option<IpAddr> {
    device
        .addresses
        .iter()
        .map(|a| a.addr)
        .find(|addr| addr.is_ipv4())
}
