use crate::sniffer::{self, device_ipv4, device_label};
use colored::Colorize;
use pcap::Device;
use std::{io, thread};
use tokio::sync::oneshot;

pub fn show_devices(devices: &[Device]) {
    for (index, device) in devices.iter().enumerate() {
        let addr = match device_ipv4(device) {
            Some(addr) => addr.to_string(),
            None => "N/a".to_string(),
        };
        println!("({}). {} ({})", index, device_label(device), addr);
    }
}

pub fn show_banner(device: &Device, port: u16) {
    println!("{}", env!("CARGO_PKG_NAME").red().bold());
    println!("{}", env!("CARGO_PKG_VERSION").bright_white());
    println!("{}", library_notice(&sniffer::capture_library_version()));
    println!(
        "{}",
        format!(
            "Listening on device {} for traffic on port {}",
            device_label(device),
            port
        )
        .green()
    );
}

fn library_notice(version: &str) -> String {
    format!("using {}", version)
}

pub fn show_headers() {
    println!("Press enter to stop");
    println!("query\tname\tserver IP\tresponse");
}

/// Blocks until the operator presses enter or sends Ctrl-C.
#[tokio::main(flavor = "current_thread")]
pub async fn wait_for_stop() -> io::Result<()> {
    let (tx, rx) = oneshot::channel();

    // A blocking stdin read cannot be cancelled, so it lives on a detached
    // thread instead of the runtime.
    thread::Builder::new()
        .name("STDIN".to_string())
        .spawn(move || {
            let mut buffer = String::new();
            let r = io::stdin().read_line(&mut buffer);
            let _ = tx.send(r);
        })?;

    tokio::select! {
        line = rx => {
            if let Ok(Err(error)) = line {
                log::warn!("Failed to read stdin: {}", error);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
        }
    }

    Ok(())
}
