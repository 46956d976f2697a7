use crate::dns::DnsMessage;
use chrono::{DateTime, TimeZone, Utc};
use pktparse::ethernet::{EtherType, EthernetFrame};
use pktparse::ip::IPProtocol;
use pktparse::ipv4::IPv4Header;
use pktparse::ipv6::IPv6Header;
use pktparse::tcp::TcpHeader;
use pktparse::udp::UdpHeader;
use pktparse::*;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Bytes of one captured frame and the time it arrived.
#[derive(Debug, Clone)]
pub struct RawPacket {
    pub data: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

impl RawPacket {
    pub fn new(data: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        RawPacket { data, timestamp }
    }

    /// Builds a packet from a capture header's seconds/microseconds pair.
    pub fn from_capture(data: &[u8], secs: i64, usecs: i64) -> Self {
        let nanos = (usecs.clamp(0, 999_999) * 1_000) as u32;
        let timestamp = Utc
            .timestamp_opt(secs, nanos)
            .single()
            .unwrap_or_else(Utc::now);
        RawPacket {
            data: data.to_owned(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Layer {
    Ethernet(EthernetFrame),
    Ipv4(IPv4Header),
    Ipv6(IPv6Header),
    Udp(UdpHeader),
    Tcp(TcpHeader),
    Dns(DnsMessage),
}

impl Display for Layer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Ethernet(_) => write!(f, "Ethernet"),
            Layer::Ipv4(_) => write!(f, "Ipv4"),
            Layer::Ipv6(_) => write!(f, "Ipv6"),
            Layer::Udp(_) => write!(f, "Udp"),
            Layer::Tcp(_) => write!(f, "Tcp"),
            Layer::Dns(_) => write!(f, "Dns"),
        }
    }
}

/// Layers of one frame, outermost first. Decoding stops at the first layer
/// that cannot be parsed, so the stack may be partial.
#[derive(Debug, Clone)]
pub struct DecodedPacket {
    timestamp: DateTime<Utc>,
    layers: Vec<Layer>,
}

impl DecodedPacket {
    pub fn new(timestamp: DateTime<Utc>) -> DecodedPacket {
        DecodedPacket {
            timestamp,
            layers: vec![],
        }
    }

    pub fn get_ts(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn get_layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
}

/// Decodes as many layers of `packet` as possible. Malformed or irrelevant
/// input only shortens the layer stack.
pub fn decode(packet: &RawPacket) -> DecodedPacket {
    let mut decoded = DecodedPacket::new(packet.timestamp);
    parse_link_layer(&packet.data, &mut decoded);
    decoded
}

fn parse_link_layer(content: &[u8], decoded: &mut DecodedPacket) {
    if let Ok((content, frame)) = ethernet::parse_ethernet_frame(content) {
        let network = Network::of(&frame.ethertype);
        decoded.push(Layer::Ethernet(frame));

        match network {
            Network::Ipv4 => parse_ipv4(content, decoded),
            Network::Ipv6 => parse_ipv6(content, decoded),
            Network::Other => {}
        }
    }
}

enum Network {
    Ipv4,
    Ipv6,
    Other,
}

impl Network {
    fn of(ethertype: &EtherType) -> Network {
        match ethertype {
            EtherType::IPv4 => Network::Ipv4,
            EtherType::IPv6 => Network::Ipv6,
            _ => Network::Other,
        }
    }
}

fn parse_ipv4(content: &[u8], decoded: &mut DecodedPacket) {
    if let Ok((content, ipv4_header)) = ipv4::parse_ipv4_header(content) {
        let transport = Transport::of(&ipv4_header.protocol);
        decoded.push(Layer::Ipv4(ipv4_header));
        parse_transport_layer(transport, content, decoded);
    }
}

fn parse_ipv6(content: &[u8], decoded: &mut DecodedPacket) {
    if let Ok((content, ipv6_header)) = ipv6::parse_ipv6_header(content) {
        let transport = Transport::of(&ipv6_header.next_header);
        decoded.push(Layer::Ipv6(ipv6_header));
        parse_transport_layer(transport, content, decoded);
    }
}

enum Transport {
    Udp,
    Tcp,
    Other,
}

impl Transport {
    fn of(protocol: &IPProtocol) -> Transport {
        match protocol {
            IPProtocol::UDP => Transport::Udp,
            IPProtocol::TCP => Transport::Tcp,
            _ => Transport::Other,
        }
    }
}

fn parse_transport_layer(transport: Transport, content: &[u8], decoded: &mut DecodedPacket) {
    match transport {
        Transport::Udp => parse_udp(content, decoded),
        Transport::Tcp => parse_tcp(content, decoded),
        Transport::Other => {}
    }
}

fn parse_tcp(content: &[u8], decoded: &mut DecodedPacket) {
    if let Ok((_content, tcp_header)) = tcp::parse_tcp_header(content) {
        decoded.push(Layer::Tcp(tcp_header));
    }
}

fn parse_udp(content: &[u8], decoded: &mut DecodedPacket) {
    if let Ok((content, udp_header)) = udp::parse_udp_header(content) {
        // Frames shorter than the link minimum arrive padded; trust the UDP
        // length field over the captured length when it is consistent.
        let payload_len = (udp_header.length as usize).saturating_sub(8);
        let payload = if payload_len <= content.len() {
            &content[..payload_len]
        } else {
            content
        };
        decoded.push(Layer::Udp(udp_header));
        parse_dns(payload, decoded);
    }
}

fn parse_dns(content: &[u8], decoded: &mut DecodedPacket) {
    match DnsMessage::parse(content) {
        Ok(message) => decoded.push(Layer::Dns(message)),
        Err(error) => log::trace!("no DNS message in UDP payload: {}", error),
    }
}
