use crate::parser::{DecodedPacket, Layer};

/// True when the frame carries both an IPv4 and a UDP layer. Port matching
/// is left to the capture filter installed on the device.
pub fn is_of_interest(decoded: &DecodedPacket) -> bool {
    let layers = decoded.get_layers();
    let has_udp = layers.iter().any(|l| matches!(l, Layer::Udp(_)));
    let has_ipv4 = layers.iter().any(|l| matches!(l, Layer::Ipv4(_)));
    has_udp && has_ipv4
}
