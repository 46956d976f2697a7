use crate::dns::{DnsMessage, Question, ResourceRecord};
use crate::parser::{DecodedPacket, Layer};
use hickory_proto::op::ResponseCode;
use std::net::Ipv4Addr;

/// A DNS message together with the IPv4 source it came from. Queries and
/// responses alike are reported; the QR flag is not inspected.
#[derive(Debug, Clone, Copy)]
pub struct DnsReply<'a> {
    message: &'a DnsMessage,
    server: Ipv4Addr,
}

impl<'a> DnsReply<'a> {
    pub fn new(message: &'a DnsMessage, server: Ipv4Addr) -> Self {
        DnsReply { message, server }
    }

    pub fn response_code(&self) -> ResponseCode {
        self.message.response_code
    }

    pub fn questions(&self) -> &'a [Question] {
        &self.message.questions
    }

    pub fn answers(&self) -> &'a [ResourceRecord] {
        &self.message.answers
    }

    pub fn message(&self) -> &'a DnsMessage {
        self.message
    }

    /// Source address of the IPv4 layer, i.e. the responding server.
    pub fn server(&self) -> Ipv4Addr {
        self.server
    }
}

/// Pulls the first DNS message and the first IPv4 header out of a decoded
/// frame. Either one missing means the frame is dropped.
pub fn extract(decoded: &DecodedPacket) -> Option<DnsReply<'_>> {
    let layers = decoded.get_layers();

    let message = layers.iter().find_map(|l| match l {
        Layer::Dns(message) => Some(message),
        _ => None,
    })?;

    let server = layers.iter().find_map(|l| match l {
        Layer::Ipv4(header) => Some(header.source_addr),
        _ => None,
    })?;

    Some(DnsReply::new(message, server))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn dns_without_ipv4_is_dropped() {
        let mut decoded = DecodedPacket::new(Utc::now());
        decoded.push(Layer::Dns(DnsMessage {
            id: 7,
            query: true,
            response_code: ResponseCode::NoError,
            question_count: 0,
            answer_count: 0,
            questions: vec![],
            answers: vec![],
        }));

        assert!(extract(&decoded).is_none());
    }

    #[test]
    fn nothing_decoded_means_nothing_extracted() {
        assert!(extract(&DecodedPacket::new(Utc::now())).is_none());
    }
}
