use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, Record};
use hickory_proto::ProtoError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Record types the formatter knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    WKS,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    OPT,
    ANY,
    Unknown(u16),
}

impl RecordType {
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::WKS => 11,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::SRV => 33,
            RecordType::OPT => 41,
            RecordType::ANY => 255,
            RecordType::Unknown(code) => *code,
        }
    }
}

impl From<u16> for RecordType {
    fn from(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            11 => RecordType::WKS,
            12 => RecordType::PTR,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            33 => RecordType::SRV,
            41 => RecordType::OPT,
            255 => RecordType::ANY,
            code => RecordType::Unknown(code),
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::SOA => write!(f, "SOA"),
            RecordType::WKS => write!(f, "WKS"),
            RecordType::PTR => write!(f, "PTR"),
            RecordType::MX => write!(f, "MX"),
            RecordType::TXT => write!(f, "TXT"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::SRV => write!(f, "SRV"),
            RecordType::OPT => write!(f, "OPT"),
            RecordType::ANY => write!(f, "ANY"),
            RecordType::Unknown(code) => write!(f, "TYPE{}", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub qtype: RecordType,
    pub qname: String,
    pub qclass: DNSClass,
}

/// Payload of an answer record. The variant is the record's type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    PTR(String),
    MX {
        preference: u16,
        exchange: String,
    },
    NS(String),
    SOA {
        master: String,
        mailbox: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    TXT(Vec<String>),
    /// Any other record type, kept by its wire code.
    Other { rtype: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub ttl: u32,
    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(name: &str, ttl: u32, data: RecordData) -> Self {
        ResourceRecord {
            name: name.to_string(),
            ttl,
            data,
        }
    }

    pub fn record_type(&self) -> RecordType {
        match &self.data {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::PTR(_) => RecordType::PTR,
            RecordData::MX { .. } => RecordType::MX,
            RecordData::NS(_) => RecordType::NS,
            RecordData::SOA { .. } => RecordType::SOA,
            RecordData::SRV { .. } => RecordType::SRV,
            RecordData::TXT(_) => RecordType::TXT,
            RecordData::Other { rtype } => RecordType::from(*rtype),
        }
    }
}

/// Owned view of one DNS message: header fields, questions and the answer
/// section. Authority and additional sections are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsMessage {
    pub id: u16,
    pub query: bool,
    pub response_code: ResponseCode,
    pub question_count: u16,
    pub answer_count: u16,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
}

impl DnsMessage {
    /// Parses a DNS message out of a UDP payload. Record types the decoder
    /// does not know are kept by code instead of failing the message.
    pub fn parse(payload: &[u8]) -> Result<DnsMessage, ProtoError> {
        let message = Message::from_vec(payload)?;
        Ok(DnsMessage::from(&message))
    }
}

impl From<&Message> for DnsMessage {
    fn from(message: &Message) -> Self {
        let questions: Vec<Question> = message
            .queries()
            .iter()
            .map(|q| Question {
                qtype: RecordType::from(u16::from(q.query_type())),
                qname: name_text(q.name()),
                qclass: q.query_class(),
            })
            .collect();

        let answers: Vec<ResourceRecord> = message
            .answers()
            .iter()
            .map(|record| ResourceRecord {
                name: name_text(record.name()),
                ttl: record.ttl(),
                data: record_data(record),
            })
            .collect();

        let header = message.header();
        DnsMessage {
            id: header.id(),
            query: header.message_type() == MessageType::Query,
            response_code: header.response_code(),
            question_count: header.query_count(),
            answer_count: header.answer_count(),
            questions,
            answers,
        }
    }
}

fn record_data(record: &Record) -> RecordData {
    match record.data() {
        RData::A(a) => RecordData::A(a.0),
        RData::AAAA(aaaa) => RecordData::AAAA(aaaa.0),
        RData::CNAME(cname) => RecordData::CNAME(name_text(&cname.0)),
        RData::PTR(ptr) => RecordData::PTR(name_text(&ptr.0)),
        RData::NS(ns) => RecordData::NS(name_text(&ns.0)),
        RData::MX(mx) => RecordData::MX {
            preference: mx.preference(),
            exchange: name_text(mx.exchange()),
        },
        RData::SOA(soa) => RecordData::SOA {
            master: name_text(soa.mname()),
            mailbox: name_text(soa.rname()),
            serial: soa.serial(),
            refresh: soa.refresh() as u32,
            retry: soa.retry() as u32,
            expire: soa.expire() as u32,
            minimum: soa.minimum(),
        },
        RData::SRV(srv) => RecordData::SRV {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: name_text(srv.target()),
        },
        RData::TXT(txt) => RecordData::TXT(
            txt.txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect(),
        ),
        _ => RecordData::Other {
            rtype: u16::from(record.record_type()),
        },
    }
}

/// Names are shown without the trailing root dot.
fn name_text(name: &Name) -> String {
    let text = name.to_utf8();
    match text.strip_suffix('.') {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => text,
    }
}

/// Multi-line dump used by verbose output.
impl Display for DnsMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            ";; id: {}, {}, status: {:?}, questions: {}, answers: {}",
            self.id,
            if self.query { "query" } else { "response" },
            self.response_code,
            self.question_count,
            self.answer_count
        )?;
        writeln!(f, ";; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{}\t{:?}\t{}", q.qname, q.qclass, q.qtype)?;
        }
        write!(f, ";; ANSWER SECTION:")?;
        for a in &self.answers {
            write!(f, "\n{}\t{}\t{}\t{:?}", a.name, a.ttl, a.record_type(), a.data)?;
        }
        Ok(())
    }
}
