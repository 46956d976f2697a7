use crate::dns::{RecordData, RecordType, ResourceRecord};
use crate::error::FormatError;
use crate::extractor::DnsReply;
use hickory_proto::op::ResponseCode;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// One report line per question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub query_type: RecordType,
    pub query_name: String,
    pub server: Ipv4Addr,
    pub answer: String,
}

impl Display for FormattedLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.query_type, self.query_name, self.server, self.answer
        )
    }
}

pub fn format_reply(reply: &DnsReply) -> Vec<FormattedLine> {
    let answer = render_answer_field(reply);

    reply
        .questions()
        .iter()
        .map(|q| FormattedLine {
            query_type: q.qtype,
            query_name: q.qname.clone(),
            server: reply.server(),
            answer: answer.clone(),
        })
        .collect()
}

/// The answers joined with ", ", or the response code when there are none.
/// Records that cannot be rendered are replaced by a marker so the rest of
/// the line survives.
pub fn render_answer_field(reply: &DnsReply) -> String {
    let answers = reply.answers();
    if answers.is_empty() {
        return render_response_code(reply.response_code()).to_string();
    }

    answers
        .iter()
        .map(|a| match render_record(a) {
            Ok(rendered) => rendered,
            Err(error) => {
                log::warn!("{} for {} from {}", error, a.name, reply.server());
                fallback_marker(&error)
            }
        })
        .collect::<Vec<String>>()
        .join(", ")
}

pub fn render_record(record: &ResourceRecord) -> Result<String, FormatError> {
    let value = match &record.data {
        RecordData::A(addr) => addr.to_string(),
        RecordData::AAAA(addr) => addr.to_string(),
        RecordData::CNAME(name) => name.clone(),
        RecordData::PTR(name) => name.clone(),
        RecordData::MX {
            preference,
            exchange,
        } => format!("{} {}", exchange, preference),
        RecordData::NS(name) => name.clone(),
        RecordData::SOA { master, .. } => master.clone(),
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => format!("{} {} {} {}", priority, weight, port, target),
        RecordData::TXT(strings) => {
            let (key, value) = txt_attribute(strings);
            format!("{}:{}", key, value)
        }
        RecordData::Other { rtype, .. } => {
            return Err(match RecordType::from(*rtype) {
                t @ (RecordType::OPT | RecordType::ANY | RecordType::WKS) => {
                    FormatError::UnsupportedRecordType(t)
                }
                t => FormatError::UnrecognizedRecordType(t),
            })
        }
    };

    Ok(format!("{}: {}", record.record_type(), value))
}

// SERVFAIL and NXDOMAIN keep their traditional mnemonics; the other codes
// are spelled out.
pub fn render_response_code(code: ResponseCode) -> &'static str {
    match code {
        ResponseCode::NoError => "NOERROR",
        ResponseCode::FormErr => "FORMATERROR",
        ResponseCode::ServFail => "SERVFAIL",
        ResponseCode::NXDomain => "NXDOMAIN",
        ResponseCode::NotImp => "NOTIMPLEMENTED",
        ResponseCode::Refused => "REFUSED",
        _ => "RESERVED",
    }
}

fn fallback_marker(error: &FormatError) -> String {
    match error {
        FormatError::UnsupportedRecordType(t) => format!("<unsupported:{}>", t),
        FormatError::UnrecognizedRecordType(t) => format!("<unrecognized:{}>", t),
    }
}

/// Splits TXT data into an RFC 1464 attribute. The key ends at the first
/// '=' not escaped by a backtick; without one the whole text is the key.
/// Unescaped whitespace around the key is dropped.
fn txt_attribute(strings: &[String]) -> (String, String) {
    let text = strings.concat();
    let mut key = String::new();
    // key bytes up to the last escaped char survive trimming
    let mut kept = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '`' if chars.peek().map_or(false, |&n| is_escapable(n)) => {
                if let Some(escaped) = chars.next() {
                    key.push(escaped);
                    kept = key.len();
                }
            }
            '=' => return (trim_key(key, kept), chars.collect()),
            c if c.is_whitespace() && key.is_empty() => {}
            c => key.push(c),
        }
    }

    (trim_key(key, kept), String::new())
}

fn is_escapable(c: char) -> bool {
    c == '`' || c == '=' || c.is_whitespace()
}

fn trim_key(mut key: String, kept: usize) -> String {
    let end = kept + key[kept..].trim_end().len();
    key.truncate(end);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{DnsMessage, Question};
    use hickory_proto::rr::DNSClass;

    fn record(data: RecordData) -> ResourceRecord {
        ResourceRecord::new("example.com.", 300, data)
    }

    fn message(code: ResponseCode, answers: Vec<ResourceRecord>) -> DnsMessage {
        DnsMessage {
            id: 1,
            query: false,
            response_code: code,
            question_count: 1,
            answer_count: answers.len() as u16,
            questions: vec![Question {
                qtype: RecordType::A,
                qname: "example.com".to_string(),
                qclass: DNSClass::IN,
            }],
            answers,
        }
    }

    const SERVER: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

    #[test]
    fn renders_addresses() {
        assert_eq!(
            render_record(&record(RecordData::A(Ipv4Addr::new(93, 184, 216, 34)))).unwrap(),
            "A: 93.184.216.34"
        );
        assert_eq!(
            render_record(&record(RecordData::AAAA("2606:2800:220:1::1".parse().unwrap())))
                .unwrap(),
            "AAAA: 2606:2800:220:1::1"
        );
    }

    #[test]
    fn renders_mx_exchange_before_preference() {
        let mx = record(RecordData::MX {
            preference: 10,
            exchange: "mail.example.com.".to_string(),
        });
        assert_eq!(render_record(&mx).unwrap(), "MX: mail.example.com. 10");
    }

    #[test]
    fn renders_srv() {
        let srv = record(RecordData::SRV {
            priority: 10,
            weight: 20,
            port: 5060,
            target: "sip.example.com.".to_string(),
        });
        assert_eq!(render_record(&srv).unwrap(), "SRV: 10 20 5060 sip.example.com.");
    }

    #[test]
    fn renders_names() {
        let cases = [
            (RecordData::CNAME("alias.example.com".into()), "CNAME: alias.example.com"),
            (RecordData::PTR("host.example.com".into()), "PTR: host.example.com"),
            (RecordData::NS("ns1.example.com".into()), "NS: ns1.example.com"),
        ];
        for (data, expected) in cases {
            assert_eq!(render_record(&record(data)).unwrap(), expected);
        }
    }

    #[test]
    fn renders_soa_master_only() {
        let soa = record(RecordData::SOA {
            master: "ns.icann.org".to_string(),
            mailbox: "noc.dns.icann.org".to_string(),
            serial: 2024010101,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 3600,
        });
        assert_eq!(render_record(&soa).unwrap(), "SOA: ns.icann.org");
    }

    #[test]
    fn renders_txt_attributes() {
        let txt = |parts: &[&str]| {
            record(RecordData::TXT(parts.iter().map(|s| s.to_string()).collect()))
        };

        assert_eq!(
            render_record(&txt(&["v=spf1 -all"])).unwrap(),
            "TXT: v:spf1 -all"
        );
        assert_eq!(render_record(&txt(&["hello"])).unwrap(), "TXT: hello:");
        assert_eq!(render_record(&txt(&["a`=b=c"])).unwrap(), "TXT: a=b:c");
        assert_eq!(render_record(&txt(&["key=", "value"])).unwrap(), "TXT: key:value");
    }

    #[test]
    fn txt_key_drops_unescaped_whitespace() {
        let txt = |text: &str| record(RecordData::TXT(vec![text.to_string()]));

        assert_eq!(render_record(&txt("color = blue")).unwrap(), "TXT: color: blue");
        assert_eq!(render_record(&txt("  name\t=x")).unwrap(), "TXT: name:x");
        assert_eq!(render_record(&txt("key` =v")).unwrap(), "TXT: key :v");
        assert_eq!(render_record(&txt("`` tick=v")).unwrap(), "TXT: ` tick:v");
        assert_eq!(render_record(&txt("a`b=c")).unwrap(), "TXT: a`b:c");
    }

    #[test]
    fn rejects_unsupported_and_unknown_types() {
        for (code, rtype) in [(41, RecordType::OPT), (255, RecordType::ANY), (11, RecordType::WKS)] {
            let other = record(RecordData::Other { rtype: code });
            assert_eq!(
                render_record(&other),
                Err(FormatError::UnsupportedRecordType(rtype))
            );
        }

        for code in [13u16, 46, 65, 257] {
            let other = record(RecordData::Other { rtype: code });
            assert_eq!(
                render_record(&other),
                Err(FormatError::UnrecognizedRecordType(RecordType::Unknown(code)))
            );
        }
    }

    #[test]
    fn response_code_names() {
        assert_eq!(render_response_code(ResponseCode::NoError), "NOERROR");
        assert_eq!(render_response_code(ResponseCode::FormErr), "FORMATERROR");
        assert_eq!(render_response_code(ResponseCode::ServFail), "SERVFAIL");
        assert_eq!(render_response_code(ResponseCode::NXDomain), "NXDOMAIN");
        assert_eq!(render_response_code(ResponseCode::NotImp), "NOTIMPLEMENTED");
        assert_eq!(render_response_code(ResponseCode::Refused), "REFUSED");
        assert_eq!(render_response_code(ResponseCode::NotAuth), "RESERVED");
        assert_eq!(render_response_code(ResponseCode::Unknown(12)), "RESERVED");
    }

    #[test]
    fn empty_answers_render_the_status() {
        let msg = message(ResponseCode::NXDomain, vec![]);
        let reply = DnsReply::new(&msg, SERVER);
        assert_eq!(render_answer_field(&reply), "NXDOMAIN");
    }

    #[test]
    fn answers_are_joined_and_bad_records_degrade() {
        let msg = message(
            ResponseCode::NoError,
            vec![
                record(RecordData::CNAME("edge.example.net".into())),
                record(RecordData::Other { rtype: 41 }),
                record(RecordData::A(Ipv4Addr::new(10, 0, 0, 1))),
            ],
        );
        let reply = DnsReply::new(&msg, SERVER);

        assert_eq!(
            render_answer_field(&reply),
            "CNAME: edge.example.net, <unsupported:OPT>, A: 10.0.0.1"
        );
    }

    #[test]
    fn one_tab_separated_line_per_question() {
        let mut msg = message(ResponseCode::Refused, vec![]);
        msg.questions.push(Question {
            qtype: RecordType::AAAA,
            qname: "example.org".to_string(),
            qclass: DNSClass::IN,
        });
        let reply = DnsReply::new(&msg, SERVER);

        let lines: Vec<String> = format_reply(&reply).iter().map(|l| l.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "A\texample.com\t8.8.8.8\tREFUSED",
                "AAAA\texample.org\t8.8.8.8\tREFUSED",
            ]
        );
    }

    #[test]
    fn formatting_is_repeatable() {
        let msg = message(
            ResponseCode::NoError,
            vec![record(RecordData::A(Ipv4Addr::new(1, 1, 1, 1)))],
        );
        let reply = DnsReply::new(&msg, SERVER);

        assert_eq!(format_reply(&reply), format_reply(&reply));
    }
}
