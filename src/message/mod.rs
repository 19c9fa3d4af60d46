// Copyright 2021 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of reading and writing of DNS messages.
//!
//! The [`Reader`] and [`Writer`] types work directly on the wire format.
//! The resolver itself deals in [`Message`]s, an owned representation
//! with records grouped into RRsets, which is converted to and from
//! the wire with [`Message::to_wire`] and [`Message::from_wire`].

use std::fmt;

mod constants;
mod opcode;
mod question;
mod rcode;
pub mod reader;
pub mod writer;
pub use opcode::Opcode;
pub use question::Question;
pub use rcode::Rcode;
pub use reader::Reader;
pub use writer::Writer;

use constants::{EDNS_DO_MASK, MAX_MESSAGE_SIZE};
use crate::name::Name;
use crate::rr::{add_record, Class, Rrset, Type};

/// The UDP payload size advertised in queries with EDNS, the value
/// agreed on for DNS Flag Day 2020.
pub const EDNS_UDP_PAYLOAD_SIZE: u16 = 1232;

////////////////////////////////////////////////////////////////////////
// MESSAGES                                                           //
////////////////////////////////////////////////////////////////////////

/// An owned DNS message.
///
/// The answer, authority, and additional sections hold [`Rrset`]s:
/// records read from the wire are merged by owner, type, and class. The
/// OPT pseudo-RR is not kept in the additional section; its contents
/// are lifted into [`Message::edns`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub id: u16,
    pub qr: bool,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub ad: bool,
    pub cd: bool,
    pub rcode: Rcode,
    pub question: Vec<Question>,
    pub answer: Vec<Rrset>,
    pub authority: Vec<Rrset>,
    pub additional: Vec<Rrset>,
    pub edns: Option<Edns>,
}

/// The EDNS(0) parameters of a message, taken from its OPT record
/// ([RFC 6891 § 6.1.3]).
///
/// [RFC 6891 § 6.1.3]: https://datatracker.ietf.org/doc/html/rfc6891#section-6.1.3
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Edns {
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
}

impl Message {
    /// Builds an iterative query for `qname`/`qtype` in class IN. The RD
    /// bit is left clear. When `want_dnssec` is set, an OPT record with
    /// the DO bit and a UDP payload size of [`EDNS_UDP_PAYLOAD_SIZE`] is
    /// attached.
    pub fn query(id: u16, qname: Name, qtype: Type, want_dnssec: bool) -> Self {
        Self {
            id,
            qr: false,
            opcode: Opcode::Query,
            aa: false,
            tc: false,
            rd: false,
            ra: false,
            ad: false,
            cd: false,
            rcode: Rcode::NoError,
            question: vec![Question {
                qname,
                qtype,
                qclass: Class::IN,
            }],
            answer: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: want_dnssec.then_some(Edns {
                udp_payload_size: EDNS_UDP_PAYLOAD_SIZE,
                dnssec_ok: true,
            }),
        }
    }

    /// Builds an empty response to `query`: the ID, opcode, RD bit, and
    /// question are copied, and QR is set.
    pub fn response_to(query: &Message) -> Self {
        Self {
            id: query.id,
            qr: true,
            opcode: query.opcode,
            aa: false,
            tc: false,
            rd: query.rd,
            ra: false,
            ad: false,
            cd: false,
            rcode: Rcode::NoError,
            question: query.question.clone(),
            answer: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: None,
        }
    }

    /// Serializes the message into its on-the-wire form. Names are not
    /// compressed.
    pub fn to_wire(&self) -> Result<Vec<u8>, writer::Error> {
        let mut buf = vec![0; MAX_MESSAGE_SIZE];
        let mut writer = Writer::try_from(buf.as_mut_slice())?;
        writer.set_id(self.id);
        writer.set_qr(self.qr);
        writer.set_opcode(self.opcode);
        writer.set_aa(self.aa);
        writer.set_tc(self.tc);
        writer.set_rd(self.rd);
        writer.set_ra(self.ra);
        writer.set_ad(self.ad);
        writer.set_cd(self.cd);
        writer.set_rcode(self.rcode);
        if let Some(edns) = self.edns {
            writer.set_edns(edns.udp_payload_size, edns.dnssec_ok)?;
        }
        for question in &self.question {
            writer.add_question(question)?;
        }
        for rrset in &self.answer {
            writer.add_answer_rrset(rrset)?;
        }
        for rrset in &self.authority {
            writer.add_authority_rrset(rrset)?;
        }
        for rrset in &self.additional {
            writer.add_additional_rrset(rrset)?;
        }
        let len = writer.finish();
        buf.truncate(len);
        Ok(buf)
    }

    /// Parses a message from its on-the-wire form. Compressed names are
    /// followed, records are merged into RRsets, and an OPT record in
    /// the additional section is lifted into [`Message::edns`]. Data
    /// after the last record is an error.
    pub fn from_wire(octets: &[u8]) -> Result<Self, reader::Error> {
        let mut reader = Reader::try_from(octets)?;
        let mut message = Self {
            id: reader.id(),
            qr: reader.qr(),
            opcode: reader.opcode(),
            aa: reader.aa(),
            tc: reader.tc(),
            rd: reader.rd(),
            ra: reader.ra(),
            ad: reader.ad(),
            cd: reader.cd(),
            rcode: reader.rcode(),
            question: Vec::new(),
            answer: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: None,
        };

        for _ in 0..reader.qdcount() {
            message.question.push(reader.read_question()?);
        }
        let counts = [reader.ancount(), reader.nscount(), reader.arcount()];
        for (section, count) in counts.into_iter().enumerate() {
            for _ in 0..count {
                let rr = reader.read_rr()?;
                match section {
                    0 => add_record(&mut message.answer, rr.owner, rr.rr_type, rr.class, rr.ttl, rr.rdata),
                    1 => add_record(&mut message.authority, rr.owner, rr.rr_type, rr.class, rr.ttl, rr.rdata),
                    _ if rr.rr_type == Type::OPT => {
                        message.edns = Some(Edns {
                            udp_payload_size: rr.class.into(),
                            dnssec_ok: rr.ttl & EDNS_DO_MASK != 0,
                        });
                    }
                    _ => add_record(&mut message.additional, rr.owner, rr.rr_type, rr.class, rr.ttl, rr.rdata),
                }
            }
        }

        if reader.at_eom() {
            Ok(message)
        } else {
            Err(reader::Error::TrailingData)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// PRESENTATION                                                       //
////////////////////////////////////////////////////////////////////////

/// A `Message` is displayed as a set of header lines followed by each
/// section, in the style of dig-like tools:
///
/// ```text
/// id 4660
/// opcode QUERY
/// rcode NOERROR
/// flags QR AA
/// ;QUESTION
/// example.test. IN A
/// ;ANSWER
/// example.test. 300 IN A 192.0.2.1
/// ;AUTHORITY
/// ;ADDITIONAL
/// ```
///
/// EDNS messages have additional `edns`, `eflags`, and `payload` header
/// lines.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "id {}", self.id)?;
        writeln!(f, "opcode {}", self.opcode)?;
        writeln!(f, "rcode {}", self.rcode)?;
        f.write_str("flags")?;
        let flags = [
            (self.qr, "QR"),
            (self.aa, "AA"),
            (self.tc, "TC"),
            (self.rd, "RD"),
            (self.ra, "RA"),
            (self.ad, "AD"),
            (self.cd, "CD"),
        ];
        for (_, flag) in flags.iter().filter(|(set, _)| *set) {
            write!(f, " {flag}")?;
        }
        f.write_str("\n")?;
        if let Some(edns) = self.edns {
            writeln!(f, "edns 0")?;
            if edns.dnssec_ok {
                writeln!(f, "eflags DO")?;
            }
            writeln!(f, "payload {}", edns.udp_payload_size)?;
        }

        f.write_str(";QUESTION")?;
        for question in &self.question {
            write!(f, "\n{question}")?;
        }
        for (heading, section) in [
            (";ANSWER", &self.answer),
            (";AUTHORITY", &self.authority),
            (";ADDITIONAL", &self.additional),
        ] {
            write!(f, "\n{heading}")?;
            for rrset in section {
                write!(f, "\n{rrset}")?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
