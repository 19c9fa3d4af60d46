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

//! Implementation of the [`Writer`] type to write on-the-wire DNS
//! messages.

use std::fmt;

use super::constants::*;
use super::{Opcode, Question, Rcode};
use crate::name::Name;
use crate::rr::{Class, Rdata, Rrset, Type};

////////////////////////////////////////////////////////////////////////
// WRITER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer that serializes a DNS message into it.
///
/// A `Writer` is constructed with its [`TryFrom`] implementation; the
/// buffer must be able to hold a full DNS message header of 12 octets.
/// The header is initially zeroed and its fields can be set at any
/// time.
///
/// Questions and RRsets are written sequentially with
/// [`Writer::add_question`], [`Writer::add_answer_rrset`],
/// [`Writer::add_authority_rrset`], and
/// [`Writer::add_additional_rrset`], which must be called in that
/// order. Calls made out of order fail with [`Error::OutOfOrder`]. Each
/// of these is atomic: on failure, nothing is written.
///
/// For EDNS messages, use [`Writer::set_edns`]. Space for an OPT record
/// is reserved, and the OPT record is added to the message when
/// [`Writer::finish`] is called.
///
/// Names are never compressed. Queries carry a single name, so there
/// would be nothing to gain.
pub struct Writer<'a> {
    octets: &'a mut [u8],
    cursor: usize,
    available: usize,
    section: Section,
    qdcount: u16,
    ancount: u16,
    nscount: u16,
    arcount: u16,
    edns: Option<Edns>,
}

/// The section of a DNS message a [`Writer`] is currently serializing.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

/// EDNS information recorded until the OPT record is written in
/// [`Writer::finish`].
#[derive(Clone, Copy, Debug)]
struct Edns {
    udp_payload_size: u16,
    dnssec_ok: bool,
}

/// The amount of space we need to reserve for the OPT record. No EDNS
/// options are sent, so the OPT record is a fixed size.
const OPT_RECORD_SIZE: usize = 11;

impl<'a> Writer<'a> {
    /// Sets the 16-bit ID of the message.
    pub fn set_id(&mut self, id: u16) {
        self.write_u16(ID_START, id);
    }

    /// Sets or clears the QR (query response) bit.
    pub fn set_qr(&mut self, qr: bool) {
        self.set_flag(QR_BYTE, QR_MASK, qr);
    }

    /// Sets the message's opcode.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.octets[OPCODE_BYTE] &= !OPCODE_MASK;
        self.octets[OPCODE_BYTE] |= u8::from(opcode) << OPCODE_SHIFT;
    }

    /// Sets or clears the AA (authoritative answer) bit.
    pub fn set_aa(&mut self, aa: bool) {
        self.set_flag(AA_BYTE, AA_MASK, aa);
    }

    /// Sets or clears the TC (truncation) bit.
    pub fn set_tc(&mut self, tc: bool) {
        self.set_flag(TC_BYTE, TC_MASK, tc);
    }

    /// Sets or clears the RD (recursion desired) bit.
    pub fn set_rd(&mut self, rd: bool) {
        self.set_flag(RD_BYTE, RD_MASK, rd);
    }

    /// Sets or clears the RA (recursion available) bit.
    pub fn set_ra(&mut self, ra: bool) {
        self.set_flag(RA_BYTE, RA_MASK, ra);
    }

    /// Sets or clears the AD (authentic data) bit.
    pub fn set_ad(&mut self, ad: bool) {
        self.set_flag(AD_BYTE, AD_MASK, ad);
    }

    /// Sets or clears the CD (checking disabled) bit.
    pub fn set_cd(&mut self, cd: bool) {
        self.set_flag(CD_BYTE, CD_MASK, cd);
    }

    /// Sets the message's RCODE.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.octets[RCODE_BYTE] &= !RCODE_MASK;
        self.octets[RCODE_BYTE] |= u8::from(rcode);
    }

    /// Adds a question to message. This must be used before any
    /// resource records are added.
    pub fn add_question(&mut self, question: &Question) -> Result<()> {
        if self.section != Section::Question {
            return Err(Error::OutOfOrder);
        }
        let new_qdcount = self.qdcount.checked_add(1).ok_or(Error::CountOverflow)?;
        self.with_rollback(|this| {
            this.try_push(question.qname.wire_repr())?;
            this.try_push(&u16::from(question.qtype).to_be_bytes())?;
            this.try_push(&u16::from(question.qclass).to_be_bytes())
        })?;
        self.qdcount = new_qdcount;
        Ok(())
    }

    /// Adds an RRset to the answer section.
    pub fn add_answer_rrset(&mut self, rrset: &Rrset) -> Result<()> {
        self.add_rrset(Section::Answer, rrset)
    }

    /// Adds an RRset to the authority section.
    pub fn add_authority_rrset(&mut self, rrset: &Rrset) -> Result<()> {
        self.add_rrset(Section::Authority, rrset)
    }

    /// Adds an RRset to the additional section.
    pub fn add_additional_rrset(&mut self, rrset: &Rrset) -> Result<()> {
        self.add_rrset(Section::Additional, rrset)
    }

    /// Makes this an EDNS message. This reserves space at the end of
    /// the message for the OPT record, failing if there is insufficient
    /// space or if this is already an EDNS message.
    pub fn set_edns(&mut self, udp_payload_size: u16, dnssec_ok: bool) -> Result<()> {
        if self.edns.is_some() {
            Err(Error::AlreadyEdns)
        } else if self.cursor + OPT_RECORD_SIZE > self.available {
            Err(Error::Truncation)
        } else {
            self.arcount = self.arcount.checked_add(1).ok_or(Error::CountOverflow)?;
            self.available -= OPT_RECORD_SIZE;
            self.edns = Some(Edns {
                udp_payload_size,
                dnssec_ok,
            });
            Ok(())
        }
    }

    /// Finishes writing the message. The final length of the message
    /// is returned.
    pub fn finish(mut self) -> usize {
        self.write_u16(QDCOUNT_START, self.qdcount);
        self.write_u16(ANCOUNT_START, self.ancount);
        self.write_u16(NSCOUNT_START, self.nscount);
        self.write_u16(ARCOUNT_START, self.arcount);

        if let Some(edns) = self.edns {
            // The space was reserved in set_edns, so this fits.
            let ttl = if edns.dnssec_ok { EDNS_DO_MASK } else { 0 };
            let start = self.cursor;
            let end = start + OPT_RECORD_SIZE;
            let opt = &mut self.octets[start..end];
            opt[0] = 0;
            opt[1..3].copy_from_slice(&u16::from(Type::OPT).to_be_bytes());
            opt[3..5].copy_from_slice(&edns.udp_payload_size.to_be_bytes());
            opt[5..9].copy_from_slice(&ttl.to_be_bytes());
            opt[9..11].copy_from_slice(&0u16.to_be_bytes());
            self.cursor = end;
        }
        self.cursor
    }

    /// Writes out each record of an RRset in `section`, atomically.
    fn add_rrset(&mut self, section: Section, rrset: &Rrset) -> Result<()> {
        if section < self.section {
            return Err(Error::OutOfOrder);
        }
        let n_records = u16::try_from(rrset.rdatas.len()).or(Err(Error::CountOverflow))?;
        let count = match section {
            Section::Answer => self.ancount,
            Section::Authority => self.nscount,
            _ => self.arcount,
        };
        let new_count = count.checked_add(n_records).ok_or(Error::CountOverflow)?;

        self.with_rollback(|this| {
            for rdata in &rrset.rdatas {
                this.add_rr(&rrset.owner, rrset.rr_type, rrset.class, rrset.ttl, rdata)?;
            }
            Ok(())
        })?;
        self.section = section;
        match section {
            Section::Answer => self.ancount = new_count,
            Section::Authority => self.nscount = new_count,
            _ => self.arcount = new_count,
        }
        Ok(())
    }

    /// Writes out an RR at the current cursor. This is not atomic; use
    /// it within [`Writer::with_rollback`].
    fn add_rr(
        &mut self,
        owner: &Name,
        rr_type: Type,
        class: Class,
        ttl: u32,
        rdata: &Rdata,
    ) -> Result<()> {
        let mut rdata_octets = Vec::new();
        rdata.write(&mut rdata_octets);
        let rdlength = u16::try_from(rdata_octets.len()).or(Err(Error::RdataTooLong))?;
        self.try_push(owner.wire_repr())?;
        self.try_push(&u16::from(rr_type).to_be_bytes())?;
        self.try_push(&u16::from(class).to_be_bytes())?;
        self.try_push(&ttl.to_be_bytes())?;
        self.try_push(&rdlength.to_be_bytes())?;
        self.try_push(&rdata_octets)
    }

    /// Executes `f(self)`, restoring the cursor first if it fails.
    fn with_rollback<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let cursor = self.cursor;
        let result = f(self);
        if result.is_err() {
            self.cursor = cursor;
        }
        result
    }

    fn set_flag(&mut self, byte: usize, mask: u8, value: bool) {
        if value {
            self.octets[byte] |= mask;
        } else {
            self.octets[byte] &= !mask;
        }
    }

    /// Tries to write `data` to the underlying buffer at the current
    /// cursor, failing if there is not sufficient space.
    fn try_push(&mut self, data: &[u8]) -> Result<()> {
        if self.available - self.cursor >= data.len() {
            self.octets[self.cursor..self.cursor + data.len()].copy_from_slice(data);
            self.cursor += data.len();
            Ok(())
        } else {
            Err(Error::Truncation)
        }
    }

    /// Writes `data` in network byte order at `position`. This performs
    /// no bounds checking.
    fn write_u16(&mut self, position: usize, data: u16) {
        self.octets[position..position + 2].copy_from_slice(&data.to_be_bytes());
    }
}

impl<'a> TryFrom<&'a mut [u8]> for Writer<'a> {
    type Error = Error;

    fn try_from(octets: &'a mut [u8]) -> Result<Self> {
        if octets.len() < HEADER_SIZE {
            Err(Error::Truncation)
        } else {
            octets[0..HEADER_SIZE].fill(0);
            let available = octets.len();
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
                available,
                section: Section::Question,
                qdcount: 0,
                ancount: 0,
                nscount: 0,
                arcount: 0,
                edns: None,
            })
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a question or RRset could not be written.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// Adding the question or resource record(s) would overflow the
    /// corresponding 16-bit counter in the DNS header.
    CountOverflow,

    /// There is not enough room left in the buffer.
    Truncation,

    /// An attempt was made to serialize a question or resource record
    /// in the wrong place in the message (e.g., adding a question after
    /// an answer resource record has already been serialized).
    OutOfOrder,

    /// Serialized RDATA would not fit in the RDLENGTH field.
    RdataTooLong,

    /// An attempt was made to set up EDNS when EDNS is already enabled.
    AlreadyEdns,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CountOverflow => f.write_str("too many questions or records for the header"),
            Self::Truncation => f.write_str("not enough room in the message buffer"),
            Self::OutOfOrder => f.write_str("message sections were written out of order"),
            Self::RdataTooLong => f.write_str("RDATA is longer than 65,535 octets"),
            Self::AlreadyEdns => f.write_str("EDNS is already enabled"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Writer`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use std::net::Ipv4Addr;

    lazy_static! {
        static ref QUESTION: Question = Question {
            qname: "quarry.test.".parse().unwrap(),
            qtype: Type::A,
            qclass: Class::IN,
        };
        static ref RRSET: Rrset = {
            let mut rrset = Rrset::new("quarry.test.".parse().unwrap(), Type::A, Class::IN, 3600);
            rrset.push_rdata(Rdata::A(Ipv4Addr::new(127, 0, 0, 1)));
            rrset
        };
    }

    #[test]
    fn writer_works() {
        let mut buf = vec![0; 512];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.set_id(0x0703);
        writer.set_opcode(Opcode::Query);
        writer.set_qr(true);
        writer.set_aa(true);
        writer.set_rcode(Rcode::NoError);
        writer.add_question(&QUESTION).unwrap();
        writer.add_answer_rrset(&RRSET).unwrap();
        let len = writer.finish();
        assert_eq!(
            &buf[0..len],
            b"\x07\x03\x84\x00\x00\x01\x00\x01\x00\x00\x00\x00\
              \x06quarry\x04test\x00\x00\x01\x00\x01\
              \x06quarry\x04test\x00\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\
              \x7f\x00\x00\x01"
        );
    }

    #[test]
    fn writer_works_with_edns() {
        let mut buf = [0; 512];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.set_id(0x0703);
        writer.set_edns(1232, true).unwrap();
        assert_eq!(writer.set_edns(1232, true), Err(Error::AlreadyEdns));
        let len = writer.finish();
        assert_eq!(
            &buf[0..len],
            b"\x07\x03\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01\
              \x00\x00\x29\x04\xd0\x00\x00\x80\x00\x00\x00",
        );
    }

    #[test]
    fn writer_enforces_section_ordering() {
        let mut buf = vec![0; 512];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.add_question(&QUESTION).unwrap();
        writer.add_authority_rrset(&RRSET).unwrap();
        assert_eq!(writer.add_answer_rrset(&RRSET), Err(Error::OutOfOrder));
        assert_eq!(writer.add_question(&QUESTION), Err(Error::OutOfOrder));
        writer.add_authority_rrset(&RRSET).unwrap();
        writer.add_additional_rrset(&RRSET).unwrap();
        assert_eq!(writer.add_authority_rrset(&RRSET), Err(Error::OutOfOrder));
    }

    #[test]
    fn writer_rolls_back_on_truncation() {
        let mut buf = vec![0; 40];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.add_question(&QUESTION).unwrap();
        assert_eq!(writer.add_answer_rrset(&RRSET), Err(Error::Truncation));
        let len = writer.finish();
        assert_eq!(len, 12 + 17);
        assert_eq!(&buf[6..8], b"\x00\x00");
    }

    #[test]
    fn writer_edns_reservation_is_respected() {
        let mut buf = vec![0; 12 + 17 + OPT_RECORD_SIZE];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.set_edns(512, false).unwrap();
        writer.add_question(&QUESTION).unwrap();
        assert_eq!(writer.add_answer_rrset(&RRSET), Err(Error::Truncation));
        assert_eq!(writer.finish(), buf.len());
    }

    #[test]
    fn writer_rejects_short_buffers() {
        for size in 0..HEADER_SIZE {
            let mut buf = vec![0; size];
            assert!(matches!(
                Writer::try_from(buf.as_mut_slice()),
                Err(Error::Truncation)
            ));
        }
    }
}
