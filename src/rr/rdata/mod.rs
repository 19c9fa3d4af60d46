// Copyright 2022 Matthew Ingwersen.
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

//! Provides the [`Rdata`] type for RR data.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::name::{self, Name};
use crate::util;

mod wire;

////////////////////////////////////////////////////////////////////////
// RDATA                                                              //
////////////////////////////////////////////////////////////////////////

/// The data of a single resource record.
///
/// Types whose RDATA the resolver needs to look inside have their own
/// variants; names in those variants are decompressed when the record
/// is read from a message. Everything else is kept as the raw octets of
/// the RDATA field in [`Rdata::Other`].
///
/// When displayed, each variant uses its master-file presentation
/// format; [`Rdata::Other`] uses the generic `\# <len> <hex>` form of
/// [RFC 3597 § 5].
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rdata {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(Name),
    Cname(Name),
    Ptr(Name),
    Soa(Box<Soa>),
    Mx { preference: u16, exchange: Name },
    Txt(Vec<Box<[u8]>>),
    Other(Box<[u8]>),
}

/// The fields of an SOA record ([RFC 1035 § 3.3.13]).
///
/// [RFC 1035 § 3.3.13]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl Rdata {
    /// Returns the target name if this is CNAME RDATA.
    pub fn cname_target(&self) -> Option<&Name> {
        match self {
            Self::Cname(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::A(address) => address.fmt(f),
            Self::Aaaa(address) => address.fmt(f),
            Self::Ns(name) | Self::Cname(name) | Self::Ptr(name) => name.fmt(f),
            Self::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum,
            ),
            Self::Mx {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            Self::Txt(strings) => {
                for (i, string) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_character_string(f, string)?;
                }
                Ok(())
            }
            Self::Other(octets) if octets.is_empty() => f.write_str("\\# 0"),
            Self::Other(octets) => {
                write!(f, "\\# {} ", octets.len())?;
                util::write_hex(f, octets)
            }
        }
    }
}

/// Writes a `<character-string>` in quoted master-file form, escaping
/// quotes, backslashes, and non-printable octets.
fn write_character_string(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &octet in octets {
        match octet {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b' ' => f.write_str(" ")?,
            _ if octet.is_ascii_graphic() => write!(f, "{}", octet as char)?,
            _ => write!(f, "\\{:03}", octet)?,
        }
    }
    f.write_str("\"")
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that RDATA read from a message is invalid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReadRdataError {
    InvalidName(name::Error),
    UnexpectedEom,
    Other,
}

impl From<name::Error> for ReadRdataError {
    fn from(error: name::Error) -> Self {
        Self::InvalidName(error)
    }
}

impl fmt::Display for ReadRdataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidName(error) => write!(f, "invalid name in RDATA: {error}"),
            Self::UnexpectedEom => f.write_str("unexpected end of message in RDATA"),
            Self::Other => f.write_str("RDATA is malformed"),
        }
    }
}

impl std::error::Error for ReadRdataError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdata_displays_in_presentation_format() {
        assert_eq!(Rdata::A(Ipv4Addr::new(192, 0, 2, 1)).to_string(), "192.0.2.1");
        assert_eq!(
            Rdata::Aaaa("2001:db8::1".parse().unwrap()).to_string(),
            "2001:db8::1"
        );
        assert_eq!(
            Rdata::Ns("a.root-servers.net.".parse().unwrap()).to_string(),
            "a.root-servers.net."
        );
        assert_eq!(
            Rdata::Mx {
                preference: 10,
                exchange: "mail.example.".parse().unwrap(),
            }
            .to_string(),
            "10 mail.example."
        );
        let soa = Soa {
            mname: "ns.example.".parse().unwrap(),
            rname: "admin.example.".parse().unwrap(),
            serial: 2022010101,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 300,
        };
        assert_eq!(
            Rdata::Soa(Box::new(soa)).to_string(),
            "ns.example. admin.example. 2022010101 7200 3600 1209600 300"
        );
    }

    #[test]
    fn txt_escapes_special_octets() {
        let txt = Rdata::Txt(vec![
            b"hello world"[..].into(),
            b"say \"hi\"\\\x01"[..].into(),
        ]);
        assert_eq!(
            txt.to_string(),
            "\"hello world\" \"say \\\"hi\\\"\\\\\\001\""
        );
    }

    #[test]
    fn other_rdata_uses_generic_form() {
        assert_eq!(
            Rdata::Other(b"\x0a\x00\xff"[..].into()).to_string(),
            "\\# 3 0a00ff"
        );
        assert_eq!(Rdata::Other(Box::new([])).to_string(), "\\# 0");
    }

    #[test]
    fn accessors_match_variants() {
        let target: Name = "target.example.".parse().unwrap();
        assert_eq!(Rdata::Cname(target.clone()).cname_target(), Some(&target));
        assert_eq!(Rdata::Ns(target).cname_target(), None);
    }
}
