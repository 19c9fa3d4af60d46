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

//! Reading RDATA from messages and serializing it back out.

use std::net::{Ipv4Addr, Ipv6Addr};

use super::{Rdata, ReadRdataError, Soa};
use crate::name::Name;
use crate::rr::Type;

impl Rdata {
    /// Reads RDATA of type `rr_type` that occupies `len` octets at
    /// index `start` of `message`. The entire message must be passed so
    /// that compressed names can be followed; names may not extend past
    /// the end of the RDATA field.
    pub fn read(
        rr_type: Type,
        message: &[u8],
        start: usize,
        len: usize,
    ) -> Result<Self, ReadRdataError> {
        let end = start
            .checked_add(len)
            .filter(|end| *end <= message.len())
            .ok_or(ReadRdataError::UnexpectedEom)?;
        let buf = &message[..end];
        let rdata = &message[start..end];

        match rr_type {
            Type::A => <[u8; 4]>::try_from(rdata)
                .map(|octets| Self::A(Ipv4Addr::from(octets)))
                .or(Err(ReadRdataError::Other)),
            Type::AAAA => <[u8; 16]>::try_from(rdata)
                .map(|octets| Self::Aaaa(Ipv6Addr::from(octets)))
                .or(Err(ReadRdataError::Other)),
            Type::NS => read_name_rdata(buf, start).map(Self::Ns),
            Type::CNAME => read_name_rdata(buf, start).map(Self::Cname),
            Type::PTR => read_name_rdata(buf, start).map(Self::Ptr),
            Type::SOA => read_soa(buf, start),
            Type::MX => read_mx(buf, start),
            Type::TXT => read_txt(rdata),
            _ => Ok(Self::Other(rdata.into())),
        }
    }

    /// Serializes the RDATA (without the RDLENGTH field) onto the end of
    /// `buf`. Names are written uncompressed.
    pub fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Self::A(address) => buf.extend_from_slice(&address.octets()),
            Self::Aaaa(address) => buf.extend_from_slice(&address.octets()),
            Self::Ns(name) | Self::Cname(name) | Self::Ptr(name) => {
                buf.extend_from_slice(name.wire_repr())
            }
            Self::Soa(soa) => {
                buf.extend_from_slice(soa.mname.wire_repr());
                buf.extend_from_slice(soa.rname.wire_repr());
                for field in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    buf.extend_from_slice(&field.to_be_bytes());
                }
            }
            Self::Mx {
                preference,
                exchange,
            } => {
                buf.extend_from_slice(&preference.to_be_bytes());
                buf.extend_from_slice(exchange.wire_repr());
            }
            Self::Txt(strings) => {
                for string in strings {
                    buf.push(string.len() as u8);
                    buf.extend_from_slice(string);
                }
            }
            Self::Other(octets) => buf.extend_from_slice(octets),
        }
    }
}

/// Reads RDATA consisting of a single (possibly compressed) domain
/// name, which must fill the RDATA exactly. `buf` ends where the RDATA
/// ends.
fn read_name_rdata(buf: &[u8], start: usize) -> Result<Name, ReadRdataError> {
    let (name, len) = Name::try_from_compressed(buf, start)?;
    if start + len != buf.len() {
        Err(ReadRdataError::Other)
    } else {
        Ok(name)
    }
}

/// Reads SOA RDATA. Per RFC 3597 § 4, MNAME and RNAME may be
/// compressed.
fn read_soa(buf: &[u8], start: usize) -> Result<Rdata, ReadRdataError> {
    let (mname, mname_len) = Name::try_from_compressed(buf, start)?;
    let (rname, rname_len) = Name::try_from_compressed(buf, start + mname_len)?;
    let fixed = &buf[start + mname_len + rname_len..];
    if fixed.len() != 20 {
        return Err(ReadRdataError::Other);
    }
    let field = |i: usize| u32::from_be_bytes([fixed[i], fixed[i + 1], fixed[i + 2], fixed[i + 3]]);
    Ok(Rdata::Soa(Box::new(Soa {
        mname,
        rname,
        serial: field(0),
        refresh: field(4),
        retry: field(8),
        expire: field(12),
        minimum: field(16),
    })))
}

fn read_mx(buf: &[u8], start: usize) -> Result<Rdata, ReadRdataError> {
    if buf.len() < start + 2 {
        return Err(ReadRdataError::UnexpectedEom);
    }
    let preference = u16::from_be_bytes([buf[start], buf[start + 1]]);
    let exchange = read_name_rdata(buf, start + 2)?;
    Ok(Rdata::Mx {
        preference,
        exchange,
    })
}

/// Reads TXT RDATA: one or more `<character-string>`s filling the RDATA
/// exactly.
fn read_txt(rdata: &[u8]) -> Result<Rdata, ReadRdataError> {
    if rdata.is_empty() {
        return Err(ReadRdataError::Other);
    }
    let mut strings = Vec::new();
    let mut remaining = rdata;
    while let Some((&len, rest)) = remaining.split_first() {
        let len = len as usize;
        if len > rest.len() {
            return Err(ReadRdataError::UnexpectedEom);
        }
        strings.push(rest[..len].into());
        remaining = &rest[len..];
    }
    Ok(Rdata::Txt(strings))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
