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

//! Implementation of the [`Rrset`] structure.

use std::fmt;

use super::{Class, Rdata, Type};
use crate::name::Name;

/// A resource record set.
///
/// [RFC 2181 § 5] defines an RRset as a group of records with the same
/// owner, class, and type, and stipulates that all records in an RRset
/// have the same TTL. Responses are processed RRset by RRset, so the
/// records of each message section are grouped this way as they are
/// read (see [`add_record`]).
///
/// [RFC 2181 § 5]: https://datatracker.ietf.org/doc/html/rfc2181#section-5
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rrset {
    pub owner: Name,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: u32,
    pub rdatas: Vec<Rdata>,
}

impl Rrset {
    /// Creates a new `Rrset` with no records.
    pub fn new(owner: Name, rr_type: Type, class: Class, ttl: u32) -> Self {
        Self {
            owner,
            rr_type,
            class,
            ttl,
            rdatas: Vec::new(),
        }
    }

    /// Adds an [`Rdata`] to this `Rrset`. Following the behavior of
    /// other nameservers, RDATA already present is silently discarded.
    pub fn push_rdata(&mut self, rdata: Rdata) {
        if !self.rdatas.contains(&rdata) {
            self.rdatas.push(rdata);
        }
    }

    /// Returns whether this `Rrset` has the given owner, type, and
    /// class.
    pub fn matches(&self, owner: &Name, rr_type: Type, class: Class) -> bool {
        self.rr_type == rr_type && self.class == class && self.owner == *owner
    }
}

/// Adds a single record to a list of RRsets, merging it into an existing
/// RRset with the same owner, type, and class if there is one. When
/// records of an RRset disagree on the TTL, the RRset takes the minimum
/// ([RFC 2181 § 5.2]).
///
/// [RFC 2181 § 5.2]: https://datatracker.ietf.org/doc/html/rfc2181#section-5.2
pub fn add_record(
    rrsets: &mut Vec<Rrset>,
    owner: Name,
    rr_type: Type,
    class: Class,
    ttl: u32,
    rdata: Rdata,
) {
    if let Some(rrset) = rrsets
        .iter_mut()
        .find(|rrset| rrset.matches(&owner, rr_type, class))
    {
        rrset.ttl = rrset.ttl.min(ttl);
        rrset.push_rdata(rdata);
    } else {
        let mut rrset = Rrset::new(owner, rr_type, class, ttl);
        rrset.push_rdata(rdata);
        rrsets.push(rrset);
    }
}

/// An `Rrset` is displayed as one master-file line per record.
impl fmt::Display for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, rdata) in self.rdatas.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(
                f,
                "{} {} {} {} {}",
                self.owner, self.ttl, self.class, self.rr_type, rdata
            )?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn a(last: u8) -> Rdata {
        Rdata::A(Ipv4Addr::new(192, 0, 2, last))
    }

    #[test]
    fn add_record_groups_by_owner_type_and_class() {
        let owner: Name = "www.example.".parse().unwrap();
        let other: Name = "WWW.EXAMPLE.".parse().unwrap();
        let mut rrsets = Vec::new();
        add_record(&mut rrsets, owner.clone(), Type::A, Class::IN, 300, a(1));
        add_record(&mut rrsets, other, Type::A, Class::IN, 60, a(2));
        add_record(&mut rrsets, owner.clone(), Type::A, Class::IN, 600, a(1));
        add_record(&mut rrsets, owner.clone(), Type::A, Class::CH, 300, a(1));
        add_record(
            &mut rrsets,
            owner,
            Type::CNAME,
            Class::IN,
            300,
            Rdata::Cname("target.example.".parse().unwrap()),
        );

        assert_eq!(rrsets.len(), 3);
        assert_eq!(rrsets[0].ttl, 60);
        assert_eq!(rrsets[0].rdatas, vec![a(1), a(2)]);
        assert_eq!(rrsets[1].class, Class::CH);
        assert_eq!(rrsets[2].rr_type, Type::CNAME);
    }

    #[test]
    fn rrset_displays_one_line_per_record() {
        let mut rrset = Rrset::new("www.example.".parse().unwrap(), Type::A, Class::IN, 300);
        rrset.push_rdata(a(1));
        rrset.push_rdata(a(2));
        assert_eq!(
            rrset.to_string(),
            "www.example. 300 IN A 192.0.2.1\nwww.example. 300 IN A 192.0.2.2"
        );
    }
}
