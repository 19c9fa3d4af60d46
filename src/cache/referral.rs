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

//! Implementation of the [`ReferralCache`].

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use lazy_static::lazy_static;
use log::debug;

use super::node::Node;
use crate::name::Name;
use crate::rr::Type;

/// The record sets known for a single name in the [`ReferralCache`],
/// keyed by type.
pub type ReferralEntry = BTreeMap<Type, Vec<ReferralValue>>;

/// A value stored in a [`ReferralCache`] record set.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ReferralValue {
    /// The target of an NS record.
    Name(Name),

    /// The address from an A or AAAA record.
    Address(IpAddr),

    /// Any other record, in its rendered form.
    Text(String),
}

impl ReferralValue {
    /// Returns the name if this is a [`ReferralValue::Name`].
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the address if this is a [`ReferralValue::Address`].
    pub fn as_address(&self) -> Option<IpAddr> {
        match self {
            Self::Address(address) => Some(*address),
            _ => None,
        }
    }
}

impl fmt::Display for ReferralValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Name(name) => name.fmt(f),
            Self::Address(address) => address.fmt(f),
            Self::Text(text) => f.write_str(text),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ROOT HINTS                                                         //
////////////////////////////////////////////////////////////////////////

/// A root nameserver and one of its addresses, used to seed a
/// [`ReferralCache`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RootHint {
    pub name: Name,
    pub address: IpAddr,
}

/// The names and addresses behind [`ROOT_HINTS`].
const BUILT_IN_ROOT_HINTS: [(&str, Ipv4Addr); 2] = [
    ("a.root-servers.net.", Ipv4Addr::new(198, 41, 0, 4)),
    ("b.root-servers.net.", Ipv4Addr::new(199, 9, 14, 201)),
];

lazy_static! {
    /// The built-in root hints: a.root-servers.net and
    /// b.root-servers.net.
    pub static ref ROOT_HINTS: Vec<RootHint> = BUILT_IN_ROOT_HINTS
        .iter()
        .map(|(name, address)| RootHint {
            name: name.parse().unwrap(),
            address: IpAddr::V4(*address),
        })
        .collect();
}

////////////////////////////////////////////////////////////////////////
// REFERRAL CACHE                                                     //
////////////////////////////////////////////////////////////////////////

/// The cache of delegation information gathered while resolving.
///
/// Entries are kept in a tree mirroring the DNS namespace, so that the
/// closest known enclosing zone of a name can be found by walking down
/// from the root ([`ReferralCache::deepest_match`]). Record sets are
/// overwritten per type by [`ReferralCache::put`] and are never
/// expired.
#[derive(Clone, Debug)]
pub struct ReferralCache {
    root: Node<ReferralEntry>,
}

impl Default for ReferralCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferralCache {
    /// Creates an empty `ReferralCache`. Nothing can be resolved with it
    /// until root hints are added.
    pub fn new() -> Self {
        Self {
            root: Node::new(Name::root()),
        }
    }

    /// Creates a `ReferralCache` seeded with the provided root hints:
    /// the root's NS set lists each distinct hint name (in order), and
    /// each name gets an A or AAAA set with its addresses.
    pub fn with_root_hints(hints: &[RootHint]) -> Self {
        let mut cache = Self::new();
        let mut ns_names: Vec<ReferralValue> = Vec::new();
        let mut addresses: Vec<(Name, Type, Vec<ReferralValue>)> = Vec::new();
        for hint in hints {
            let ns_name = ReferralValue::Name(hint.name.clone());
            if !ns_names.contains(&ns_name) {
                ns_names.push(ns_name);
            }
            let rr_type = match hint.address {
                IpAddr::V4(_) => Type::A,
                IpAddr::V6(_) => Type::AAAA,
            };
            let value = ReferralValue::Address(hint.address);
            match addresses
                .iter_mut()
                .find(|(name, t, _)| *name == hint.name && *t == rr_type)
            {
                Some((_, _, values)) => values.push(value),
                None => addresses.push((hint.name.clone(), rr_type, vec![value])),
            }
        }
        if !ns_names.is_empty() {
            cache.put(Name::root(), Type::NS, ns_names);
        }
        for (name, rr_type, values) in addresses {
            cache.put(name, rr_type, values);
        }
        cache
    }

    /// Stores a record set for `name`, creating the name's entry if
    /// needed and replacing any set of the same type already present.
    pub fn put(&mut self, name: Name, rr_type: Type, values: Vec<ReferralValue>) {
        debug!("Referral cache: {} {} <- {} value(s)", name, rr_type, values.len());
        let level = name.len() - 1;
        let node = self.root.get_or_create_descendant(&name, level);
        node.data.insert(rr_type, values);
    }

    /// Returns the entry for `name`, if it has any record sets.
    pub fn get(&self, name: &Name) -> Option<&ReferralEntry> {
        self.find_node(name)
            .map(|node| &node.data)
            .filter(|entry| !entry.is_empty())
    }

    /// Returns the addresses known for `name`: the values of its A set,
    /// then those of its AAAA set.
    pub fn addresses(&self, name: &Name) -> Vec<IpAddr> {
        let Some(entry) = self.get(name) else {
            return Vec::new();
        };
        [Type::A, Type::AAAA]
            .iter()
            .filter_map(|rr_type| entry.get(rr_type))
            .flatten()
            .filter_map(ReferralValue::as_address)
            .collect()
    }

    /// Finds the deepest ancestor of `name` (possibly `name` itself)
    /// whose entry holds an NS set, returning that ancestor's name and
    /// entry. This is `None` only when not even the root has NS data.
    pub fn deepest_match(&self, name: &Name) -> Option<(&Name, &ReferralEntry)> {
        let mut node = &self.root;
        let mut deepest = None;
        let mut labels = name.labels().rev().skip(1);
        loop {
            if node.data.contains_key(&Type::NS) {
                deepest = Some((&node.name, &node.data));
            }
            match labels.next().and_then(|label| node.child(label)) {
                Some(child) => node = child,
                None => return deepest,
            }
        }
    }

    /// Returns an iterator over every name with at least one record set
    /// and its entry. Names come in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &ReferralEntry)> {
        self.root.iter().filter(|(_, entry)| !entry.is_empty())
    }

    fn find_node(&self, name: &Name) -> Option<&Node<ReferralEntry>> {
        name.labels()
            .rev()
            .skip(1)
            .try_fold(&self.root, |node, label| node.child(label))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Name {
        text.parse().unwrap()
    }

    fn ns(text: &str) -> ReferralValue {
        ReferralValue::Name(name(text))
    }

    #[test]
    fn root_hints_seed_the_cache() {
        let cache = ReferralCache::with_root_hints(&ROOT_HINTS);
        let root = cache.get(&Name::root()).unwrap();
        assert_eq!(
            root[&Type::NS],
            [ns("a.root-servers.net."), ns("b.root-servers.net.")]
        );
        assert_eq!(
            cache.addresses(&name("a.root-servers.net.")),
            [IpAddr::V4(Ipv4Addr::new(198, 41, 0, 4))]
        );
        assert_eq!(
            cache.addresses(&name("B.ROOT-SERVERS.NET.")),
            [IpAddr::V4(Ipv4Addr::new(199, 9, 14, 201))]
        );
        assert_eq!(cache.iter().count(), 3);
    }

    #[test]
    fn every_built_in_root_hint_is_kept() {
        assert_eq!(ROOT_HINTS.len(), BUILT_IN_ROOT_HINTS.len());
        for (hint, (name, address)) in ROOT_HINTS.iter().zip(BUILT_IN_ROOT_HINTS) {
            assert_eq!(hint.name.to_string(), name);
            assert_eq!(hint.address, IpAddr::V4(address));
        }
    }

    #[test]
    fn deepest_match_falls_back_to_root() {
        let cache = ReferralCache::with_root_hints(&ROOT_HINTS);
        let (matched, entry) = cache.deepest_match(&name("www.example.com.")).unwrap();
        assert!(matched.is_root());
        assert!(entry.contains_key(&Type::NS));
    }

    #[test]
    fn deepest_match_finds_longest_ns_ancestor() {
        let mut cache = ReferralCache::with_root_hints(&ROOT_HINTS);
        cache.put(name("com."), Type::NS, vec![ns("a.gtld-servers.net.")]);
        cache.put(name("example.com."), Type::NS, vec![ns("a.iana-servers.net.")]);
        cache.put(
            name("deep.www.example.com."),
            Type::NS,
            vec![ns("ns.deep.www.example.com.")],
        );
        // An address-only entry is not a zone cut.
        cache.put(
            name("www.example.com."),
            Type::A,
            vec![ReferralValue::Address(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))],
        );

        let (matched, _) = cache.deepest_match(&name("www.example.com.")).unwrap();
        assert_eq!(*matched, name("example.com."));
        let (matched, _) = cache.deepest_match(&name("x.deep.www.Example.com.")).unwrap();
        assert_eq!(*matched, name("deep.www.example.com."));
        let (matched, _) = cache.deepest_match(&name("example.com.")).unwrap();
        assert_eq!(*matched, name("example.com."));
        let (matched, _) = cache.deepest_match(&name("org.")).unwrap();
        assert!(matched.is_root());
    }

    #[test]
    fn deepest_match_requires_seeding() {
        let cache = ReferralCache::new();
        assert!(cache.deepest_match(&name("example.com.")).is_none());
        assert!(cache.get(&Name::root()).is_none());
        assert_eq!(cache.iter().count(), 0);
    }

    #[test]
    fn put_overwrites_per_type() {
        let mut cache = ReferralCache::new();
        let zone = name("example.test.");
        cache.put(zone.clone(), Type::NS, vec![ns("a.example.test.")]);
        cache.put(zone.clone(), Type::TXT, vec![ReferralValue::Text("\"x\"".into())]);
        cache.put(zone.clone(), Type::NS, vec![ns("b.example.test.")]);
        let entry = cache.get(&zone).unwrap();
        assert_eq!(entry[&Type::NS], [ns("b.example.test.")]);
        assert_eq!(entry[&Type::TXT][0].to_string(), "\"x\"");
        assert!(cache.get(&name("test.")).is_none());
    }
}
