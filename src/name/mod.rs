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

//! Implementation of data structures related to domain names.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::Index;
use std::str::FromStr;

use arrayvec::ArrayVec;

mod builder;
mod error;
mod label;
mod wire;
pub use builder::NameBuilder;
pub use error::Error;
pub use label::{Label, LabelBuf};

/// The maximum number of labels in a domain name.
const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// An owned, immutable domain name.
///
/// A `Name` stores the uncompressed on-the-wire representation of the
/// name ([RFC 1035 § 3.1]) along with the offset of each label within
/// it, following the layout used by the [NSD] authoritative
/// nameserver. Labels are indexed from the leaf toward the root, so
/// `name[0]` is the leftmost label and `name[name.len() - 1]` is always
/// the null label of the root.
///
/// `Name`s can be constructed
///
/// * through the [`FromStr`] implementation;
/// * through a [`NameBuilder`]; and
/// * from compressed on-the-wire names through
///   [`Name::try_from_compressed`].
///
/// Equality and hashing are ASCII-case-insensitive, and [`Ord`]
/// implements the DNSSEC canonical ordering, so `Name`s work as keys in
/// both hash maps and B-trees.
///
/// [NSD]: https://www.nlnetlabs.nl/projects/nsd/about/
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
#[derive(Clone)]
pub struct Name {
    wire: Box<[u8]>,
    label_offsets: Box<[u8]>,
}

impl Name {
    /// Makes a `Name` out of a wire representation and its label
    /// offsets. Callers within this module must ensure the two are
    /// valid and agree.
    fn from_parts(wire: &[u8], label_offsets: &[u8]) -> Self {
        Self {
            wire: wire.into(),
            label_offsets: label_offsets.into(),
        }
    }

    /// Returns the offset of label `n` in the `Name`'s on-the-wire
    /// representation.
    fn label_offset(&self, n: usize) -> usize {
        self.label_offsets[n] as usize
    }
}

////////////////////////////////////////////////////////////////////////
// NAME PUBLIC API                                                    //
////////////////////////////////////////////////////////////////////////

#[allow(clippy::len_without_is_empty)] // A domain name is never empty!
impl Name {
    /// Returns the name of the DNS root, `.`.
    pub fn root() -> Self {
        Self::from_parts(&[0], &[0])
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.label_offsets.len() == 1
    }

    /// Returns the number of labels in this `Name`, including the null
    /// label.
    pub fn len(&self) -> usize {
        self.label_offsets.len()
    }

    /// Returns an iterator over labels in this `Name`, from the leaf
    /// toward the root.
    pub fn labels(&self) -> Labels {
        Labels::new(self)
    }

    /// Returns the superdomain obtained by skipping the first `skip`
    /// labels of the `Name`, or `None` if there aren't enough labels.
    pub fn superdomain(&self, skip: usize) -> Option<Name> {
        if skip < self.len() {
            let start = self.label_offset(skip);
            let label_offsets: ArrayVec<u8, MAX_N_LABELS> = self.label_offsets[skip..]
                .iter()
                .map(|offset| offset - start as u8)
                .collect();
            Some(Self::from_parts(&self.wire[start..], &label_offsets))
        } else {
            None
        }
    }

    /// Tries to parse a compressed name present at index `start` of the
    /// provided buffer. Pointers are followed; indices given in
    /// pointers are treated as indices in `octets`, so generally one
    /// will pass an entire DNS message. On success, returns the `Name`
    /// and the number of contiguous octets read at `start` (that is,
    /// where the next field of the message begins).
    pub fn try_from_compressed(octets: &[u8], start: usize) -> Result<(Self, usize), Error> {
        wire::parse_compressed_name(octets, start)
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.wire
    }
}

impl Index<usize> for Name {
    type Output = Label;

    fn index(&self, index: usize) -> &Self::Output {
        let offset = self.label_offset(index);
        let len = self.wire[offset] as usize;
        Label::from_unchecked(&self.wire[offset + 1..offset + 1 + len])
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            for label in self.labels().take(self.len() - 1) {
                write!(f, "{}.", label)?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.labels().zip(other.labels()).all(|(a, b)| a == b)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The [`Ord`] implementation for `Name` employs DNSSEC's canonical
/// ordering of domain names. Per [RFC 4034 § 6.1], `Name`s are ordered
/// as strings of labels read from right to left.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels()
            .rev()
            .zip(other.labels().rev())
            .map(|(a, b)| a.cmp(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            label.hash(state);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Label`]s in a [`Name`], created by
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    name: &'a Name,
    front: usize,
    back: usize,
}

impl Labels<'_> {
    fn new(name: &Name) -> Labels {
        Labels {
            name,
            front: 0,
            back: name.len(),
        }
    }
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            Some(&self.name[self.front - 1])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(&self.name[self.back])
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Allows for conversion of a Rust [`str`] into a [`Name`]. The passed
/// string must be strictly ASCII. Escape sequences as defined by
/// [RFC 4343 § 2.1] are supported.
///
/// There is no origin to append, so a name without a trailing period is
/// taken to be relative to the root: `example.test` and `example.test.`
/// parse to the same `Name`.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root());
        }

        let mut remaining_octets = s.as_bytes();
        let mut builder = NameBuilder::new();

        // Checking each octet as we go suffices to check that the whole
        // string is ASCII: every multi-byte character starts with a
        // non-ASCII octet.
        while let Some(&octet) = remaining_octets.first() {
            if octet == b'\\' {
                let (value, consumed) = parse_escape(&remaining_octets[1..])?;
                builder.try_push(value)?;
                remaining_octets = &remaining_octets[consumed + 1..];
            } else if octet == b'.' {
                builder.next_label()?;
                remaining_octets = &remaining_octets[1..];
            } else if !octet.is_ascii() {
                return Err(Error::StrNotAscii);
            } else {
                builder.try_push(octet)?;
                remaining_octets = &remaining_octets[1..];
            }
        }
        builder.finish()
    }
}

/// Parses an escape sequence. We expect `remaining_octets` to start
/// with the octet immediately *after* the backslash that introduces the
/// escape sequence. Returns the escaped value and the number of octets
/// consumed.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    match remaining_octets {
        [] => Err(Error::InvalidEscape),
        [first, ..] if !first.is_ascii_digit() => Ok((*first, 1)),
        [a, b, c, ..] if b.is_ascii_digit() && c.is_ascii_digit() => {
            let value =
                100 * (a - b'0') as usize + 10 * (b - b'0') as usize + (c - b'0') as usize;
            u8::try_from(value)
                .map(|value| (value, 3))
                .or(Err(Error::InvalidEscape))
        }
        _ => Err(Error::InvalidEscape),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 1);
        assert_eq!(root.wire_repr(), &[0]);
        assert_eq!(root.to_string(), ".");
        assert!(root[0].octets().is_empty());
    }

    #[test]
    fn superdomain_works() {
        let subdomain = name("subdomain.example.test.");
        assert_eq!(subdomain.superdomain(0), Some(subdomain.clone()));
        assert_eq!(subdomain.superdomain(1), Some(name("example.test.")));
        assert_eq!(subdomain.superdomain(2), Some(name("test.")));
        assert_eq!(subdomain.superdomain(3), Some(Name::root()));
        assert_eq!(subdomain.superdomain(4), None);
        assert_eq!(
            subdomain.superdomain(2).unwrap().wire_repr(),
            b"\x04test\x00"
        );
    }

    #[test]
    fn labels_iterate_from_leaf_to_root() {
        let name = name("a.b.example.test.");
        let labels: Vec<&[u8]> = name.labels().map(Label::octets).collect();
        assert_eq!(labels, [&b"a"[..], b"b", b"example", b"test", b""]);
        let reversed: Vec<&[u8]> = name.labels().rev().map(Label::octets).collect();
        assert_eq!(reversed, [&b""[..], b"test", b"example", b"b", b"a"]);
        assert_eq!(name.labels().len(), 5);
    }

    #[test]
    fn equality_and_hashing_ignore_case() {
        let lower = name("example.test.");
        let upper = name("EXAMPLE.Test.");
        assert_eq!(lower, upper);

        let hash = |n: &Name| {
            let mut hasher = DefaultHasher::new();
            n.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&lower), hash(&upper));
        assert_ne!(lower, name("example.test.test."));

        // Case is preserved for display.
        assert_eq!(upper.to_string(), "EXAMPLE.Test.");
    }

    #[test]
    fn ord_works() {
        // This ordered list is from RFC 4034 § 6.1, which defines the
        // canonical ordering of domain names.
        let names: Vec<Name> = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ]
        .into_iter()
        .map(name)
        .collect();

        for (i, ni) in names.iter().enumerate() {
            for (j, nj) in names.iter().enumerate() {
                assert_eq!(i.cmp(&j), ni.cmp(nj));
            }
        }
    }

    #[test]
    fn fromstr_works() {
        assert_eq!(
            name("example.test.").wire_repr(),
            b"\x07example\x04test\x00"
        );
        assert_eq!(name("."), Name::root());
    }

    #[test]
    fn fromstr_treats_relative_names_as_fully_qualified() {
        assert_eq!(name("example.test"), name("example.test."));
        assert_eq!(name("example.test").to_string(), "example.test.");
    }

    #[test]
    fn fromstr_rejects_bad_input() {
        assert_eq!("".parse::<Name>(), Err(Error::StrEmpty));
        assert_eq!("✈.aero.".parse::<Name>(), Err(Error::StrNotAscii));
        assert_eq!("a.b..c.".parse::<Name>(), Err(Error::NullNonTerminal));
        assert_eq!(
            "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx."
                .parse::<Name>(),
            Err(Error::LabelTooLong)
        );
        assert_eq!(
            "x.".repeat(128).parse::<Name>(),
            Err(Error::NameTooLong)
        );
    }

    #[test]
    fn fromstr_escaping_works() {
        let escaped = name("\\000.\\\\\\..");
        assert_eq!(escaped.wire_repr(), b"\x01\x00\x02\\.\x00");
        assert_eq!(escaped.to_string(), "\\000.\\\\\\..");
    }

    #[test]
    fn fromstr_rejects_invalid_escapes() {
        assert_eq!("\\00".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\00x.".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\256.".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("x\\".parse::<Name>(), Err(Error::InvalidEscape));
    }
}
