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

//! Implementation of the [`Label`] and [`LabelBuf`] types.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use super::{Error, MAX_LABEL_LEN};

////////////////////////////////////////////////////////////////////////
// LABELS                                                             //
////////////////////////////////////////////////////////////////////////

/// The label given to a node in the Domain Name System's tree
/// structure.
///
/// `Label` is a wrapper over `[u8]` that can only be constructed if the
/// slice is a valid DNS label (no more than 63 octets long). Per
/// [RFC 1034 § 3.1] (clarified by RFC 4343), comparison and hashing are
/// ASCII-case-insensitive, while case is preserved in the internal
/// representation.
///
/// [RFC 1034 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1034#section-3.1
#[repr(transparent)]
pub struct Label {
    octets: [u8],
}

#[allow(clippy::len_without_is_empty)]
impl Label {
    /// Wraps up a `&[u8]` as a `Label` without checking its length. To
    /// be used only within the parent module, after checking the length
    /// manually.
    pub(super) fn from_unchecked(octets: &[u8]) -> &Self {
        // SAFETY: Label is a repr(transparent) wrapper over [u8].
        unsafe { &*(octets as *const [u8] as *const Label) }
    }

    /// Returns the number of octets in this `Label`.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the octets of this `Label`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a Label {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else {
            Ok(Label::from_unchecked(octets))
        }
    }
}

impl ToOwned for Label {
    type Owned = LabelBuf;

    fn to_owned(&self) -> Self::Owned {
        LabelBuf::from_unchecked(self.octets())
    }
}

/// When a `Label` is displayed, periods, backslashes, and octets that
/// are not ASCII graphic characters are escaped in accordance with
/// RFC 1035 § 5.1 and RFC 4343 § 2.1.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &octet in self.octets() {
            match octet {
                b'.' => f.write_str("\\.")?,
                b'\\' => f.write_str("\\\\")?,
                _ if octet.is_ascii_graphic() => write!(f, "{}", octet as char)?,
                _ => write!(f, "\\{:03}", octet)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.octets().eq_ignore_ascii_case(other.octets())
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Labels are ordered "as unsigned left-justified octet strings," with
/// uppercase ASCII letters treated as lowercase ([RFC 4034 § 6.1]).
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        let lowered = |octet: &u8| octet.to_ascii_lowercase();
        self.octets
            .iter()
            .map(lowered)
            .cmp(other.octets.iter().map(lowered))
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with the case-insensitive PartialEq above.
        state.write_u8(self.octets.len() as u8);
        for octet in self.octets() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// LABEL BUFFERS                                                      //
////////////////////////////////////////////////////////////////////////

/// A fixed-size buffer capable of holding any valid DNS label. It
/// dereferences to a [`Label`], and compares and hashes the same way.
///
/// `LabelBuf`s key the children of each node in the referral cache's
/// tree, so lookups can borrow a `&Label` straight out of a
/// [`Name`](super::Name).
#[derive(Clone)]
pub struct LabelBuf {
    len: u8,
    data: [u8; MAX_LABEL_LEN],
}

impl LabelBuf {
    /// Constructs a `LabelBuf` from the given octets. The length is
    /// checked only in an assertion; the caller must ensure it's valid.
    fn from_unchecked(octets: &[u8]) -> Self {
        assert!(octets.len() <= MAX_LABEL_LEN);
        let mut buf = LabelBuf {
            len: octets.len() as u8,
            data: [0; MAX_LABEL_LEN],
        };
        buf.data[..octets.len()].copy_from_slice(octets);
        buf
    }
}

impl TryFrom<&[u8]> for LabelBuf {
    type Error = Error;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        <&Label>::try_from(octets).map(ToOwned::to_owned)
    }
}

impl Deref for LabelBuf {
    type Target = Label;

    fn deref(&self) -> &Self::Target {
        Label::from_unchecked(&self.data[..self.len as usize])
    }
}

impl Borrow<Label> for LabelBuf {
    fn borrow(&self) -> &Label {
        self.deref()
    }
}

impl fmt::Display for LabelBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.deref().fmt(f)
    }
}

impl fmt::Debug for LabelBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.deref().fmt(f)
    }
}

// For use in HashMaps, Eq and Hash must be the same as for the
// corresponding Label.
impl PartialEq for LabelBuf {
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl Eq for LabelBuf {}

impl Hash for LabelBuf {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.deref().hash(state)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn label_try_from_slice_checks_length() {
        let octets = [b'x'; MAX_LABEL_LEN + 1];
        assert!(<&Label>::try_from(&octets[..MAX_LABEL_LEN]).is_ok());
        assert_eq!(
            <&Label>::try_from(&octets[..]).err(),
            Some(Error::LabelTooLong)
        );
        assert_eq!(
            LabelBuf::try_from(&octets[..]).err(),
            Some(Error::LabelTooLong)
        );
    }

    #[test]
    fn labels_compare_and_hash_case_insensitively() {
        let lower = <&Label>::try_from(&b"example"[..]).unwrap();
        let mixed = <&Label>::try_from(&b"ExAmPlE"[..]).unwrap();
        assert_eq!(lower, mixed);
        assert_eq!(hash_of(lower), hash_of(mixed));
        assert_eq!(hash_of(lower), hash_of(&lower.to_owned()));
        assert_eq!(lower.to_owned(), mixed.to_owned());
    }

    #[test]
    fn labels_order_canonically() {
        let a = <&Label>::try_from(&b"a"[..]).unwrap();
        let upper_z = <&Label>::try_from(&b"Z"[..]).unwrap();
        let zabc = <&Label>::try_from(&b"zABC"[..]).unwrap();
        assert!(a < upper_z);
        assert!(upper_z < zabc);
        assert!(<&Label>::try_from(&b""[..]).unwrap() < a);
    }

    #[test]
    fn labels_display_with_escapes() {
        let label = <&Label>::try_from(&b"a.b\\c\x07"[..]).unwrap();
        assert_eq!(label.to_string(), "a\\.b\\\\c\\007");
    }
}
