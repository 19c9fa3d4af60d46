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

//! Implementation of the [`NameBuilder`] structure.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// A facility to build [`Name`]s one octet or label at a time.
///
/// The `NameBuilder` assembles the on-the-wire representation and label
/// offsets of a [`Name`] in fixed-size buffers large enough for any
/// valid name, so only the finished `Name` touches the heap.
///
/// A new `NameBuilder` starts with a single null label; finishing it
/// right away yields the root:
///
/// ```
/// use quarry::name::{Name, NameBuilder};
/// assert_eq!(NameBuilder::new().finish().unwrap(), Name::root());
/// ```
///
/// Octets are appended to the current label with
/// [`NameBuilder::try_push`], and [`NameBuilder::next_label`] starts a new label. Unlike master-file
/// parsing, the builder has no notion of an origin: when
/// [`NameBuilder::finish`] is called on a name whose last label is not
/// null, the null label is appended, so the result is always fully
/// qualified.
///
/// ```
/// use quarry::name::NameBuilder;
/// let mut builder = NameBuilder::new();
/// for octet in *b"test" {
///     builder.try_push(octet).unwrap();
/// }
/// assert_eq!(builder.finish().unwrap(), "test.".parse().unwrap());
/// ```
pub struct NameBuilder {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    label_start: usize,
    label_len: u8,
}

impl NameBuilder {
    /// Constructs a new `NameBuilder`, which initially contains a
    /// single null label.
    pub fn new() -> Self {
        let mut wire_repr = ArrayVec::new();
        let mut label_offsets = ArrayVec::new();
        wire_repr.push(0);
        label_offsets.push(0);
        Self {
            wire_repr,
            label_offsets,
            label_start: 0,
            label_len: 0,
        }
    }

    /// Returns whether the name built so far ends with the null label.
    pub fn is_fully_qualified(&self) -> bool {
        self.label_len == 0
    }

    /// Tries to add the given octet to the current label. This fails if
    /// doing so would make the label or name too long, in which case
    /// the `NameBuilder`'s state is unchanged.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        if self.label_len as usize >= MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else if self.wire_repr.try_push(octet).is_ok() {
            self.label_len += 1;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Finishes the current label and starts a new one. Only the last
    /// label of a name may be null, so this fails if the current label
    /// is null.
    pub fn next_label(&mut self) -> Result<(), Error> {
        if self.is_fully_qualified() {
            Err(Error::NullNonTerminal)
        } else if self.wire_repr.is_full() {
            Err(Error::NameTooLong)
        } else {
            self.wire_repr[self.label_start] = self.label_len;
            self.label_start = self.wire_repr.len();
            self.label_len = 0;

            // Neither push can fail: wire_repr is not full, and since no
            // previous label is null, fewer than MAX_N_LABELS labels
            // have been started.
            self.wire_repr.push(0);
            self.label_offsets.push(self.label_start as u8);
            Ok(())
        }
    }

    /// Consumes the `NameBuilder` and returns the [`Name`] built. If
    /// the current label is not null, it is finished and the null label
    /// is appended.
    pub fn finish(mut self) -> Result<Name, Error> {
        if !self.is_fully_qualified() {
            self.next_label()?;
        }
        Ok(Name::from_parts(&self.wire_repr, &self.label_offsets))
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
