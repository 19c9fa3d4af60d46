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

//! Parsing of on-the-wire (possibly compressed) names.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// Parses a compressed name starting at index `start` of `octets`.
/// Pointers are followed. Indices given in pointers are treated as
/// indices of `octets`, so the intention is for an entire DNS message
/// to be passed in `octets`. This is the implementation of
/// [`Name::try_from_compressed`].
pub fn parse_compressed_name(octets: &[u8], start: usize) -> Result<(Name, usize), Error> {
    let mut next_chunk = Some(start);
    let mut wire_len_of_first_chunk = None;

    let mut label_offsets = ArrayVec::<u8, MAX_N_LABELS>::new();
    let mut wire_repr = ArrayVec::<u8, MAX_WIRE_LEN>::new();

    while let Some(chunk_start) = next_chunk {
        let mut index = chunk_start;
        loop {
            let len = *octets.get(index).ok_or(Error::UnexpectedEom)?;
            if len & 0xc0 == 0xc0 {
                next_chunk = Some(parse_pointer(octets, chunk_start, index)?);
                index += 2;
                break;
            } else if len as usize > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }

            let end_of_label = index + len as usize + 1;
            if end_of_label > octets.len() {
                return Err(Error::UnexpectedEom);
            }
            label_offsets
                .try_push(wire_repr.len() as u8)
                .or(Err(Error::NameTooLong))?;
            wire_repr
                .try_extend_from_slice(&octets[index..end_of_label])
                .or(Err(Error::NameTooLong))?;
            index = end_of_label;
            if len == 0 {
                next_chunk = None;
                break;
            }
        }
        if wire_len_of_first_chunk.is_none() {
            wire_len_of_first_chunk = Some(index - chunk_start);
        }
    }

    // The outer loop runs at least once, so the first chunk's length is
    // always recorded.
    let consumed = wire_len_of_first_chunk.unwrap_or_default();
    Ok((Name::from_parts(&wire_repr, &label_offsets), consumed))
}

/// Parses a pointer at `index` in `octets`. This also checks that the
/// pointer refers to an index *earlier* than the start of the chunk it
/// is in (`chunk_start`), which rules out loops.
fn parse_pointer(octets: &[u8], chunk_start: usize, index: usize) -> Result<usize, Error> {
    if index + 1 < octets.len() {
        let pointer = u16::from_be_bytes([octets[index], octets[index + 1]]) & !0xc000;
        if pointer as usize >= chunk_start {
            Err(Error::InvalidPointer)
        } else {
            Ok(pointer as usize)
        }
    } else {
        Err(Error::UnexpectedEom)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uncompressed_name() {
        let octets = b"\x07example\x04test\x00junk";
        let (name, consumed) = parse_compressed_name(octets, 0).unwrap();
        assert_eq!(name, "example.test.".parse().unwrap());
        assert_eq!(consumed, 14);
    }

    #[test]
    fn follows_pointers() {
        // "test." at 0, then "example" + pointer to 0 at 6.
        let octets = b"\x04test\x00\x07example\xc0\x00";
        let (name, consumed) = parse_compressed_name(octets, 6).unwrap();
        assert_eq!(name.to_string(), "example.test.");
        assert_eq!(consumed, 10);

        let (name, consumed) = parse_compressed_name(octets, 14).unwrap();
        assert_eq!(name.to_string(), "test.");
        assert_eq!(consumed, 2);
    }

    #[test]
    fn follows_chained_pointers_to_earlier_chunks() {
        // "net." at 0, "example" + pointer to 0 at 5, then "www" +
        // pointer to 5 at 15. Each pointer moves before the start.
        let octets = b"\x03net\x00\x07example\xc0\x00\x03www\xc0\x05";
        let (name, consumed) = parse_compressed_name(octets, 15).unwrap();
        assert_eq!(name.to_string(), "www.example.net.");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn rejects_forward_and_self_pointers() {
        assert_eq!(
            parse_compressed_name(b"\xc0\x00", 0).err(),
            Some(Error::InvalidPointer)
        );
        assert_eq!(
            parse_compressed_name(b"\x01x\xc0\x04\x00", 0).err(),
            Some(Error::InvalidPointer)
        );
    }

    #[test]
    fn rejects_truncated_names() {
        assert_eq!(
            parse_compressed_name(b"\x07example\x04tes", 0).err(),
            Some(Error::UnexpectedEom)
        );
        assert_eq!(
            parse_compressed_name(b"\x07example", 0).err(),
            Some(Error::UnexpectedEom)
        );
        assert_eq!(
            parse_compressed_name(b"\x00\xc0", 1).err(),
            Some(Error::UnexpectedEom)
        );
    }

    #[test]
    fn rejects_long_labels() {
        let mut octets = vec![64];
        octets.extend_from_slice(&[b'x'; 64]);
        octets.push(0);
        assert_eq!(
            parse_compressed_name(&octets, 0).err(),
            Some(Error::LabelTooLong)
        );
    }

    #[test]
    fn rejects_long_names() {
        let mut octets = Vec::new();
        for _ in 0..128 {
            octets.extend_from_slice(b"\x01x");
        }
        octets.push(0);
        assert_eq!(
            parse_compressed_name(&octets, 0).err(),
            Some(Error::NameTooLong)
        );
    }
}
