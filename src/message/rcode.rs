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

//! Implementation of the [`Rcode`] type.

use std::fmt;

/// The RCODE value of the DNS message header.
///
/// [RFC 1035 § 4.1.1] defines the RCODE field as a four-bit field
/// indicating success or failure in a DNS response. The first six
/// values are original to RFC 1035, while the rest have been added in
/// subsequent extensions of the DNS. The names given to each member of
/// the `Rcode` enumeration are those listed by the IANA.
///
/// Extended RCODEs carried in the OPT pseudo-RR are not represented.
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrset,
    NxRrset,
    NotAuth,
    NotZone,
    DsoTypeNi,
    Unassigned(u8),
}

/// Converts the low four bits of a `u8` (the width of the header field)
/// into an `Rcode`; the upper bits are ignored.
impl From<u8> for Rcode {
    fn from(value: u8) -> Self {
        match value & 0x0f {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NxDomain,
            4 => Self::NotImp,
            5 => Self::Refused,
            6 => Self::YxDomain,
            7 => Self::YxRrset,
            8 => Self::NxRrset,
            9 => Self::NotAuth,
            10 => Self::NotZone,
            11 => Self::DsoTypeNi,
            other => Self::Unassigned(other),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NxDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YxDomain => 6,
            Rcode::YxRrset => 7,
            Rcode::NxRrset => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::DsoTypeNi => 11,
            Rcode::Unassigned(v) => v & 0x0f,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NoError => f.write_str("NOERROR"),
            Self::FormErr => f.write_str("FORMERR"),
            Self::ServFail => f.write_str("SERVFAIL"),
            Self::NxDomain => f.write_str("NXDOMAIN"),
            Self::NotImp => f.write_str("NOTIMP"),
            Self::Refused => f.write_str("REFUSED"),
            Self::YxDomain => f.write_str("YXDOMAIN"),
            Self::YxRrset => f.write_str("YXRRSET"),
            Self::NxRrset => f.write_str("NXRRSET"),
            Self::NotAuth => f.write_str("NOTAUTH"),
            Self::NotZone => f.write_str("NOTZONE"),
            Self::DsoTypeNi => f.write_str("DSOTYPENI"),
            Self::Unassigned(v) => write!(f, "RCODE{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcode_conversion_uses_low_four_bits() {
        assert_eq!(Rcode::from(3), Rcode::NxDomain);
        assert_eq!(Rcode::from(0xf3), Rcode::NxDomain);
        assert_eq!(Rcode::from(13), Rcode::Unassigned(13));
        for value in 0..16 {
            assert_eq!(u8::from(Rcode::from(value)), value);
        }
    }

    #[test]
    fn rcode_displays_iana_mnemonic() {
        assert_eq!(Rcode::ServFail.to_string(), "SERVFAIL");
        assert_eq!(Rcode::Unassigned(14).to_string(), "RCODE14");
    }
}
