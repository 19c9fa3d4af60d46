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

//! Provides the [`Type`] and [`Class`] structures.
//!
//! Both are `u16` wrappers whose textual forms are either a registered
//! mnemonic or the generic `TYPEnnn`/`CLASSnnn` form of [RFC 3597 § 5].
//! Their boilerplate is generated by the `define_mnemonics!` macro.
//!
//! [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5

use std::fmt;
use std::str::FromStr;

use crate::util::Caseless;

/// Defines a `u16` wrapper with associated constants, conversions, and
/// mnemonic-aware [`Display`](fmt::Display) and [`FromStr`]
/// implementations. `$generic` is the RFC 3597 prefix used for values
/// without a mnemonic.
macro_rules! define_mnemonics {
    (
        $(#[$meta:meta])*
        $wrapper:ident, $generic:literal, $what:literal {
            $($constant:ident = $value:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
        pub struct $wrapper(u16);

        impl $wrapper {
            $(pub const $constant: Self = Self($value);)*
        }

        impl From<u16> for $wrapper {
            fn from(value: u16) -> Self {
                Self(value)
            }
        }

        impl From<$wrapper> for u16 {
            fn from(wrapper: $wrapper) -> Self {
                wrapper.0
            }
        }

        impl FromStr for $wrapper {
            type Err = &'static str;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                $(
                    if Caseless(text) == Caseless(stringify!($constant)) {
                        return Ok(Self::$constant);
                    }
                )*
                match text.get(0..$generic.len()) {
                    Some(prefix) if prefix.eq_ignore_ascii_case($generic) => text
                        [$generic.len()..]
                        .parse::<u16>()
                        .map(Self)
                        .or(Err(concat!($what, " value is not a valid unsigned 16-bit integer"))),
                    _ => Err(concat!("unknown ", $what)),
                }
            }
        }

        impl fmt::Debug for $wrapper {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{self}")
            }
        }

        impl fmt::Display for $wrapper {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match *self {
                    $(Self::$constant => f.write_str(stringify!($constant)),)*
                    Self(value) => write!(f, concat!($generic, "{}"), value),
                }
            }
        }
    };
}

define_mnemonics! {
    /// Represents the RR type of a DNS record.
    ///
    /// Constants are provided for the types a resolver commonly sees.
    /// Any other value passes through opaquely and is displayed as
    /// `TYPEnnn`.
    Type, "TYPE", "type" {
        A = 1,
        NS = 2,
        CNAME = 5,
        SOA = 6,
        PTR = 12,
        HINFO = 13,
        MX = 15,
        TXT = 16,
        AAAA = 28,
        SRV = 33,
        DNAME = 39,
        OPT = 41,
        DS = 43,
        RRSIG = 46,
        NSEC = 47,
        DNSKEY = 48,
        NSEC3 = 50,
        ANY = 255,
    }
}

define_mnemonics! {
    /// Represents a class in the DNS. The only class in common use is
    /// [`IN`](Class::IN).
    Class, "CLASS", "class" {
        IN = 1,
        CH = 3,
        HS = 4,
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics_parse_case_insensitively() {
        assert_eq!("cname".parse::<Type>(), Ok(Type::CNAME));
        assert_eq!("Aaaa".parse::<Type>(), Ok(Type::AAAA));
        assert_eq!("in".parse::<Class>(), Ok(Class::IN));
        assert_eq!("BOGUS".parse::<Type>(), Err("unknown type"));
    }

    #[test]
    fn generic_forms_follow_rfc3597() {
        // 65280 is from the private use range, so it has no mnemonic.
        assert_eq!(Type::from(0xff00).to_string(), "TYPE65280");
        assert_eq!(Class::from(0xff00).to_string(), "CLASS65280");
        assert_eq!("TYPE1".parse::<Type>(), Ok(Type::A));
        assert_eq!("type65280".parse::<Type>().map(u16::from), Ok(65280));
        assert_eq!("CLASS1".parse::<Class>(), Ok(Class::IN));
        assert!("TYPE65536".parse::<Type>().is_err());
    }

    #[test]
    fn mnemonics_display() {
        assert_eq!(Type::NS.to_string(), "NS");
        assert_eq!(Type::DNSKEY.to_string(), "DNSKEY");
        assert_eq!(Class::CH.to_string(), "CH");
    }
}
