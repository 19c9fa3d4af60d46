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

//! Deciding what a nameserver's response means for the descent.

use crate::cache::{ReferralCache, ReferralValue};
use crate::message::{Message, Rcode};
use crate::name::Name;
use crate::rr::{Rdata, Rrset, Type};

/// What a response means for the question that was asked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum Classification {
    /// The nameserver returned an error RCODE. The response is final.
    Error,

    /// The answer section has the answer. The response is final.
    Answer,

    /// The answer section has a CNAME, whose target must be resolved.
    Alias { cname: Rrset, target: Name },

    /// The nameserver returned an SOA in the authority section, so the
    /// name or data does not exist. The response is final.
    Negative,

    /// The response is a referral; its contents are now in the
    /// referral cache.
    Referral,
}

/// Classifies a response. Unless the response is final on account of its
/// RCODE or answer section, every non-SOA authority RRset is stored in
/// `referrals`, and for referrals so are the A and AAAA RRsets of the
/// additional section.
pub(super) fn classify(response: &Message, referrals: &mut ReferralCache) -> Classification {
    if response.rcode != Rcode::NoError {
        return Classification::Error;
    }

    if !response.answer.is_empty() {
        let cname = response
            .answer
            .iter()
            .find(|rrset| rrset.rr_type == Type::CNAME);
        let target = cname.and_then(|rrset| rrset.rdatas.iter().filter_map(Rdata::cname_target).min());
        return match (cname, target) {
            (Some(cname), Some(target)) => Classification::Alias {
                cname: cname.clone(),
                target: target.clone(),
            },
            _ => Classification::Answer,
        };
    }

    let mut soa_found = false;
    for rrset in &response.authority {
        if rrset.rr_type == Type::SOA {
            soa_found = true;
        } else {
            referrals.put(rrset.owner.clone(), rrset.rr_type, referral_values(rrset));
        }
    }
    if soa_found {
        return Classification::Negative;
    }

    for rrset in response
        .additional
        .iter()
        .filter(|rrset| rrset.rr_type == Type::A || rrset.rr_type == Type::AAAA)
    {
        referrals.put(rrset.owner.clone(), rrset.rr_type, referral_values(rrset));
    }
    Classification::Referral
}

/// Converts the records of an RRset into referral cache values.
fn referral_values(rrset: &Rrset) -> Vec<ReferralValue> {
    rrset
        .rdatas
        .iter()
        .map(|rdata| match rdata {
            Rdata::Ns(nsdname) => ReferralValue::Name(nsdname.clone()),
            Rdata::A(address) => ReferralValue::Address((*address).into()),
            Rdata::Aaaa(address) => ReferralValue::Address((*address).into()),
            other => ReferralValue::Text(other.to_string()),
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
