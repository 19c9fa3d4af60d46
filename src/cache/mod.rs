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

//! The resolver's caches.
//!
//! The [`ReferralCache`] holds delegation information (NS sets and
//! nameserver addresses) and is consulted to find where to begin or
//! continue a descent. The [`AnswerCache`] holds final answers, so that
//! a repeated question needs no network activity at all.

mod answer;
mod node;
mod referral;
pub use answer::{AnswerCache, AnswerEntry};
pub use referral::{ReferralCache, ReferralEntry, ReferralValue, RootHint, ROOT_HINTS};
