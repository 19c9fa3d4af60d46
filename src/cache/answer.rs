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

//! Implementation of the [`AnswerCache`].

use std::collections::BTreeMap;

use log::debug;

use crate::name::Name;
use crate::rr::Type;

/// The rendered answers known for a single name, keyed by type.
pub type AnswerEntry = BTreeMap<Type, String>;

/// The cache of final answers, already rendered to text.
///
/// Names are kept in canonical order so that printing the cache is
/// deterministic. Entries never expire.
#[derive(Clone, Debug, Default)]
pub struct AnswerCache {
    entries: BTreeMap<Name, AnswerEntry>,
}

impl AnswerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the rendered answer for `name` and `rr_type`.
    pub fn get(&self, name: &Name, rr_type: Type) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|entry| entry.get(&rr_type))
            .map(String::as_str)
    }

    /// Stores the rendered answer for `name` and `rr_type`, replacing
    /// any previous one.
    pub fn insert(&mut self, name: Name, rr_type: Type, answer: String) {
        debug!("Answer cache: {} {} <- {} octet(s)", name, rr_type, answer.len());
        self.entries.entry(name).or_default().insert(rr_type, answer);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &AnswerEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
