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

//! The [`Node`] structure, a node in the tree behind the
//! [`ReferralCache`](super::ReferralCache).

use std::collections::{hash_map, HashMap};
use std::iter::FusedIterator;

use crate::name::{Label, LabelBuf, Name};

/// A node in the DNS tree. This structure is generic over the type of
/// data to store at each node. Children are keyed by their (leftmost)
/// label, which hashes and compares case-insensitively.
#[derive(Clone, Debug)]
pub struct Node<T> {
    pub name: Name,
    pub children: HashMap<LabelBuf, Node<T>>,
    pub data: T,
}

impl<T: Default> Node<T> {
    /// Creates a new `Node` with the provided name. Its data is set to
    /// `T`'s default, and it initially has no children.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            data: T::default(),
            children: HashMap::new(),
        }
    }

    /// Gets or creates a descendant node corresponding to `name`. Any
    /// nodes between the target descendant node and `self` will also be
    /// created. `level` should be set so that `self` corresponds to the
    /// label `name[level]`.
    pub fn get_or_create_descendant(&mut self, name: &Name, level: usize) -> &mut Self {
        let mut node = self;
        for skip in (0..level).rev() {
            let Some(child_name) = name.superdomain(skip) else {
                break;
            };
            node = node
                .children
                .entry(name[skip].to_owned())
                .or_insert_with(|| Self::new(child_name));
        }
        node
    }
}

impl<T> Node<T> {
    /// Returns the child of this node for `label`, if there is one.
    pub fn child(&self, label: &Label) -> Option<&Self> {
        self.children.get(label)
    }

    /// Returns an iterator over this node and its descendants.
    pub fn iter(&self) -> Iter<T> {
        Iter::new(self)
    }
}

////////////////////////////////////////////////////////////////////////
// NODE ITERATOR                                                      //
////////////////////////////////////////////////////////////////////////

/// A depth-first iterator over a [`Node`] and its descendants. Each node
/// is produced before its children; siblings come in no particular
/// order.
pub struct Iter<'a, T> {
    pending: Vec<&'a Node<T>>,
    siblings: Vec<hash_map::Values<'a, LabelBuf, Node<T>>>,
}

impl<'a, T> Iter<'a, T> {
    fn new(apex: &'a Node<T>) -> Self {
        Self {
            pending: vec![apex],
            siblings: Vec::new(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a Name, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.pending.pop() {
                self.siblings.push(node.children.values());
                return Some((&node.name, &node.data));
            }
            let children = self.siblings.last_mut()?;
            match children.next() {
                Some(child) => self.pending.push(child),
                None => {
                    self.siblings.pop();
                }
            }
        }
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
