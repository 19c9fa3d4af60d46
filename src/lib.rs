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

//! Quarry is an iterative DNS resolver.
//!
//! Given a domain name and a record type, a
//! [`Resolver`](resolver::Resolver) walks the DNS delegation hierarchy
//! from the root hints down to an authoritative nameserver, following
//! referrals and CNAMEs and caching what it learns along the way.

pub mod cache;
pub mod message;
pub mod name;
pub mod resolver;
pub mod rr;
pub mod transport;
mod util;
