// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Path prefix trie
//!
//! A compressed prefix tree mapping registered byte prefixes (typically request paths) to
//! arbitrary values. Lookups return the value of the longest registered prefix of the query, in
//! time proportional to the length of the query rather than the number of registered prefixes.
//!
//! Matching is purely byte-based: `/api` is a prefix of both `/api/v2` and `/apis`. There are no
//! wildcards and no case folding.
//!
//! The trie is set up in two phases. All prefixes are inserted into a [`PrefixTrieBuilder`],
//! then [`PrefixTrieBuilder::build`] compiles them into a read-only [`PrefixTrie`]:
//!
//! ```rust
//! use path_prefix_trie::{InsertError, PrefixTrie};
//!
//! let mut builder = PrefixTrie::builder();
//! builder.insert("/api", "API").unwrap();
//! builder.insert("/api/v2", "API v2").unwrap();
//! assert_eq!(builder.insert("/api", "again"), Err(InsertError::DuplicateRule));
//!
//! let trie = builder.build();
//! assert_eq!(trie.lookup("/api/v2/users").as_deref(), Some(&"API v2"));
//! assert_eq!(trie.lookup("/api/v1/users").as_deref(), Some(&"API"));
//! assert_eq!(trie.lookup("/health").as_deref(), None);
//! ```
//!
//! The compiled trie never changes, so it can be shared between threads without locking.

mod error;
mod trie;

pub use error::InsertError;
pub use trie::{LookupResult, PrefixTrie, PrefixTrieBuilder};
