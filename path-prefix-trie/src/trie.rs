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

//! The compressed prefix tree. The design goals are:
//!
//! * Memory-efficient data storage after the setup phase
//! * Zero allocation and copying during lookup
//! * Lookup cost depending only on the length of the looked up path
//! * Longest registered prefix wins, matching is byte-based

use std::{
    fmt::{Debug, DebugMap},
    ops::{Deref, Range},
};

use crate::InsertError;

/// Calculates the length of the longest common prefix of two labels.
pub(crate) fn common_prefix_length(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(a, b)| a == b).count()
}

/// The compiled prefix trie
///
/// To use memory more efficiently and to improve locality, this stores all data in flat vectors.
/// `nodes` lists all nodes, ordered in such a way that children of one node are always stored
/// consecutively and sorted by the first byte of their label. A node stores an index range
/// referring to its children. `dispatch` runs parallel to `nodes` and holds the first label byte of
/// each node, so that `dispatch[node.children]` is the dispatch table of a node.
///
/// Labels are stored in a single byte vector, nodes refer to their label via an index range.
/// Values are stored separately, nodes only keep an optional index into `values`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrefixTrie<Value> {
    nodes: Vec<Node>,
    dispatch: Vec<u8>,
    labels: Vec<u8>,
    values: Vec<Value>,
}

/// Trie lookup result, will dereference into the value
#[derive(Debug, Clone)]
pub struct LookupResult<'a, Value> {
    value: &'a Value,
    prefix_len: usize,
}

impl<'a, Value> LookupResult<'a, Value> {
    fn new(value: &'a Value, prefix_len: usize) -> Self {
        Self { value, prefix_len }
    }

    /// Length of the registered prefix that matched, in bytes. The matched prefix is
    /// `&path[..result.prefix_len()]`.
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Retrieves the inner value
    ///
    /// Unlike dereferencing, this propagates lifetimes properly
    pub fn as_value(&self) -> &'a Value {
        self.value
    }
}

impl<Value> Deref for LookupResult<'_, Value> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        self.value
    }
}

/// A compiled trie node
///
/// The label is the route to the node from its parent node. Only the root node has an empty label.
///
/// The value is optional. Nodes without a value serve merely as a routing point for multiple child
/// nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    label: Range<usize>,
    value: Option<usize>,
    children: Range<usize>,
}

impl Node {
    const EMPTY: Node = Node {
        label: 0..0,
        value: None,
        children: 0..0,
    };
}

impl<Value> PrefixTrie<Value> {
    /// Index of the root node in the `nodes` vector, this is where lookup always starts.
    const ROOT: usize = 0;

    /// Returns a builder instance that can be used to set up the trie.
    pub fn builder() -> PrefixTrieBuilder<Value> {
        PrefixTrieBuilder::default()
    }

    /// Number of registered prefixes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks whether no prefixes have been registered
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up the value registered for the longest prefix of `path`.
    ///
    /// Returns `None` if no registered prefix is a prefix of `path`.
    pub fn lookup(&self, path: impl AsRef<[u8]>) -> Option<LookupResult<'_, Value>> {
        let mut path = path.as_ref();
        let mut consumed = 0;
        let mut best_match = None;
        let mut current = self.nodes.get(Self::ROOT)?;
        loop {
            let label = &self.labels[current.label.clone()];
            let length = common_prefix_length(label, path);
            if length < label.len() {
                // Path diverges within this label
                break;
            }

            path = &path[length..];
            consumed += length;
            if let Some(value) = current.value {
                best_match = Some((value, consumed));
            }

            let Some(next) = path.first() else {
                break;
            };

            let children = current.children.clone();
            match self.dispatch[children.clone()]
                .iter()
                .position(|first| first == next)
            {
                Some(position) => current = self.nodes.get(children.start + position)?,
                None => break,
            }
        }

        best_match.and_then(|(index, prefix_len)| {
            Some(LookupResult::new(self.values.get(index)?, prefix_len))
        })
    }

    /// Adds all prefixes with a value to the map, in byte order. Each stack entry holds a node
    /// index and the length of its parent's prefix within `prefix`.
    fn fmt_entries(&self, f: &mut DebugMap<'_, '_>)
    where
        Value: Debug,
    {
        let mut prefix = Vec::new();
        let mut stack = vec![(Self::ROOT, 0)];
        while let Some((index, parent_len)) = stack.pop() {
            let node = &self.nodes[index];
            prefix.truncate(parent_len);
            prefix.extend_from_slice(&self.labels[node.label.clone()]);
            if let Some(value) = node.value {
                f.entry(&String::from_utf8_lossy(&prefix), &self.values[value]);
            }

            stack.extend(node.children.clone().rev().map(|child| (child, prefix.len())));
        }
    }
}

impl<Value> Default for PrefixTrie<Value> {
    fn default() -> Self {
        PrefixTrieBuilder::default().build()
    }
}

impl<Value> Debug for PrefixTrie<Value>
where
    Value: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        if !self.nodes.is_empty() {
            self.fmt_entries(&mut map);
        }
        map.finish()
    }
}

/// A trie builder used to set up a [`PrefixTrie`] instance
///
/// In addition to setting up the trie structure, this will keep track of the required allocation
/// size for the trie vectors. Inserting is not meant to happen concurrently, the compiled trie is
/// what gets shared.
#[derive(Debug)]
pub struct PrefixTrieBuilder<Value> {
    nodes: usize,
    labels: usize,
    values: usize,
    root: BuilderNode<Value>,
}

/// A builder node
///
/// Unlike `Node` this data structure owns its label, children and value directly. `indices`
/// contains the first label byte of each child, in the same order as `children`.
#[derive(Debug)]
struct BuilderNode<Value> {
    label: Vec<u8>,
    indices: Vec<u8>,
    children: Vec<BuilderNode<Value>>,
    value: Option<Value>,
}

impl<Value> BuilderNode<Value> {
    fn new(label: Vec<u8>, value: Option<Value>) -> Self {
        Self {
            label,
            indices: Vec::new(),
            children: Vec::new(),
            value,
        }
    }

    /// Finds the child whose label starts with the given byte.
    fn child_position(&self, first: u8) -> Option<usize> {
        self.indices.iter().position(|b| *b == first)
    }

    /// Shortens the label of this node to `at` bytes. The remainder of the label moves into a new
    /// child node, along with all children and the value of this node.
    fn split(&mut self, at: usize) {
        let child = BuilderNode {
            label: self.label.split_off(at),
            indices: std::mem::take(&mut self.indices),
            children: std::mem::take(&mut self.children),
            value: self.value.take(),
        };
        self.indices.extend(child.label.first());
        self.children.push(child);
    }

    fn push_child(&mut self, label: Vec<u8>, value: Value) {
        self.indices.extend(label.first());
        self.children.push(BuilderNode::new(label, Some(value)));
    }
}

impl<Value> Default for PrefixTrieBuilder<Value> {
    fn default() -> Self {
        Self {
            nodes: 1,
            labels: 0,
            values: 0,
            root: BuilderNode::new(Vec::new(), None),
        }
    }
}

impl<Value> PrefixTrieBuilder<Value> {
    /// Registers a value for the given prefix.
    ///
    /// Empty prefixes and prefixes that already have a value are rejected. The builder remains
    /// unchanged in that case.
    pub fn insert(&mut self, prefix: impl AsRef<[u8]>, value: Value) -> Result<(), InsertError> {
        let mut prefix = prefix.as_ref();
        if prefix.is_empty() {
            return Err(InsertError::EmptyPrefix);
        }

        let mut current = &mut self.root;
        loop {
            let length = common_prefix_length(&current.label, prefix);
            if length < current.label.len() {
                // Partial match, the label of the current node needs to be split
                current.split(length);
                self.nodes += 1;
            }

            prefix = &prefix[length..];
            let Some(&next) = prefix.first() else {
                break;
            };

            match current.child_position(next) {
                Some(position) => current = &mut current.children[position],
                None => {
                    self.nodes += 1;
                    self.labels += prefix.len();
                    self.values += 1;
                    current.push_child(prefix.to_vec(), value);
                    return Ok(());
                }
            }
        }

        if current.value.is_some() {
            return Err(InsertError::DuplicateRule);
        }
        current.value = Some(value);
        self.values += 1;
        Ok(())
    }

    /// Number of prefixes registered so far
    pub fn len(&self) -> usize {
        self.values
    }

    /// Checks whether no prefixes have been registered yet
    pub fn is_empty(&self) -> bool {
        self.values == 0
    }

    /// Transfers builder nodes into the trie, starting with the root node.
    ///
    /// When a node is transferred, slots for all its children are allocated consecutively, sorted
    /// by their first byte. The children are then queued up to be transferred into these slots.
    fn into_trie_nodes(root: BuilderNode<Value>, trie: &mut PrefixTrie<Value>) {
        let mut queue = vec![(root, PrefixTrie::<Value>::ROOT)];
        while let Some((mut current, index)) = queue.pop() {
            let label_start = trie.labels.len();
            trie.labels.append(&mut current.label);
            trie.nodes[index].label = label_start..trie.labels.len();

            if let Some(value) = current.value {
                trie.nodes[index].value = Some(trie.values.len());
                trie.values.push(value);
            }

            let mut children: Vec<_> = current.indices.into_iter().zip(current.children).collect();
            children.sort_by_key(|(first, _)| *first);

            let child_index = trie.nodes.len();
            trie.nodes[index].children = child_index..child_index + children.len();
            for (offset, (first, child)) in children.into_iter().enumerate() {
                trie.nodes.push(Node::EMPTY);
                trie.dispatch.push(first);
                queue.push((child, child_index + offset));
            }
        }
    }

    /// Translates the builder data into a [`PrefixTrie`] instance.
    pub fn build(self) -> PrefixTrie<Value> {
        let mut trie = PrefixTrie {
            nodes: Vec::with_capacity(self.nodes),
            dispatch: Vec::with_capacity(self.nodes),
            labels: Vec::with_capacity(self.labels),
            values: Vec::with_capacity(self.values),
        };

        // The root node is never dispatched to, its dispatch byte is a placeholder.
        trie.nodes.push(Node::EMPTY);
        trie.dispatch.push(0);
        Self::into_trie_nodes(self.root, &mut trie);

        debug_assert_eq!(trie.nodes.len(), self.nodes);
        debug_assert_eq!(trie.labels.len(), self.labels);
        debug_assert_eq!(trie.values.len(), self.values);

        trie
    }
}
