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

//! Structures required to deserialize Cache Control Module configuration from YAML configuration
//! files.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use log::trace;
use serde::Deserialize;
use std::ops::Deref;
use std::path::Path;

use crate::{Error, FromYaml};

/// A set of HTTP headers to be applied to a response
///
/// The same header name can be present with multiple values, these will all be sent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    headers: HeaderMap,
}

impl HeaderSet {
    /// Adds a value for a header, keeping any values already present for this name.
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Applies the headers to a response header map.
    ///
    /// All existing values of the headers contained in this set are removed from `target` first.
    /// Headers not contained in this set are left unchanged.
    pub fn apply_to(&self, target: &mut HeaderMap) {
        for name in self.headers.keys() {
            target.remove(name);
            for value in self.headers.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }
    }
}

impl Deref for HeaderSet {
    type Target = HeaderMap;

    fn deref(&self) -> &Self::Target {
        &self.headers
    }
}

impl From<HeaderMap> for HeaderSet {
    fn from(headers: HeaderMap) -> Self {
        Self { headers }
    }
}

impl<const N: usize> TryFrom<[(&str, &str); N]> for HeaderSet {
    type Error = http::Error;

    fn try_from(value: [(&str, &str); N]) -> Result<Self, Self::Error> {
        let mut result = Self::default();
        for (name, value) in value {
            result.append(HeaderName::try_from(name)?, HeaderValue::try_from(value)?);
        }
        Ok(result)
    }
}

/// A single rule: headers to be applied to all paths starting with `prefix`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheRule {
    /// Path prefix the rule applies to, matched byte by byte
    pub prefix: String,

    /// Headers to be applied to the response
    #[serde(default)]
    pub headers: HeaderSet,
}

/// The rules of the Cache Control Module
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheControlRules {
    /// Path prefix rules, in no particular order
    pub rules: Vec<CacheRule>,

    /// Headers to apply if no rule matches the request path
    pub no_match_headers: Option<HeaderSet>,
}

impl CacheControlRules {
    /// Adds the rules from another configuration. The `no_match_headers` setting of the other
    /// configuration takes precedence if present.
    pub fn merge_with(&mut self, other: Self) {
        self.rules.extend(other.rules);
        if other.no_match_headers.is_some() {
            self.no_match_headers = other.no_match_headers;
        }
    }
}

/// Configuration file settings of the Cache Control Module
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheControlConf {
    /// Cache control rules
    pub cache_control: CacheControlRules,
}

impl CacheControlConf {
    /// Loads and merges configuration from multiple YAML files.
    pub fn load_from_files<P>(files: &[P]) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut conf = Self::default();
        for file in files {
            trace!("Loading configuration file {:?}", file.as_ref());
            conf.cache_control
                .merge_with(Self::load_from_yaml(file)?.cache_control);
        }
        Ok(conf)
    }
}
