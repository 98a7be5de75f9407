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

use path_prefix_trie::InsertError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading configuration and setting up the handler
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be opened
    #[error("failed opening configuration file {path:?}: {source}")]
    FileOpen {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed
    #[error("failed reading configuration file {path:?}: {source}")]
    FileRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration string could not be parsed
    #[error("failed parsing configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A rule was rejected while building the lookup structure
    #[error("invalid cache control rule for prefix {prefix:?}: {source}")]
    Rule {
        /// Prefix of the rejected rule
        prefix: String,
        /// Reason for rejecting the rule
        #[source]
        source: InsertError,
    },
}
