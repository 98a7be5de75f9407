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

use thiserror::Error;

/// Reasons for rejecting a prefix registration
///
/// A rejected registration leaves the builder unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The prefix is empty, registering it would match everything.
    #[error("an empty prefix cannot be registered")]
    EmptyPrefix,

    /// A value has been registered for this exact prefix already.
    #[error("a value is already registered for this prefix")]
    DuplicateRule,
}
