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

//! Custom deserialization code for the configuration

use http::header::{HeaderName, HeaderValue};
use serde::de::{Deserializer, Error as _, MapAccess, Visitor};
use serde::Deserialize;

use crate::configuration::HeaderSet;

/// A header value in the configuration, either a single string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<'de> Deserialize<'de> for HeaderSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VisitorImpl;

        impl<'de> Visitor<'de> for VisitorImpl {
            type Value = HeaderSet;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a map of HTTP header names to values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut result = HeaderSet::default();
                while let Some(field) = map.next_key::<String>()? {
                    let name = HeaderName::try_from(field.as_str())
                        .map_err(|_| A::Error::custom(format!("Invalid header name {field:?}")))?;
                    for value in map.next_value::<OneOrMany>()?.into_vec() {
                        let value = HeaderValue::try_from(value).map_err(|_| {
                            A::Error::custom(format!("Invalid value for header {field:?}"))
                        })?;
                        result.append(name.clone(), value);
                    }
                }
                Ok(result)
            }
        }

        deserializer.deserialize_map(VisitorImpl)
    }
}
