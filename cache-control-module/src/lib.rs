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

//! # Cache Control Module
//!
//! This crate adds configured HTTP headers to responses depending on the path of the request.
//! Typically this is used to send different `Cache-Control` headers for static assets, API
//! responses and everything else, but any header can be configured.
//!
//! Each set of headers is paired with a path prefix. For every request, the rule with the longest
//! prefix of the request path is selected. If no rule matches, the optional `no_match_headers` are
//! used instead. A configuration could look like this:
//!
//! ```yaml
//! cache_control:
//!   rules:
//!   - prefix: /static/
//!     headers:
//!       Cache-Control: public, max-age=31536000, immutable
//!   - prefix: /api/
//!     headers:
//!       Cache-Control: no-store
//!       Vary: [Accept, Authorization]
//!   no_match_headers:
//!     Cache-Control: no-cache
//! ```
//!
//! Prefixes are matched byte by byte, without any normalization: `/api` applies to `/api/users`
//! but also to `/apix`, whereas `/api/` only applies to paths within the `/api/` directory. The
//! order of the rules does not matter. Configuring the same prefix twice or an empty prefix is an
//! error, use `no_match_headers` to define headers applying to all other paths.
//!
//! Applying a header set replaces all existing values of the configured headers in the response.
//! A header configured with a list of values is sent multiple times. Other headers are left
//! untouched.
//!
//! ## Code example
//!
//! ```rust
//! use cache_control_module::{CacheControlHandler, FromYaml};
//! use cache_control_module::configuration::CacheControlConf;
//! use http::{header, HeaderMap};
//!
//! let conf = CacheControlConf::from_yaml(r#"
//!     cache_control:
//!       rules:
//!       - prefix: /static/
//!         headers:
//!           Cache-Control: max-age=604800
//!       no_match_headers:
//!         Cache-Control: no-cache
//! "#).unwrap();
//! let handler = CacheControlHandler::new(conf).unwrap();
//!
//! let mut headers = HeaderMap::new();
//! handler.apply("/static/style.css", &mut headers);
//! assert_eq!(headers[header::CACHE_CONTROL], "max-age=604800");
//!
//! handler.apply("/index.html", &mut headers);
//! assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
//! ```

pub mod configuration;
mod deserialize;
mod error;
mod handler;

pub use error::Error;
pub use handler::CacheControlHandler;

use log::trace;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Trait for configuration structures that can be loaded from YAML files. This trait has a blanket
/// implementation for any structure implementing [`serde::Deserialize`].
pub trait FromYaml {
    /// Loads configuration from a YAML file.
    fn load_from_yaml<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
        Self: Sized;

    /// Loads configuration from a YAML string.
    fn from_yaml<S>(yaml_conf: S) -> Result<Self, Error>
    where
        S: AsRef<str>,
        Self: Sized;
}

impl<D> FromYaml for D
where
    D: DeserializeOwned + Debug,
{
    fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::FileOpen {
            path: path.to_owned(),
            source,
        })?;
        let reader = BufReader::new(file);

        let conf = serde_yaml::from_reader(reader).map_err(|source| Error::FileRead {
            path: path.to_owned(),
            source,
        })?;
        trace!("Loaded configuration file: {conf:#?}");

        Ok(conf)
    }

    fn from_yaml<S: AsRef<str>>(yaml_conf: S) -> Result<Self, Error> {
        let conf = serde_yaml::from_str(yaml_conf.as_ref())?;
        trace!("Loaded configuration: {conf:#?}");

        Ok(conf)
    }
}
