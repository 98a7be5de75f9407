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

use http::{HeaderMap, Request, Response};
use log::{debug, trace};
use path_prefix_trie::PrefixTrie;

use crate::configuration::{CacheControlConf, CacheControlRules, CacheRule, HeaderSet};
use crate::Error;

/// Handler applying the configured headers to responses
///
/// The handler doesn't change after it has been set up and can be shared between threads.
#[derive(Debug)]
pub struct CacheControlHandler {
    rules: PrefixTrie<HeaderSet>,
    no_match_headers: Option<HeaderSet>,
}

impl TryFrom<CacheControlConf> for CacheControlHandler {
    type Error = Error;

    fn try_from(conf: CacheControlConf) -> Result<Self, Self::Error> {
        debug!("Cache control configuration received: {conf:#?}");

        let CacheControlRules {
            rules,
            no_match_headers,
        } = conf.cache_control;

        let mut builder = PrefixTrie::builder();
        for CacheRule { prefix, headers } in rules {
            if let Err(source) = builder.insert(&prefix, headers) {
                return Err(Error::Rule { prefix, source });
            }
        }

        let rules = builder.build();
        trace!("Compiled cache control rules: {rules:#?}");

        Ok(Self {
            rules,
            no_match_headers,
        })
    }
}

impl CacheControlHandler {
    /// Creates a new instance of the handler from its configuration.
    pub fn new(conf: CacheControlConf) -> Result<Self, Error> {
        conf.try_into()
    }

    /// Determines the headers to be applied for a request path.
    ///
    /// These are the headers of the rule with the longest prefix of `path`. If no rule matches,
    /// the `no_match_headers` are returned if configured.
    pub fn headers_for(&self, path: &str) -> Option<&HeaderSet> {
        if let Some(result) = self.rules.lookup(path) {
            trace!(
                "Path {path} matched rule for prefix {}",
                String::from_utf8_lossy(&path.as_bytes()[..result.prefix_len()])
            );
            Some(result.as_value())
        } else {
            trace!("No rule matched path {path}");
            self.no_match_headers.as_ref()
        }
    }

    /// Applies the headers determined for `path` to the response headers. Returns `false` if there
    /// was nothing to apply.
    pub fn apply(&self, path: &str, headers: &mut HeaderMap) -> bool {
        if let Some(header_set) = self.headers_for(path) {
            trace!("Adding headers to response: {header_set:?}");
            header_set.apply_to(headers);
            true
        } else {
            false
        }
    }

    /// Applies the headers determined for the request's path to the response.
    pub fn handle_response<ReqBody, RespBody>(
        &self,
        request: &Request<ReqBody>,
        response: &mut Response<RespBody>,
    ) -> bool {
        self.apply(request.uri().path(), response.headers_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::FromYaml;
    use http::{header, HeaderValue};
    use path_prefix_trie::InsertError;
    use test_log::test;

    fn make_handler(no_match_headers: bool) -> CacheControlHandler {
        let mut conf = CacheControlConf::from_yaml(
            r#"
                cache_control:
                  rules:
                  - prefix: /api
                    headers:
                      Cache-Control: no-store
                  - prefix: /api/v2
                    headers:
                      Cache-Control: [private, max-age=60]
                      Vary: Authorization
                  - prefix: /static/
                    headers:
                      Cache-Control: public, max-age=31536000, immutable
                  no_match_headers:
                    Cache-Control: no-cache
            "#,
        )
        .unwrap();
        if !no_match_headers {
            conf.cache_control.no_match_headers = None;
        }
        CacheControlHandler::new(conf).unwrap()
    }

    fn make_response_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert("X-Test", HeaderValue::from_static("unchanged"));
        headers
    }

    fn assert_headers(headers: &HeaderMap, expected: Vec<(&str, &str)>) {
        let mut headers: Vec<_> = headers
            .iter()
            .map(|(name, value)| (name.as_str().to_owned(), value.to_str().unwrap().to_owned()))
            .collect();
        headers.sort();

        let mut expected: Vec<_> = expected
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_owned()))
            .collect();
        expected.sort();

        assert_eq!(headers, expected);
    }

    #[test]
    fn longest_prefix() {
        let handler = make_handler(true);

        let mut headers = make_response_headers();
        assert!(handler.apply("/api/v2/users", &mut headers));
        assert_headers(
            &headers,
            vec![
                ("Cache-Control", "private"),
                ("Cache-Control", "max-age=60"),
                ("Vary", "Authorization"),
                ("X-Test", "unchanged"),
            ],
        );

        let mut headers = make_response_headers();
        assert!(handler.apply("/api/v1/users", &mut headers));
        assert_headers(
            &headers,
            vec![("Cache-Control", "no-store"), ("X-Test", "unchanged")],
        );

        let mut headers = make_response_headers();
        assert!(handler.apply("/static/style.css", &mut headers));
        assert_headers(
            &headers,
            vec![
                ("Cache-Control", "public, max-age=31536000, immutable"),
                ("X-Test", "unchanged"),
            ],
        );
    }

    #[test]
    fn no_match() {
        let handler = make_handler(true);

        let mut headers = make_response_headers();
        assert!(handler.apply("/health", &mut headers));
        assert_headers(
            &headers,
            vec![("Cache-Control", "no-cache"), ("X-Test", "unchanged")],
        );

        // Only byte prefixes count, "/static" doesn't match "/static/"
        let mut headers = make_response_headers();
        assert!(handler.apply("/static", &mut headers));
        assert_headers(
            &headers,
            vec![("Cache-Control", "no-cache"), ("X-Test", "unchanged")],
        );

        let handler = make_handler(false);

        let mut headers = make_response_headers();
        assert!(!handler.apply("/health", &mut headers));
        assert_headers(
            &headers,
            vec![("Cache-Control", "max-age=0"), ("X-Test", "unchanged")],
        );
        assert_eq!(handler.headers_for("/health"), None);
    }

    #[test]
    fn headers_for() {
        let handler = make_handler(true);

        assert_eq!(
            handler.headers_for("/api/v2"),
            Some(&HeaderSet::try_from([
                ("Cache-Control", "private"),
                ("Cache-Control", "max-age=60"),
                ("Vary", "Authorization"),
            ])
            .unwrap())
        );
        assert_eq!(
            handler.headers_for("/apix"),
            Some(&HeaderSet::try_from([("Cache-Control", "no-store")]).unwrap())
        );
        assert_eq!(
            handler.headers_for(""),
            Some(&HeaderSet::try_from([("Cache-Control", "no-cache")]).unwrap())
        );

        // Repeated lookups produce the same result
        assert_eq!(handler.headers_for("/api/x"), handler.headers_for("/api/x"));
    }

    #[test]
    fn handle_response() {
        let handler = make_handler(true);

        let request = Request::get("https://example.com/api/v2/users?page=2")
            .body(())
            .unwrap();
        let mut response = Response::builder()
            .header(header::CACHE_CONTROL, "max-age=0")
            .header(header::CONTENT_TYPE, "application/json")
            .body(())
            .unwrap();

        assert!(handler.handle_response(&request, &mut response));
        assert_headers(
            response.headers(),
            vec![
                ("Cache-Control", "private"),
                ("Cache-Control", "max-age=60"),
                ("Content-Type", "application/json"),
                ("Vary", "Authorization"),
            ],
        );
    }

    #[test]
    fn empty_configuration() {
        let handler = CacheControlHandler::new(CacheControlConf::default()).unwrap();

        let mut headers = make_response_headers();
        assert!(!handler.apply("/", &mut headers));
        assert_headers(
            &headers,
            vec![("Cache-Control", "max-age=0"), ("X-Test", "unchanged")],
        );
    }

    #[test]
    fn rejected_rules() {
        let conf = CacheControlConf::from_yaml(
            r#"
                cache_control:
                  rules:
                  - prefix: /a
                  - prefix: /b
                  - prefix: /a
            "#,
        )
        .unwrap();
        let err = CacheControlHandler::new(conf).unwrap_err();
        assert!(matches!(
            &err,
            Error::Rule {
                prefix,
                source: InsertError::DuplicateRule,
            } if prefix == "/a"
        ));
        assert!(err.to_string().contains("\"/a\""));

        let conf = CacheControlConf::from_yaml(
            r#"
                cache_control:
                  rules:
                  - prefix: ""
            "#,
        )
        .unwrap();
        assert!(matches!(
            CacheControlHandler::new(conf),
            Err(Error::Rule {
                source: InsertError::EmptyPrefix,
                ..
            })
        ));
    }
}
