//! Redirect fragment / query string parsing.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::Serialize;

/// Parameters returned by the authorization server in the redirect URI.
///
/// Keys keep the order in which they were first seen. When a key repeats,
/// the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthResponse {
    params: IndexMap<String, String>,
}

impl AuthResponse {
    /// Parses a URL fragment or query string.
    ///
    /// A single leading `#` is stripped. The input is split on `&`, each
    /// segment on its first `=`, and both halves are percent-decoded (`+` is
    /// left alone). Segments without `=`, with an empty key, or that do not
    /// decode to UTF-8 are skipped, so malformed input yields an empty
    /// response rather than an error.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let mut params = IndexMap::new();

        for segment in raw.split('&') {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            if key.is_empty() {
                continue;
            }

            let (Ok(key), Ok(value)) = (
                percent_decode_str(key).decode_utf8(),
                percent_decode_str(value).decode_utf8(),
            ) else {
                tracing::debug!("Skipping response parameter that is not valid UTF-8");
                continue;
            };

            params.insert(key.into_owned(), value.into_owned());
        }

        Self { params }
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns `true` if the parameter is present.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns `true` if no parameter could be parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of parsed parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterates over the parameters in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_strips_hash() {
        let response = AuthResponse::parse("#state=S1&token_type=Bearer");

        assert_eq!(response.len(), 2);
        assert_eq!(response.get("state"), Some("S1"));
        assert_eq!(response.get("token_type"), Some("Bearer"));
    }

    #[test]
    fn test_parse_query_without_hash() {
        let response = AuthResponse::parse("state=S1");
        assert_eq!(response.get("state"), Some("S1"));
    }

    #[test]
    fn test_only_one_hash_is_stripped() {
        let response = AuthResponse::parse("##state=S1");
        assert_eq!(response.get("#state"), Some("S1"));
        assert!(!response.has_property("state"));
    }

    #[test]
    fn test_percent_decoding() {
        let response = AuthResponse::parse("#scope=openid%20profile%20email&redirect=https%3A%2F%2Fapp.example.com%2Fcb&a%26b=c");

        assert_eq!(response.get("scope"), Some("openid profile email"));
        assert_eq!(response.get("redirect"), Some("https://app.example.com/cb"));
        assert_eq!(response.get("a&b"), Some("c"));
    }

    #[test]
    fn test_plus_is_not_a_space() {
        let response = AuthResponse::parse("scope=openid+profile");
        assert_eq!(response.get("scope"), Some("openid+profile"));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let response = AuthResponse::parse("token=abc==&x=1=2");
        assert_eq!(response.get("token"), Some("abc=="));
        assert_eq!(response.get("x"), Some("1=2"));
    }

    #[test]
    fn test_empty_value_is_kept() {
        let response = AuthResponse::parse("state=&scope=openid");
        assert_eq!(response.get("state"), Some(""));
        assert!(response.has_property("state"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let response = AuthResponse::parse("state=first&scope=openid&state=second");

        assert_eq!(response.get("state"), Some("second"));
        let keys: Vec<&str> = response.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["state", "scope"]);
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(AuthResponse::parse("").is_empty());
        assert!(AuthResponse::parse("#").is_empty());
        assert!(AuthResponse::parse("garbage-without-equals").is_empty());
        assert!(AuthResponse::parse("&&&").is_empty());
        assert!(AuthResponse::parse("=value").is_empty());
    }

    #[test]
    fn test_segments_without_equals_are_skipped() {
        let response = AuthResponse::parse("abc&state=S1&def");
        assert_eq!(response.len(), 1);
        assert_eq!(response.get("state"), Some("S1"));
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let response = AuthResponse::parse("bad=%FF%FE&state=S1");
        assert!(!response.has_property("bad"));
        assert_eq!(response.get("state"), Some("S1"));
    }

    #[test]
    fn test_decoded_values_match_unencoded_inputs() {
        let inputs = [
            ("state", "a b&c=d"),
            ("nonce", "ünïcødé/?#"),
            ("id_token", "aaa.bbb.ccc"),
        ];
        let raw = inputs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    k,
                    percent_encoding::utf8_percent_encode(v, percent_encoding::NON_ALPHANUMERIC)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let response = AuthResponse::parse(&format!("#{raw}"));
        for (key, value) in inputs {
            assert_eq!(response.get(key), Some(value));
        }
    }
}
