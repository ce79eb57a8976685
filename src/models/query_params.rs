use std::collections::HashMap;

use url::form_urlencoded;

/// A query parameter value as seen by the decoder: a single string, or every
/// value when the name was repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multiple(Vec<String>),
}

impl QueryValue {
    /// The first value, if there is one.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(values) => values.push(value),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Decoded query parameters, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, QueryValue>);

impl QueryParams {
    /// Parses a raw query string (without the leading `?`) with
    /// `application/x-www-form-urlencoded` rules, so percent-escaped names and
    /// values come back decoded.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params: HashMap<String, QueryValue> = HashMap::new();
        for (name, value) in iter {
            match params.get_mut(&name) {
                Some(existing) => existing.push(value),
                None => {
                    params.insert(name, QueryValue::Single(value));
                }
            }
        }
        Self(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_names_and_values() {
        let params = QueryParams::parse("%72%65f=aHR0cHM6Ly9hLmNv&utm_source=a+b");
        assert_eq!(params.get("ref"), Some(&QueryValue::from("aHR0cHM6Ly9hLmNv")));
        assert_eq!(params.get("utm_source"), Some(&QueryValue::from("a b")));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_repeated_names_become_multiple() {
        let params = QueryParams::parse("url=one&x=1&url=two&url=three");
        let value = params.get("url").unwrap();
        assert_eq!(
            value,
            &QueryValue::Multiple(vec!["one".into(), "two".into(), "three".into()])
        );
        assert_eq!(value.first(), Some("one"));
    }

    #[test]
    fn test_empty_query() {
        assert!(QueryParams::parse("").is_empty());
    }

    #[test]
    fn test_empty_multiple_has_no_first() {
        assert_eq!(QueryValue::Multiple(Vec::new()).first(), None);
    }
}
