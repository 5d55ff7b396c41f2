//! Parse-then-recover combinator.
//!
//! Several caller parameters are documented as "JSON, or something a human
//! typed". [`parse_or_recover`] makes the difference between a clean parse and
//! a heuristic guess visible to callers instead of hiding it in a `catch`.

use serde::de::DeserializeOwned;

/// Outcome of [`parse_or_recover`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery<T> {
    /// The input was valid JSON of the expected shape.
    Parsed(T),
    /// JSON parsing failed and the fallback produced a value.
    Recovered(T),
    /// Neither path produced a value; carries the parser diagnostic.
    Failed(String),
}

impl<T> Recovery<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Recovery::Parsed(_))
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Recovery::Recovered(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Recovery::Parsed(v) | Recovery::Recovered(v) => Some(v),
            Recovery::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Recovery::Parsed(v) | Recovery::Recovered(v) => Some(v),
            Recovery::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Recovery<U> {
        match self {
            Recovery::Parsed(v) => Recovery::Parsed(f(v)),
            Recovery::Recovered(v) => Recovery::Recovered(f(v)),
            Recovery::Failed(e) => Recovery::Failed(e),
        }
    }
}

/// Parse `raw` as JSON into `T`; on failure hand the raw text and the parser
/// error to `recover`.
pub fn parse_or_recover<T, F>(raw: &str, recover: F) -> Recovery<T>
where
    T: DeserializeOwned,
    F: FnOnce(&str, &serde_json::Error) -> Option<T>,
{
    match serde_json::from_str::<T>(raw) {
        Ok(v) => Recovery::Parsed(v),
        Err(e) => match recover(raw, &e) {
            Some(v) => Recovery::Recovered(v),
            None => Recovery::Failed(e.to_string()),
        },
    }
}
