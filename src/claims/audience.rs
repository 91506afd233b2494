use alloc::{
    string::{String, ToString},
    vec,
    vec::Vec,
};
use core::slice;

use serde::{Deserialize, Serialize};

/// The `aud` claim as defined in [section 4.1.3 of RFC 7519].
///
/// The RFC allows the audience to be either a single string or an array of
/// strings. Both forms are kept apart, so a decoded audience is written back
/// in the same shape.
///
/// Building an [`Audience`] from a list with exactly one element yields
/// [`Audience::Single`].
///
/// ```
/// # use jwt_codec::claims::Audience;
/// let aud = Audience::from(vec!["single".to_string()]);
/// assert_eq!(aud, Audience::Single("single".to_string()));
///
/// let aud: Audience = ["a", "b"].into_iter().collect();
/// assert_eq!(aud.values(), ["a", "b"]);
/// assert!(aud.contains("b"));
/// ```
///
/// [section 4.1.3 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.3>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Serialized as a bare JSON string
    Single(String),
    /// Serialized as a JSON array of strings
    Multiple(Vec<String>),
}

impl Audience {
    /// All audience values, in order.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(s) => slice::from_ref(s),
            Self::Multiple(v) => v,
        }
    }

    /// Iterates over all audience values.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values().iter().map(String::as_str)
    }

    /// Whether `audience` is one of the values.
    pub fn contains(&self, audience: &str) -> bool {
        self.iter().any(|a| a == audience)
    }

    /// Consumes the audience and returns all values.
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Single(s) => vec![s],
            Self::Multiple(v) => v,
        }
    }
}

impl From<&str> for Audience {
    fn from(aud: &str) -> Self {
        Self::Single(aud.to_string())
    }
}

impl From<String> for Audience {
    fn from(aud: String) -> Self {
        Self::Single(aud)
    }
}

impl From<Vec<String>> for Audience {
    fn from(mut values: Vec<String>) -> Self {
        match values.len() {
            1 => Self::Single(values.remove(0)),
            _ => Self::Multiple(values),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Audience {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().map(Into::into).collect::<Vec<String>>().into()
    }
}
