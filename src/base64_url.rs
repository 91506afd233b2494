//! Helpers for base64 urlsafe encoded stuff

use alloc::{borrow::ToOwned, string::String, vec::Vec};
use core::{fmt, ops::Deref, str::FromStr};

use base64ct::{Base64UrlUnpadded, Encoding};
use thiserror::Error;

/// Error type indicating that one part of the compact representation was an
/// invalid Base64Url string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the string is not a valid Base64Url representation")]
pub struct NoBase64UrlString;

/// A wrapper around a [`String`] that guarantees that the inner string is a
/// valid Base64Url string.
///
/// The text is kept exactly as it was given, including any trailing `=`
/// padding, so it can be written back out unchanged.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Base64UrlString(String);

impl fmt::Display for Base64UrlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Base64UrlString {
    type Err = NoBase64UrlString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(|_| Self(s.to_owned()))
    }
}

impl Base64UrlString {
    /// Creates a new, empty Base64Url string.
    #[inline]
    pub const fn new() -> Self {
        Self(String::new())
    }

    /// Encode the given bytes using Base64Url format without padding.
    #[inline]
    pub fn encode(x: impl AsRef<[u8]>) -> Self {
        Base64UrlString(Base64UrlUnpadded::encode_string(x.as_ref()))
    }

    /// Decodes this Base64Url string into it's raw byte representation.
    #[inline]
    pub fn decode(&self) -> Vec<u8> {
        // validated on construction, encoded output always round trips
        decode(&self.0).unwrap_or_default()
    }

    /// Return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Base64UrlString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decodes Base64Url text, tolerating up to two trailing `=` characters.
pub(crate) fn decode(s: &str) -> Result<Vec<u8>, NoBase64UrlString> {
    let trimmed = s.strip_suffix("==").or_else(|| s.strip_suffix('=')).unwrap_or(s);

    // padding is only legal where it completes a 4 character group
    if trimmed.len() != s.len() && s.len() % 4 != 0 {
        return Err(NoBase64UrlString);
    }

    Base64UrlUnpadded::decode_vec(trimmed).map_err(|_| NoBase64UrlString)
}
