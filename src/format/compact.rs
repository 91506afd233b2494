use alloc::{string::ToString, vec::Vec};
use core::{fmt, str::FromStr};

use crate::{error::Component, Base64UrlString, FormatError};

/// The compact representation is three Base64Url strings that are separated
/// by `.`: the header, the payload and the signature.
///
/// Each part is kept exactly as it was parsed, so formatting a parsed
/// [`Compact`] reproduces the input.
///
/// # Examples
///
/// ```
/// # use jwt_codec::format::Compact;
/// # fn main() {
/// let c: Compact = "eyJhbGciOiJub25lIn0.e30.".parse().unwrap();
///
/// assert_eq!(&**c.header(), "eyJhbGciOiJub25lIn0");
/// assert_eq!(&**c.payload(), "e30");
/// assert!(c.signature().is_empty());
/// assert_eq!(c.to_string(), "eyJhbGciOiJub25lIn0.e30.");
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compact {
    parts: [Base64UrlString; 3],
}

impl Compact {
    /// Creates a compact representation from already encoded parts.
    pub const fn new(
        header: Base64UrlString,
        payload: Base64UrlString,
        signature: Base64UrlString,
    ) -> Self {
        Self {
            parts: [header, payload, signature],
        }
    }

    /// The encoded header.
    pub fn header(&self) -> &Base64UrlString {
        &self.parts[0]
    }

    /// The encoded payload.
    pub fn payload(&self) -> &Base64UrlString {
        &self.parts[1]
    }

    /// The encoded signature, empty for unsecured tokens.
    pub fn signature(&self) -> &Base64UrlString {
        &self.parts[2]
    }

    /// The part belonging to `component`.
    pub fn part(&self, component: Component) -> &Base64UrlString {
        match component {
            Component::Header => self.header(),
            Component::Payload => self.payload(),
            Component::Signature => self.signature(),
        }
    }

    /// Returns the header, payload and signature.
    pub fn into_parts(self) -> (Base64UrlString, Base64UrlString, Base64UrlString) {
        let [header, payload, signature] = self.parts;
        (header, payload, signature)
    }

    /// The bytes a signature is computed over: `header.payload`.
    pub fn signing_input(&self) -> Vec<u8> {
        signing_input(self.header(), self.payload())
    }
}

pub(crate) fn signing_input(header: &str, payload: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(header.len() + 1 + payload.len());
    input.extend_from_slice(header.as_bytes());
    input.push(b'.');
    input.extend_from_slice(payload.as_bytes());
    input
}

impl FromStr for Compact {
    type Err = FormatError;

    /// Splits the input into its three parts and verifies that every part
    /// is valid Base64Url.
    ///
    /// Only the signature may be empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut split = s.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (split.next(), split.next(), split.next(), split.next())
        else {
            tracing::debug!("rejecting token without exactly three parts");
            return Err(FormatError::InvalidFormat(s.to_string()));
        };

        if header.is_empty() {
            return Err(FormatError::EmptyHeader);
        }
        if payload.is_empty() {
            return Err(FormatError::EmptyPayload);
        }

        let part = |segment: &str, component: Component| {
            Base64UrlString::from_str(segment).map_err(|_| {
                tracing::debug!(%component, "rejecting token with invalid Base64Url part");
                FormatError::InvalidBase64Url {
                    segment: segment.to_string(),
                    component,
                }
            })
        };

        Ok(Self::new(
            part(header, Component::Header)?,
            part(payload, Component::Payload)?,
            part(signature, Component::Signature)?,
        ))
    }
}

impl fmt::Display for Compact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.parts.len();

        for (idx, part) in self.parts.iter().enumerate() {
            fmt::Display::fmt(&part, f)?;

            if idx != len - 1 {
                f.write_str(".")?;
            }
        }

        Ok(())
    }
}
