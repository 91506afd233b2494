use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::claims::TimingError;

/// One of the three parts of a compact JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// The first part, containing the JOSE header
    Header,
    /// The second part, containing the claim set
    Payload,
    /// The third part, containing the signature
    Signature,
}

impl Component {
    /// Lowercase name of this component.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Payload => "payload",
            Self::Signature => "signature",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons why a string is not a well formed compact JWT.
///
/// These are permanent: the same input will always be rejected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The input was empty.
    #[error("the token is empty")]
    Empty,
    /// The header part is empty.
    #[error("the header of the token is empty")]
    EmptyHeader,
    /// The payload part is empty.
    #[error("the payload of the token is empty")]
    EmptyPayload,
    /// The input does not consist of exactly three parts separated by `.`
    #[error("`{0}` is not a compact JWT, expected exactly two `.` separators")]
    InvalidFormat(String),
    /// One part is not valid Base64Url.
    #[error("the {component} `{segment}` is not valid Base64Url")]
    InvalidBase64Url {
        /// The offending part, as it appeared in the input
        segment: String,
        /// Which part it was
        component: Component,
    },
    /// The header or payload is not a JSON object of the expected shape.
    #[error("the {component} is not valid: {source}")]
    InvalidJson {
        /// Either [`Component::Header`] or [`Component::Payload`]
        component: Component,
        /// See [`serde_json::Error`] for details
        source: serde_json::Error,
    },
}

impl FormatError {
    /// The component this error refers to, if it refers to one.
    pub const fn component(&self) -> Option<Component> {
        match self {
            Self::EmptyHeader => Some(Component::Header),
            Self::EmptyPayload => Some(Component::Payload),
            Self::InvalidBase64Url { component, .. } | Self::InvalidJson { component, .. } => {
                Some(*component)
            }
            Self::Empty | Self::InvalidFormat(_) => None,
        }
    }
}

/// Every error this crate can report.
///
/// The codec itself only produces [`Error::Format`] and [`Error::Timing`].
/// [`Error::InvalidSignature`] and [`Error::UnsupportedAlgorithm`] exist for
/// [`Verifier`](crate::Verifier) implementations, so they can use this type as
/// their error and callers see every failure in one place.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// See [`FormatError`] for details.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// See [`TimingError`] for details.
    #[error(transparent)]
    Timing(#[from] TimingError),
    /// The signature does not match the signing input.
    #[error("invalid signature")]
    InvalidSignature,
    /// The `alg` header names an algorithm the verifier does not support.
    #[error("unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),
}
