use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::time::Duration;

use thiserror::Error;

use crate::{
    claims::{Audience, Claims, NumericDate},
    header::{Header, HeaderBuilder, HeaderBuilderError},
    value::ClaimValue,
    JsonWebToken,
};

/// This trait represents anything that can produce the signature of a JWT.
///
/// The signer receives the [signing input](JsonWebToken::signing_input) and
/// returns the raw signature bytes. Which algorithm it uses is up to the
/// caller, this crate only writes the name given to
/// [`JsonWebToken::builder`] into the `alg` header.
///
/// Every `FnMut(&[u8]) -> Result<Vec<u8>, E>` is a [`Signer`].
pub trait Signer {
    /// The error that can occur while signing.
    type Error;

    /// Sign the given bytestring and return the signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing operation fails.
    /// An error usually only appears when communicating with external signers.
    fn sign(&mut self, signing_input: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

impl<F, E> Signer for F
where
    F: FnMut(&[u8]) -> Result<Vec<u8>, E>,
{
    type Error = E;

    fn sign(&mut self, signing_input: &[u8]) -> Result<Vec<u8>, Self::Error> {
        self(signing_input)
    }
}

/// Errors returned by [`JwtBuilder::sign`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignError<E> {
    /// The header could not be built, see [`HeaderBuilderError`].
    #[error(transparent)]
    Header(#[from] HeaderBuilderError),
    /// The header or claims could not be serialized.
    #[error("failed to serialize the token: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The [`Signer`] returned an error.
    #[error("the signer failed: {0}")]
    Signer(E),
}

/// Assembles the header and claims of a new token and signs it.
///
/// The header always carries `typ: "JWT"`. Unless set explicitly, `iat` is
/// the time [`build`](Self::build) is called, truncated to whole seconds.
///
/// ```
/// # use std::{convert::Infallible, time::Duration};
/// # use jwt_codec::JsonWebToken;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let jwt = JsonWebToken::builder("none")
///     .issuer("example.com")
///     .subject("alice")
///     .expires_in(Duration::from_secs(3600))
///     .claim("admin", true)
///     .sign(&mut |_: &[u8]| Ok::<_, Infallible>(vec![]))?;
///
/// assert!(jwt.is_unsecured());
/// assert_eq!(jwt.header().typ(), Some("JWT"));
/// assert_eq!(jwt.claims().additional_claim::<bool>("admin"), Some(true));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JwtBuilder {
    header: HeaderBuilder,
    issuer: Option<String>,
    subject: Option<String>,
    audience: Option<String>,
    audiences: Option<Vec<String>>,
    expires_in: Option<Duration>,
    expires_at: Option<NumericDate>,
    not_before: Option<NumericDate>,
    issued_at: Option<NumericDate>,
    jwt_id: Option<String>,
    claims: BTreeMap<String, ClaimValue>,
}

impl JsonWebToken {
    /// Start building a token that is signed with `algorithm`.
    ///
    /// `algorithm` is written into the `alg` header as is, it must not be
    /// empty.
    pub fn builder(algorithm: impl Into<String>) -> JwtBuilder {
        JwtBuilder::new(algorithm)
    }
}

impl JwtBuilder {
    /// Same as [`JsonWebToken::builder`].
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            header: HeaderBuilder::new().algorithm(algorithm).typ("JWT"),
            issuer: None,
            subject: None,
            audience: None,
            audiences: None,
            expires_in: None,
            expires_at: None,
            not_before: None,
            issued_at: None,
            jwt_id: None,
            claims: BTreeMap::new(),
        }
    }

    /// Set the `iss` claim.
    pub fn issuer(self, issuer: impl Into<String>) -> Self {
        Self {
            issuer: Some(issuer.into()),
            ..self
        }
    }

    /// Set the `sub` claim.
    pub fn subject(self, subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..self
        }
    }

    /// Set a single `aud` value.
    ///
    /// Ignored if [`audiences`](Self::audiences) is set too.
    pub fn audience(self, audience: impl Into<String>) -> Self {
        Self {
            audience: Some(audience.into()),
            ..self
        }
    }

    /// Set several `aud` values. Takes precedence over
    /// [`audience`](Self::audience).
    ///
    /// An empty list is the same as not calling this method.
    pub fn audiences<I>(self, audiences: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            audiences: Some(audiences.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    /// Let the token expire `duration` after its `iat`.
    ///
    /// Ignored if [`expires_at`](Self::expires_at) is set too.
    pub fn expires_in(self, duration: Duration) -> Self {
        Self {
            expires_in: Some(duration),
            ..self
        }
    }

    /// Set the `exp` claim. Takes precedence over
    /// [`expires_in`](Self::expires_in).
    pub fn expires_at(self, expires_at: impl Into<NumericDate>) -> Self {
        Self {
            expires_at: Some(expires_at.into()),
            ..self
        }
    }

    /// Set the `nbf` claim.
    pub fn not_before(self, not_before: impl Into<NumericDate>) -> Self {
        Self {
            not_before: Some(not_before.into()),
            ..self
        }
    }

    /// Set the `iat` claim instead of using the current time.
    pub fn issued_at(self, issued_at: impl Into<NumericDate>) -> Self {
        Self {
            issued_at: Some(issued_at.into()),
            ..self
        }
    }

    /// Set the `jti` claim.
    pub fn jwt_id(self, jwt_id: impl Into<String>) -> Self {
        Self {
            jwt_id: Some(jwt_id.into()),
            ..self
        }
    }

    /// Add a custom claim, see [`Claims::with_claim`].
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Add every claim from `claims`, see [`JwtBuilder::claim`].
    pub fn claims<K, V>(self, claims: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ClaimValue>,
    {
        claims
            .into_iter()
            .fold(self, |builder, (k, v)| builder.claim(k, v))
    }

    /// Set the `kid` header parameter.
    pub fn key_id(self, key_id: impl Into<String>) -> Self {
        Self {
            header: self.header.key_id(key_id),
            ..self
        }
    }

    /// Add a header parameter, see [`HeaderBuilder::parameter`].
    pub fn header_parameter(self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        Self {
            header: self.header.parameter(name, value),
            ..self
        }
    }

    /// Add every header parameter from `parameters`.
    pub fn header_parameters<K, V>(self, parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ClaimValue>,
    {
        Self {
            header: self.header.parameters(parameters),
            ..self
        }
    }

    /// Build the unsigned header and claims.
    ///
    /// # Errors
    ///
    /// Fails if the algorithm is empty.
    pub fn build(self) -> Result<(Header, Claims), HeaderBuilderError> {
        let header = self.header.build()?;

        let issued_at = self
            .issued_at
            .unwrap_or_else(|| NumericDate::from_secs(NumericDate::now().as_secs()));
        let expiration = self
            .expires_at
            .or_else(|| self.expires_in.map(|d| issued_at.saturating_add(d)));
        let audience = match self.audiences {
            Some(audiences) if !audiences.is_empty() => Some(Audience::from(audiences)),
            _ => self.audience.map(Audience::from),
        };

        let mut claims = Claims::new().with_issued_at(issued_at).with_claims(self.claims);
        if let Some(issuer) = self.issuer {
            claims = claims.with_issuer(issuer);
        }
        if let Some(subject) = self.subject {
            claims = claims.with_subject(subject);
        }
        if let Some(audience) = audience {
            claims = claims.with_audience(audience);
        }
        if let Some(expiration) = expiration {
            claims = claims.with_expiration(expiration);
        }
        if let Some(not_before) = self.not_before {
            claims = claims.with_not_before(not_before);
        }
        if let Some(jwt_id) = self.jwt_id {
            claims = claims.with_jwt_id(jwt_id);
        }

        Ok((header, claims))
    }

    /// Build the token and sign its signing input with `signer`.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Signer`] with the signer's error unchanged if
    /// signing fails, and the other variants if the token could not be
    /// assembled.
    pub fn sign<S>(self, signer: &mut S) -> Result<JsonWebToken, SignError<S::Error>>
    where
        S: Signer + ?Sized,
    {
        let (header, claims) = self.build()?;
        let unsigned =
            JsonWebToken::new(header, claims, Vec::new()).map_err(SignError::Serialize)?;

        let signature = signer
            .sign(&unsigned.signing_input())
            .map_err(SignError::Signer)?;

        Ok(unsigned.with_signature(signature))
    }
}
