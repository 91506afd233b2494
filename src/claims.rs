//! The JWT claim set as defined in [section 4 of RFC 7519].
//!
//! [section 4 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-4>

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
};
use core::fmt;

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

mod audience;
mod numeric_date;
mod timing;

pub use self::{
    audience::Audience,
    numeric_date::NumericDate,
    timing::{TimingError, TimingOptions, DEFAULT_CLOCK_SKEW},
};
use crate::value::{take_member, ClaimValue, FromClaimValue};

/// Names of the claims registered in [section 4.1 of RFC 7519], in the order
/// they are written.
///
/// [section 4.1 of RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519#section-4.1>
pub const REGISTERED_CLAIMS: &[&str] = &["iss", "sub", "aud", "exp", "nbf", "iat", "jti"];

/// The claims of a JSON Web Token.
///
/// The seven registered claims are typed fields, every other claim lives in
/// an open map of [`ClaimValue`]s. A claim name is never in both places:
/// registered names passed to [`Claims::with_claim`] are ignored.
///
/// ```
/// # use jwt_codec::claims::Claims;
/// let claims: Claims =
///     serde_json::from_str(r#"{"sub":"1234567890","name":"John Doe","iat":1516239022}"#)
///         .unwrap();
///
/// assert_eq!(claims.subject(), Some("1234567890"));
/// assert_eq!(claims.additional_claim::<&str>("name"), Some("John Doe"));
/// assert_eq!(claims.additional_claim::<i64>("name"), None);
/// assert_eq!(claims.issued_at().map(|iat| iat.as_secs()), Some(1516239022));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    issuer: Option<String>,
    subject: Option<String>,
    audience: Option<Audience>,
    expiration: Option<NumericDate>,
    not_before: Option<NumericDate>,
    issued_at: Option<NumericDate>,
    jwt_id: Option<String>,
    additional: BTreeMap<String, ClaimValue>,
}

impl Claims {
    /// An empty claim set.
    pub const fn new() -> Self {
        Self {
            issuer: None,
            subject: None,
            audience: None,
            expiration: None,
            not_before: None,
            issued_at: None,
            jwt_id: None,
            additional: BTreeMap::new(),
        }
    }

    /// The `iss` (issuer) claim.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// The `sub` (subject) claim.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The `aud` (audience) claim.
    pub const fn audience(&self) -> Option<&Audience> {
        self.audience.as_ref()
    }

    /// The `exp` (expiration time) claim.
    pub const fn expiration(&self) -> Option<NumericDate> {
        self.expiration
    }

    /// The `nbf` (not before) claim.
    pub const fn not_before(&self) -> Option<NumericDate> {
        self.not_before
    }

    /// The `iat` (issued at) claim.
    pub const fn issued_at(&self) -> Option<NumericDate> {
        self.issued_at
    }

    /// The `jti` (JWT ID) claim.
    pub fn jwt_id(&self) -> Option<&str> {
        self.jwt_id.as_deref()
    }

    /// All claims that are not registered.
    pub const fn additional_claims(&self) -> &BTreeMap<String, ClaimValue> {
        &self.additional
    }

    /// Looks up an unregistered claim and converts it into `T`.
    ///
    /// Returns [`None`] if the claim is missing or does not have the shape
    /// `T` asks for.
    pub fn additional_claim<'a, T: FromClaimValue<'a>>(&'a self, name: &str) -> Option<T> {
        self.additional.get(name).and_then(T::from_claim_value)
    }

    /// Sets the `iss` claim.
    #[must_use]
    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        Self {
            issuer: Some(issuer.into()),
            ..self
        }
    }

    /// Sets the `sub` claim.
    #[must_use]
    pub fn with_subject(self, subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..self
        }
    }

    /// Sets the `aud` claim.
    #[must_use]
    pub fn with_audience(self, audience: impl Into<Audience>) -> Self {
        Self {
            audience: Some(audience.into()),
            ..self
        }
    }

    /// Sets the `exp` claim.
    #[must_use]
    pub fn with_expiration(self, expiration: impl Into<NumericDate>) -> Self {
        Self {
            expiration: Some(expiration.into()),
            ..self
        }
    }

    /// Sets the `nbf` claim.
    #[must_use]
    pub fn with_not_before(self, not_before: impl Into<NumericDate>) -> Self {
        Self {
            not_before: Some(not_before.into()),
            ..self
        }
    }

    /// Sets the `iat` claim.
    #[must_use]
    pub fn with_issued_at(self, issued_at: impl Into<NumericDate>) -> Self {
        Self {
            issued_at: Some(issued_at.into()),
            ..self
        }
    }

    /// Sets the `jti` claim.
    #[must_use]
    pub fn with_jwt_id(self, jwt_id: impl Into<String>) -> Self {
        Self {
            jwt_id: Some(jwt_id.into()),
            ..self
        }
    }

    /// Adds an unregistered claim.
    ///
    /// Registered claim names are ignored, use the dedicated setters for
    /// them.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        let name = name.into();
        if !REGISTERED_CLAIMS.contains(&name.as_str()) {
            self.additional.insert(name, value.into());
        }
        self
    }

    /// Adds every unregistered claim from `claims`.
    #[must_use]
    pub fn with_claims<K, V>(self, claims: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ClaimValue>,
    {
        claims
            .into_iter()
            .fold(self, |claims, (k, v)| claims.with_claim(k, v))
    }
}

impl Serialize for Claims {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        if let Some(iss) = &self.issuer {
            map.serialize_entry("iss", iss)?;
        }
        if let Some(sub) = &self.subject {
            map.serialize_entry("sub", sub)?;
        }
        if let Some(aud) = &self.audience {
            map.serialize_entry("aud", aud)?;
        }
        if let Some(exp) = &self.expiration {
            map.serialize_entry("exp", exp)?;
        }
        if let Some(nbf) = &self.not_before {
            map.serialize_entry("nbf", nbf)?;
        }
        if let Some(iat) = &self.issued_at {
            map.serialize_entry("iat", iat)?;
        }
        if let Some(jti) = &self.jwt_id {
            map.serialize_entry("jti", jti)?;
        }
        for (name, value) in &self.additional {
            map.serialize_entry(name, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ClaimsVisitor)
    }
}

struct ClaimsVisitor;

impl<'de> Visitor<'de> for ClaimsVisitor {
    type Value = Claims;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a JWT claim set")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // first pass collects every member, so duplicates are caught no matter
        // whether the name is registered
        let mut members = BTreeMap::<String, ClaimValue>::new();
        while let Some(name) = map.next_key::<String>()? {
            if members.contains_key(&name) {
                return Err(de::Error::custom(alloc::format!("duplicate claim `{name}`")));
            }
            let value = map.next_value::<ClaimValue>()?;
            members.insert(name, value);
        }

        Claims::from_members(members).map_err(de::Error::custom)
    }
}

impl Claims {
    // second pass moves the registered claims into their typed fields
    fn from_members(mut members: BTreeMap<String, ClaimValue>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            issuer: take_member(&mut members, "iss")?,
            subject: take_member(&mut members, "sub")?,
            audience: take_member(&mut members, "aud")?,
            expiration: take_member(&mut members, "exp")?,
            not_before: take_member(&mut members, "nbf")?,
            issued_at: take_member(&mut members, "iat")?,
            jwt_id: take_member(&mut members, "jti")?,
            additional: members,
        })
    }
}

impl fmt::Display for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Claims> for ClaimValue {
    fn from(claims: Claims) -> Self {
        let mut members = claims.additional;
        let mut put = |name: &str, value: Option<ClaimValue>| {
            if let Some(value) = value {
                members.insert(name.to_string(), value);
            }
        };

        put("iss", claims.issuer.map(ClaimValue::String));
        put("sub", claims.subject.map(ClaimValue::String));
        put(
            "aud",
            claims.audience.map(|aud| match aud {
                Audience::Single(s) => ClaimValue::String(s),
                Audience::Multiple(v) => v.into(),
            }),
        );
        put("exp", claims.expiration.map(date_value));
        put("nbf", claims.not_before.map(date_value));
        put("iat", claims.issued_at.map(date_value));
        put("jti", claims.jwt_id.map(ClaimValue::String));

        ClaimValue::Object(members)
    }
}

fn date_value(date: NumericDate) -> ClaimValue {
    if date.has_fraction() {
        ClaimValue::Double(date.as_secs_f64())
    } else {
        ClaimValue::Integer(date.as_secs())
    }
}
