use alloc::{collections::BTreeMap, string::String};

use super::{Header, REGISTERED_PARAMETERS};
use crate::value::ClaimValue;

/// A builder to create a [`Header`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderBuilder {
    /// `alg` parameter defined in section 4.1.1 of JWS
    algorithm: Option<String>,
    /// `typ` parameter defined in section 4.1.9 of JWS
    typ: Option<String>,
    /// `cty` parameter defined in section 4.1.10 of JWS
    content_type: Option<String>,
    // `kid` parameter defined in section 4.1.4 of JWS
    key_id: Option<String>,
    additional: BTreeMap<String, ClaimValue>,
}

impl HeaderBuilder {
    /// Create a new [`Header`] builder from scratch.
    pub const fn new() -> Self {
        Self {
            algorithm: None,
            typ: None,
            content_type: None,
            key_id: None,
            additional: BTreeMap::new(),
        }
    }

    /// Set the algorithm used to secure the token.
    pub fn algorithm(self, algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: Some(algorithm.into()),
            ..self
        }
    }

    /// Set the `typ` parameter.
    pub fn typ(self, typ: impl Into<String>) -> Self {
        Self {
            typ: Some(typ.into()),
            ..self
        }
    }

    /// Set the `cty` parameter.
    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..self
        }
    }

    /// Set the `kid` parameter.
    pub fn key_id(self, key_id: impl Into<String>) -> Self {
        Self {
            key_id: Some(key_id.into()),
            ..self
        }
    }

    /// Add a parameter without a typed field.
    ///
    /// Names of typed parameters (`alg`, `typ`, `cty` and `kid`) are
    /// ignored, use their dedicated setters instead.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        let name = name.into();
        if !REGISTERED_PARAMETERS.contains(&name.as_str()) {
            self.additional.insert(name, value.into());
        }
        self
    }

    /// Add every parameter from `parameters`, see [`HeaderBuilder::parameter`].
    pub fn parameters<K, V>(self, parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ClaimValue>,
    {
        parameters
            .into_iter()
            .fold(self, |builder, (k, v)| builder.parameter(k, v))
    }

    /// Use this [`HeaderBuilder`] to build a [`Header`].
    ///
    /// # Errors
    ///
    /// Returns [`HeaderBuilderError::MissingAlgorithm`] if the `algorithm`
    /// was never set, and [`HeaderBuilderError::EmptyAlgorithm`] if it was set
    /// to an empty string.
    pub fn build(self) -> Result<Header, HeaderBuilderError> {
        let algorithm = self
            .algorithm
            .ok_or(HeaderBuilderError::MissingAlgorithm)?;
        if algorithm.is_empty() {
            return Err(HeaderBuilderError::EmptyAlgorithm);
        }

        Ok(Header {
            algorithm,
            typ: self.typ,
            content_type: self.content_type,
            key_id: self.key_id,
            additional: self.additional,
        })
    }
}

impl From<Header> for HeaderBuilder {
    fn from(header: Header) -> Self {
        HeaderBuilder {
            algorithm: Some(header.algorithm),
            typ: header.typ,
            content_type: header.content_type,
            key_id: header.key_id,
            additional: header.additional,
        }
    }
}

/// Errors returned by [`HeaderBuilder::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HeaderBuilderError {
    /// The [`HeaderBuilder::algorithm`] method wasn't called during the
    /// build.
    #[error("The JOSE header is missing the `alg` parameter which is REQUIRED.")]
    MissingAlgorithm,
    /// The algorithm was set to an empty string.
    #[error("The `alg` parameter of the JOSE header must not be empty.")]
    EmptyAlgorithm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_algorithm() {
        assert_eq!(
            HeaderBuilder::new().typ("JWT").build(),
            Err(HeaderBuilderError::MissingAlgorithm)
        );
        assert_eq!(
            HeaderBuilder::new().algorithm("").build(),
            Err(HeaderBuilderError::EmptyAlgorithm)
        );
    }

    #[test]
    fn typed_names_are_not_additional() {
        let header = HeaderBuilder::new()
            .algorithm("HS256")
            .parameters([("alg", "none"), ("kid", "k"), ("x", "y")])
            .build()
            .unwrap();

        assert_eq!(header.algorithm(), "HS256");
        assert_eq!(header.key_id(), None);
        assert_eq!(header.additional_parameters().len(), 1);
    }

    #[test]
    fn into_builder_keeps_parameters() {
        let header = HeaderBuilder::new()
            .algorithm("HS256")
            .key_id("a")
            .parameter("n", 1)
            .build()
            .unwrap();

        let changed = header.clone().into_builder().key_id("b").build().unwrap();
        assert_eq!(changed.key_id(), Some("b"));
        assert_eq!(changed.algorithm(), header.algorithm());
        assert_eq!(changed.additional_parameter::<i64>("n"), Some(1));
    }
}
