use crate::{
    claims::{TimingError, TimingOptions},
    JsonWebToken,
};

/// This trait represents anything that can check the signature of a JWT.
///
/// The verifier receives the [signing input](JsonWebToken::signing_input),
/// the raw signature and the value of the `alg` header, and decides whether
/// the signature is valid. Rejecting unknown algorithms, including `none`,
/// is the verifier's job.
///
/// Every `FnMut(&[u8], &[u8], &str) -> Result<bool, E>` is a [`Verifier`].
pub trait Verifier {
    /// The error that can occur while verifying.
    type Error;

    /// The `verify` operation.
    ///
    /// Returns `Ok(true)` if the signature matches the signing input.
    ///
    /// # Errors
    ///
    /// Returns an error if verification could not be performed, for example
    /// because the algorithm is not supported or an external verifier is not
    /// reachable.
    fn verify(
        &mut self,
        signing_input: &[u8],
        signature: &[u8],
        algorithm: &str,
    ) -> Result<bool, Self::Error>;
}

impl<F, E> Verifier for F
where
    F: FnMut(&[u8], &[u8], &str) -> Result<bool, E>,
{
    type Error = E;

    fn verify(
        &mut self,
        signing_input: &[u8],
        signature: &[u8],
        algorithm: &str,
    ) -> Result<bool, Self::Error> {
        self(signing_input, signature, algorithm)
    }
}

impl JsonWebToken {
    /// Checks the signature of this token using `verifier`.
    ///
    /// For a parsed token the verifier sees the header and payload exactly as
    /// they appeared in the input.
    ///
    /// # Errors
    ///
    /// Returns the verifier's error unchanged.
    pub fn verify<V>(&self, verifier: &mut V) -> Result<bool, V::Error>
    where
        V: Verifier + ?Sized,
    {
        let valid = verifier.verify(
            &self.signing_input(),
            self.signature(),
            self.header().algorithm(),
        )?;

        if !valid {
            tracing::debug!(alg = self.header().algorithm(), "signature rejected");
        }
        Ok(valid)
    }

    /// Checks the signature, then the `exp` and `nbf` claims.
    ///
    /// Returns `Ok(false)` if the signature does not match, without looking
    /// at the claims. A token that is expired or not yet valid is an error,
    /// not `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns the verifier's error unchanged, or the [`TimingError`]
    /// converted into the verifier's error type.
    pub fn verify_and_validate<V>(
        &self,
        verifier: &mut V,
        options: &TimingOptions,
    ) -> Result<bool, V::Error>
    where
        V: Verifier + ?Sized,
        V::Error: From<TimingError>,
    {
        if !self.verify(verifier)? {
            return Ok(false);
        }

        self.claims().validate_timing(options)?;
        Ok(true)
    }
}
