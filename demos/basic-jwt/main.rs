//! Simple program to decode, sign and verify a JsonWebToken (JWT) using HS256
//!
//! Set `RUST_LOG=jwt_codec=debug` to see why a token is rejected.

use std::time::Duration;

use clap::Parser;
use clio::Input;
use eyre::eyre;
use hmac::{Hmac, Mac};
use jwt_codec::{claims::TimingOptions, Claims, Jwt};
use sha2::Sha256;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
enum Commands {
    /// Prints the header and claims of a JWT without checking the signature
    Decode { jwt: String },
    /// Signs a claim set with an HMAC secret
    Sign {
        /// The shared secret
        #[arg(short, long)]
        secret: String,
        /// Sets `exp` this many seconds after `iat`
        #[arg(short, long)]
        expires_in: Option<u64>,
        /// The claims that this JWT should contain, as a JSON object
        claims: Input,
    },
    /// Verifies the signature and the timing claims of a JWT
    Verify {
        jwt: String,
        /// The shared secret
        #[arg(short, long)]
        secret: String,
        /// Tolerated clock skew in seconds
        #[arg(long, default_value_t = 60)]
        clock_skew: u64,
    },
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmds = Commands::parse();

    match cmds {
        Commands::Decode { jwt } => {
            let jwt: Jwt = jwt.parse()?;
            println!("Header: {}", jwt.header());
            println!("Claims: {}", jwt.claims());
            if jwt.is_unsecured() {
                println!("The token is unsecured");
            }
        }
        Commands::Sign {
            secret,
            expires_in,
            claims,
        } => {
            let claims: Claims = serde_json::from_reader(claims)?;
            let mut builder = Jwt::builder("HS256").claims(claims.additional_claims().clone());
            if let Some(iss) = claims.issuer() {
                builder = builder.issuer(iss);
            }
            if let Some(sub) = claims.subject() {
                builder = builder.subject(sub);
            }
            if let Some(aud) = claims.audience() {
                builder = builder.audiences(aud.values().iter().cloned());
            }
            if let Some(nbf) = claims.not_before() {
                builder = builder.not_before(nbf);
            }
            if let Some(iat) = claims.issued_at() {
                builder = builder.issued_at(iat);
            }
            if let Some(jti) = claims.jwt_id() {
                builder = builder.jwt_id(jti);
            }
            match (expires_in, claims.expiration()) {
                (Some(secs), _) => builder = builder.expires_in(Duration::from_secs(secs)),
                (None, Some(exp)) => builder = builder.expires_at(exp),
                (None, None) => {}
            }

            let mut signer = |input: &[u8]| -> Result<Vec<u8>, hmac::digest::InvalidLength> {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())?;
                mac.update(input);
                Ok(mac.finalize().into_bytes().to_vec())
            };
            let signed = builder.sign(&mut signer)?;

            println!("JWT: {signed}");
        }
        Commands::Verify {
            jwt,
            secret,
            clock_skew,
        } => {
            let jwt: Jwt = jwt.parse()?;
            let options = TimingOptions::new().with_clock_skew(Duration::from_secs(clock_skew));

            let mut verifier = |input: &[u8], signature: &[u8], alg: &str| {
                if alg != "HS256" {
                    return Err(jwt_codec::Error::UnsupportedAlgorithm(alg.to_owned()));
                }
                let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
                    .map_err(|_| jwt_codec::Error::InvalidSignature)?;
                mac.update(input);
                Ok(mac.verify_slice(signature).is_ok())
            };

            if !jwt.verify_and_validate(&mut verifier, &options)? {
                return Err(eyre!("invalid signature"));
            }

            let claims = jwt.claims();
            println!(
                "JWT: Sub {:?}, {:?}",
                claims.subject(),
                claims.additional_claim::<&str>("name")
            );
        }
    }
    Ok(())
}
