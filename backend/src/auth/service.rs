//! Core business logic for the authentication system.
//!
//! The credential verifier checks the signature of a session credential
//! against the shared secret, enforces its expiry against an explicit clock
//! and extracts the caller's identity. It can also mint credentials with the
//! same secret, which local tooling and the test suites rely on.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::errors::AuthError;
use super::models::{Claims, Identity};

#[derive(Clone)]
pub struct CredentialVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl CredentialVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against the caller's clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as of `now` (unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, AuthError> {
        self.claims_at(token, now).map(Identity::from)
    }

    /// Like `verify_at`, but keeps the full claim set.
    pub fn claims_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = self.claims_ignoring_expiry(token)?;
        if now > claims.exp {
            return Err(AuthError::ExpiredCredential {
                expired_at: claims.exp,
            });
        }
        Ok(claims)
    }

    /// Checks only the signature and claim shape. Never use this to authorize
    /// a request; it exists to identify a session that is being torn down.
    pub fn claims_ignoring_expiry(&self, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => {
                    AuthError::InvalidCredential("signature mismatch".to_string())
                }
                _ => AuthError::InvalidCredential(e.to_string()),
            })
    }

    /// Mints a credential for `identity` valid for `ttl` from now.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        self.issue_at(identity, issued_at.timestamp(), (issued_at + ttl).timestamp())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.subject_id.clone(),
            role: identity.role,
            iat: issued_at,
            exp: expires_at,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}
