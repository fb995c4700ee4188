//! Signed credential tokens (HS256 JWT) with two subject types.
//!
//! - `sub` carries the subject type (`access` / `refresh`), not the user.
//! - `userid` carries the owner id.
//! - `verify` checks signature / iss / aud / nbf / exp only. Which subject type is
//!   acceptable is decided by the caller (gate: access, refresh endpoint: refresh).

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::services::auth::error::AuthError;

pub const DEFAULT_ROLE: &str = "user";

/// Upper bound for either token lifetime (10 years).
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// 0 や上限超えは発行時に exp が壊れるので起動時に弾く
pub fn ttl_in_range(seconds: u64) -> bool {
    (1..=MAX_TTL_SECONDS).contains(&seconds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Access,
    Refresh,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Access => "access",
            SubjectType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload. Field names are the wire claim names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub userid: String,
    #[serde(default)]
    pub roles: Vec<String>,

    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub sub: SubjectType,
}

/// Everything the token service needs, built from `Config` at startup.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub leeway_seconds: u64,
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // secret は出さない
        f.debug_struct("TokenSettings")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// Access + refresh pair returned by login and refresh.
#[derive(Clone, Debug)]
pub struct IssuedTokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> Result<Self, AuthError> {
        if settings.secret.trim().is_empty() {
            error!("token signing secret is empty");
            return Err(AuthError::Signing(None));
        }

        for (subject, ttl) in [
            (SubjectType::Access, settings.access_ttl_seconds),
            (SubjectType::Refresh, settings.refresh_ttl_seconds),
        ] {
            if !ttl_in_range(ttl) {
                error!(subject = %subject, ttl, "token ttl out of range");
                return Err(AuthError::Signing(None));
            }
        }

        let secret = settings.secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            access_ttl_seconds: settings.access_ttl_seconds,
            refresh_ttl_seconds: settings.refresh_ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self, subject: SubjectType) -> u64 {
        match subject {
            SubjectType::Access => self.access_ttl_seconds,
            SubjectType::Refresh => self.refresh_ttl_seconds,
        }
    }

    /// Issue a token of the given subject type for `owner_id`.
    pub fn issue(&self, owner_id: &str, subject: SubjectType) -> Result<String, AuthError> {
        self.issue_at(owner_id, subject, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        owner_id: &str,
        subject: SubjectType,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = i64::try_from(self.ttl_seconds(subject))
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                error!(subject = %subject, "token expiry overflows");
                AuthError::Signing(None)
            })?;

        let claims = Claims {
            userid: owner_id.to_string(),
            roles: vec![DEFAULT_ROLE.to_string()],
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            sub: subject,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                error!(error = %e, subject = %subject, "failed to sign token");
                AuthError::Signing(Some(e))
            })
    }

    /// Issue a fresh access + refresh pair bound to `owner_id`.
    pub fn issue_pair(&self, owner_id: &str) -> Result<IssuedTokenPair, AuthError> {
        let access_token = self.issue(owner_id, SubjectType::Access)?;
        let refresh_token = self.issue(owner_id, SubjectType::Refresh)?;

        Ok(IssuedTokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.access_ttl_seconds,
        })
    }

    /// Verify signature, issuer, audience and the nbf/exp window.
    ///
    /// The subject type is returned as-is; see `verify_subject`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(AuthError::InvalidToken)?;

        Ok(data.claims)
    }

    /// `verify` + require a specific subject type.
    pub fn verify_subject(&self, token: &str, expected: SubjectType) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;

        if claims.sub != expected {
            return Err(AuthError::WrongSubjectType {
                expected,
                found: claims.sub,
            });
        }

        Ok(claims)
    }

    /// Refresh flow: a valid refresh token mints a new pair for the same owner.
    ///
    /// The presented refresh token is not invalidated (no revocation store).
    pub fn refresh(&self, refresh_token: &str) -> Result<IssuedTokenPair, AuthError> {
        let claims = self.verify_subject(refresh_token, SubjectType::Refresh)?;
        self.issue_pair(&claims.userid)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    pub(crate) fn test_settings() -> TokenSettings {
        TokenSettings {
            secret: "test-secret-do-not-use".to_string(),
            issuer: "paperless.dev".to_string(),
            audience: "paperless.dev".to_string(),
            access_ttl_seconds: 24 * 60 * 60,
            refresh_ttl_seconds: 30 * 24 * 60 * 60,
            leeway_seconds: 0,
        }
    }

    pub(crate) fn test_service() -> TokenService {
        TokenService::new(&test_settings()).unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut settings = test_settings();
        settings.secret = "  ".to_string();

        let err = TokenService::new(&settings).unwrap_err();
        assert!(matches!(err, AuthError::Signing(None)));
    }

    #[test]
    fn out_of_range_ttl_is_rejected() {
        for ttl in [0, MAX_TTL_SECONDS + 1, 10_u64.pow(16), u64::MAX] {
            let mut settings = test_settings();
            settings.access_ttl_seconds = ttl;
            assert!(
                matches!(TokenService::new(&settings), Err(AuthError::Signing(None))),
                "access {ttl}"
            );

            let mut settings = test_settings();
            settings.refresh_ttl_seconds = ttl;
            assert!(
                matches!(TokenService::new(&settings), Err(AuthError::Signing(None))),
                "refresh {ttl}"
            );
        }
    }

    #[test]
    fn longest_ttl_still_verifies() {
        let mut settings = test_settings();
        settings.access_ttl_seconds = MAX_TTL_SECONDS;
        let svc = TokenService::new(&settings).unwrap();

        let token = svc.issue("u1", SubjectType::Access).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TTL_SECONDS as i64);
    }

    #[test]
    fn expiry_past_max_datetime_is_a_signing_error() {
        let svc = test_service();
        let err = svc
            .issue_at("u1", SubjectType::Access, DateTime::<Utc>::MAX_UTC)
            .unwrap_err();
        assert!(matches!(err, AuthError::Signing(None)));
    }

    #[test]
    fn access_token_round_trips_owner_and_subject() {
        let svc = test_service();
        let token = svc.issue("u1", SubjectType::Access).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.userid, "u1");
        assert_eq!(claims.sub, SubjectType::Access);
        assert_eq!(claims.roles, vec!["user".to_string()]);
        assert_eq!(claims.iss, "paperless.dev");
        assert_eq!(claims.aud, "paperless.dev");
    }

    #[test]
    fn expiry_depends_on_subject_type() {
        let svc = test_service();
        let now = Utc::now();

        let access = svc.issue_at("u1", SubjectType::Access, now).unwrap();
        let refresh = svc.issue_at("u1", SubjectType::Refresh, now).unwrap();

        let access = svc.verify(&access).unwrap();
        let refresh = svc.verify(&refresh).unwrap();

        assert_eq!(access.iat, now.timestamp());
        assert_eq!(access.nbf, now.timestamp());
        assert_eq!(access.exp - access.iat, 24 * 60 * 60);
        assert_eq!(refresh.exp - refresh.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_invalid() {
        let svc = test_service();
        let issued = Utc::now() - TimeDelta::hours(25);
        let token = svc.issue_at("u1", SubjectType::Access, issued).unwrap();

        let err = svc.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn token_from_the_future_is_invalid() {
        let svc = test_service();
        let issued = Utc::now() + TimeDelta::hours(1);
        let token = svc.issue_at("u1", SubjectType::Access, issued).unwrap();

        assert!(matches!(svc.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let svc = test_service();
        let token = svc.issue("u1", SubjectType::Access).unwrap();

        let mut bytes = token.into_bytes();
        let i = bytes.len() - 5;
        // stay inside the base64url alphabet
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            svc.verify(&tampered),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let svc = test_service();
        let token = svc.issue("u1", SubjectType::Access).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let payload = String::from_utf8(payload)
            .unwrap()
            .replace("\"u1\"", "\"u2\"");
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(payload),
            parts[2]
        );

        assert!(svc.verify(&forged).is_err());
    }

    #[test]
    fn other_secret_is_rejected() {
        let svc = test_service();
        let mut settings = test_settings();
        settings.secret = "another-secret".to_string();
        let other = TokenService::new(&settings).unwrap();

        let token = other.issue("u1", SubjectType::Access).unwrap();
        assert!(matches!(svc.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn other_audience_is_rejected() {
        let svc = test_service();
        let mut settings = test_settings();
        settings.audience = "someone-else".to_string();
        let other = TokenService::new(&settings).unwrap();

        let token = other.issue("u1", SubjectType::Access).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let svc = test_service();
        assert!(matches!(svc.verify("abc"), Err(AuthError::InvalidToken(_))));
        assert!(matches!(svc.verify(""), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn verify_subject_enforces_type() {
        let svc = test_service();
        let refresh = svc.issue("u1", SubjectType::Refresh).unwrap();

        assert!(svc.verify(&refresh).is_ok());
        let err = svc.verify_subject(&refresh, SubjectType::Access).unwrap_err();
        assert!(matches!(
            err,
            AuthError::WrongSubjectType {
                expected: SubjectType::Access,
                found: SubjectType::Refresh,
            }
        ));
    }

    #[test]
    fn refresh_rotates_pair_for_same_owner() {
        let svc = test_service();
        let refresh = svc.issue("u1", SubjectType::Refresh).unwrap();

        let pair = svc.refresh(&refresh).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 24 * 60 * 60);

        let access = svc.verify_subject(&pair.access_token, SubjectType::Access).unwrap();
        let next = svc
            .verify_subject(&pair.refresh_token, SubjectType::Refresh)
            .unwrap();
        assert_eq!(access.userid, "u1");
        assert_eq!(next.userid, "u1");
    }

    #[test]
    fn refresh_rejects_access_token() {
        let svc = test_service();
        let access = svc.issue("u1", SubjectType::Access).unwrap();

        assert!(matches!(
            svc.refresh(&access),
            Err(AuthError::WrongSubjectType { .. })
        ));
    }
}
