use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by access tokens from the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// HS256 access-token verifier.
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    audience: Option<String>,
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            audience: audience.map(str::to_string),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Mint a token for `user_id` valid for `ttl_secs`. Used by local tooling
    /// and tests; production tokens come from the auth provider.
    pub fn issue(&self, user_id: Uuid, email: Option<&str>, ttl_secs: i64) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            exp: (now + ttl_secs).max(0) as usize,
            iat: Some(now as usize),
            aud: self.audience.clone(),
            email: email.map(str::to_string),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let verifier = TokenVerifier::new("secret", None).unwrap();
        let user = Uuid::new_v4();

        let token = verifier.issue(user, Some("a@example.com"), 300).unwrap();
        let claims = verifier.verify(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = TokenVerifier::new("secret", None).unwrap();
        let token = verifier.issue(Uuid::new_v4(), None, -3600).unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenVerifier::new("secret-a", None).unwrap();
        let verifier = TokenVerifier::new("secret-b", None).unwrap();
        let token = issuer.issue(Uuid::new_v4(), None, 300).unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_audience_enforced() {
        let issuer = TokenVerifier::new("secret", Some("other")).unwrap();
        let verifier = TokenVerifier::new("secret", Some("authenticated")).unwrap();
        let token = issuer.issue(Uuid::new_v4(), None, 300).unwrap();

        assert!(verifier.verify(&token).is_err());

        let good = verifier.issue(Uuid::new_v4(), None, 300).unwrap();
        assert!(verifier.verify(&good).is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenVerifier::new("", None),
            Err(AuthError::EmptySecret)
        ));
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
