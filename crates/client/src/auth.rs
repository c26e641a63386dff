use serde::Deserialize;

use crate::error::AuthError;
use crate::query;

/// Claim URIs the validation endpoint checks, sent as repeated `claims`
/// form fields in this order.
pub const VALIDATION_CLAIMS: [&str; 4] = [
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/givenname",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/surname",
];

/// Short-lived service token minted for one session group and reused by
/// every lookup in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
struct TokenBody {
    #[serde(rename = "apiToken")]
    api_token: String,
}

/// Exchanges report session credentials for a validated [`ApiToken`].
///
/// Two calls, both mandatory: `GET {auth_base}/apiToken` mints the token,
/// `POST {auth_base}/ValidateSecurityToken` proves it against the standard
/// identity claims. A failure at either step is terminal for the session
/// group; nothing here retries.
pub struct Authenticator {
    http: reqwest::Client,
    auth_base: String,
}

impl Authenticator {
    pub fn new(http: reqwest::Client, auth_base: impl Into<String>) -> Self {
        Self {
            http,
            auth_base: auth_base.into(),
        }
    }

    pub async fn authenticate(
        &self,
        session_id: &str,
        auth_token: &str,
    ) -> Result<ApiToken, AuthError> {
        let token = self.request_token(session_id, auth_token).await?;
        self.validate(session_id, auth_token, &token).await?;
        log::debug!("session {session_id} authenticated");
        Ok(token)
    }

    async fn request_token(
        &self,
        session_id: &str,
        auth_token: &str,
    ) -> Result<ApiToken, AuthError> {
        let url = format!(
            "{}/apiToken?sessionId={}&authToken={}",
            self.auth_base.trim_end_matches('/'),
            query::escape(session_id),
            query::escape(auth_token),
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AuthError::TokenRequest(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::TokenStatus(status.as_u16()));
        }
        let body: TokenBody = response
            .json()
            .await
            .map_err(|err| AuthError::TokenBody(err.to_string()))?;
        let token = body.api_token.trim().to_string();
        if token.is_empty() {
            return Err(AuthError::TokenBody("empty apiToken".to_string()));
        }
        Ok(ApiToken::new(token))
    }

    async fn validate(
        &self,
        session_id: &str,
        auth_token: &str,
        token: &ApiToken,
    ) -> Result<(), AuthError> {
        let url = format!(
            "{}/ValidateSecurityToken",
            self.auth_base.trim_end_matches('/')
        );
        let mut form: Vec<(&str, &str)> = vec![("sessionId", session_id), ("authToken", auth_token)];
        for claim in VALIDATION_CLAIMS {
            form.push(("claims", claim));
        }
        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .form(&form)
            .send()
            .await
            .map_err(|err| AuthError::ValidationRequest(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ValidationStatus(status.as_u16()));
        }
        Ok(())
    }
}
