//! HTTP client for the hosted Supabase backend.
//!
//! Covers exactly the calls the site makes: password sign-in, sign-up with
//! profile metadata, row insert/upsert, fetching the current user, and the
//! best-effort public-IP echo used for activity logging. Requests are fired
//! once — no retries and no client-side timeout; a hung call stays in flight
//! until the server settles it.

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

const IP_ECHO_URL: &str = "https://api.ipify.org?format=json";

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status_code: u16, message: String },
    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: Value,
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    pub user: UserInfo,
}

#[derive(Debug)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    http: reqwest::Client,
    // Last session token, so that `user` reports who is signed in.
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    /// # Errors
    /// Returns `SupabaseError::Config` if the URL or key is empty, or if the
    /// underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, SupabaseError> {
        if base_url.is_empty() || anon_key.is_empty() {
            return Err(SupabaseError::Config(
                "Supabase URL and anon key are required".to_owned(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent("mdvta-portal/0.1.0")
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
            http,
            access_token: RwLock::new(None),
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    /// `SupabaseError::Api` carries the service's own message so it can be
    /// surfaced to the user verbatim.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let session: Session = self.post_json(&url, &body).await?;
        self.remember_token(session.access_token.clone()).await;
        Ok(session)
    }

    /// Sign up a new account, attaching profile metadata to the auth record.
    ///
    /// # Errors
    /// `SupabaseError::Api` carries the service's rejection message
    /// (e.g. "Email already registered").
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<Session, SupabaseError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        });
        let session: Session = self.post_json(&url, &body).await?;
        self.remember_token(session.access_token.clone()).await;
        Ok(session)
    }

    /// Insert a row into a table.
    ///
    /// # Errors
    /// Returns `SupabaseError` if the request fails or the service rejects it.
    pub async fn insert(&self, table: &str, record: Value) -> Result<(), SupabaseError> {
        self.write_row(table, record, false).await
    }

    /// Insert a row, merging with an existing one on conflict.
    ///
    /// # Errors
    /// Returns `SupabaseError` if the request fails or the service rejects it.
    pub async fn upsert(&self, table: &str, record: Value) -> Result<(), SupabaseError> {
        self.write_row(table, record, true).await
    }

    /// Fetch the currently signed-in user, if any session is held.
    ///
    /// # Errors
    /// Returns `SupabaseError` if the request fails.
    pub async fn user(&self) -> Result<Option<UserInfo>, SupabaseError> {
        let Some(token) = self.access_token.read().await.clone() else {
            return Ok(None);
        };

        let url = format!("{}/auth/v1/user", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let user: UserInfo = serde_json::from_str(&resp.text().await?)?;
        Ok(Some(user))
    }

    /// Public IP of this host via the IP-echo collaborator. Best-effort:
    /// any failure collapses to `None`.
    pub async fn fetch_public_ip(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct IpResponse {
            ip: String,
        }

        match self.http.get(IP_ECHO_URL).send().await {
            Ok(resp) => match resp.json::<IpResponse>().await {
                Ok(body) => Some(body.ip),
                Err(e) => {
                    warn!("IP lookup returned an unreadable body: {e}");
                    None
                }
            },
            Err(e) => {
                warn!("IP lookup failed: {e}");
                None
            }
        }
    }

    async fn remember_token(&self, token: Option<String>) {
        if token.is_some() {
            *self.access_token.write().await = token;
        }
    }

    async fn write_row(
        &self,
        table: &str,
        record: Value,
        merge: bool,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        let mut req = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Prefer", if merge {
                "resolution=merge-duplicates,return=minimal"
            } else {
                "return=minimal"
            })
            .json(&record);

        if let Some(token) = self.access_token.read().await.clone() {
            req = req.bearer_auth(token);
        } else {
            req = req.bearer_auth(&self.anon_key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &text))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<T, SupabaseError> {
        let resp = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }
        Err(api_error(status.as_u16(), &text))
    }
}

/// Build an `Api` error from a response body, digging the service's message
/// out of the handful of shapes Supabase uses.
fn api_error(status_code: u16, body: &str) -> SupabaseError {
    SupabaseError::Api {
        status_code,
        message: extract_message(body).unwrap_or_else(|| format!("HTTP {status_code}")),
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["msg", "message", "error_description", "error"] {
        if let Some(msg) = value.get(key).and_then(Value::as_str) {
            if !msg.is_empty() {
                return Some(msg.to_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_configuration() {
        assert!(matches!(
            SupabaseClient::new("", "key"),
            Err(SupabaseError::Config(_))
        ));
        assert!(matches!(
            SupabaseClient::new("https://x.supabase.co", ""),
            Err(SupabaseError::Config(_))
        ));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = SupabaseClient::new("https://x.supabase.co/", "key").unwrap();
        assert_eq!(client.base_url, "https://x.supabase.co");
    }

    #[test]
    fn extracts_auth_error_message() {
        let body = r#"{"code":400,"error_code":"user_already_exists","msg":"Email already registered"}"#;
        let err = api_error(400, body);
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn extracts_rest_error_message() {
        let body = r#"{"message":"new row violates row-level security policy","code":"42501"}"#;
        let err = api_error(403, body);
        assert_eq!(err.to_string(), "new row violates row-level security policy");
    }

    #[test]
    fn falls_back_to_status_for_opaque_bodies() {
        let err = api_error(502, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[tokio::test]
    async fn user_without_session_is_none() {
        let client = SupabaseClient::new("https://x.supabase.co", "key").unwrap();
        let user = client.user().await.unwrap();
        assert!(user.is_none());
    }
}
