//! Backend port: the hosted collaborator and its local demo stand-in.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use local_store_adapter::{LocalStore, StoreError};
use serde_json::{Value, json};
use supabase_adapter::{SupabaseClient, SupabaseError, UserInfo};
use tracing::debug;

use crate::member::AuthUser;

pub const DEMO_EMAIL: &str = "demo@mdvta.org.tw";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_NAME: &str = "演示用戶";
pub const MSG_DEMO_BAD_CREDENTIALS: &str = "帳號或密碼錯誤（請嘗試 demo@mdvta.org.tw / demo123）";
pub const MSG_EMAIL_TAKEN: &str = "此電子郵件已被註冊";

#[derive(Debug)]
pub enum BackendError {
    /// The collaborator refused the request and said why. The message is
    /// meant for the user.
    Rejected(String),
    /// Transport-level failure; the user gets a generic message instead.
    Unavailable(String),
    Store(StoreError),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Rejected(msg) => write!(f, "{msg}"),
            BackendError::Unavailable(msg) => write!(f, "backend unavailable: {msg}"),
            BackendError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<StoreError> for BackendError {
    fn from(error: StoreError) -> Self {
        BackendError::Store(error)
    }
}

impl From<SupabaseError> for BackendError {
    fn from(error: SupabaseError) -> Self {
        match error {
            SupabaseError::Api { message, .. } => BackendError::Rejected(message),
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}

impl BackendError {
    /// The collaborator's own message, when there is one fit to show.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected(msg) => Some(msg),
            _ => None,
        }
    }
}

/// The external collaborator consumed by the submission flows. All calls are
/// request/response; none are retried or cancelled.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, BackendError>;

    async fn insert_row(&self, table: &str, record: Value) -> Result<(), BackendError>;

    async fn upsert_row(&self, table: &str, record: Value) -> Result<(), BackendError>;

    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError>;

    /// Whether this is the real hosted service (activity logging and the IP
    /// lookup only happen against the real one).
    fn is_hosted(&self) -> bool;

    async fn public_ip(&self) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Hosted backend
// ---------------------------------------------------------------------------

/// The real hosted service.
pub struct HostedBackend {
    client: SupabaseClient,
}

impl HostedBackend {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

fn auth_user_from_info(info: UserInfo) -> AuthUser {
    let name = info
        .user_metadata
        .get("full_name")
        .and_then(Value::as_str)
        .unwrap_or(&info.email)
        .to_string();
    AuthUser {
        id: info.id,
        email: info.email,
        name,
    }
}

#[async_trait]
impl Backend for HostedBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let session = self.client.sign_in_with_password(email, password).await?;
        Ok(auth_user_from_info(session.user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, BackendError> {
        let session = self.client.sign_up(email, password, metadata).await?;
        Ok(auth_user_from_info(session.user))
    }

    async fn insert_row(&self, table: &str, record: Value) -> Result<(), BackendError> {
        Ok(self.client.insert(table, record).await?)
    }

    async fn upsert_row(&self, table: &str, record: Value) -> Result<(), BackendError> {
        Ok(self.client.upsert(table, record).await?)
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
        Ok(self.client.user().await?.map(auth_user_from_info))
    }

    fn is_hosted(&self) -> bool {
        true
    }

    async fn public_ip(&self) -> Option<String> {
        self.client.fetch_public_ip().await
    }
}

// ---------------------------------------------------------------------------
// Fallback backend
// ---------------------------------------------------------------------------

const KEY_AUTH_USER: &str = "authUser";
const KEY_DEMO_USERS: &str = "demoUsers";

/// Store key holding the demo rendition of a backend table.
fn table_key(table: &str) -> &str {
    match table {
        "contact_forms" => "contactSubmissions",
        "newsletter_subscriptions" => "newsletterSubscriptions",
        "members" => "demoMembers",
        "member_activities" => "memberActivities",
        other => other,
    }
}

/// Demo-mode backend over the browser-style fallback store. Accepts the demo
/// account and any account registered in this store; optionally sleeps to
/// imitate the hosted service's latency.
pub struct FallbackBackend {
    store: LocalStore,
    simulate_latency: bool,
}

impl FallbackBackend {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            simulate_latency: false,
        }
    }

    #[must_use]
    pub fn with_simulated_latency(mut self) -> Self {
        self.simulate_latency = true;
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    async fn pause(&self, millis: u64) {
        if self.simulate_latency {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    fn remember_user(&self, user: &AuthUser) -> Result<(), BackendError> {
        self.store.set(
            KEY_AUTH_USER,
            json!({ "id": user.id, "email": user.email, "name": user.name }),
        )?;
        Ok(())
    }
}

#[async_trait]
impl Backend for FallbackBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        self.pause(1500).await;

        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            let user = AuthUser {
                id: "demo".to_string(),
                email: email.to_string(),
                name: DEMO_NAME.to_string(),
            };
            self.remember_user(&user)?;
            return Ok(user);
        }

        // Accounts registered in demo mode can sign in too.
        let registered = self.store.get_array(KEY_DEMO_USERS).into_iter().find(|u| {
            u.get("email").and_then(Value::as_str) == Some(email)
                && u.get("password").and_then(Value::as_str) == Some(password)
        });

        if let Some(record) = registered {
            let user = AuthUser {
                id: record
                    .get("id")
                    .map(Value::to_string)
                    .unwrap_or_default()
                    .trim_matches('"')
                    .to_string(),
                email: email.to_string(),
                name: record
                    .get("full_name")
                    .and_then(Value::as_str)
                    .unwrap_or(email)
                    .to_string(),
            };
            self.remember_user(&user)?;
            return Ok(user);
        }

        Err(BackendError::Rejected(MSG_DEMO_BAD_CREDENTIALS.to_string()))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, BackendError> {
        self.pause(2000).await;

        let taken = self
            .store
            .get_array(KEY_DEMO_USERS)
            .iter()
            .any(|u| u.get("email").and_then(Value::as_str) == Some(email));
        if taken {
            return Err(BackendError::Rejected(MSG_EMAIL_TAKEN.to_string()));
        }

        let id = Utc::now().timestamp_millis();
        let name = metadata
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or(email)
            .to_string();

        let mut record = json!({
            "id": id,
            "email": email,
            "password": password,
            "created_at": Utc::now().to_rfc3339(),
        });
        if let (Some(target), Some(source)) = (record.as_object_mut(), metadata.as_object()) {
            for (k, v) in source {
                target.insert(k.clone(), v.clone());
            }
        }
        self.store.push(KEY_DEMO_USERS, record)?;

        Ok(AuthUser {
            id: id.to_string(),
            email: email.to_string(),
            name,
        })
    }

    async fn insert_row(&self, table: &str, record: Value) -> Result<(), BackendError> {
        // Contact submissions carry the same fake latency as the real call.
        if table == "contact_forms" {
            self.pause(2000).await;
        }

        let mut record = record;
        if let Some(obj) = record.as_object_mut() {
            obj.entry("id")
                .or_insert_with(|| json!(Utc::now().timestamp_millis()));
            obj.entry("submittedAt")
                .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        }
        self.store.push(table_key(table), record)?;
        debug!("demo mode: stored one {table} record");
        Ok(())
    }

    async fn upsert_row(&self, table: &str, record: Value) -> Result<(), BackendError> {
        let key = table_key(table);
        let mut rows = self.store.get_array(key);

        let matches_existing = |existing: &Value| {
            let same = |field: &str| {
                record.get(field).is_some() && existing.get(field) == record.get(field)
            };
            same("id") || same("email")
        };

        if let Some(slot) = rows.iter_mut().find(|r| matches_existing(r)) {
            *slot = record;
        } else {
            rows.push(record);
        }
        self.store.set(key, Value::Array(rows))?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
        let Some(record) = self.store.get(KEY_AUTH_USER) else {
            return Ok(None);
        };
        let field = |name: &str| {
            record
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Some(AuthUser {
            id: field("id"),
            email: field("email"),
            name: field("name"),
        }))
    }

    fn is_hosted(&self) -> bool {
        false
    }
}
