use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use domain::member::AuthUser;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Secret - In production, use environment variable or secure key management
const JWT_SECRET: &[u8] = b"mdvta_session_secret_change_in_production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (member ID)
    pub email: String, // Email for convenience
    pub name: String,  // Display name for the navbar
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

impl Claims {
    pub fn new(user: &AuthUser) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(24); // Token expires in 24 hours

        Self {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Generate a session token for the given member
pub fn create_session_token(user: &AuthUser) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(user);
    let header = Header::default();
    let encoding_key = EncodingKey::from_secret(JWT_SECRET);

    encode(&header, &claims, &encoding_key)
}

/// Verify and decode a session token
pub fn verify_session_token(token: &str) -> Option<Claims> {
    let decoding_key = DecodingKey::from_secret(JWT_SECRET);
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Signed-in member from the request cookies, if any
pub fn current_claims(headers: &HeaderMap) -> Option<Claims> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    cookie_str
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix("session="))
        .and_then(verify_session_token)
}

/// Helper to create the session cookie. "Remember me" keeps the cookie for
/// 24 hours; otherwise it ends with the browser session.
pub fn create_session_cookie(token: &str, remember: bool) -> String {
    if remember {
        format!(
            "session={}; HttpOnly; SameSite=Strict; Max-Age={}; Path=/",
            token,
            24 * 60 * 60 // 24 hours in seconds
        )
    } else {
        format!("session={token}; HttpOnly; SameSite=Strict; Path=/")
    }
}

/// Helper to create a cookie that clears the session
pub fn create_logout_cookie() -> String {
    "session=; HttpOnly; SameSite=Strict; Max-Age=0; Path=/".to_string()
}
