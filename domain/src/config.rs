/// Placeholder values shipped in the site configuration. Until both are
/// replaced with real project values, every backend call takes the local
/// fallback path.
pub const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL";
pub const PLACEHOLDER_ANON_KEY: &str = "YOUR_SUPABASE_ANON_KEY";

/// Hosted-backend configuration, resolved once at startup and shared by every
/// page controller.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` from the environment,
    /// falling back to the placeholders when unset.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("SUPABASE_URL").unwrap_or_else(|_| PLACEHOLDER_URL.to_string()),
            anon_key: std::env::var("SUPABASE_ANON_KEY")
                .unwrap_or_else(|_| PLACEHOLDER_ANON_KEY.to_string()),
        }
    }

    /// Whether a real backend is configured. Placeholder or empty values mean
    /// the site runs in demo mode against the local fallback store.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
            && !self.anon_key.is_empty()
            && self.url != PLACEHOLDER_URL
            && self.anon_key != PLACEHOLDER_ANON_KEY
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(PLACEHOLDER_URL, PLACEHOLDER_ANON_KEY)
    }
}
