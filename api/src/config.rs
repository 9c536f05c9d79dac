use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL of the command-style key-value cache (e.g. an Upstash REST endpoint)
    pub session_cache_url: Option<String>,
    pub session_cache_token: Option<String>,
    /// How long a fetched CSRF token + cookie pair is reused
    pub csrf_session_ttl_secs: u64,
    pub partner_cache_ttl_secs: u64,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub completion_api_url: Option<String>,
    pub completion_api_key: Option<String>,
    pub completion_model: String,
    /// Serve demo deliveries/invoices when SAP is unreachable
    pub sap_demo_fallback: bool,
    pub sap_timeout_secs: u64,
    /// Request timeout of the session cache client
    pub cache_timeout_secs: u64,
    /// Request timeout of the mail and completion clients
    pub http_timeout_secs: u64,
    /// Apply per-IP rate limiting to routes that write to SAP
    pub rate_limit_sap_writes: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: parse_var("PORT", 8080),
            session_cache_url: non_empty_var("SESSION_CACHE_URL"),
            session_cache_token: non_empty_var("SESSION_CACHE_TOKEN"),
            csrf_session_ttl_secs: parse_var("CSRF_SESSION_TTL_SECS", 300),
            partner_cache_ttl_secs: parse_var("PARTNER_CACHE_TTL_SECS", 600),
            mail_api_url: non_empty_var("MAIL_API_URL"),
            mail_api_key: non_empty_var("MAIL_API_KEY"),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Portal <no-reply@portal.local>".to_string()),
            completion_api_url: non_empty_var("COMPLETION_API_URL"),
            completion_api_key: non_empty_var("COMPLETION_API_KEY"),
            completion_model: env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            sap_demo_fallback: parse_bool("SAP_DEMO_FALLBACK"),
            sap_timeout_secs: parse_var("SAP_TIMEOUT_SECS", 30),
            cache_timeout_secs: parse_var("CACHE_TIMEOUT_SECS", 5),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", 15),
            rate_limit_sap_writes: env::var("RATE_LIMIT_SAP_WRITES")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// Check if the session cache is configured
    pub fn session_cache_enabled(&self) -> bool {
        self.session_cache_url.is_some()
    }

    /// Check if transactional mail is configured
    pub fn mail_enabled(&self) -> bool {
        self.mail_api_url.is_some() && self.mail_api_key.is_some()
    }

    /// Check if the completion API is configured
    pub fn completion_enabled(&self) -> bool {
        self.completion_api_url.is_some() && self.completion_api_key.is_some()
    }

    /// Configuration used by unit and router tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/portal_test".to_string(),
            port: 0,
            session_cache_url: None,
            session_cache_token: None,
            csrf_session_ttl_secs: 300,
            partner_cache_ttl_secs: 600,
            mail_api_url: None,
            mail_api_key: None,
            mail_from: "Portal <no-reply@portal.local>".to_string(),
            completion_api_url: None,
            completion_api_key: None,
            completion_model: "test-model".to_string(),
            sap_demo_fallback: false,
            sap_timeout_secs: 5,
            cache_timeout_secs: 2,
            http_timeout_secs: 5,
            rate_limit_sap_writes: false,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str) -> bool {
    matches!(
        env::var(key).as_deref().map(str::to_lowercase).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}
