use log::*;

#[derive(Debug, Clone, Default)]
pub struct E5Config {
    pub base_url: String,
    /// Sent with every request as the `ADV_userName` query parameter.
    pub username: String,
}

impl E5Config {
    pub fn new(base_url: impl Into<String>, username: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), username: username.into() }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("LFP_E5_API_URL").unwrap_or_else(|_| {
            warn!("🪛️ LFP_E5_API_URL not set, using (probably useless) default");
            "http://localhost:8080".to_string()
        });
        let username = std::env::var("LFP_E5_USERNAME").unwrap_or_else(|_| {
            warn!("🪛️ LFP_E5_USERNAME not set, using (probably useless) default");
            "SYSTEM".to_string()
        });
        Self { base_url: base_url.trim_end_matches('/').to_string(), username }
    }
}
