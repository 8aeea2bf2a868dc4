use std::env;

#[derive(Clone)]
pub struct BotConfig {
    /// Transport token, handed to the chat adapter that drains the outbox.
    pub token: String,
    /// Shared secret that grants the admin role through `/admin`.
    pub admin_code: String,
    pub bind_addr: String,
}

impl BotConfig {
    pub fn from_env() -> Self {
        Self {
            token: env::var("BOT_TOKEN").unwrap_or_default(),
            admin_code: env::var("ADMIN_CODE")
                .unwrap_or_else(|_| "change-me-admin-code".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }

    pub fn is_admin_code(&self, candidate: &str) -> bool {
        !self.admin_code.is_empty() && candidate.trim() == self.admin_code
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("admin_code", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
