use chrono::Utc;

use crate::types::Token;

/// Seconds before the nominal expiry at which a token is treated as expired.
pub const EXPIRY_MARGIN_SECS: u64 = 60;

/// Holds the access token for the lifetime of the process.
///
/// Implicit grant tokens cannot be refreshed, so the only thing managed here
/// is knowing when the token stops being usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp().max(0) as u64)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        let expires_at = self.token.obtained_at.saturating_add(self.token.expires_in);
        now >= expires_at.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
