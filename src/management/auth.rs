use chrono::Utc;

use crate::types::ClientToken;

/// Seconds before the reported expiry at which a token counts as expired.
const EXPIRY_MARGIN: u64 = 60;

/// Holds an access token together with the moment it was obtained.
pub struct TokenManager {
    token: ClientToken,
}

impl TokenManager {
    pub fn new(token: ClientToken) -> Self {
        TokenManager { token }
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN >= self.token.obtained_at + self.token.expires_in
    }

    /// The access token, or `None` once it has expired.
    pub fn valid_token(&self) -> Option<&str> {
        (!self.is_expired()).then_some(self.token.access_token.as_str())
    }
}
