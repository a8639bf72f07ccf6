//! Activation link tokens.
//!
//! An activation link carries the user's id (base64url, no padding) and a
//! keyed token binding the account's current state. The token covers the
//! `is_active` flag and last login timestamp, so activating the account or
//! logging in invalidates any outstanding link.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use plateful_core::UserId;

use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

/// Encode a user id for use in an activation URL.
#[must_use]
pub fn encode_uid(id: UserId) -> String {
    URL_SAFE_NO_PAD.encode(id.as_i32().to_string())
}

/// Decode a user id from an activation URL segment.
#[must_use]
pub fn decode_uid(encoded: &str) -> Option<UserId> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    let text = std::str::from_utf8(&bytes).ok()?;
    text.parse::<i32>().ok().map(UserId::new)
}

/// Issues and checks activation tokens with a keyed MAC.
#[derive(Clone)]
pub struct ActivationTokens {
    key: Vec<u8>,
}

impl ActivationTokens {
    /// Build a token signer from the application secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: secret.expose_secret().as_bytes().to_vec(),
        }
    }

    /// State string the token binds. Changes on activation or login.
    fn state(user: &User) -> String {
        let last_login = user
            .last_login
            .map_or_else(|| "never".to_owned(), |t| t.timestamp().to_string());
        format!("{}:{}:{}", user.id, user.is_active, last_login)
    }

    fn mac(&self, user: &User) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).unwrap_or_else(|_| unreachable!("any key length"));
        mac.update(Self::state(user).as_bytes());
        mac
    }

    /// Generate a token for the user's current state.
    #[must_use]
    pub fn generate(&self, user: &User) -> String {
        hex::encode(self.mac(user).finalize().into_bytes())
    }

    /// Check a token against the user's current state.
    #[must_use]
    pub fn verify(&self, user: &User, token: &str) -> bool {
        let Ok(bytes) = hex::decode(token) else {
            return false;
        };
        self.mac(user).verify_slice(&bytes).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use plateful_core::{Email, Role};

    use super::*;

    fn test_user(active: bool) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(42),
            first_name: "Asha".to_owned(),
            last_name: "Nair".to_owned(),
            username: "asha".to_owned(),
            email: Email::parse("asha@example.com").expect("valid email"),
            phone_number: None,
            role: Some(Role::Customer),
            is_active: active,
            is_staff: false,
            is_superadmin: false,
            date_joined: now,
            last_login: None,
            created_at: now,
            modified_at: now,
        }
    }

    fn tokens() -> ActivationTokens {
        ActivationTokens::new(&SecretString::from("k7#mZ9$qR2!xW5&vN8*pL4@jF6^tD3%h"))
    }

    #[test]
    fn test_uid_round_trip() {
        let encoded = encode_uid(UserId::new(42));
        assert_eq!(decode_uid(&encoded), Some(UserId::new(42)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_uid("!!!"), None);
        assert_eq!(decode_uid(&URL_SAFE_NO_PAD.encode("not-a-number")), None);
    }

    #[test]
    fn test_token_verifies_for_same_state() {
        let tokens = tokens();
        let user = test_user(false);
        let token = tokens.generate(&user);
        assert!(tokens.verify(&user, &token));
    }

    #[test]
    fn test_token_invalidated_by_activation() {
        let tokens = tokens();
        let user = test_user(false);
        let token = tokens.generate(&user);

        let mut activated = test_user(false);
        activated.is_active = true;
        assert!(!tokens.verify(&activated, &token));
    }

    #[test]
    fn test_token_invalidated_by_login() {
        let tokens = tokens();
        let user = test_user(false);
        let token = tokens.generate(&user);

        let mut logged_in = test_user(false);
        logged_in.last_login = Some(Utc::now());
        assert!(!tokens.verify(&logged_in, &token));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = tokens();
        let user = test_user(false);
        let mut token = tokens.generate(&user);
        token.replace_range(0..1, if token.starts_with('0') { "1" } else { "0" });
        assert!(!tokens.verify(&user, &token));
    }
}
