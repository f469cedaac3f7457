// Session Domain Model
//
// Server-side session: the cookie carries only the opaque id.

use serde::{Deserialize, Serialize};

use super::account::UserId;
use super::cart::Cart;

pub type SessionId = String;

/// Persisted session payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub cart: Cart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: Option<UserId>,
    pub data: SessionData,
    pub expires_at: i64, // epoch ms
}

impl Session {
    pub fn new(id: impl Into<String>, expires_at: i64) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            data: SessionData::default(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at <= now_millis
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Bind to a user under a fresh id; the cart survives
    pub fn login(&mut self, user_id: UserId, new_id: impl Into<String>, expires_at: i64) {
        self.id = new_id.into();
        self.user_id = Some(user_id);
        self.expires_at = expires_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;

    #[test]
    fn test_login_rotates_id_and_keeps_cart() {
        let mut session = Session::new("anon", 5_000);
        session.data.cart.add(1, 2, Money::from_units(3)).unwrap();

        session.login(9, "fresh", 10_000);

        assert_eq!(session.id, "fresh");
        assert_eq!(session.user_id, Some(9));
        assert_eq!(session.data.cart.quantity_of(1), 2);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_expiry_boundary() {
        let session = Session::new("s", 1_000);
        assert!(!session.is_expired(999));
        assert!(session.is_expired(1_000));
    }

    #[test]
    fn test_data_defaults_when_blob_is_empty() {
        let data: SessionData = serde_json::from_str("{}").unwrap();
        assert!(data.cart.is_empty());
    }
}
