use serde::{Deserialize, Serialize};

use crate::drive::UserProfile;

/// Google Drive session, persisted under its own storage key.
///
/// Tokens are never refreshed; an expired token is discovered when Drive
/// rejects it and the session is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    is_authenticated: bool,
    access_token: Option<String>,
    user: Option<UserProfile>,
}

impl AuthState {
    pub fn login(&mut self, access_token: String, user: UserProfile) {
        tracing::info!(email = %user.email, "signed in to Google Drive");
        self.is_authenticated = true;
        self.access_token = Some(access_token);
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.is_authenticated = false;
        self.access_token = None;
        self.user = None;
    }

    /// Token for Drive calls, only while signed in.
    pub fn token(&self) -> Option<&str> {
        if self.is_authenticated {
            self.access_token.as_deref()
        } else {
            None
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> UserProfile {
        UserProfile {
            email: "ada@example.com".into(),
            name: "Ada".into(),
            picture: String::new(),
        }
    }

    #[test]
    fn test_login_then_logout() {
        let mut auth = AuthState::default();
        assert_eq!(auth.token(), None);
        auth.login("tok".into(), ada());
        assert!(auth.is_authenticated());
        assert_eq!(auth.token(), Some("tok"));
        assert_eq!(auth.user().map(|u| u.name.as_str()), Some("Ada"));
        auth.logout();
        assert_eq!(auth, AuthState::default());
    }

    #[test]
    fn test_serialized_shape() {
        let mut auth = AuthState::default();
        auth.login("tok".into(), ada());
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["isAuthenticated"], true);
        assert_eq!(json["accessToken"], "tok");
        assert_eq!(json["user"]["email"], "ada@example.com");
    }
}
