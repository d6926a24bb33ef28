//! Authenticated user record.

use serde::{Deserialize, Serialize};

use hungry_owl_core::UserId;

/// The logged-in user as returned by the login and profile endpoints.
///
/// Persisted as JSON next to the auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server id.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Default delivery address.
    #[serde(default)]
    pub address: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_roundtrip_uses_camel_case() {
        let user = User {
            id: UserId::new(5),
            full_name: "Lan Nguyen".to_string(),
            email: "lan@example.com".to_string(),
            phone: None,
            address: Some("12 Ly Tu Trong".to_string()),
            avatar_url: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"fullName\""));
        assert_eq!(serde_json::from_str::<User>(&json).unwrap(), user);
    }

    #[test]
    fn test_user_optional_fields_default() {
        let user: User =
            serde_json::from_str(r#"{"id":1,"fullName":"A","email":"a@b.c"}"#).unwrap();
        assert!(user.phone.is_none());
        assert!(user.address.is_none());
    }
}
