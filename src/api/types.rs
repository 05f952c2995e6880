//! Wire types of the admin user-management API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles recognized by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SpaOwner,
    Customer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::SpaOwner, Role::Customer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SpaOwner => "spa_owner",
            Role::Customer => "customer",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct SendOtpRequest<'a> {
    pub phone: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub phone: &'a str,
    pub otp: &'a str,
    pub name: &'a str,
}

/// Role is a plain string so probes can send values outside [`Role`].
#[derive(Debug, Serialize)]
pub struct CreateUserRequest<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest<'a> {
    pub user_id: &'a str,
    pub new_role: &'a str,
}

/// User object as echoed by the service. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
}

impl UserRecord {
    pub fn has_role(&self, role: Role) -> bool {
        self.role.as_deref() == Some(role.as_str())
    }

    pub fn role_display(&self) -> &str {
        self.role.as_deref().unwrap_or("None")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendOtpResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of user creation and role update responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMutationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::SpaOwner.as_str(), "spa_owner");
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"customer\"");
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("invalid_role"), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn test_update_role_request_uses_camel_case() {
        let body = serde_json::to_value(UpdateRoleRequest {
            user_id: "abc",
            new_role: "customer",
        })
        .unwrap();
        assert_eq!(body["userId"], "abc");
        assert_eq!(body["newRole"], "customer");
    }

    #[test]
    fn test_user_record_accepts_mongo_id_and_missing_fields() {
        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "_id": "65f0c0ffee",
            "phone": "+919999999999",
            "role": "admin",
            "createdAt": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("65f0c0ffee"));
        assert!(user.name.is_none());
        assert!(user.has_role(Role::Admin));

        let empty = UserRecord::default();
        assert_eq!(empty.role_display(), "None");
    }
}
