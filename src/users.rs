//! User management (`/api/v1/users/`).
//!
//! Users are addressed either by numeric ID or by email address; the API
//! accepts both in the same path position, so [`get_user`] and friends take a
//! string.

use serde::{Deserialize, Serialize};

use crate::client::{ApiResponse, ArmisClient, PageParams};
use crate::error::Result;

/// Roles granted to a user, optionally limited to a set of sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Role names, e.g. `"Admin"` or `"Read Only"`.
    pub name: Vec<String>,
    /// Site names the roles apply to. Empty means every site.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<String>,
}

/// A platform user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Numeric user ID.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Login email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Login name, when it differs from the email.
    #[serde(default)]
    pub username: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
    /// Office or region.
    #[serde(default)]
    pub location: Option<String>,
    /// Whether the account can log in.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Last login time (ISO 8601).
    #[serde(default)]
    pub last_login_time: Option<String>,
    /// Granted roles.
    #[serde(default)]
    pub role_assignment: Vec<RoleAssignment>,
}

/// One page of users.
#[derive(Debug, Clone, Deserialize)]
pub struct UserList {
    /// Users on this page.
    #[serde(default)]
    pub users: Vec<User>,
    /// Number of users on this page.
    #[serde(default)]
    pub count: Option<u64>,
    /// Offset of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<u64>,
    /// Total number of users across all pages.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body for create and update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Full name.
    pub name: String,
    /// Login email address.
    pub email: String,
    /// Login name, when it differs from the email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Job title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Office or region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Roles to grant. Omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_assignment: Vec<RoleAssignment>,
}

/// Retrieves one page of users.
pub async fn list_users(client: &ArmisClient, page: PageParams) -> Result<UserList> {
    let path = client.api_path("users/");
    let response: ApiResponse<UserList> = client.get_with_query(&path, &page).await?;
    Ok(response.data)
}

/// Retrieves a user by numeric ID or email address.
pub async fn get_user(client: &ArmisClient, id_or_email: &str) -> Result<User> {
    let path = client.api_item_path("users", id_or_email)?;
    let response: ApiResponse<User> = client.get(&path).await?;
    Ok(response.data)
}

/// Creates a user.
pub async fn create_user(client: &ArmisClient, settings: &UserSettings) -> Result<User> {
    let path = client.api_path("users/");
    let response: ApiResponse<User> = client.post(&path, settings).await?;
    Ok(response.data)
}

/// Updates a user's profile and role assignments.
pub async fn update_user(
    client: &ArmisClient,
    id_or_email: &str,
    settings: &UserSettings,
) -> Result<User> {
    let path = client.api_item_path("users", id_or_email)?;
    let response: ApiResponse<User> = client.patch(&path, settings).await?;
    Ok(response.data)
}

/// Deletes a user.
pub async fn delete_user(client: &ArmisClient, id_or_email: &str) -> Result<()> {
    let path = client.api_item_path("users", id_or_email)?;
    client.delete(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_role_assignments() {
        let json = r#"{
            "id": 31,
            "name": "Dana Analyst",
            "email": "dana@example.com",
            "isActive": true,
            "roleAssignment": [{"name": ["Read Only"], "sites": ["Plant A"]}]
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 31);
        assert_eq!(user.is_active, Some(true));
        assert_eq!(
            user.role_assignment,
            vec![RoleAssignment {
                name: vec!["Read Only".to_string()],
                sites: vec!["Plant A".to_string()],
            }]
        );
    }

    #[test]
    fn settings_omit_empty_roles() {
        let settings = UserSettings {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["email"], "sam@example.com");
        assert!(json.get("roleAssignment").is_none());
        assert!(json.get("phone").is_none());
    }
}
