use serde::{Deserialize, Serialize};

use super::client::segment;
use super::{ApiError, PipesClient};

/// The authenticated user, or a user embedded in another object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

/// Short user reference embedded in membership records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserSummary {
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserPreferences {
    pub id: String,
    #[serde(default)]
    pub communication_community_updates: Option<String>,
    #[serde(default)]
    pub communication_product_updates: Option<String>,
    #[serde(default)]
    pub communication_tips_and_tricks: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateUserPreferencesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_community_updates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_product_updates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_tips_and_tricks: Option<String>,
}

impl PipesClient {
    /// The user the token belongs to.
    pub async fn get_actor(&self) -> Result<User, ApiError> {
        self.get_json("/actor").await
    }

    pub async fn get_user_preferences(&self, user: &str) -> Result<UserPreferences, ApiError> {
        self.get_json(&format!("/user/{}/preference", segment(user)))
            .await
    }

    pub async fn update_user_preferences(
        &self,
        user: &str,
        request: &UpdateUserPreferencesRequest,
    ) -> Result<UserPreferences, ApiError> {
        self.patch_json(&format!("/user/{}/preference", segment(user)), request)
            .await
    }
}
