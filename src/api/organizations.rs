use serde::{Deserialize, Serialize};

use super::client::segment;
use super::{ApiError, PipesClient, UserSummary};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Organization {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrgRequest {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateOrgRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A user's membership in an organization, or a pending invitation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrgMember {
    pub id: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub role: String,
    pub status: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

impl OrgMember {
    pub fn user_handle(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.handle.as_str())
    }

    /// Email from the record itself, falling back to the embedded user.
    pub fn member_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.email.as_deref()))
    }
}

/// Exactly one of `handle` and `email` is expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InviteOrgMemberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOrgMemberRequest {
    pub role: String,
}

impl PipesClient {
    pub async fn create_org(&self, request: &CreateOrgRequest) -> Result<Organization, ApiError> {
        self.post_json("/org", request).await
    }

    pub async fn get_org(&self, org: &str) -> Result<Organization, ApiError> {
        self.get_json(&format!("/org/{}", segment(org))).await
    }

    pub async fn update_org(
        &self,
        org: &str,
        request: &UpdateOrgRequest,
    ) -> Result<Organization, ApiError> {
        self.patch_json(&format!("/org/{}", segment(org)), request)
            .await
    }

    pub async fn delete_org(&self, org: &str) -> Result<(), ApiError> {
        self.delete(&format!("/org/{}", segment(org))).await
    }

    pub async fn invite_org_member(
        &self,
        org: &str,
        request: &InviteOrgMemberRequest,
    ) -> Result<OrgMember, ApiError> {
        self.post_json(&format!("/org/{}/member/invite", segment(org)), request)
            .await
    }

    /// All members and pending invitations of an organization.
    pub async fn list_org_members(&self, org: &str) -> Result<Vec<OrgMember>, ApiError> {
        self.list_all(&format!("/org/{}/member", segment(org)))
            .await
    }

    pub async fn get_org_member(&self, org: &str, user: &str) -> Result<OrgMember, ApiError> {
        self.get_json(&format!("/org/{}/member/{}", segment(org), segment(user)))
            .await
    }

    pub async fn update_org_member(
        &self,
        org: &str,
        user: &str,
        request: &UpdateOrgMemberRequest,
    ) -> Result<OrgMember, ApiError> {
        self.patch_json(
            &format!("/org/{}/member/{}", segment(org), segment(user)),
            request,
        )
        .await
    }

    pub async fn delete_org_member(&self, org: &str, user: &str) -> Result<(), ApiError> {
        self.delete(&format!("/org/{}/member/{}", segment(org), segment(user)))
            .await
    }

    /// Withdraw a pending invitation sent to an email address.
    pub async fn delete_org_invite(&self, org: &str, email: &str) -> Result<(), ApiError> {
        self.delete(&format!(
            "/org/{}/member/invite/{}",
            segment(org),
            segment(email)
        ))
        .await
    }
}
