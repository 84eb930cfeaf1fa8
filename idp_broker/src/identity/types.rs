use serde::{Deserialize, Serialize};

/// User object as the identity provider reports it.
///
/// `user_metadata` is the provider's free-form metadata bag; the broker
/// reads `first_name`/`last_name` out of it during profile bootstrap and
/// writes them into it on admin invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl IdentityUser {
    pub(crate) fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Opaque session issued by the provider. The broker stores and forwards
/// the access token; it never parses or verifies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: Option<IdentityUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorType {
    Totp,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Verified,
    Unverified,
}

/// A registered second-factor method on the provider side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaFactor {
    pub id: String,
    #[serde(rename = "factor_type")]
    pub factor_type: FactorType,
    pub status: FactorStatus,
    pub friendly_name: Option<String>,
}

impl MfaFactor {
    pub fn is_verified_totp(&self) -> bool {
        self.factor_type == FactorType::Totp && self.status == FactorStatus::Verified
    }

    pub fn is_unverified_totp(&self) -> bool {
        self.factor_type == FactorType::Totp && self.status == FactorStatus::Unverified
    }
}

/// Provisioning material for a freshly enrolled TOTP factor.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrolledFactor {
    pub id: String,
    pub totp: TotpProvisioning,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TotpProvisioning {
    pub secret: String,
    pub uri: String,
}

/// Short-lived token binding a verification attempt to a factor.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeCreated {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitedUser {
    pub id: String,
    pub email: Option<String>,
}

/// Error body shapes the provider uses, collapsed into one message.
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct ProviderErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ProviderErrorBody {
    pub(crate) fn into_message(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| "unknown provider error".to_string())
    }
}
