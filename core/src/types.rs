//! Caller-facing payload types.
//!
//! # Design
//! Fields use Rust naming; `#[serde(rename_all = "camelCase")]` produces the
//! remote API's key casing on the wire. Optional fields are omitted rather
//! than sent as `null`, so the server keeps whatever it already has.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form user profile fields (`dataFields` on the wire).
pub type DataFields = Map<String, Value>;

/// Extra knobs for `Users::update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Create the user by `userId` when no user matches the email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_user_id: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_nested_objects: Option<bool>,
}

/// One entry of a `Users::bulk_update` batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUser {
    pub email: String,
    #[serde(default)]
    pub data_fields: DataFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_user_id: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_nested_objects: Option<bool>,
}

impl BulkUser {
    pub fn new(email: impl Into<String>, data_fields: DataFields) -> Self {
        Self {
            email: email.into(),
            data_fields,
            user_id: None,
            prefer_user_id: None,
            merge_nested_objects: None,
        }
    }
}

/// A list member addressed by email or user id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fields: Option<DataFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_user_id: Option<bool>,
}

impl Subscriber {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn user_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }
}

/// Channel and list membership changes for `Users::update_subscriptions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_list_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_channel_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_message_type_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
}

/// Push platform of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Apns,
    ApnsSandbox,
    Gcm,
}

/// A push device for `Users::register_device_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub token: String,
    pub platform: Platform,
    pub application_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fields: Option<DataFields>,
}

/// Filters for `Users::get_sent_messages`. Unset filters are left out of
/// the query string.
#[derive(Debug, Clone, Default)]
pub struct SentMessagesQuery {
    pub limit: Option<u32>,
    pub campaign_id: Option<i64>,
    /// `yyyy-MM-dd HH:mm:ss ZZ`, passed through verbatim.
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub exclude_blast_campaigns: Option<bool>,
    /// `Email`, `Push`, `SMS`, ...
    pub message_medium: Option<String>,
}

impl SentMessagesQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(id) = self.campaign_id {
            pairs.push(("campaignId", id.to_string()));
        }
        if let Some(start) = &self.start_date_time {
            pairs.push(("startDateTime", start.clone()));
        }
        if let Some(end) = &self.end_date_time {
            pairs.push(("endDateTime", end.clone()));
        }
        if let Some(exclude) = self.exclude_blast_campaigns {
            pairs.push(("excludeBlastCampaigns", exclude.to_string()));
        }
        if let Some(medium) = &self.message_medium {
            pairs.push(("messageMedium", medium.clone()));
        }
        pairs
    }
}
