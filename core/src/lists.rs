//! `/lists` endpoints.

use serde::Serialize;

use crate::client::IterableClient;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::types::Subscriber;

/// Handle for list operations, borrowed from an `IterableClient`.
#[derive(Debug, Clone, Copy)]
pub struct Lists<'a> {
    client: &'a IterableClient,
}

#[derive(Serialize)]
struct CreateList<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Subscribe<'a> {
    list_id: i64,
    subscribers: &'a [Subscriber],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Unsubscribe<'a> {
    list_id: i64,
    subscribers: &'a [Subscriber],
    #[serde(skip_serializing_if = "Option::is_none")]
    campaign_id: Option<i64>,
    channel_unsubscribe: bool,
}

impl<'a> Lists<'a> {
    pub(crate) fn new(client: &'a IterableClient) -> Self {
        Self { client }
    }

    /// `GET /lists`
    pub fn list(&self) -> Result<ApiResponse, ApiError> {
        self.client.get(&["lists"], &[])
    }

    /// `POST /lists` with `{"name": name}`.
    pub fn create(&self, name: &str) -> Result<ApiResponse, ApiError> {
        self.client.post(&["lists"], &CreateList { name })
    }

    /// `DELETE /lists/{listId}`
    pub fn delete(&self, list_id: i64) -> Result<ApiResponse, ApiError> {
        let list_id = list_id.to_string();
        self.client.delete(&["lists", list_id.as_str()])
    }

    /// `GET /lists/getUsers?listId=`
    pub fn get_users(&self, list_id: i64) -> Result<ApiResponse, ApiError> {
        self.client
            .get(&["lists", "getUsers"], &[("listId", list_id.to_string())])
    }

    /// `POST /lists/subscribe`
    pub fn subscribe(&self, list_id: i64, subscribers: &[Subscriber]) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["lists", "subscribe"],
            &Subscribe {
                list_id,
                subscribers,
            },
        )
    }

    /// `POST /lists/unsubscribe`
    ///
    /// With `channel_unsubscribe` the members are also unsubscribed from the
    /// list's channel, not just removed from the list.
    pub fn unsubscribe(
        &self,
        list_id: i64,
        subscribers: &[Subscriber],
        campaign_id: Option<i64>,
        channel_unsubscribe: bool,
    ) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["lists", "unsubscribe"],
            &Unsubscribe {
                list_id,
                subscribers,
                campaign_id,
                channel_unsubscribe,
            },
        )
    }
}
