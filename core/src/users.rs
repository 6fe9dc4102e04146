//! `/users` endpoints.
//!
//! Methods that take an email plus profile fields merge the email into a
//! freshly built body; caller-owned maps are only borrowed.

use serde::Serialize;

use crate::client::IterableClient;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::types::{BulkUser, DataFields, Device, SentMessagesQuery, Subscriptions, UpdateUserOptions};

/// Handle for user operations, borrowed from an `IterableClient`.
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a IterableClient,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUser<'a> {
    email: &'a str,
    data_fields: &'a DataFields,
    #[serde(flatten)]
    options: &'a UpdateUserOptions,
}

#[derive(Serialize)]
struct BulkUpdate<'a> {
    users: &'a [BulkUser],
}

#[derive(Serialize)]
struct UpdateSubscriptions<'a> {
    email: &'a str,
    #[serde(flatten)]
    subscriptions: &'a Subscriptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEmail<'a> {
    current_email: &'a str,
    new_email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterDevice<'a> {
    email: &'a str,
    device: &'a Device,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DisableDevice<'a> {
    token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Serialize)]
struct Forget<'a> {
    email: &'a str,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a IterableClient) -> Self {
        Self { client }
    }

    /// `POST /users/update`: create or update the user identified by `email`.
    pub fn update(
        &self,
        email: &str,
        data_fields: &DataFields,
        options: &UpdateUserOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["users", "update"],
            &UpdateUser {
                email,
                data_fields,
                options,
            },
        )
    }

    /// `POST /users/bulkUpdate`
    pub fn bulk_update(&self, users: &[BulkUser]) -> Result<ApiResponse, ApiError> {
        self.client.post(&["users", "bulkUpdate"], &BulkUpdate { users })
    }

    /// `POST /users/updateSubscriptions`
    ///
    /// Lists given in `subscriptions` replace the user's current ones; unset
    /// fields are left alone by the server.
    pub fn update_subscriptions(&self, email: &str, subscriptions: &Subscriptions) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["users", "updateSubscriptions"],
            &UpdateSubscriptions {
                email,
                subscriptions,
            },
        )
    }

    /// `POST /users/updateEmail`
    pub fn update_email(&self, current_email: &str, new_email: &str) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["users", "updateEmail"],
            &UpdateEmail {
                current_email,
                new_email,
            },
        )
    }

    /// `GET /users/getByEmail?email=`
    pub fn get_by_email(&self, email: &str) -> Result<ApiResponse, ApiError> {
        self.client
            .get(&["users", "getByEmail"], &[("email", email.to_string())])
    }

    /// `DELETE /users/{email}`
    pub fn delete_by_email(&self, email: &str) -> Result<ApiResponse, ApiError> {
        self.client.delete(&["users", email])
    }

    /// `GET /users/byUserId/{userId}`
    pub fn get_by_id(&self, user_id: &str) -> Result<ApiResponse, ApiError> {
        self.client.get(&["users", "byUserId", user_id], &[])
    }

    /// `DELETE /users/byUserId/{userId}`
    pub fn delete_by_id(&self, user_id: &str) -> Result<ApiResponse, ApiError> {
        self.client.delete(&["users", "byUserId", user_id])
    }

    /// `GET /users/getFields`: every profile field defined in the project.
    pub fn get_fields(&self) -> Result<ApiResponse, ApiError> {
        self.client.get(&["users", "getFields"], &[])
    }

    /// `POST /users/registerDeviceToken`
    pub fn register_device_token(
        &self,
        email: &str,
        device: &Device,
        user_id: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["users", "registerDeviceToken"],
            &RegisterDevice {
                email,
                device,
                user_id,
            },
        )
    }

    /// `POST /users/disableDevice`. Without email or user id the token is
    /// disabled for every user holding it.
    pub fn disable_device(
        &self,
        token: &str,
        email: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        self.client.post(
            &["users", "disableDevice"],
            &DisableDevice {
                token,
                email,
                user_id,
            },
        )
    }

    /// `GET /users/getSentMessages`
    pub fn get_sent_messages(&self, email: &str, query: &SentMessagesQuery) -> Result<ApiResponse, ApiError> {
        let mut pairs = vec![("email", email.to_string())];
        pairs.extend(query.to_pairs());
        self.client.get(&["users", "getSentMessages"], &pairs)
    }

    /// `POST /users/forget`: erase the user's data and block future
    /// collection for the address.
    pub fn forget(&self, email: &str) -> Result<ApiResponse, ApiError> {
        self.client.post(&["users", "forget"], &Forget { email })
    }
}
