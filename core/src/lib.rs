//! Blocking client for the Iterable marketing-automation REST API.
//!
//! # Overview
//! Every operation maps one method call to one HTTP verb, path and JSON
//! body, and returns an `ApiResponse` carrying the reply's status and body.
//!
//! ```no_run
//! use iterable_core::{Config, IterableClient};
//!
//! let client = IterableClient::new(Config::with_api_key("my-key"));
//! let response = client.lists().create("VIP")?;
//! if response.is_success() {
//!     println!("{:?}", response.json());
//! }
//! # Ok::<(), iterable_core::ApiError>(())
//! ```
//!
//! # Design
//! - `IterableClient` is stateless apart from its `Config`; resources
//!   (`lists()`, `users()`) borrow it.
//! - Request building (`http`) is separate from execution (`transport`), so
//!   every endpoint is testable without a network.
//! - Non-2xx replies are returned, not raised. `ApiError` only reports local
//!   failures and transport failures.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lists;
pub mod response;
pub mod transport;
pub mod types;
pub mod users;

pub use client::IterableClient;
pub use config::Config;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use lists::Lists;
pub use response::{ApiResponse, ResponseBody};
pub use transport::{Transport, UreqTransport};
pub use types::{
    BulkUser, DataFields, Device, Platform, SentMessagesQuery, Subscriber, Subscriptions,
    UpdateUserOptions,
};
pub use users::Users;
