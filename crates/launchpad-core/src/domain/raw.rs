//! Provider-side launch documents.
//!
//! These mirror the projection requested from the launch data provider.
//! Every field is optional so that a missing value surfaces as a
//! normalization error for that one document instead of failing the
//! decode of the whole response.

use serde::{Deserialize, Serialize};

/// Rocket sub-document, populated with the display name only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRocket {
    /// Rocket display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload sub-document, populated with its customer list only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPayload {
    /// Customers of this payload
    #[serde(default)]
    pub customers: Option<Vec<String>>,
}

/// One launch document as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLaunchDocument {
    /// Provider flight number
    #[serde(default)]
    pub flight_number: Option<i64>,

    /// Mission name
    #[serde(default)]
    pub name: Option<String>,

    /// Populated rocket
    #[serde(default)]
    pub rocket: Option<RawRocket>,

    /// Populated payloads
    #[serde(default)]
    pub payloads: Option<Vec<RawPayload>>,

    /// Local launch time with offset, RFC 3339
    #[serde(default)]
    pub date_local: Option<String>,

    /// Whether the launch is in the future
    #[serde(default)]
    pub upcoming: Option<bool>,

    /// Launch success; `null` for launches that have not happened yet
    #[serde(default)]
    pub success: Option<bool>,
}
