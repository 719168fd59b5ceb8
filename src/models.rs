use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Free-form attributes used for targeting.
pub type CustomAttributes = serde_json::Map<String, serde_json::Value>;

#[skip_serializing_none]
#[derive(Debug, PartialEq, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub custom_attributes: Option<CustomAttributes>,
}

impl ToggleUser {
    pub fn new(id: String) -> Self {
        ToggleUser {
            id,
            ..Default::default()
        }
    }
}

/// Evaluation context describing who a toggle is evaluated for.
///
/// An empty `targeting_key` means "not set"; it is resolved from the user id
/// or the client's default target key at evaluation time.
#[skip_serializing_none]
#[derive(Debug, PartialEq, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleContext {
    #[serde(default)]
    pub targeting_key: String,
    pub ip_address: Option<String>,
    pub custom_attributes: Option<CustomAttributes>,
    pub user: Option<ToggleUser>,
}

impl ToggleContext {
    pub fn new(targeting_key: String) -> Self {
        ToggleContext {
            targeting_key,
            ..Default::default()
        }
    }
}

/// Body posted to the evaluation endpoint.
#[skip_serializing_none]
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub application: String,
    pub environment: String,
    pub targeting_key: String,
    pub ip_address: Option<String>,
    pub user: Option<ToggleUser>,
    pub custom_attributes: Option<CustomAttributes>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationType {
    Boolean,
    String,
    Number,
    Object,
    /// Missing or unrecognized type tag.
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(rename = "type", default)]
    pub kind: EvaluationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct EvaluationResponse {
    pub toggles: HashMap<String, Evaluation>,
}

/// Options to use when creating the client, they will override default values, if they exist.
///
/// When `horizon_urls` is not set and a public API key is given, the client
/// talks to the organization's default horizon URL.
/// The default value for environment is `development`.
#[derive(Debug, Clone, Default)]
pub struct ToggleOptions {
    pub public_api_key: Option<String>,
    pub default_context: Option<ToggleContext>,
    pub horizon_urls: Option<Vec<String>>,
    pub application_id: Option<String>,
    pub environment: Option<String>,
    pub default_target_key: Option<String>,
}

/// Per-call options for toggle evaluation.
///
/// A `context` here replaces the client's default context entirely.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub context: Option<ToggleContext>,
}

impl GetOptions {
    pub fn with_context(context: ToggleContext) -> Self {
        Self {
            context: Some(context),
        }
    }
}
