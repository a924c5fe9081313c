//! Desired-state document schema
//!
//! One document describes the target configuration of a single realm. The
//! top level is strict: unknown keys are rejected so that typos surface as
//! parse errors instead of silently doing nothing. Resource categories are
//! kept as free-form JSON because their contents belong to the target system.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One parsed desired-state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DesiredStateDocument {
    /// Name of the realm this document configures
    pub realm: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_scopes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_providers: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider_mappers: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_flows: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_config: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_roles: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_default_client_scopes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_optional_client_scopes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_flow: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_grant_flow: Option<String>,

    /// Checksum of the source file, attached after parsing
    #[serde(skip)]
    checksum: Option<String>,
}

impl DesiredStateDocument {
    /// Minimal document for the given realm
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            id: None,
            enabled: None,
            display_name: None,
            attributes: BTreeMap::new(),
            roles: None,
            clients: None,
            client_scopes: None,
            groups: None,
            users: None,
            identity_providers: None,
            identity_provider_mappers: None,
            components: None,
            authentication_flows: None,
            authenticator_config: None,
            required_actions: None,
            default_roles: None,
            default_default_client_scopes: None,
            default_optional_client_scopes: None,
            browser_flow: None,
            direct_grant_flow: None,
            checksum: None,
        }
    }

    /// Checksum of the interpolated source file this document came from
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// Attach the source file checksum
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn set_checksum(&mut self, checksum: impl Into<String>) {
        self.checksum = Some(checksum.into());
    }
}
