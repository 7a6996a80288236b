//! Canonical server records and the validator that builds them.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_GROUP, DEFAULT_METHOD, DEFAULT_PORT};
use crate::extract::RawFields;

/// Canonical field names.
pub mod field {
    pub const SERVER: &str = "server";
    pub const SERVER_PORT: &str = "server_port";
    pub const PASSWORD: &str = "password";
    pub const METHOD: &str = "method";
    pub const REMARKS: &str = "remarks";
}

/// One usable proxy server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub server: String,
    pub server_port: u16,
    pub password: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ServerRecord {
    /// Merge identity.
    pub fn identity(&self) -> (&str, u16) {
        (&self.server, self.server_port)
    }
}

/// Accepts raw field mappings that carry a server and a password and fills
/// in the rest.
#[derive(Debug, Clone)]
pub struct Validator {
    fallback_method: String,
    group: String,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_METHOD, DEFAULT_GROUP)
    }
}

impl Validator {
    pub fn new(fallback_method: &str, group: &str) -> Self {
        Self {
            fallback_method: fallback_method.to_lowercase(),
            group: group.to_string(),
        }
    }

    pub fn validate(&self, fields: &RawFields) -> Option<ServerRecord> {
        let server = non_empty(fields, field::SERVER)?;
        let Some(password) = non_empty(fields, field::PASSWORD) else {
            debug!("Dropping {}: no password", server);
            return None;
        };

        let server_port = match non_empty(fields, field::SERVER_PORT) {
            None => DEFAULT_PORT,
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    debug!("Dropping {}: bad port {:?}", server, raw);
                    return None;
                }
            },
        };

        Some(ServerRecord {
            server: server.to_lowercase(),
            server_port,
            password: password.to_string(),
            method: non_empty(fields, field::METHOD)
                .map(str::to_lowercase)
                .unwrap_or_else(|| self.fallback_method.clone()),
            remarks: non_empty(fields, field::REMARKS).map(str::to_string),
            group: Some(self.group.clone()),
        })
    }

    pub fn validate_all<'a>(&self, batch: impl IntoIterator<Item = &'a RawFields>) -> Vec<ServerRecord> {
        batch.into_iter().filter_map(|fields| self.validate(fields)).collect()
    }
}

fn non_empty<'a>(fields: &'a RawFields, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}
