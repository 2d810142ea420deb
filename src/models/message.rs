//! # Mensajes JSON
//! src/models/message.rs
//!
//! ```json
//! {"text": "Hello from the server!", "timestamp": "2024-05-01T12:00:00Z"}
//! ```
//!
//! Si el JSON de entrada no trae `timestamp`, se usa el instante actual
//! (UTC, RFC 3339). Los campos desconocidos se ignoran.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Mensaje intercambiado por `/api/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,

    #[serde(default = "now_rfc3339")]
    pub timestamp: String,
}

impl Message {
    /// Crea un mensaje con timestamp actual
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: now_rfc3339(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn now_rfc3339() -> String {
    // Solo falla con años fuera de 0..=9999
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
