//! # API de Mensajes
//! src/routes/messages.rs
//!
//! - `GET /api/messages`: mensaje de ejemplo (200)
//! - `POST /api/messages`: parsea el mensaje del body y lo devuelve (201)

use crate::http::{Request, Response, StatusCode};
use crate::models::Message;
use anyhow::Context;
use tracing::debug;

/// Handler para `GET /api/messages`
pub fn list_messages_handler(_req: &Request) -> anyhow::Result<Response> {
    let message = Message::new("Hello from the server!");
    let json = message.to_json().context("serializing message")?;

    Ok(Response::json(&json, StatusCode::Ok))
}

/// Handler para `POST /api/messages`
///
/// Body que no es UTF-8 o JSON inválido → 400.
pub fn create_message_handler(req: &Request) -> anyhow::Result<Response> {
    let Some(body) = req.body_str() else {
        return Ok(Response::error(StatusCode::BadRequest));
    };

    let message = match Message::from_json(body) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "rejecting invalid message");
            return Ok(Response::text(
                &format!("400 Bad Request: {}", e),
                StatusCode::BadRequest,
            ));
        }
    };

    let json = message.to_json().context("serializing message")?;
    Ok(Response::json(&json, StatusCode::Created))
}
