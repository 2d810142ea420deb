//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas y serializarlas a bytes.
//!
//! ## Formato serializado
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Server: ToyWebServer/1.0\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Content-Type: text/plain; charset=utf-8\r\n
//! Content-Length: 13\r\n
//! \r\n
//! Hello, World!
//! ```
//!
//! `Server` y `Date` se fijan al construir la respuesta, así un handler
//! puede sobrescribirlos. `Content-Length` nunca se fija a mano: se
//! calcula al serializar y se omite si el body está vacío.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use toy_web_server::http::{Response, StatusCode};
//!
//! let response = Response::text("Hello, World!", StatusCode::Ok);
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;
use std::io::Write;
use std::time::SystemTime;

/// Versión que se escribe en la status line
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Valor del header `Server`
pub const SERVER_NAME: &str = "ToyWebServer/1.0";

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta con `Server` y `Date` ya fijados y body vacío
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: vec![
                ("Server".to_string(), SERVER_NAME.to_string()),
                ("Date".to_string(), httpdate::fmt_http_date(SystemTime::now())),
            ],
            body: Vec::new(),
        }
    }

    /// Respuesta `text/plain`
    pub fn text(content: &str, status: StatusCode) -> Self {
        Self::new(status)
            .with_header("Content-Type", TEXT_PLAIN)
            .with_body(content)
    }

    /// Respuesta `text/html`
    pub fn html(content: &str, status: StatusCode) -> Self {
        Self::new(status)
            .with_header("Content-Type", TEXT_HTML)
            .with_body(content)
    }

    /// Respuesta `application/json`; `content` ya debe ser JSON válido
    pub fn json(content: &str, status: StatusCode) -> Self {
        Self::new(status)
            .with_header("Content-Type", APPLICATION_JSON)
            .with_body(content)
    }

    /// Respuesta de error en texto plano cuyo body es la status line
    ///
    /// # Ejemplo
    /// ```
    /// use toy_web_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound);
    /// assert_eq!(response.body(), b"404 Not Found");
    /// ```
    pub fn error(status: StatusCode) -> Self {
        Self::text(&status.to_string(), status)
    }

    /// Agrega o reemplaza un header (versión builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Agrega o reemplaza un header
    ///
    /// Los nombres se comparan sin distinguir mayúsculas; un reemplazo
    /// conserva la posición original. `Content-Length` se ignora.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("content-length") {
            tracing::debug!("ignoring hand-set Content-Length");
            return;
        }

        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Elimina un header si existe
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    }

    /// Reemplaza el body (versión builder)
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Reemplaza el body
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Serializa la respuesta completa:
    /// status line, headers, `Content-Length` (si hay body), línea vacía y body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());
        // Escribir en un Vec no falla
        let _ = self.write_to(&mut result);
        result
    }

    /// Escribe la respuesta serializada en cualquier `Write`
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "{} {}\r\n", HTTP_VERSION, self.status)?;

        for (name, value) in &self.headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }

        if !self.body.is_empty() {
            write!(out, "Content-Length: {}\r\n", self.body.len())?;
        }

        out.write_all(b"\r\n")?;
        out.write_all(&self.body)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers en orden de inserción
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
