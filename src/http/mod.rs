//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementa desde cero el subconjunto mínimo de HTTP/1.1 que necesita
//! el servidor: un request y una respuesta por conexión.
//!
//! - Parsing de requests
//! - Construcción y serialización de respuestas
//! - Códigos de estado
//!
//! Fuera de alcance: keep-alive, pipelining, chunked transfer-encoding,
//! compresión, TLS y HTTP/2.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Permite usar `http::Request` en vez de `http::request::Request`
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
