//! # Handlers Básicos
//! src/routes/basic.rs
//!
//! - `/`: página de demo
//! - `/hello`: saludo
//! - `/echo`: devuelve el body recibido
//! - `/api/health`: chequeo de vida

use crate::http::{Request, Response, StatusCode};

/// Página HTML que sirve `GET /`
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Toy Web Server</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <h1>Toy Web Server</h1>
    <p>A minimal HTTP/1.1 server built on raw TCP sockets.</p>
    <ul>
        <li><a href="/hello">GET /hello</a></li>
        <li><a href="/api/health">GET /api/health</a></li>
        <li><a href="/api/messages">GET /api/messages</a></li>
        <li>POST /echo</li>
        <li>POST /api/messages</li>
    </ul>
</body>
</html>
"#;

/// Handler para `GET /`
pub fn index_handler(_req: &Request) -> anyhow::Result<Response> {
    Ok(Response::html(INDEX_HTML, StatusCode::Ok))
}

/// Handler para `GET /hello`
pub fn hello_handler(_req: &Request) -> anyhow::Result<Response> {
    Ok(Response::text("Hello, World!", StatusCode::Ok))
}

/// Handler para `POST /echo`
///
/// Responde `You sent: <body>`. Bytes que no son UTF-8 se reemplazan.
pub fn echo_handler(req: &Request) -> anyhow::Result<Response> {
    let body = String::from_utf8_lossy(req.body());
    Ok(Response::text(&format!("You sent: {}", body), StatusCode::Ok))
}

/// Handler para `GET /api/health`
pub fn health_handler(_req: &Request) -> anyhow::Result<Response> {
    Ok(Response::text("OK", StatusCode::Ok))
}
