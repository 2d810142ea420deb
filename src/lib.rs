//! # Toy Web Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado directamente sobre sockets TCP:
//! un request y una respuesta por conexión.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing de requests, serialización de respuestas y códigos de estado
//! - `router`: Tabla ordenada de rutas (exactas o con comodín final)
//! - `static_files`: Archivos bajo un directorio raíz, sin escapes de path
//! - `routes`: Handlers incluidos (`/`, `/hello`, `/echo`, `/api/*`, `/static/*`)
//! - `models`: Mensajes JSON de la API
//! - `server`: Listener TCP, pool de workers y manejo de conexiones
//! - `config`: Configuración por CLI y variables de entorno
//! - `logging`: Inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use toy_web_server::config::Config;
//! use toy_web_server::http::{Response, StatusCode};
//! use toy_web_server::server::Server;
//!
//! let mut server = Server::new(Config::default());
//! server
//!     .router_mut()
//!     .get("/ping", |_req| Ok(Response::text("pong", StatusCode::Ok)));
//!
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod http;
pub mod logging;
pub mod models;
pub mod router;
pub mod routes;
pub mod server;
pub mod static_files;
