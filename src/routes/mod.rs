//! # Rutas Incluidas
//! src/routes/mod.rs
//!
//! Handlers que el servidor expone por defecto:
//!
//! | Método | Path            | Handler                       |
//! |--------|-----------------|-------------------------------|
//! | GET    | `/`             | página HTML de demo           |
//! | GET    | `/hello`        | "Hello, World!"               |
//! | POST   | `/echo`         | eco del body                  |
//! | GET    | `/api/health`   | "OK"                          |
//! | GET    | `/api/messages` | mensaje JSON                  |
//! | POST   | `/api/messages` | parsea y devuelve el mensaje  |
//! | GET    | `/static/*`     | archivos bajo el directorio estático |
//!
//! La aplicación anfitriona puede registrar más rutas después de estas.

pub mod basic;
pub mod messages;

pub use basic::*;
pub use messages::*;

use crate::router::Router;
use crate::static_files::StaticFiles;

/// Prefijo de las rutas de archivos estáticos
pub const STATIC_PREFIX: &str = "/static/";

/// Registra las rutas por defecto, en el orden de la tabla de arriba
pub fn register_defaults(router: &mut Router, static_files: StaticFiles) {
    router
        .get("/", index_handler)
        .get("/hello", hello_handler)
        .post("/echo", echo_handler)
        .get("/api/health", health_handler)
        .get("/api/messages", list_messages_handler)
        .post("/api/messages", create_message_handler);

    let pattern = format!("{}*", STATIC_PREFIX);
    router.get(&pattern, move |req| {
        let suffix = req.route_path().strip_prefix(STATIC_PREFIX).unwrap_or_default();
        Ok(static_files.serve(suffix))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, Request, StatusCode};

    #[test]
    fn test_register_defaults_order() {
        let mut router = Router::new();
        register_defaults(&mut router, StaticFiles::new("./static"));

        let table: Vec<(Method, String)> = router
            .routes()
            .iter()
            .map(|route| (route.method(), format!("{:?}", route.pattern())))
            .collect();

        assert_eq!(table.len(), 7);
        assert_eq!(table[0], (Method::GET, r#"Exact("/")"#.to_string()));
        assert_eq!(table[2], (Method::POST, r#"Exact("/echo")"#.to_string()));
        assert_eq!(table[6], (Method::GET, r#"Prefix("/static/")"#.to_string()));
    }

    #[test]
    fn test_static_route_strips_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("app.js"), "console.log(1)").unwrap();

        let mut router = Router::new();
        register_defaults(&mut router, StaticFiles::new(tmp.path()));

        let response = router
            .dispatch(&Request::new(Method::GET, "/static/app.js?v=2"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("application/javascript"));
        assert_eq!(response.body(), b"console.log(1)");

        let blocked = router
            .dispatch(&Request::new(Method::GET, "/static/../../etc/passwd"))
            .unwrap();
        assert_eq!(blocked.status(), StatusCode::NotFound);
    }
}
