//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Tabla ordenada de rutas `(método, patrón, handler)`.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Los patrones son un path exacto (`/hello`) o un prefijo terminado en
//! un único comodín (`/static/*`). El comodín es opaco: no se captura ni
//! se pasa al handler. Las rutas se recorren en orden de registro y gana
//! la primera que coincide, así que el orden de registro importa.
//!
//! La tabla se arma durante el setup y luego el servidor la mueve a un
//! `Arc<Router>`; desde ese momento es de solo lectura.

use crate::http::{Method, Request, Response, StatusCode};

/// Un handler recibe un Request y produce una Response.
///
/// Un `Err` es una falla del handler; el servidor la convierte en 500.
pub type Handler = Box<dyn Fn(&Request) -> anyhow::Result<Response> + Send + Sync>;

/// Patrón de path de una ruta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Coincide solo con el path idéntico
    Exact(String),

    /// `P/*`: coincide con todo path que empiece con `P/`
    Prefix(String),
}

impl Pattern {
    /// Interpreta un patrón textual
    ///
    /// # Ejemplo
    /// ```
    /// use toy_web_server::router::Pattern;
    ///
    /// assert_eq!(Pattern::parse("/hello"), Pattern::Exact("/hello".to_string()));
    /// assert_eq!(Pattern::parse("/static/*"), Pattern::Prefix("/static/".to_string()));
    /// ```
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('/') => Pattern::Prefix(prefix.to_string()),
            _ => Pattern::Exact(pattern.to_string()),
        }
    }

    /// Verifica si el path coincide con el patrón
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => exact == path,
            Pattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Una entrada de la tabla de rutas
pub struct Route {
    method: Method,
    pattern: Pattern,
    handler: Handler,
}

impl Route {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Verifica método y path
    pub fn matches(&self, method: Method, path: &str) -> bool {
        self.method == method && self.pattern.matches(path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Router que mapea (método, path) a handlers
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta al final de la tabla
    ///
    /// # Ejemplo
    /// ```
    /// use toy_web_server::router::Router;
    /// use toy_web_server::http::{Method, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello", |_req| {
    ///     Ok(Response::text("Hello, World!", StatusCode::Ok))
    /// });
    /// assert_eq!(router.len(), 1);
    /// ```
    pub fn register<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(pattern),
            handler: Box::new(handler),
        });
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.register(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.register(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.register(Method::PUT, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        self.register(Method::DELETE, pattern, handler)
    }

    /// Primera ruta que coincide con método y path, en orden de registro
    pub fn find(&self, method: Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(method, path))
    }

    /// Ejecuta el handler de la primera ruta que coincide
    ///
    /// Sin coincidencia retorna `Ok` con un 404 de texto fijo. El `Err`
    /// del handler se propaga tal cual: quien despacha decide el 500.
    ///
    /// # Ejemplo
    /// ```
    /// use toy_web_server::router::Router;
    /// use toy_web_server::http::{Request, StatusCode};
    ///
    /// let router = Router::new();
    /// let request = Request::parse(b"GET /test HTTP/1.1\r\n\r\n").unwrap();
    /// let response = router.dispatch(&request).unwrap();
    /// assert_eq!(response.status(), StatusCode::NotFound);
    /// ```
    pub fn dispatch(&self, request: &Request) -> anyhow::Result<Response> {
        match self.find(request.method(), request.route_path()) {
            Some(route) => (route.handler)(request),
            None => Ok(Response::error(StatusCode::NotFound)),
        }
    }

    /// Rutas registradas en orden
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
