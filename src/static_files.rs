//! # Archivos Estáticos
//! src/static_files.rs
//!
//! Resuelve un sufijo de URL (lo que sigue a `/static/`) contra un
//! directorio raíz. La ruta canónica resultante tiene que quedar dentro
//! de la raíz canónica: `../`, paths absolutos y symlinks que escapan
//! terminan en 404, igual que un archivo inexistente.
//!
//! El sufijo se decodifica (`%XX`) antes de unirlo a la raíz; un `%2e%2e`
//! decodificado pasa por el mismo chequeo que un `..` literal.

use crate::http::request::decode_path;
use crate::http::{Response, StatusCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handler de archivos bajo un directorio raíz
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ruta canónica de un archivo regular dentro de la raíz, o `None`
    ///
    /// La raíz se canonicaliza en cada llamada: puede crearse después
    /// de arrancar el servidor.
    pub fn resolve(&self, suffix: &str) -> Option<PathBuf> {
        let root = fs::canonicalize(&self.root).ok()?;

        // Un sufijo absoluto reemplaza a la raíz en `join`; el chequeo de
        // prefijo de abajo lo rechaza.
        let candidate = fs::canonicalize(root.join(decode_path(suffix))).ok()?;

        if !candidate.starts_with(&root) {
            warn!(suffix, "static path escapes root");
            return None;
        }

        candidate.is_file().then_some(candidate)
    }

    /// Sirve el archivo: 200 con su contenido o 404
    pub fn serve(&self, suffix: &str) -> Response {
        let Some(path) = self.resolve(suffix) else {
            debug!(suffix, "static file not found");
            return Response::error(StatusCode::NotFound);
        };

        match fs::read(&path) {
            Ok(contents) => Response::new(StatusCode::Ok)
                .with_header("Content-Type", content_type(&path))
                .with_body(contents),
            Err(e) => {
                // Al cliente no se le distingue un error de I/O de un 404
                warn!(path = %path.display(), error = %e, "failed to read static file");
                Response::error(StatusCode::NotFound)
            }
        }
    }
}

/// Content-Type según la extensión
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
