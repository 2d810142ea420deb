//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//! Se fija al construir el servidor; no hay reconfiguración en caliente.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./toy_web_server --port 8080 --static-dir ./static --workers 10 --backlog 50
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 STATIC_DIR=/srv/www ./toy_web_server
//! ```

use clap::Parser;
use tracing::info;

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "toy_web_server")]
#[command(about = "Servidor HTTP/1.1 mínimo sobre sockets TCP")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz de `/static/*`
    #[arg(long = "static-dir", default_value = "./static", env = "STATIC_DIR")]
    pub static_dir: String,

    /// Tamaño del pool de workers (una conexión por worker)
    #[arg(long, default_value = "10", env = "WORKERS")]
    pub workers: usize,

    /// Conexiones pendientes que encola el sistema operativo antes de `accept`
    #[arg(long, default_value = "50", env = "BACKLOG")]
    pub backlog: u32,

    /// Nivel de log por defecto si `RUST_LOG` no está definido
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use toy_web_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.backlog == 0 {
            return Err("Backlog must be >= 1".to_string());
        }
        if self.backlog > i32::MAX as u32 {
            return Err(format!("Backlog must be <= {}", i32::MAX));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración efectiva
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            static_dir = %self.static_dir,
            workers = self.workers,
            backlog = self.backlog,
            "server configuration"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            static_dir: "./static".to_string(),
            workers: 10,
            backlog: 50,
            log_level: "info".to_string(),
        }
    }
}
