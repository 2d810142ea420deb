//! # Logging
//! src/logging.rs
//!
//! Inicializa el subscriber de `tracing`. `RUST_LOG` tiene prioridad;
//! si no está definido se usa el nivel de la configuración.

use tracing_subscriber::EnvFilter;

/// Instala el subscriber global. Llamarlo más de una vez no hace nada.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}
