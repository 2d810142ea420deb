//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto con un backlog configurable
//! 2. Acepta conexiones en un thread dedicado
//! 3. Entrega cada conexión a un pool fijo de workers
//! 4. Lee, parsea, despacha y responde un único request por conexión

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use pool::WorkerPool;
pub use tcp::{Server, ServerHandle};
