//! # Modelos de la API
//! src/models/mod.rs

pub mod message;

pub use message::Message;
