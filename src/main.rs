//! # Toy Web Server - Entry Point
//! src/main.rs

use toy_web_server::config::Config;
use toy_web_server::logging;
use toy_web_server::server::Server;
use tracing::error;

fn main() {
    let config = Config::new();
    logging::init(&config.log_level);

    if let Err(e) = config.validate() {
        error!("invalid configuration: {}", e);
        std::process::exit(2);
    }
    config.log_summary();

    // Bloquea el thread principal mientras el servidor corre
    if let Err(e) = Server::new(config).run() {
        error!("fatal server error: {}", e);
        std::process::exit(1);
    }
}
