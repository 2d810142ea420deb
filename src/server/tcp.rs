//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Un thread dedicado (`acceptor`) acepta conexiones y las entrega a un
//! pool fijo de workers. Cada worker atiende una conexión de principio a
//! fin: leer, parsear, despachar, escribir y cerrar.
//!
//! La tabla de rutas se arma antes de `start` y se comparte como
//! `Arc<Router>` de solo lectura; no hace falta sincronizarla.

use super::connection::handle_connection;
use super::pool::WorkerPool;
use crate::config::Config;
use crate::router::Router;
use crate::routes;
use crate::static_files::StaticFiles;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, warn};

/// Servidor HTTP listo para arrancar
pub struct Server {
    config: Config,
    router: Router,
}

impl Server {
    /// Crea el servidor con las rutas por defecto ya registradas
    pub fn new(config: Config) -> Self {
        let mut router = Router::new();
        routes::register_defaults(&mut router, StaticFiles::new(&config.static_dir));

        Self { config, router }
    }

    /// Crea el servidor con una tabla de rutas propia
    pub fn with_router(config: Config, router: Router) -> Self {
        Self { config, router }
    }

    /// Permite registrar más rutas antes de arrancar
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hace bind, arranca el pool y el thread de accept
    ///
    /// Retorna en cuanto el socket está escuchando.
    pub fn start(self) -> io::Result<ServerHandle> {
        self.config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = bind(&self.config.address(), self.config.backlog)?;
        let local_addr = listener.local_addr()?;

        let pool = Arc::new(WorkerPool::new(self.config.workers, self.config.workers)?);
        let router = Arc::new(self.router);
        let running = Arc::new(AtomicBool::new(true));

        info!(
            address = %local_addr,
            workers = self.config.workers,
            backlog = self.config.backlog,
            routes = router.len(),
            "server listening"
        );

        let acceptor = thread::Builder::new().name("acceptor".to_string()).spawn({
            let pool = Arc::clone(&pool);
            let running = Arc::clone(&running);
            move || accept_loop(listener, router, pool, running)
        })?;

        Ok(ServerHandle {
            local_addr,
            running,
            pool,
            acceptor: Some(acceptor),
        })
    }

    /// Arranca y bloquea el thread actual hasta que el accept loop termine
    pub fn run(self) -> io::Result<()> {
        self.start()?.join();
        Ok(())
    }
}

/// Handle de un servidor en ejecución
///
/// Al hacer drop el servidor se detiene.
pub struct ServerHandle {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    pool: Arc<WorkerPool>,
    acceptor: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Detiene el accept loop y cierra el socket de escucha y el pool
    ///
    /// No espera a las conexiones en curso; las encoladas se descartan.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Bloquea hasta que el accept loop termine
    pub fn join(mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            if acceptor.join().is_err() {
                error!("acceptor thread panicked");
            }
        }
    }

    fn shutdown(&mut self) {
        let Some(acceptor) = self.acceptor.take() else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        self.pool.shutdown();

        // `accept` bloquea: una conexión propia lo despierta para que vea el flag
        let _ = TcpStream::connect_timeout(&wake_addr(self.local_addr), Duration::from_secs(1));

        if acceptor.join().is_err() {
            error!("acceptor thread panicked");
        }
        info!(address = %self.local_addr, "server stopped");
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Crea el socket de escucha con `SO_REUSEADDR` y el backlog pedido
fn bind(address: &str, backlog: u32) -> io::Result<TcpListener> {
    let addr = address.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("no address for {}", address))
    })?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;

    Ok(socket.into())
}

fn accept_loop(
    listener: TcpListener,
    router: Arc<Router>,
    pool: Arc<WorkerPool>,
    running: Arc<AtomicBool>,
) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match stream {
            Ok(stream) => {
                let router = Arc::clone(&router);
                let submitted = pool.execute(move || {
                    if let Err(e) = handle_connection(stream, &router) {
                        warn!(error = %e, "connection error");
                    }
                });

                if submitted.is_err() {
                    break;
                }
            }
            Err(e) => {
                // Un accept fallido no es fatal
                warn!(error = %e, "failed to accept connection");
            }
        }
    }

    pool.shutdown();
    info!("accept loop stopped");
}

/// Una dirección sin especificar (0.0.0.0 / ::) no sirve para conectarse
fn wake_addr(local: SocketAddr) -> SocketAddr {
    match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(Ipv4Addr::LOCALHOST.into(), local.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(Ipv6Addr::LOCALHOST.into(), local.port())
        }
        _ => local,
    }
}
