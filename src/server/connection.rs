//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Lo que ejecuta un worker por cada socket aceptado:
//!
//! ```text
//! leer bytes → parsear → router → handler → serializar → escribir → cerrar
//! ```
//!
//! Una conexión atiende exactamente un request. El socket se mueve a
//! `handle_connection` y se cierra al salir, por cualquier camino.
//!
//! Un request que declara o envía más de `MAX_REQUEST_SIZE` bytes recibe
//! 400 sin llegar al router.

use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};

/// Tamaño máximo que se lee de un request (cabecera + body)
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;

const READ_CHUNK: usize = 8192;

/// Cuánto se descarta de un request rechazado antes de cerrar
const DRAIN_LIMIT: usize = 4 * MAX_REQUEST_SIZE;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Resultado de leer un request del socket
#[derive(Debug, PartialEq, Eq)]
pub enum RawRequest {
    /// Bytes recibidos hasta completar el request o hasta EOF
    Complete(Vec<u8>),

    /// Excede `MAX_REQUEST_SIZE`, ya sea por lo declarado o por lo enviado
    TooLarge,
}

/// Atiende una conexión completa y la cierra
pub fn handle_connection(mut stream: TcpStream, router: &Router) -> std::io::Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let span = info_span!("conn", %peer);
    let _guard = span.enter();

    let (response, oversized) = match read_request(&mut stream)? {
        RawRequest::Complete(raw) if raw.is_empty() => {
            debug!("peer closed without sending data");
            return Ok(());
        }
        RawRequest::Complete(raw) => (respond(&raw, router), false),
        RawRequest::TooLarge => (reject_too_large(), true),
    };

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    if oversized {
        // Cerrar con datos sin leer resetea la conexión y el cliente
        // podría perder la respuesta
        discard_remaining(&mut stream);
    }

    // El peer pudo haber cerrado ya; no es un error
    let _ = stream.shutdown(Shutdown::Both);
    Ok(())
}

/// Lee hasta tener la cabecera completa y el body declarado, o hasta EOF
///
/// Un peer que cierra antes de enviar todo el body declarado deja un
/// request corto, que el parser acepta. Si el tamaño declarado supera
/// `MAX_REQUEST_SIZE`, o la cabecera no termina dentro de ese límite,
/// retorna `TooLarge` sin seguir leyendo.
pub fn read_request<R: Read>(stream: &mut R) -> io::Result<RawRequest> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        match Request::expected_len(&buffer) {
            Some(total) if total > MAX_REQUEST_SIZE => {
                warn!(declared = total, limit = MAX_REQUEST_SIZE, "request too large");
                return Ok(RawRequest::TooLarge);
            }
            Some(total) if buffer.len() >= total => break,
            Some(_) => {}
            None if buffer.len() >= MAX_REQUEST_SIZE => {
                warn!(limit = MAX_REQUEST_SIZE, "request head too large");
                return Ok(RawRequest::TooLarge);
            }
            None => {}
        }
    }

    Ok(RawRequest::Complete(buffer))
}

fn reject_too_large() -> Response {
    let mut response = Response::error(StatusCode::BadRequest);
    response.set_header("Connection", "close");
    response
}

/// Lee y descarta lo que el cliente siga enviando, con tope de bytes y tiempo
fn discard_remaining(stream: &mut TcpStream) {
    if stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_err() {
        return;
    }

    let mut chunk = [0u8; READ_CHUNK];
    let mut discarded = 0;

    while discarded < DRAIN_LIMIT {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => discarded += n,
        }
    }
    debug!(discarded, "drained rejected request");
}

/// Convierte los bytes de un request en la respuesta a enviar
///
/// Nunca falla: un request malformado da 400, y un handler que retorna
/// `Err` o entra en panic da 500.
pub fn respond(raw: &[u8], router: &Router) -> Response {
    let start = Instant::now();

    let mut response = match Request::parse(raw) {
        Ok(request) => {
            let response = dispatch(&request, router);
            info!(
                method = %request.method(),
                path = request.path(),
                status = response.status().as_u16(),
                latency_ms = start.elapsed().as_secs_f64() * 1000.0,
                "request served"
            );
            response
        }
        Err(e) => {
            warn!(error = %e, "malformed request");
            Response::error(StatusCode::BadRequest)
        }
    };

    response.set_header("Connection", "close");
    response
}

fn dispatch(request: &Request, router: &Router) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(|| router.dispatch(request))) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            error!(error = %e, path = request.path(), "handler failed");
            Response::error(StatusCode::InternalServerError)
        }
        Err(_) => {
            error!(path = request.path(), "handler panicked");
            Response::error(StatusCode::InternalServerError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::thread;

    fn test_router() -> Router {
        let mut router = Router::new();
        router
            .get("/hello", |_req| Ok(Response::text("Hello, World!", StatusCode::Ok)))
            .post("/echo", |req| {
                let body = String::from_utf8_lossy(req.body()).into_owned();
                Ok(Response::text(&format!("You sent: {}", body), StatusCode::Ok))
            })
            .get("/fail", |_req| Err(anyhow::anyhow!("database unavailable")))
            .get("/panic", |_req| panic!("handler bug"));
        router
    }

    fn text_of(response: &Response) -> String {
        String::from_utf8_lossy(response.body()).into_owned()
    }

    #[test]
    fn test_respond_ok() {
        let response = respond(b"GET /hello HTTP/1.1\r\n\r\n", &test_router());

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(text_of(&response), "Hello, World!");
        assert_eq!(response.header("Connection"), Some("close"));
    }

    #[test]
    fn test_respond_parse_error_is_400() {
        let response = respond(b"\x00\x01\x02\x03garbage", &test_router());

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(text_of(&response), "400 Bad Request");
    }

    #[test]
    fn test_respond_unknown_method_is_400() {
        let response = respond(b"BREW /hello HTTP/1.1\r\n\r\n", &test_router());
        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_respond_handler_error_is_500() {
        let response = respond(b"GET /fail HTTP/1.1\r\n\r\n", &test_router());

        assert_eq!(response.status(), StatusCode::InternalServerError);
        // El mensaje interno no se filtra al cliente
        assert!(!text_of(&response).contains("database"));
    }

    #[test]
    fn test_respond_handler_panic_is_500() {
        let response = respond(b"GET /panic HTTP/1.1\r\n\r\n", &test_router());
        assert_eq!(response.status(), StatusCode::InternalServerError);
    }

    fn complete(outcome: RawRequest) -> Vec<u8> {
        match outcome {
            RawRequest::Complete(raw) => raw,
            RawRequest::TooLarge => panic!("request unexpectedly rejected as too large"),
        }
    }

    #[test]
    fn test_read_request_stops_at_content_length() {
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let mut input = Cursor::new(raw.to_vec());
        let raw = complete(read_request(&mut input).unwrap());

        let request = Request::parse(&raw).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.body(), b"hello");
    }

    #[test]
    fn test_read_request_empty() {
        let mut input = Cursor::new(Vec::new());
        assert!(complete(read_request(&mut input).unwrap()).is_empty());
    }

    #[test]
    fn test_read_request_short_body_at_eof() {
        // El peer cierra antes de enviar todo lo declarado
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 17\r\n\r\nhello";
        let mut input = Cursor::new(raw.to_vec());
        let raw = complete(read_request(&mut input).unwrap());

        assert_eq!(Request::parse(&raw).unwrap().body(), b"hello");
    }

    #[test]
    fn test_read_request_declared_too_large() {
        let mut data = b"POST /echo HTTP/1.1\r\nContent-Length: 2097152\r\n\r\n".to_vec();
        data.extend(std::iter::repeat(b'a').take(2 * MAX_REQUEST_SIZE));

        assert_eq!(read_request(&mut Cursor::new(data)).unwrap(), RawRequest::TooLarge);
    }

    #[test]
    fn test_read_request_overflowing_content_length() {
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\nhi";
        assert_eq!(read_request(&mut Cursor::new(raw.to_vec())).unwrap(), RawRequest::TooLarge);
    }

    #[test]
    fn test_read_request_head_too_large() {
        let mut data = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        data.extend(std::iter::repeat(b'a').take(MAX_REQUEST_SIZE));

        assert_eq!(read_request(&mut Cursor::new(data)).unwrap(), RawRequest::TooLarge);
    }

    #[test]
    fn test_read_request_at_limit_is_complete() {
        // Cabecera de largo fijo: el Content-Length siempre tiene 7 dígitos
        let head_len = "POST /echo HTTP/1.1\r\nContent-Length: 0000000\r\n\r\n".len();
        let body_len = MAX_REQUEST_SIZE - head_len;

        let mut data =
            format!("POST /echo HTTP/1.1\r\nContent-Length: {:07}\r\n\r\n", body_len).into_bytes();
        data.extend(std::iter::repeat(b'a').take(body_len));
        assert_eq!(data.len(), MAX_REQUEST_SIZE);

        let raw = complete(read_request(&mut Cursor::new(data)).unwrap());
        assert_eq!(Request::parse(&raw).unwrap().body().len(), body_len);
    }

    #[test]
    fn test_handle_connection_over_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &test_router()).unwrap();
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello")
            .unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nYou sent: hello"));

        server.join().unwrap();
    }

    #[test]
    fn test_handle_connection_rejects_oversized_body() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &test_router()).unwrap();
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

        let body_len = 2 * MAX_REQUEST_SIZE;
        let mut raw =
            format!("POST /echo HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body_len).into_bytes();
        raw.extend(std::iter::repeat(b'a').take(body_len));
        client.write_all(&raw).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(!text.contains("You sent"));

        server.join().unwrap();
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &test_router()).unwrap();
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();
    }
}
