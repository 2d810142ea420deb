//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser HTTP escrito a mano sobre los bytes leídos del socket.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /api/messages?draft=1 HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 13\r\n
//! \r\n
//! {"text":"hi"}
//! ```
//!
//! ## Etapas
//!
//! 1. **Request Line**: exactamente tres tokens `METHOD PATH VERSION`
//! 2. **Headers**: `Name: Value` hasta la línea vacía, nombres en minúscula
//! 3. **Body**: exactamente `Content-Length` bytes (vacío si no hay header)

use std::collections::HashMap;
use std::str::FromStr;

/// Separador entre headers y body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    /// Los métodos HTTP distinguen mayúsculas: `get` no es `GET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path tal como llegó, incluyendo el query string (ej: "/hello?name=x")
    path: String,

    /// Query parameters decodificados (ej: {"name": "x"})
    query_params: HashMap<String, String>,

    /// Headers con el nombre en minúscula (ej: {"host": "localhost:8080"})
    headers: HashMap<String, String>,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Body crudo
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request vacío
    EmptyRequest,

    /// Formato inválido de la request line
    InvalidRequestLine,

    /// Método HTTP no soportado
    UnsupportedMethod(String),

    /// Versión HTTP que no empieza con "HTTP/"
    InvalidHttpVersion(String),

    /// Header sin ':'
    InvalidHeader(String),

    /// Content-Length no numérico
    InvalidContentLength(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidHttpVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::InvalidHeader(h) => write!(f, "Invalid header: {}", h),
            ParseError::InvalidContentLength(v) => write!(f, "Invalid Content-Length: {}", v),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Construye un request sin pasar por el parser
    ///
    /// Útil para invocar handlers directamente.
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query_params: Self::parse_query(path),
            headers: HashMap::new(),
            version: "HTTP/1.1".to_string(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (el nombre se normaliza a minúscula)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Reemplaza el body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Parsea un request HTTP desde bytes
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError)` - Request malformado; el servidor responde 400
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use toy_web_server::http::{Method, Request};
    ///
    /// let raw = b"POST /echo?x=1 HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::POST);
    /// assert_eq!(request.path(), "/echo?x=1");
    /// assert_eq!(request.route_path(), "/echo");
    /// assert_eq!(request.body(), b"hello");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        // Sin separador: todo lo recibido es cabecera y no hay body
        let (head, rest) = match find_header_end(buffer) {
            Some(end) => (&buffer[..end], &buffer[end + HEADER_TERMINATOR.len()..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.split("\r\n");

        // 1. Request line
        let request_line = lines.next().unwrap_or_default();
        let (method, path, version) = Self::parse_request_line(request_line)?;

        // 2. Headers
        let headers = Self::parse_headers(lines)?;

        // 3. Body
        let body = Self::parse_body(&headers, rest)?;

        Ok(Request {
            method,
            query_params: Self::parse_query(&path),
            path,
            headers,
            version,
            body,
        })
    }

    /// Cantidad total de bytes (cabecera + body declarado) que ocupa el
    /// request, o `None` si todavía no llegó la línea vacía.
    ///
    /// El lector de la conexión la usa para saber cuándo dejar de leer.
    /// Un `Content-Length` que desborda `usize` satura en `usize::MAX`.
    pub fn expected_len(buffer: &[u8]) -> Option<usize> {
        let end = find_header_end(buffer)?;
        let head = String::from_utf8_lossy(&buffer[..end]);

        let content_length = head
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .filter_map(|(_, value)| value.trim().parse::<usize>().ok())
            .last()
            .unwrap_or(0);

        let total = (end + HEADER_TERMINATOR.len())
            .checked_add(content_length)
            .unwrap_or(usize::MAX);

        Some(total)
    }

    /// Formato: `GET /path?query HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();

        // Exactamente 3 partes separadas por un único espacio: METHOD PATH VERSION
        if parts.len() != 3 || parts.iter().any(|part| part.is_empty()) {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = parts[0].parse::<Method>()?;
        let path = parts[1].to_string();

        let version = parts[2].to_string();
        if !version.starts_with("HTTP/") {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, version))
    }

    /// Cada header tiene formato "Name: Value". Si un nombre se repite,
    /// gana el último.
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    /// Toma a lo sumo `Content-Length` bytes de lo que sigue a la cabecera
    fn parse_body(headers: &HashMap<String, String>, rest: &[u8]) -> Result<Vec<u8>, ParseError> {
        let length = match headers.get("content-length") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(value.clone()))?,
            None => 0,
        };

        if length == 0 {
            return Ok(Vec::new());
        }

        Ok(rest[..length.min(rest.len())].to_vec())
    }

    /// Extrae los query parameters de un path
    ///
    /// Ejemplo: "/hello?name=ana&debug" → {"name": "ana", "debug": ""}
    fn parse_query(path: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();

        let Some((_, query)) = path.split_once('?') else {
            return params;
        };

        for param in query.split('&').filter(|p| !p.is_empty()) {
            match param.split_once('=') {
                Some((key, value)) => params.insert(url_decode(key), url_decode(value)),
                None => params.insert(url_decode(param), String::new()),
            };
        }

        params
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path completo, incluyendo el query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path sin query string; es lo que usa el router
    pub fn route_path(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(path, _)| path)
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    ///
    /// # Ejemplo
    /// ```
    /// use toy_web_server::http::Request;
    ///
    /// let raw = b"GET /hello?name=Ana%20Maria HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.query_param("name"), Some("Ana Maria"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los headers (nombres en minúscula)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body como texto, si es UTF-8 válido
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Decodifica `+` y secuencias `%XX`. Las secuencias inválidas se dejan tal cual.
fn url_decode(s: &str) -> String {
    percent_decode(s, true)
}

/// Decodifica solo `%XX`: en un path `+` es un carácter literal
pub fn decode_path(s: &str) -> String {
    percent_decode(s, false)
}

fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => decoded.push(b' '),
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                decoded.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 2;
            }
            other => decoded.push(other),
        }
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
