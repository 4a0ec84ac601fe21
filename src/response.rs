use std::io::Write;

#[must_use]
fn reason_phrase(code: u16) -> &'static str {
    // https://datatracker.ietf.org/doc/html/rfc7231#section-6.1
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        505 => "HTTP Version Not Supported",
        _ => "Response",
    }
}

/// A response to send back on the connection.
///
/// `Normal` responses are serialized by this crate.  `Raw` responses carry
/// pre-formatted HTTP bytes, relayed verbatim; the dispatcher uses them for
/// fallback and cached dynamic content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Normal {
        code: u16,
        content_type: &'static str,
        body: Vec<u8>,
    },
    Raw(Vec<u8>),
}
impl Response {
    #[must_use]
    pub fn text(code: u16, body: impl Into<String>) -> Self {
        Response::Normal {
            code,
            content_type: "text/plain; charset=UTF-8",
            body: body.into().into_bytes(),
        }
    }

    #[must_use]
    pub fn bytes(code: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        Response::Normal {
            code,
            content_type,
            body,
        }
    }

    #[must_use]
    pub fn raw(bytes: Vec<u8>) -> Self {
        Response::Raw(bytes)
    }

    #[must_use]
    pub fn bad_request_400() -> Self {
        Response::text(400, "Bad request")
    }

    #[must_use]
    pub fn not_found_404() -> Self {
        Response::text(404, "Not found")
    }

    #[must_use]
    pub fn method_not_allowed_405() -> Self {
        Response::text(405, "Method not allowed")
    }

    #[must_use]
    pub fn internal_server_error_500() -> Self {
        Response::text(500, "Internal server error")
    }

    #[must_use]
    pub fn bad_gateway_502() -> Self {
        Response::text(502, "Bad gateway")
    }

    /// Serializes the response and writes it to `writer`.
    ///
    /// # Errors
    /// Returns an error when writing fails.
    pub fn write_to(&self, mut writer: impl Write) -> Result<(), std::io::Error> {
        match self {
            Response::Normal {
                code,
                content_type,
                body,
            } => {
                let reason = reason_phrase(*code);
                write!(writer, "HTTP/1.1 {code} {reason}\r\n")?;
                if !body.is_empty() {
                    write!(writer, "content-type: {content_type}\r\n")?;
                }
                write!(writer, "content-length: {}\r\n\r\n", body.len())?;
                writer.write_all(body)?;
            }
            Response::Raw(bytes) => writer.write_all(bytes)?,
        }
        writer.flush()
    }
}
