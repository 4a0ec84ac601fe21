use crate::util::find_slice;
use fixed_buffer::FixedBuf;
use safe_regex::{Matcher2, Matcher3, regex};
use std::fmt::{Display, Formatter};
use std::io::Read;

fn trim_trailing_cr(bytes: &[u8]) -> &[u8] {
    if let Some(&b'\r') = bytes.last() {
        bytes.split_last().unwrap().1
    } else {
        bytes
    }
}

fn trim_whitespace(mut bytes: &[u8]) -> &[u8] {
    loop {
        if let Some(&byte) = bytes.first() {
            if byte == b' ' || byte == b'\t' || byte == b'\r' || byte == b'\n' {
                bytes = bytes.split_first().unwrap().1;
                continue;
            }
        }
        if let Some(&byte) = bytes.last() {
            if byte == b' ' || byte == b'\t' || byte == b'\r' || byte == b'\n' {
                bytes = bytes.split_last().unwrap().1;
                continue;
            }
        }
        break;
    }
    bytes
}

#[allow(clippy::module_name_repetitions)]
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub enum HeadError {
    Disconnected,
    HeadTooLong,
    MalformedHeader,
    MalformedPath,
    MalformedRequestLine,
    MissingRequestLine,
    Truncated,
    UnsupportedProtocol,
}
impl HeadError {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            HeadError::Disconnected => "HeadError::Disconnected",
            HeadError::HeadTooLong => "HeadError::HeadTooLong",
            HeadError::MalformedHeader => "HeadError::MalformedHeader",
            HeadError::MalformedPath => "HeadError::MalformedPath",
            HeadError::MalformedRequestLine => "HeadError::MalformedRequestLine",
            HeadError::MissingRequestLine => "HeadError::MissingRequestLine",
            HeadError::Truncated => "HeadError::Truncated",
            HeadError::UnsupportedProtocol => "HeadError::UnsupportedProtocol",
        }
    }
}
impl Display for HeadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.description())
    }
}
impl std::error::Error for HeadError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// One parsed request head: the request line plus header lines.
///
/// Header values are kept as opaque latin-1 text; this layer only ever looks
/// at `Connection`, so it does not validate header names against a token set.
#[derive(Clone, Eq, PartialEq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub headers: Vec<Header>,
}
impl RequestHead {
    /// Tries to parse one request head from the readable part of `buf`.
    ///
    /// # Errors
    /// Returns [`HeadError::Truncated`] when the buffer does not yet hold a
    /// full head ending in `"\r\n\r\n"`, and other errors when parsing fails.
    pub fn try_read<const BUF_SIZE: usize>(
        buf: &mut FixedBuf<BUF_SIZE>,
    ) -> Result<Self, HeadError> {
        let head_len = find_slice(b"\r\n\r\n", buf.readable()).ok_or(HeadError::Truncated)?;
        let head_bytes_with_delim = buf.try_read_exact(head_len + 4).unwrap();
        let head_bytes = &head_bytes_with_delim[0..head_len];
        let mut lines = head_bytes.split(|b| *b == b'\n').map(trim_trailing_cr);
        let request_line = lines.next().ok_or(HeadError::MissingRequestLine)?;
        let (method, target) = parse_request_line(request_line)?;
        let mut headers = Vec::new();
        for line in lines {
            headers.push(parse_header_line(line)?);
        }
        Ok(Self {
            method,
            target,
            headers,
        })
    }

    /// Returns the value of the first header named `name`, ASCII
    /// case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Returns `true` when the client asked to close the connection after
    /// this request.
    #[must_use]
    pub fn connection_close(&self) -> bool {
        self.header("connection")
            .is_some_and(|value| value.eq_ignore_ascii_case("close"))
    }
}
impl core::fmt::Debug for RequestHead {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(
            f,
            "RequestHead{{method={:?}, target={:?}, headers={:?}}}",
            self.method, self.target, self.headers
        )
    }
}

fn parse_request_line(line: &[u8]) -> Result<(String, String), HeadError> {
    // https://datatracker.ietf.org/doc/html/rfc7230#section-3.1.1
    //     request-line   = method SP request-target SP HTTP-version CRLF
    //     method         = token
    //     token          = 1*tchar
    #[allow(clippy::assign_op_pattern)]
    #[allow(clippy::range_plus_one)]
    let matcher: Matcher3<_> = regex!(br"([-!#$%&'*+.^_`|~0-9A-Za-z]+) ([^ \t\r\n]+) ([^ \t\r\n]+)");
    let (method_bytes, target_bytes, proto_bytes) = matcher
        .match_slices(line)
        .ok_or(HeadError::MalformedRequestLine)?;
    let method = std::str::from_utf8(method_bytes).unwrap().to_string();
    let target = std::str::from_utf8(target_bytes)
        .map_err(|_| HeadError::MalformedPath)?
        .to_string();
    if target != "*" && !target.starts_with('/') {
        return Err(HeadError::MalformedPath);
    }
    if proto_bytes != b"HTTP/1.1" {
        return Err(HeadError::UnsupportedProtocol);
    }
    Ok((method, target))
}

fn latin1_bytes_to_utf8(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn parse_header_line(line: &[u8]) -> Result<Header, HeadError> {
    // https://datatracker.ietf.org/doc/html/rfc7230#section-3.2
    //     header-field   = field-name ":" OWS field-value OWS
    #[allow(clippy::assign_op_pattern)]
    #[allow(clippy::range_plus_one)]
    let matcher: Matcher2<_> = regex!(br"([-!#$%&'*+.^_`|~0-9A-Za-z]+):[ \t]*(.*)[ \t]*");
    let (name_bytes, value_bytes) = matcher
        .match_slices(line)
        .ok_or(HeadError::MalformedHeader)?;
    Ok(Header {
        name: String::from_utf8(name_bytes.to_vec()).unwrap(),
        value: latin1_bytes_to_utf8(trim_whitespace(value_bytes)),
    })
}

/// Reads one request head from `stream`, buffering through `buf`.
///
/// Blocks until a full head arrives, the peer closes the connection, or
/// reading fails.
///
/// # Errors
/// Returns an error when:
/// - the connection is closed before any bytes of a head arrive
///   ([`HeadError::Disconnected`])
/// - the head does not fit in `buf` ([`HeadError::HeadTooLong`])
/// - we fail to read or parse the request head
pub fn read_request_head<const BUF_SIZE: usize>(
    buf: &mut FixedBuf<BUF_SIZE>,
    mut stream: impl Read,
) -> Result<RequestHead, HeadError> {
    loop {
        match RequestHead::try_read(buf) {
            Ok(head) => return Ok(head),
            Err(HeadError::Truncated) => {}
            Err(e) => return Err(e),
        }
        if buf.writable().is_empty() {
            return Err(HeadError::HeadTooLong);
        }
        match stream.read(buf.writable()) {
            Err(..) | Ok(0) if buf.is_empty() => return Err(HeadError::Disconnected),
            Err(..) | Ok(0) => return Err(HeadError::Truncated),
            Ok(n) => buf.wrote(n),
        }
    }
}
