use fixed_buffer::FixedBuf;
use portico::{HeadError, Header, RequestHead, read_request_head};
use std::io::Cursor;

fn parse(bytes: &[u8]) -> Result<RequestHead, HeadError> {
    let mut buf: FixedBuf<1024> = FixedBuf::new();
    read_request_head(&mut buf, Cursor::new(bytes.to_vec()))
}

#[test]
fn request_line() {
    let head = parse(b"GET /p HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!("GET", head.method);
    assert_eq!("/p", head.target);
    assert!(head.headers.is_empty());
}

#[test]
fn asterisk_target() {
    let head = parse(b"OPTIONS * HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!("OPTIONS", head.method);
    assert_eq!("*", head.target);
}

#[test]
fn target_must_start_with_slash() {
    assert_eq!(Err(HeadError::MalformedPath), parse(b"GET p HTTP/1.1\r\n\r\n"));
}

#[test]
fn unsupported_protocol() {
    assert_eq!(
        Err(HeadError::UnsupportedProtocol),
        parse(b"GET /p HTTP/1.0\r\n\r\n")
    );
    assert_eq!(
        Err(HeadError::UnsupportedProtocol),
        parse(b"GET /p HTTP/2\r\n\r\n")
    );
}

#[test]
fn malformed_request_line() {
    assert_eq!(Err(HeadError::MalformedRequestLine), parse(b"GET\r\n\r\n"));
    assert_eq!(
        Err(HeadError::MalformedRequestLine),
        parse(b"GET /p\r\n\r\n")
    );
}

#[test]
fn headers() {
    let head =
        parse(b"GET / HTTP/1.1\r\nHost: example.com\r\nAccept-Encoding:  gzip \r\n\r\n").unwrap();
    assert_eq!(
        vec![
            Header {
                name: "Host".to_string(),
                value: "example.com".to_string()
            },
            Header {
                name: "Accept-Encoding".to_string(),
                value: "gzip".to_string()
            },
        ],
        head.headers
    );
    // Lookup is case-insensitive.
    assert_eq!(Some("example.com"), head.header("host"));
    assert_eq!(Some("gzip"), head.header("ACCEPT-ENCODING"));
    assert_eq!(None, head.header("cookie"));
}

#[test]
fn malformed_header() {
    assert_eq!(
        Err(HeadError::MalformedHeader),
        parse(b"GET / HTTP/1.1\r\nno-colon\r\n\r\n")
    );
}

#[test]
fn connection_close() {
    assert!(
        !parse(b"GET / HTTP/1.1\r\n\r\n")
            .unwrap()
            .connection_close()
    );
    assert!(
        !parse(b"GET / HTTP/1.1\r\nconnection: keep-alive\r\n\r\n")
            .unwrap()
            .connection_close()
    );
    assert!(
        parse(b"GET / HTTP/1.1\r\nconnection: close\r\n\r\n")
            .unwrap()
            .connection_close()
    );
    assert!(
        parse(b"GET / HTTP/1.1\r\nConnection: Close\r\n\r\n")
            .unwrap()
            .connection_close()
    );
}

#[test]
fn disconnected() {
    assert_eq!(Err(HeadError::Disconnected), parse(b""));
}

#[test]
fn truncated() {
    assert_eq!(Err(HeadError::Truncated), parse(b"GET / HTTP/1.1\r\n"));
    assert_eq!(
        Err(HeadError::Truncated),
        parse(b"GET / HTTP/1.1\r\nhost: example.com")
    );
}

#[test]
fn head_too_long() {
    let mut buf: FixedBuf<32> = FixedBuf::new();
    let bytes = b"GET /a-target-longer-than-the-buffer HTTP/1.1\r\n\r\n";
    assert_eq!(
        Err(HeadError::HeadTooLong),
        read_request_head(&mut buf, Cursor::new(bytes.to_vec()))
    );
}

#[test]
fn leaves_following_bytes_in_buffer() {
    let mut buf: FixedBuf<1024> = FixedBuf::new();
    let bytes = b"GET /one HTTP/1.1\r\n\r\nGET /two HTTP/1.1\r\n\r\n";
    let head = read_request_head(&mut buf, Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!("/one", head.target);
    let head = read_request_head(&mut buf, Cursor::new(Vec::new())).unwrap();
    assert_eq!("/two", head.target);
}
