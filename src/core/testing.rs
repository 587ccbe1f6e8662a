//! A tiny HTTP responder for exercising the client against canned replies.

use std::ops::Deref;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

pub(crate) struct Canned {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Canned {
    pub(crate) fn json(body: &str) -> Self {
        Canned {
            status: 200,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub(crate) fn text(body: &str) -> Self {
        Canned {
            status: 200,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        }
    }

    pub(crate) fn bytes(body: &[u8]) -> Self {
        Canned {
            status: 200,
            content_type: "application/octet-stream",
            body: body.to_vec(),
        }
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Canned {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        }
    }
}

/// A captured request: head and (de-chunked) body, lossily decoded.
#[derive(Debug, Clone)]
pub(crate) struct RawRequest {
    text: String,
    body_start: usize,
}

impl RawRequest {
    pub(crate) fn request_line(&self) -> &str {
        self.text.lines().next().unwrap_or_default()
    }

    pub(crate) fn body(&self) -> &str {
        &self.text[self.body_start..]
    }

    /// Header names are compared case-insensitively, values exactly.
    pub(crate) fn has_header(&self, name: &str, value: &str) -> bool {
        self.text[..self.body_start]
            .lines()
            .skip(1)
            .filter_map(|l| l.split_once(':'))
            .any(|(n, v)| n.trim().eq_ignore_ascii_case(name) && v.trim() == value)
    }

    pub(crate) fn endpoint_is(&self, endpoint: &str) -> bool {
        let target = self.request_line().split(' ').nth(1).unwrap_or_default();
        let path = target.split('?').next().unwrap_or_default();
        path.ends_with(&format!("/{endpoint}"))
    }
}

impl Deref for RawRequest {
    type Target = str;
    fn deref(&self) -> &str {
        &self.text
    }
}

/// Answer exactly one request with `reply`.
pub(crate) async fn serve_once(reply: Canned) -> (Url, JoinHandle<RawRequest>) {
    let (url, handle) = serve(vec![("", reply)]).await;
    let one = tokio::spawn(async move {
        let mut all = handle.await.unwrap();
        all.remove(0)
    });
    (url, one)
}

/// Answer one request per route, matching on the endpoint name; an empty
/// endpoint matches anything. Finishes once every route has been used.
pub(crate) async fn serve(
    routes: Vec<(&'static str, Canned)>,
) -> (Url, JoinHandle<Vec<RawRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = Url::parse(&format!("http://127.0.0.1:{port}/api/")).unwrap();

    let handle = tokio::spawn(async move {
        let mut routes: Vec<Option<(&'static str, Canned)>> = routes.into_iter().map(Some).collect();
        let mut seen = Vec::new();
        while routes.iter().any(Option::is_some) {
            let (mut sock, _) = listener.accept().await.unwrap();
            let req = read_request(&mut sock).await;
            let slot = routes
                .iter_mut()
                .find(|r| matches!(r, Some((ep, _)) if ep.is_empty() || req.endpoint_is(ep)));
            let reply = match slot.and_then(Option::take) {
                Some((_, canned)) => canned,
                None => Canned::status(404, "no route"),
            };
            write_response(&mut sock, &reply).await;
            seen.push(req);
        }
        seen
    });
    (url, handle)
}

async fn write_response(sock: &mut TcpStream, reply: &Canned) {
    let reason = if reply.status < 400 { "OK" } else { "Error" };
    let head = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    sock.write_all(head.as_bytes()).await.unwrap();
    sock.write_all(&reply.body).await.unwrap();
    let _ = sock.shutdown().await;
}

async fn read_request(sock: &mut TcpStream) -> RawRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = sock.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers ended");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());
    let chunked = head.contains("transfer-encoding: chunked");

    let body = if let Some(len) = content_length {
        while buf.len() < head_end + len {
            let n = sock.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-body");
            buf.extend_from_slice(&chunk[..n]);
        }
        buf[head_end..head_end + len].to_vec()
    } else if chunked {
        while find(&buf[head_end..], b"0\r\n\r\n").is_none() {
            let n = sock.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-body");
            buf.extend_from_slice(&chunk[..n]);
        }
        dechunk(&buf[head_end..])
    } else {
        Vec::new()
    };

    let mut text = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let body_start = text.len();
    text.push_str(&String::from_utf8_lossy(&body));
    RawRequest { text, body_start }
}

fn find(hay: &[u8], needle: &[u8]) -> Option<usize> {
    hay.windows(needle.len()).position(|w| w == needle)
}

fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(line_end) = find(raw, b"\r\n") {
        let size_str = String::from_utf8_lossy(&raw[..line_end]);
        let size = usize::from_str_radix(size_str.trim(), 16).unwrap_or(0);
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        out.extend_from_slice(&raw[start..start + size]);
        raw = &raw[start + size + 2..];
    }
    out
}
