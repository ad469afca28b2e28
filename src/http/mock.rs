//! Canned-response HTTP server for tests

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serve one canned response and hand back the raw request text
pub async fn spawn_mock_server(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let (url, task) = spawn_sequence(vec![(status_line, content_type, body)]).await;
    let task = tokio::spawn(async move {
        task.await
            .unwrap_or_default()
            .into_iter()
            .next()
            .unwrap_or_default()
    });
    (url, task)
}

/// Serve the given responses to consecutive connections, in order
pub async fn spawn_sequence(
    responses: Vec<(&'static str, &'static str, &'static str)>,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let task = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status_line, content_type, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
            requests.push(request);
        }
        requests
    });

    (format!("http://{addr}"), task)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf).await.unwrap_or(0);
        request.extend_from_slice(&buf[..n]);
        if n == 0 || request_complete(&request) {
            break;
        }
    }
    String::from_utf8_lossy(&request).to_string()
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    if text[..head_end]
        .to_ascii_lowercase()
        .contains("transfer-encoding: chunked")
    {
        return raw.ends_with(b"0\r\n\r\n");
    }
    let content_length = text[..head_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= head_end + 4 + content_length
}

/// Path of the request line, e.g. `/api/weighing/history`
pub fn request_path(raw: &str) -> &str {
    raw.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
}
