//! Helpers for tests that talk to a local one-shot HTTP server.

/// Returns `true` once `data` holds the request head and the full body
/// announced by `Content-Length`.
pub(crate) fn request_complete(data: &[u8]) -> bool {
    let text = String::from_utf8_lossy(data);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };

    let content_length = text[..head_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    data.len() >= head_end + 4 + content_length
}

/// Renders a `404 Not Found` response carrying `body` as JSON.
pub(crate) fn not_found_response(body: &str) -> String {
    format!(
        "HTTP/1.1 404 Not Found\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{body}",
        body.len()
    )
}
