use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use tracing::debug;

use crate::ClientError;

// Unreserved characters plus the sub-delims, ':' and '@' stay literal inside
// a path segment; '/' and everything else is escaped.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Resolves `path` against `service_url` without path parameters.
///
/// See [`resolve_request_url_with_params`].
pub fn resolve_request_url(service_url: &str, path: &str) -> Result<Url, ClientError> {
    resolve_request_url_with_params(service_url, path, &[])
}

/// Resolves a path template against a service URL.
///
/// Each `{name}` occurrence in `path` is replaced with the path-segment
/// encoding of the matching value. A single leading `/` is dropped and the
/// result is appended to the service URL's own path, with repeated `/`
/// collapsed into one separator. The template is treated
/// as already encoded, so existing `%XX` sequences are kept. Placeholders with
/// no matching parameter are not substituted.
///
/// Returns [`ClientError::InvalidArgument`] for an empty service URL or an
/// empty parameter value, and [`ClientError::InvalidBaseUrl`] when the service
/// URL cannot be parsed.
pub fn resolve_request_url_with_params(
    service_url: &str,
    path: &str,
    path_params: &[(&str, &str)],
) -> Result<Url, ClientError> {
    let mut url = parse_service_url(service_url)?;

    let mut resolved = path.to_owned();
    for (name, value) in path_params {
        if value.is_empty() {
            return Err(ClientError::InvalidArgument(format!(
                "Path parameter '{name}' is empty"
            )));
        }

        let placeholder = format!("{{{name}}}");
        resolved = resolved.replace(&placeholder, &encode_path_segment(value));
    }

    let relative = resolved.strip_prefix('/').unwrap_or(&resolved);
    if !relative.is_empty() {
        append_encoded_path(&mut url, relative);
    }

    debug!(template = path, url = %url, "resolved request URL");
    Ok(url)
}

/// Appends literal path segments to `service_url`.
///
/// Each entry may contain `/` and is split into several segments; every
/// segment is percent-encoded. Empty entries and repeated separators are
/// skipped.
pub fn construct_http_url(service_url: &str, segments: &[&str]) -> Result<Url, ClientError> {
    construct_http_url_with_params(service_url, segments, &[])
}

/// Appends alternating path segments and path parameter values to `service_url`.
///
/// `segments[i]` is followed by `path_params[i]` when present. Parameter values
/// are encoded as a single segment, so a `/` inside a value is escaped.
pub fn construct_http_url_with_params(
    service_url: &str,
    segments: &[&str],
    path_params: &[&str],
) -> Result<Url, ClientError> {
    let mut url = parse_service_url(service_url)?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(service_url.to_owned()))?;

        for (index, segment) in segments.iter().enumerate() {
            if !segment.is_empty() {
                for piece in path_pieces(segment) {
                    path.pop_if_empty().push(piece);
                }
            }
            if let Some(param) = path_params.get(index).filter(|param| !param.is_empty()) {
                path.pop_if_empty().push(param);
            }
        }
    }

    Ok(url)
}

fn parse_service_url(service_url: &str) -> Result<Url, ClientError> {
    if service_url.is_empty() {
        return Err(ClientError::invalid_argument("The serviceUrl cannot be null"));
    }

    let url = Url::parse(service_url)
        .map_err(|_| ClientError::InvalidBaseUrl(service_url.to_owned()))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl(service_url.to_owned()));
    }
    Ok(url)
}

fn append_encoded_path(url: &mut Url, relative: &str) {
    let mut path = url.path().to_owned();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(&path_pieces(relative).collect::<Vec<_>>().join("/"));
    url.set_path(&path);
}

// Splits on '/' and drops empty pieces, except a final one that keeps a
// trailing slash.
fn path_pieces(path: &str) -> impl Iterator<Item = &str> {
    let count = path.split('/').count();
    path.split('/')
        .enumerate()
        .filter(move |(index, piece)| !piece.is_empty() || index + 1 == count)
        .map(|(_, piece)| piece)
}

fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string()
}
