use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID extension type
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Accept a caller-supplied id only if it is short, visible ASCII.
fn sanitize(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty()
        || raw.len() > MAX_REQUEST_ID_LEN
        || !raw.bytes().all(|b| b.is_ascii_graphic())
    {
        return None;
    }
    Some(raw.to_string())
}

/// Request ID middleware
///
/// Reuses an incoming `X-Request-ID` (for tracing across services) or generates one,
/// stores it in the request extensions, runs the request inside a span carrying it
/// and echoes it in the response headers.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(sanitize)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
