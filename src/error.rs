//! Client-visible service errors and the HTML error envelope.
//!
//! Validation and query failures are plain values carrying an HTTP status
//! and a short message; the adapter renders them into the uniform HTML
//! envelope that echoes the originating request URL.

use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

/// A request failure that maps directly onto a wire response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdsnError {
    pub status: StatusCode,
    pub message: String,
}

impl FdsnError {
    /// Malformed, missing, or out-of-range query parameter.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Requested time window exceeds the configured maximum.
    pub fn request_too_large(max_hours: i64) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: format!(
                "<h3>Request time window too large:</h3>\n<p>Max is {max_hours} hours.</p>"
            ),
        }
    }

    /// No records matched; the status is chosen by the query's nodata policy.
    pub fn no_data(status: StatusCode) -> Self {
        Self {
            status,
            message: "<h3>No data found for request:</h3>".to_string(),
        }
    }

    /// Verb other than GET on the query endpoint.
    pub fn method_not_allowed(method: &Method) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: format!("<h3>{method} is not supported, use GET</h3>"),
        }
    }

    /// Render the uniform HTML envelope, echoing the request URL as a link.
    pub fn into_page(self, uri: &Uri) -> Response {
        let body = format!(
            "<h3>Error</h3>\n{}\n<a href=\"{uri}\">{uri}</a>",
            self.message
        );
        let mut response = (
            self.status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }
        response
    }
}

impl IntoResponse for FdsnError {
    /// Fallback rendering for contexts where the request URI is not at hand.
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            format!("<h3>Error</h3>\n{}", self.message),
        )
            .into_response()
    }
}
