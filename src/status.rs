//! Status codes and their three-way classification
//!
//! Internal pseudo-codes live at 600 and above so they can never collide with
//! a status a real server sends.

/// Status not known yet
pub const HTTP_STATUS_UNKNOWN: u16 = 0;

pub const HTTP_STATUS_OK: u16 = 200;
pub const HTTP_STATUS_CREATED: u16 = 201;
pub const HTTP_STATUS_ACCEPTED: u16 = 202;
pub const HTTP_STATUS_NO_CONTENT: u16 = 204;

pub const HTTP_STATUS_MOVED_PERMANENTLY: u16 = 301;
pub const HTTP_STATUS_FOUND: u16 = 302;
pub const HTTP_STATUS_NOT_MODIFIED: u16 = 304;

pub const HTTP_STATUS_BAD_REQUEST: u16 = 400;
pub const HTTP_STATUS_UNAUTHORIZED: u16 = 401;
/// Forbidden; usually the user agent was rejected rather than the page missing
pub const HTTP_STATUS_USER_AGENT: u16 = 403;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
pub const HTTP_STATUS_METHOD_NOT_ALLOWED: u16 = 405;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_SSL_CERTIFICATE_ERROR: u16 = 495;
pub const HTTP_STATUS_SSL_HANDSHAKE_FAILED: u16 = 496;
pub const HTTP_STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

pub const HTTP_STATUS_INTERNAL_SERVER_ERROR: u16 = 500;
pub const HTTP_STATUS_NOT_IMPLEMENTED: u16 = 501;
pub const HTTP_STATUS_BAD_GATEWAY: u16 = 502;
pub const HTTP_STATUS_SERVICE_UNAVAILABLE: u16 = 503;
pub const HTTP_STATUS_GATEWAY_TIMEOUT: u16 = 504;

/// Unexpected failure inside the crawler
pub const HTTP_STATUS_CODE_EXCEPTION: u16 = 600;
/// Connection could not be established
pub const HTTP_STATUS_CODE_CONNECTION_ERROR: u16 = 603;
/// Transfer did not finish before the deadline
pub const HTTP_STATUS_CODE_TIMEOUT: u16 = 604;
/// Body exceeded the request's byte limit
pub const HTTP_STATUS_CODE_FILE_TOO_BIG: u16 = 612;
/// Content type not accepted by the request
pub const HTTP_STATUS_CODE_PAGE_UNSUPPORTED: u16 = 613;
/// The crawling server (not the target) failed
pub const HTTP_STATUS_CODE_SERVER_ERROR: u16 = 614;
/// The crawling server (not the target) is rate limiting us
pub const HTTP_STATUS_CODE_SERVER_TOO_MANY_REQUESTS: u16 = 615;

/// Three-valued validity of a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 2xx-3xx, content usable
    Valid,
    /// Clearly unusable
    Invalid,
    /// This attempt failed but the resource may still be fine
    Indeterminate,
}

/// Classifies a status code
///
/// | Code | Class |
/// |------|-------|
/// | 200..400 | Valid |
/// | 0, 403, 429, 614, 615 | Indeterminate |
/// | anything else | Invalid |
pub fn classify(code: u16) -> StatusClass {
    match code {
        200..=399 => StatusClass::Valid,
        HTTP_STATUS_UNKNOWN
        | HTTP_STATUS_USER_AGENT
        | HTTP_STATUS_TOO_MANY_REQUESTS
        | HTTP_STATUS_CODE_SERVER_ERROR
        | HTTP_STATUS_CODE_SERVER_TOO_MANY_REQUESTS => StatusClass::Indeterminate,
        _ => StatusClass::Invalid,
    }
}

pub fn is_status_code_valid(code: u16) -> bool {
    classify(code) == StatusClass::Valid
}

pub fn is_status_code_invalid(code: u16) -> bool {
    classify(code) == StatusClass::Invalid
}

/// Returns true when retrying with a different crawler backend may succeed
pub fn is_status_code_uncertain(code: u16) -> bool {
    matches!(
        code,
        HTTP_STATUS_USER_AGENT
            | HTTP_STATUS_TOO_MANY_REQUESTS
            | HTTP_STATUS_CODE_EXCEPTION
            | HTTP_STATUS_CODE_SERVER_ERROR
            | HTTP_STATUS_CODE_SERVER_TOO_MANY_REQUESTS
    )
}

/// Human readable label, e.g. `HTTP_STATUS_CODE_TIMEOUT(604)`
pub fn status_code_to_text(code: u16) -> String {
    let name = match code {
        HTTP_STATUS_UNKNOWN => "HTTP_STATUS_UNKNOWN",
        HTTP_STATUS_OK => "HTTP_STATUS_OK",
        HTTP_STATUS_CREATED => "HTTP_STATUS_CREATED",
        HTTP_STATUS_ACCEPTED => "HTTP_STATUS_ACCEPTED",
        HTTP_STATUS_NO_CONTENT => "HTTP_STATUS_NO_CONTENT",
        HTTP_STATUS_MOVED_PERMANENTLY => "HTTP_STATUS_MOVED_PERMANENTLY",
        HTTP_STATUS_FOUND => "HTTP_STATUS_FOUND",
        HTTP_STATUS_NOT_MODIFIED => "HTTP_STATUS_NOT_MODIFIED",
        HTTP_STATUS_BAD_REQUEST => "HTTP_STATUS_BAD_REQUEST",
        HTTP_STATUS_UNAUTHORIZED => "HTTP_STATUS_UNAUTHORIZED",
        HTTP_STATUS_USER_AGENT => "HTTP_STATUS_USER_AGENT",
        HTTP_STATUS_NOT_FOUND => "HTTP_STATUS_NOT_FOUND",
        HTTP_STATUS_METHOD_NOT_ALLOWED => "HTTP_STATUS_METHOD_NOT_ALLOWED",
        HTTP_STATUS_TOO_MANY_REQUESTS => "HTTP_STATUS_TOO_MANY_REQUESTS",
        HTTP_STATUS_SSL_CERTIFICATE_ERROR => "HTTP_STATUS_SSL_CERTIFICATE_ERROR",
        HTTP_STATUS_SSL_HANDSHAKE_FAILED => "HTTP_STATUS_SSL_HANDSHAKE_FAILED",
        HTTP_STATUS_CLIENT_CLOSED_REQUEST => "HTTP_STATUS_CLIENT_CLOSED_REQUEST",
        HTTP_STATUS_INTERNAL_SERVER_ERROR => "HTTP_STATUS_INTERNAL_SERVER_ERROR",
        HTTP_STATUS_NOT_IMPLEMENTED => "HTTP_STATUS_NOT_IMPLEMENTED",
        HTTP_STATUS_BAD_GATEWAY => "HTTP_STATUS_BAD_GATEWAY",
        HTTP_STATUS_SERVICE_UNAVAILABLE => "HTTP_STATUS_SERVICE_UNAVAILABLE",
        HTTP_STATUS_GATEWAY_TIMEOUT => "HTTP_STATUS_GATEWAY_TIMEOUT",
        HTTP_STATUS_CODE_EXCEPTION => "HTTP_STATUS_CODE_EXCEPTION",
        HTTP_STATUS_CODE_CONNECTION_ERROR => "HTTP_STATUS_CODE_CONNECTION_ERROR",
        HTTP_STATUS_CODE_TIMEOUT => "HTTP_STATUS_CODE_TIMEOUT",
        HTTP_STATUS_CODE_FILE_TOO_BIG => "HTTP_STATUS_CODE_FILE_TOO_BIG",
        HTTP_STATUS_CODE_PAGE_UNSUPPORTED => "HTTP_STATUS_CODE_PAGE_UNSUPPORTED",
        HTTP_STATUS_CODE_SERVER_ERROR => "HTTP_STATUS_CODE_SERVER_ERROR",
        HTTP_STATUS_CODE_SERVER_TOO_MANY_REQUESTS => "HTTP_STATUS_CODE_SERVER_TOO_MANY_REQUESTS",
        _ => "STATUS_CODE",
    };
    format!("{}({})", name, code)
}
