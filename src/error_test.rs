use super::*;

#[test]
fn business_error_displays_server_message() {
    let err = ApiError::Business { code: 500, message: "plugin is busy".into() };
    assert_eq!(err.to_string(), "plugin is busy");
}

#[test]
fn status_maps_http_variants() {
    assert_eq!(ApiError::ExpiredSession.status(), Some(401));
    assert_eq!(ApiError::Forbidden.status(), Some(403));
    assert_eq!(ApiError::NotFound.status(), Some(404));
    assert_eq!(ApiError::Server { status: 503 }.status(), Some(503));
    assert_eq!(ApiError::Rejected { status: 401, message: String::new() }.status(), Some(401));
    assert_eq!(ApiError::Network("down".into()).status(), None);
}

#[test]
fn not_found_message_is_human_readable() {
    assert_eq!(ApiError::NotFound.to_string(), "resource not found");
}

#[test]
fn error_codes_are_distinct() {
    let codes = [
        ApiError::Business { code: 1, message: String::new() }.error_code(),
        ApiError::ExpiredSession.error_code(),
        ApiError::Network(String::new()).error_code(),
        ApiError::Forbidden.error_code(),
        ApiError::NotFound.error_code(),
        ApiError::Server { status: 500 }.error_code(),
        ApiError::Rejected { status: 418, message: String::new() }.error_code(),
        ApiError::Transport(String::new()).error_code(),
    ];
    let unique: std::collections::HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}
