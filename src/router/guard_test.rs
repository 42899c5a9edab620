use super::*;
use crate::router::routes::{ADMIN, LOGIN};
use crate::test_helpers::FixedStatus;

// =============================================================================
// decide
// =============================================================================

#[test]
fn decide_table() {
    assert_eq!(decide(&ADMIN, false), Navigation::Redirect(HOME));
    assert_eq!(decide(&ADMIN, true), Navigation::Allow);
    assert_eq!(decide(&LOGIN, true), Navigation::Redirect(HOME));
    assert_eq!(decide(&LOGIN, false), Navigation::Allow);
    assert_eq!(decide(&HOME, false), Navigation::Allow);
    assert_eq!(decide(&HOME, true), Navigation::Allow);
}

// =============================================================================
// before_each
// =============================================================================

#[tokio::test]
async fn public_route_skips_remote_check() {
    let status = FixedStatus::new(Ok(false));
    let guard = RouteGuard::new(status.clone());
    assert_eq!(guard.before_each(&HOME).await, Navigation::Allow);
    assert_eq!(status.calls(), 0);
}

#[tokio::test]
async fn protected_route_checks_remote() {
    let status = FixedStatus::new(Ok(true));
    let guard = RouteGuard::new(status.clone());
    assert_eq!(guard.before_each(&ADMIN).await, Navigation::Allow);
    assert_eq!(status.calls(), 1);
}

#[tokio::test]
async fn failed_check_redirects_away_from_protected_route() {
    let status = FixedStatus::new(Err(ApiError::Network("Network Error".into())));
    let guard = RouteGuard::new(status.clone());
    assert_eq!(guard.before_each(&ADMIN).await, Navigation::Redirect(HOME));
}

#[tokio::test]
async fn login_route_checks_remote_every_time() {
    let status = FixedStatus::new(Ok(true));
    let guard = RouteGuard::new(status.clone());
    assert_eq!(guard.before_each(&LOGIN).await, Navigation::Redirect(HOME));
    assert_eq!(guard.before_each(&LOGIN).await, Navigation::Redirect(HOME));
    assert_eq!(status.calls(), 2);
}

#[tokio::test]
async fn failed_check_allows_login_form() {
    let status = FixedStatus::new(Err(ApiError::Rejected { status: 401, message: String::new() }));
    let guard = RouteGuard::new(status);
    assert_eq!(guard.before_each(&LOGIN).await, Navigation::Allow);
}
