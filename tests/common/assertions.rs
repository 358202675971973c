//! Custom assertion macros and utilities
//!
//! Assertions for the response shapes the portal produces: redirects,
//! session cookies and rendered notices.

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {{
        let haystack = &$haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected '{}' to contain '{}'",
            haystack,
            needle
        );
    }};
}

/// Assert that a response is a 303 to `$location`
#[macro_export]
macro_rules! assert_see_other {
    ($response:expr, $location:expr) => {{
        let response = &$response;
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            $crate::common::app::location(response).as_deref(),
            Some($location),
            "unexpected redirect target"
        );
    }};
}
