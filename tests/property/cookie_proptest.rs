//! Property-based tests for the session cookie encoding

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use account_portal::shared::session::{read_session, session_cookies, CHUNK_SIZE};
use account_portal::shared::{CookieOptions, CookieSet, SessionToken};

const NAME: &str = "sb-session";

fn token(access_token: String, refresh_token: String, secs: i64) -> SessionToken {
    let issued_at = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
    SessionToken::new(
        access_token,
        refresh_token,
        issued_at,
        issued_at + Duration::hours(1),
        Uuid::new_v4(),
    )
}

/// Write `token` into `jar` through `Set-Cookie` text, as a browser would see it
fn store(jar: &mut CookieSet, token: &SessionToken) {
    let cookies = session_cookies(NAME, token, &CookieOptions::default(), jar).unwrap();
    for cookie in cookies {
        jar.apply_set_cookie(&cookie.to_set_cookie());
    }
}

proptest! {
    #[test]
    fn test_session_survives_browser_jar(
        access in "[A-Za-z0-9._-]{0,9000}",
        refresh in "[A-Za-z0-9]{1,64}",
        secs in 0i64..1_000_000,
    ) {
        let session = token(access, refresh, secs);
        let mut jar = CookieSet::new();
        store(&mut jar, &session);

        prop_assert_eq!(read_session(&jar, NAME).unwrap().unwrap(), session);
        for cookie in jar.iter() {
            prop_assert!(cookie.value.len() <= CHUNK_SIZE);
        }
    }

    #[test]
    fn test_rewrite_leaves_no_stale_chunks(
        first_len in 0usize..9000,
        second_len in 0usize..9000,
    ) {
        let first = token("a".repeat(first_len), "r1".to_string(), 0);
        let second = token("b".repeat(second_len), "r2".to_string(), 60);

        let mut jar = CookieSet::new();
        store(&mut jar, &first);
        store(&mut jar, &second);

        prop_assert_eq!(read_session(&jar, NAME).unwrap().unwrap(), second.clone());

        // Forwarded as a Cookie header, the jar must still read back the same way.
        let forwarded = CookieSet::parse(&jar.to_cookie_header().unwrap());
        prop_assert_eq!(read_session(&forwarded, NAME).unwrap().unwrap(), second);
    }
}
