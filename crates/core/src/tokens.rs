//! Single-use "not attending" tokens embedded in reminder emails.

use chrono::Duration;

use crate::types::Timestamp;

/// Tokens stay valid for one week after issue.
pub const NOT_ATTENDING_TOKEN_TTL_DAYS: i64 = 7;

/// Redirect targets for the redemption endpoint, relative to the app URL.
pub const REDIRECT_CONFIRMED: &str = "/not-attending-confirmed";
pub const REDIRECT_INVALID: &str = "/login?error=invalid_token";
pub const REDIRECT_EXPIRED: &str = "/login?error=token_expired";

/// Expiry for a token issued at `issued_at`.
pub fn token_expires_at(issued_at: Timestamp) -> Timestamp {
    issued_at + Duration::days(NOT_ATTENDING_TOKEN_TTL_DAYS)
}

/// A token is expired once `now` is strictly past `expires_at`.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now > expires_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_ttl_is_seven_days() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        assert_eq!(
            token_expires_at(issued),
            Utc.with_ymd_and_hms(2026, 1, 8, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let exp = Utc.with_ymd_and_hms(2026, 1, 8, 8, 0, 0).unwrap();
        assert!(!is_expired(exp, exp));
        assert!(is_expired(exp, exp + Duration::seconds(1)));
        assert!(!is_expired(exp, exp - Duration::days(1)));
    }
}
