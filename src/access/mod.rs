mod codes;
mod store;

pub use codes::{CodeRegistry, VerifyCode};
pub use store::AccessStore;

use chrono::{DateTime, TimeDelta, Utc};
use teloxide::types::UserId;

use crate::stats::Stats;

/// How long one redeemed verification is good for.
pub fn access_window() -> TimeDelta {
    TimeDelta::hours(12)
}

/// Ties the access windows, the code registry and the counters into the
/// user-facing verification flow.
///
/// A user is in one of three states: no usable window (the initial state,
/// and where expiry returns them to), waiting on one or more issued codes,
/// or holding an unexpired window. Expiry is lazy: a window lapses the
/// moment it is checked past its end, and nothing sweeps old records.
///
/// Time-dependent operations come in pairs; the `_at` variants take an
/// explicit `now` so tests can drive the clock.
pub struct AccessControl {
    windows: AccessStore,
    codes: CodeRegistry,
    stats: Stats,
}

impl AccessControl {
    pub fn new() -> Self {
        AccessControl {
            windows: AccessStore::new(),
            codes: CodeRegistry::new(),
            stats: Stats::new(),
        }
    }

    pub fn is_authorized(&self, user: UserId) -> bool {
        self.is_authorized_at(user, Utc::now())
    }

    pub fn is_authorized_at(&self, user: UserId, now: DateTime<Utc>) -> bool {
        self.windows.is_authorized_at(user, now)
    }

    /// Start (another) verification round for `user`. Codes issued earlier
    /// stay valid alongside the new one.
    pub fn issue_code(&self, user: UserId) -> VerifyCode {
        self.codes.issue(user)
    }

    pub fn redeem(&self, code: &str) -> Option<UserId> {
        self.redeem_at(code, Utc::now())
    }

    /// Trade `code` for an access window measured from `now`, not from when
    /// the code was issued. An unknown code changes nothing.
    pub fn redeem_at(&self, code: &str, now: DateTime<Utc>) -> Option<UserId> {
        let user = self.codes.resolve(code)?;
        self.windows.grant_at(user, access_window(), now);
        self.stats.note_user_verified(user);
        Some(user)
    }

    /// Revoke every window at once. Outstanding codes survive and can be
    /// redeemed again afterwards.
    pub fn reset_all(&self) {
        self.windows.reset_all();
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn redeemed_code_opens_a_window_from_redemption_time() {
        let engine = AccessControl::new();
        let user = UserId(42);
        let issued_at = noon();
        let redeemed_at = issued_at + TimeDelta::hours(3);

        let code = engine.issue_code(user);
        assert!(!engine.is_authorized_at(user, issued_at));

        assert_eq!(engine.redeem_at(code.as_str(), redeemed_at), Some(user));
        assert!(engine.is_authorized_at(user, redeemed_at));

        // The window is measured from redemption, so it still stands where
        // an issuance-based one would have lapsed already.
        assert!(engine.is_authorized_at(user, issued_at + TimeDelta::hours(12)));
        assert!(engine.is_authorized_at(
            user,
            redeemed_at + TimeDelta::hours(12) - TimeDelta::minutes(1)
        ));
        assert!(!engine.is_authorized_at(user, redeemed_at + TimeDelta::hours(12)));
    }

    #[test]
    fn unknown_code_changes_nothing() {
        let engine = AccessControl::new();
        let user = UserId(42);
        engine.issue_code(user);

        assert_eq!(engine.redeem_at("0000000", noon()), None);
        assert!(!engine.is_authorized_at(user, noon()));
        assert_eq!(engine.stats().snapshot().verified_today, 0);
    }

    #[test]
    fn several_codes_for_one_user_all_stay_redeemable() {
        let engine = AccessControl::new();
        let user = UserId(7);

        let first = engine.issue_code(user);
        let second = engine.issue_code(user);

        assert_eq!(engine.redeem_at(second.as_str(), noon()), Some(user));
        assert_eq!(engine.redeem_at(first.as_str(), noon()), Some(user));
    }

    #[test]
    fn reset_all_revokes_everyone() {
        let engine = AccessControl::new();
        let now = noon();

        for id in [1, 2, 3] {
            let code = engine.issue_code(UserId(id));
            engine.redeem_at(code.as_str(), now);
        }
        assert!(engine.is_authorized_at(UserId(2), now));

        engine.reset_all();

        for id in [1, 2, 3] {
            assert!(!engine.is_authorized_at(UserId(id), now));
        }
    }

    #[test]
    fn redemption_counts_towards_the_current_period() {
        let engine = AccessControl::new();
        let code = engine.issue_code(UserId(1));
        engine.redeem_at(code.as_str(), noon());

        assert_eq!(engine.stats().snapshot().verified_today, 1);

        engine.stats().start_new_period();
        assert_eq!(engine.stats().snapshot().verified_today, 0);
    }
}
