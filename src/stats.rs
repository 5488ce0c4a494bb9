use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use teloxide::types::UserId;

/// Running usage counters. Process-local, gone on restart.
pub struct Stats {
    inner: Mutex<Counters>,
}

#[derive(Default)]
struct Counters {
    users_seen: HashSet<UserId>,
    links_resolved: u64,
    verified_this_period: HashSet<UserId>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub users: u64,
    pub links_resolved: u64,
    pub verified_today: u64,
}

impl Stats {
    pub fn new() -> Self {
        Stats {
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn note_user_seen(&self, user: UserId) {
        self.lock().users_seen.insert(user);
    }

    pub fn note_link_resolved(&self) {
        self.lock().links_resolved += 1;
    }

    pub fn note_user_verified(&self, user: UserId) {
        self.lock().verified_this_period.insert(user);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let counters = self.lock();
        StatsSnapshot {
            users: counters.users_seen.len() as u64,
            links_resolved: counters.links_resolved,
            verified_today: counters.verified_this_period.len() as u64,
        }
    }

    /// Open a new "verified today" period. The cumulative counters stay.
    pub fn start_new_period(&self) {
        self.lock().verified_this_period.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.inner.lock().expect("Stats mutex was poisoned!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_are_counted_once() {
        let stats = Stats::new();
        stats.note_user_seen(UserId(1));
        stats.note_user_seen(UserId(2));
        stats.note_user_seen(UserId(1));

        assert_eq!(stats.snapshot().users, 2);
    }

    #[test]
    fn period_rollover_keeps_cumulative_counts() {
        let stats = Stats::new();
        stats.note_user_seen(UserId(1));
        stats.note_link_resolved();
        stats.note_link_resolved();
        stats.note_user_verified(UserId(1));

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                users: 1,
                links_resolved: 2,
                verified_today: 1
            }
        );

        stats.start_new_period();

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                users: 1,
                links_resolved: 2,
                verified_today: 0
            }
        );
    }
}
