use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, TimeDelta, Utc};
use teloxide::types::UserId;

/// Who currently holds an access window, and until when.
///
/// Expired windows are not removed, they just stop counting; the map grows
/// for the lifetime of the process. Known limitation.
pub struct AccessStore {
    windows: Mutex<HashMap<UserId, DateTime<Utc>>>,
}

impl AccessStore {
    pub fn new() -> Self {
        AccessStore {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// True iff `user` has a window reaching strictly past `now`.
    pub fn is_authorized_at(&self, user: UserId, now: DateTime<Utc>) -> bool {
        self.lock().get(&user).is_some_and(|expiry| *expiry > now)
    }

    /// Open a window of `length` for `user`, starting at `now`. An existing
    /// window is replaced, not extended.
    pub fn grant_at(&self, user: UserId, length: TimeDelta, now: DateTime<Utc>) {
        self.lock().insert(user, now + length);
    }

    /// Throw every window away. There is no undo.
    pub fn reset_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, DateTime<Utc>>> {
        self.windows.lock().expect("Access store mutex was poisoned!")
    }
}
