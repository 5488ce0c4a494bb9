use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Mutex, MutexGuard},
};

use rand::RngExt;
use teloxide::types::UserId;

/// A verification code: seven decimal digits, drawn uniformly at random.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct VerifyCode(String);

impl VerifyCode {
    fn generate() -> Self {
        let number: u32 = rand::rng().random_range(1_000_000..10_000_000);
        VerifyCode(number.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VerifyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Outstanding verification codes and who they were issued to.
///
/// Codes are never consumed, never expire, and are not checked for
/// uniqueness: a repeated draw silently hands the code to the newer user.
/// A leaked code therefore stays redeemable until the process restarts.
pub struct CodeRegistry {
    pending: Mutex<HashMap<String, UserId>>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        CodeRegistry {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Draw a fresh code for `user`. Codes issued earlier for the same user
    /// stay redeemable.
    pub fn issue(&self, user: UserId) -> VerifyCode {
        let code = VerifyCode::generate();
        self.lock().insert(code.0.clone(), user);
        code
    }

    /// Who `code` was issued to, if anyone. The mapping is left in place so
    /// a retried redemption still works.
    pub fn resolve(&self, code: &str) -> Option<UserId> {
        self.lock().get(code).copied()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, UserId>> {
        self.pending.lock().expect("Code registry mutex was poisoned!")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn issued_code_resolves_to_its_user_repeatedly() {
        let registry = CodeRegistry::new();
        let code = registry.issue(UserId(42));

        assert_eq!(registry.resolve(code.as_str()), Some(UserId(42)));
        // Resolution does not consume the code.
        assert_eq!(registry.resolve(code.as_str()), Some(UserId(42)));
    }

    #[test]
    fn never_issued_code_is_absent() {
        let registry = CodeRegistry::new();
        registry.issue(UserId(42));

        assert_eq!(registry.resolve("0000000"), None);
        assert_eq!(registry.resolve(""), None);
        assert_eq!(registry.resolve("not a code"), None);
    }

    #[test]
    fn codes_are_seven_decimal_digits() {
        for _ in 0..100 {
            let code = VerifyCode::generate();
            assert_eq!(code.as_str().len(), 7);
            let number: u32 = code.as_str().parse().unwrap();
            assert!((1_000_000..10_000_000).contains(&number));
        }
    }
}
