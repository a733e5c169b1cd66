//! Login accounts
//!
//! A fixed set of accounts loaded from configuration, checked at login before
//! a token is issued.

use serde::{Deserialize, Serialize};

/// A login account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl UserAccount {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }
}

/// Lookup of configured accounts by username
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    accounts: Vec<UserAccount>,
}

impl UserDirectory {
    pub fn new(accounts: Vec<UserAccount>) -> Self {
        Self { accounts }
    }

    /// Development accounts used when none are configured
    pub fn development() -> Self {
        Self::new(vec![
            UserAccount::new("1", "admin", "admin123", "admin"),
            UserAccount::new("2", "user", "user123", "user"),
        ])
    }

    /// Return the account when the username exists and the password matches
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&UserAccount> {
        let account = self.accounts.iter().find(|a| a.username == username)?;

        constant_time_eq(account.password.as_bytes(), password.as_bytes()).then_some(account)
    }

    pub fn accounts(&self) -> &[UserAccount] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
