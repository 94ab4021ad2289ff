//! Value objects.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Server-assigned identity of a live connection
///
/// Issued at accept time and used as the registry key for the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Issue a fresh connection identity
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the short form is enough to tell sessions apart in logs
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Authenticated user name (non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserName(String);

impl UserName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyUserName);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 発行される ConnectionId は毎回異なる
        // given (前提条件):

        // when (操作):
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(first.to_string().len(), 8);
    }

    #[test]
    fn test_user_name_accepts_non_empty_value() {
        // テスト項目: 空でないユーザー名は受け付けられる
        // given (前提条件):
        let value = "alice".to_string();

        // when (操作):
        let result = UserName::new(value);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_user_name_rejects_empty_value() {
        // テスト項目: 空のユーザー名はエラーになる
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = UserName::try_from(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyUserName));
    }
}
