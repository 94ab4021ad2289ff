//! User name uniqueness policy.

use serde::Deserialize;

use super::value_object::UserName;

/// Rule deciding whether a candidate name conflicts with a registered one
///
/// `Prefix` is the historical rule: a candidate is rejected when any
/// registered name starts with it, so `"al"` is refused while `"alice"` is
/// online. `Exact` only rejects identical names. Both keep registered names
/// pairwise distinct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsernamePolicy {
    #[default]
    Prefix,
    Exact,
}

impl UsernamePolicy {
    pub fn conflicts(self, registered: &UserName, candidate: &UserName) -> bool {
        match self {
            UsernamePolicy::Prefix => registered.as_str().starts_with(candidate.as_str()),
            UsernamePolicy::Exact => registered == candidate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> UserName {
        UserName::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_prefix_policy_rejects_prefix_of_registered_name() {
        // テスト項目: Prefix ポリシーでは登録済みの名前の接頭辞が衝突とみなされる
        // given (前提条件):
        let policy = UsernamePolicy::Prefix;

        // when (操作):
        let result = policy.conflicts(&name("alice"), &name("al"));

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_prefix_policy_allows_extension_of_registered_name() {
        // テスト項目: Prefix ポリシーでは登録済みの名前を延長した名前は衝突しない
        // given (前提条件):
        let policy = UsernamePolicy::Prefix;

        // when (操作):
        let result = policy.conflicts(&name("al"), &name("alice"));

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_prefix_policy_rejects_identical_name() {
        // テスト項目: Prefix ポリシーでも同一の名前は衝突する
        // given (前提条件):
        let policy = UsernamePolicy::Prefix;

        // when (操作):
        let result = policy.conflicts(&name("alice"), &name("alice"));

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_exact_policy_only_rejects_identical_name() {
        // テスト項目: Exact ポリシーでは同一の名前のみが衝突する
        // given (前提条件):
        let policy = UsernamePolicy::Exact;

        // when (操作) / then (期待する結果):
        assert!(policy.conflicts(&name("alice"), &name("alice")));
        assert!(!policy.conflicts(&name("alice"), &name("al")));
    }

    #[test]
    fn test_policy_deserializes_from_lowercase() {
        // テスト項目: 設定ファイルの小文字表記からポリシーを読み込める
        // given (前提条件):
        let json = r#"["prefix", "exact"]"#;

        // when (操作):
        let policies: Vec<UsernamePolicy> = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(policies, vec![UsernamePolicy::Prefix, UsernamePolicy::Exact]);
    }
}
