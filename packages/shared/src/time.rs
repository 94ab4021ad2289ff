//! Time-related utilities for display.

use chrono::{DateTime, Local, Utc};

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix timestamp (milliseconds) as a local `HH:MM:SS` clock time
pub fn timestamp_to_local_clock(timestamp_millis: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_millis)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_timestamp_millis_returns_positive_value() {
        // テスト項目: get_timestamp_millis が正の値を返す
        // given (前提条件):

        // when (操作):
        let timestamp = get_timestamp_millis();

        // then (期待する結果):
        assert!(timestamp > 0);
    }

    #[test]
    fn test_timestamp_to_local_clock_format() {
        // テスト項目: ローカル時刻が HH:MM:SS 形式で表示される
        // given (前提条件):
        let timestamp = 1672498800123;

        // when (操作):
        let result = timestamp_to_local_clock(timestamp);

        // then (期待する結果):
        assert_eq!(result.len(), 8);
        assert_eq!(result.matches(':').count(), 2);
    }

    #[test]
    fn test_timestamp_to_local_clock_out_of_range() {
        // テスト項目: 範囲外のタイムスタンプはプレースホルダになる
        // given (前提条件):
        let timestamp = i64::MAX;

        // when (操作):
        let result = timestamp_to_local_clock(timestamp);

        // then (期待する結果):
        assert_eq!(result, "--:--:--");
    }
}
