//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use todo_domain::todo::{NewTodo, TodoTitle};

/// テスト用の固定時刻
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// タイトルのみ指定した NewTodo を作成する
pub fn new_todo(title: &str) -> NewTodo {
    NewTodo::new(TodoTitle::new(title).unwrap(), None, test_now())
}

/// 説明付きの NewTodo を作成する
pub fn new_todo_with_description(title: &str, description: &str) -> NewTodo {
    NewTodo::new(
        TodoTitle::new(title).unwrap(),
        Some(description.to_string()),
        test_now(),
    )
}
