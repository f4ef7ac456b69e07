//! # Todo
//!
//! Todo 項目を表現するドメインモデル。
//!
//! ## ライフサイクル
//!
//! 1. [`NewTodo`] を組み立て、ストアが採番した ID で [`Todo`] になる
//! 2. [`Todo::apply`] で部分更新した新インスタンスを得る（渡されたフィールドのみ変更）
//! 3. 削除はリポジトリ層で行い、ドメインモデルは関与しない
//!
//! ## タイムスタンプ
//!
//! 永続化先（PostgreSQL `TIMESTAMPTZ`）の精度に合わせ、マイクロ秒で切り捨てて保持する。
//! 更新時の `updated_at` は直前の値より必ず大きくなる。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use todo_domain::todo::{NewTodo, TodoChanges, TodoId, TodoTitle};
//!
//! let now = chrono::Utc::now();
//! let todo = NewTodo::new(TodoTitle::new("  Buy milk ")?, None, now).into_todo(TodoId::new(1));
//! assert_eq!(todo.title().as_str(), "Buy milk");
//! assert_eq!(todo.created_at(), todo.updated_at());
//!
//! let changes = TodoChanges {
//!     completed: Some(true),
//!     ..Default::default()
//! };
//! let done = todo.apply(changes, now);
//! assert!(done.completed());
//! assert!(done.updated_at() > todo.updated_at());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// タイトル未入力時のメッセージ
pub const TITLE_REQUIRED_MESSAGE: &str = "Title is required";

/// Todo の一意識別子
///
/// ストアが採番する。一度使われた値は削除後も再利用されない。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

// =========================================================================
// TodoTitle（タイトル）
// =========================================================================

/// Todo のタイトル（値オブジェクト）
///
/// # 不変条件
///
/// - 前後の空白は除去済み
/// - 空文字列ではない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoTitle(String);

impl TodoTitle {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(TITLE_REQUIRED_MESSAGE.to_string()));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// NewTodo（採番前の Todo）
// =========================================================================

/// ID 採番前の Todo
///
/// 作成直後は未完了で、`created_at == updated_at`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    title:       TodoTitle,
    description: String,
    created_at:  DateTime<Utc>,
}

impl NewTodo {
    /// `description` 省略時は空文字列
    pub fn new(title: TodoTitle, description: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            title,
            description: description.unwrap_or_default(),
            created_at: now.trunc_subsecs(6),
        }
    }

    /// 採番された ID を割り当てて [`Todo`] にする
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: false,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }

    pub fn title(&self) -> &TodoTitle {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// =========================================================================
// TodoChanges（部分更新）
// =========================================================================

/// 部分更新の内容
///
/// `Some` のフィールドだけが変更される。`None` は「指定なし」で現状維持。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title:       Option<TodoTitle>,
    pub description: Option<String>,
    pub completed:   Option<bool>,
}

// =========================================================================
// Todo（エンティティ）
// =========================================================================

/// Todo エンティティ
///
/// # 不変条件
///
/// - `title` は空ではない（[`TodoTitle`] が保証）
/// - `updated_at >= created_at`
/// - `id` と `created_at` は作成後に変化しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id:          TodoId,
    title:       TodoTitle,
    description: String,
    completed:   bool,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl Todo {
    /// データベースから Todo を復元する
    pub fn from_db(
        id: TodoId,
        title: TodoTitle,
        description: String,
        completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            completed,
            created_at,
            updated_at,
        }
    }

    /// 部分更新を適用した新インスタンスを返す
    ///
    /// 変更の有無に関わらず `updated_at` は前進する。
    pub fn apply(&self, changes: TodoChanges, now: DateTime<Utc>) -> Self {
        let TodoChanges {
            title,
            description,
            completed,
        } = changes;

        Self {
            id:          self.id,
            title:       title.unwrap_or_else(|| self.title.clone()),
            description: description.unwrap_or_else(|| self.description.clone()),
            completed:   completed.unwrap_or(self.completed),
            created_at:  self.created_at,
            updated_at:  next_updated_at(self.updated_at, now),
        }
    }

    // --- ゲッター ---

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &TodoTitle {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// 診断用の表現: `<Todo 1: Buy milk>`
impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Todo {}: {}>", self.id, self.title)
    }
}

/// 時計が巻き戻った場合や同一マイクロ秒内の連続更新でも単調増加させる
fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    let floor = previous + TimeDelta::microseconds(1);
    now.max(floor)
}
