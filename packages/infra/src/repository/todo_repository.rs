//! # TodoRepository
//!
//! Todo の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **書き込みは TxContext 必須**: insert / update / delete は `&mut TxContext` を受け取り、
//!   コミットするかどうかは呼び出し側（ユースケース層）が決める
//! - **読み取りはプール直結**: 参照系はコミット済みの状態のみを返す
//! - **更新前の読み取りは行ロック付き**: `find_by_id_for_update` は書き込みと同じ
//!   トランザクション内で `SELECT ... FOR UPDATE` を発行し、同じ行への並行更新を直列化する
//! - **採番はストア任せ**: `BIGSERIAL` のシーケンスはロールバックされないため、ID は再利用されない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use todo_domain::todo::{NewTodo, Todo, TodoId, TodoTitle};

use crate::{db::TxContext, error::InfraError};

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Todo を挿入し、採番済みの Todo を返す
    async fn insert(&self, tx: &mut TxContext, new_todo: &NewTodo) -> Result<Todo, InfraError>;

    /// ID で Todo を検索する
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, InfraError>;

    /// トランザクション内で行ロックを取得して Todo を検索する
    ///
    /// ロックはコミットまたはロールバックまで保持される。
    async fn find_by_id_for_update(
        &self,
        tx: &mut TxContext,
        id: TodoId,
    ) -> Result<Option<Todo>, InfraError>;

    /// 全件を ID 昇順で取得する
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError>;

    /// Todo を更新する
    ///
    /// 対象が存在しなかった場合は `false` を返す。
    async fn update(&self, tx: &mut TxContext, todo: &Todo) -> Result<bool, InfraError>;

    /// Todo を削除する
    ///
    /// 対象が存在しなかった場合は `false` を返す。
    async fn delete(&self, tx: &mut TxContext, id: TodoId) -> Result<bool, InfraError>;
}

/// `todos` テーブルの1行
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id:          i64,
    title:       String,
    description: String,
    completed:   bool,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = InfraError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        // CHECK 制約により通常は失敗しない
        let title = TodoTitle::new(row.title).map_err(|e| {
            InfraError::unexpected(format!("invalid title stored for todo {}: {e}", row.id))
        })?;

        Ok(Todo::from_db(
            TodoId::new(row.id),
            title,
            row.description,
            row.completed,
            row.created_at,
            row.updated_at,
        ))
    }
}

/// PostgreSQL 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(title = %new_todo.title()))]
    async fn insert(&self, tx: &mut TxContext, new_todo: &NewTodo) -> Result<Todo, InfraError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos (title, description, completed, created_at, updated_at)
            VALUES ($1, $2, FALSE, $3, $3)
            RETURNING id, title, description, completed, created_at, updated_at
            "#,
        )
        .bind(new_todo.title().as_str())
        .bind(new_todo.description())
        .bind(new_todo.created_at())
        .fetch_one(tx.conn()?)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, InfraError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id_for_update(
        &self,
        tx: &mut TxContext,
        id: TodoId,
    ) -> Result<Option<Todo>, InfraError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(tx.conn()?)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %todo.id()))]
    async fn update(&self, tx: &mut TxContext, todo: &Todo) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $2, description = $3, completed = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(todo.id().as_i64())
        .bind(todo.title().as_str())
        .bind(todo.description())
        .bind(todo.completed())
        .bind(todo.updated_at())
        .execute(tx.conn()?)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, tx: &mut TxContext, id: TodoId) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.as_i64())
            .execute(tx.conn()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
