//! Todo 管理ユースケース
//!
//! 書き込み系は1リクエスト1トランザクション。失敗時は `TxContext` のドロップで
//! ロールバックされ、部分的な行は残らない。
//!
//! 更新・削除は対象行をトランザクション内でロック付きで読み直すため、
//! 同じ Todo への並行リクエストは直列化され、互いの変更を上書きしない。

use std::sync::Arc;

use todo_domain::{
    clock::Clock,
    todo::{NewTodo, Todo, TodoChanges, TodoId, TodoTitle},
};
use todo_infra::{
    db::{TransactionManager, TxContext},
    repository::TodoRepository,
};

use crate::error::ApiError;

/// `completed` に null が指定されたときのメッセージ
pub const COMPLETED_MUST_BE_BOOLEAN_MESSAGE: &str = "Completed must be a boolean";

/// Todo 作成の入力
#[derive(Debug, Default)]
pub struct CreateTodoInput {
    pub title:       Option<String>,
    pub description: Option<String>,
}

/// Todo 更新の入力
///
/// - `title`: 変更なしは `None`。null 指定は空文字列として検証に回す
/// - `description`: 変更なしは `None`
/// - `completed`: 変更なしは `None`、null 指定は `Some(None)`
#[derive(Debug, Default)]
pub struct UpdateTodoInput {
    pub title:       Option<String>,
    pub description: Option<String>,
    pub completed:   Option<Option<bool>>,
}

/// Todo 管理ユースケース
pub struct TodoUseCaseImpl {
    todo_repository: Arc<dyn TodoRepository>,
    tx_manager: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
}

impl TodoUseCaseImpl {
    pub fn new(
        todo_repository: Arc<dyn TodoRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            todo_repository,
            tx_manager,
            clock,
        }
    }

    /// 全件を ID 昇順で取得する
    pub async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.todo_repository
            .find_all()
            .await
            .map_err(ApiError::internal)
    }

    /// ID で1件取得する
    pub async fn get_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.find_existing(id).await
    }

    /// Todo を作成する
    ///
    /// 1. タイトル検証（前後の空白を除去して空なら 400）
    /// 2. トランザクション内で挿入しコミット
    pub async fn create_todo(&self, input: CreateTodoInput) -> Result<Todo, ApiError> {
        let title = TodoTitle::new(input.title.unwrap_or_default())?;
        let new_todo = NewTodo::new(title, input.description, self.clock.now());

        let mut tx = self.tx_manager.begin().await.map_err(ApiError::Persistence)?;
        let todo = self
            .todo_repository
            .insert(&mut tx, &new_todo)
            .await
            .map_err(ApiError::Persistence)?;
        tx.commit().await.map_err(ApiError::Persistence)?;

        tracing::info!(todo_id = %todo.id(), "Todo を作成しました");
        Ok(todo)
    }

    /// Todo を部分更新する
    ///
    /// 存在確認を検証より先に行う（未存在なら入力内容に関わらず 404）。
    pub async fn update_todo(&self, id: TodoId, input: UpdateTodoInput) -> Result<Todo, ApiError> {
        let mut tx = self.tx_manager.begin().await.map_err(ApiError::Persistence)?;
        let current = self.lock_existing(&mut tx, id).await?;

        let title = input.title.map(TodoTitle::new).transpose()?;
        let completed = match input.completed {
            Some(None) => {
                return Err(ApiError::Validation(
                    COMPLETED_MUST_BE_BOOLEAN_MESSAGE.to_string(),
                ));
            }
            Some(Some(value)) => Some(value),
            None => None,
        };
        let changes = TodoChanges {
            title,
            description: input.description,
            completed,
        };
        let updated = current.apply(changes, self.clock.now());

        let found = self
            .todo_repository
            .update(&mut tx, &updated)
            .await
            .map_err(ApiError::Persistence)?;
        if !found {
            return Err(ApiError::TodoNotFound(id));
        }
        tx.commit().await.map_err(ApiError::Persistence)?;

        tracing::info!(todo_id = %id, "Todo を更新しました");
        Ok(updated)
    }

    /// Todo を削除する
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ApiError> {
        let mut tx = self.tx_manager.begin().await.map_err(ApiError::Persistence)?;
        self.lock_existing(&mut tx, id).await?;

        let found = self
            .todo_repository
            .delete(&mut tx, id)
            .await
            .map_err(ApiError::Persistence)?;
        if !found {
            return Err(ApiError::TodoNotFound(id));
        }
        tx.commit().await.map_err(ApiError::Persistence)?;

        tracing::info!(todo_id = %id, "Todo を削除しました");
        Ok(())
    }

    async fn find_existing(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.todo_repository
            .find_by_id(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or(ApiError::TodoNotFound(id))
    }

    async fn lock_existing(&self, tx: &mut TxContext, id: TodoId) -> Result<Todo, ApiError> {
        self.todo_repository
            .find_by_id_for_update(tx, id)
            .await
            .map_err(ApiError::internal)?
            .ok_or(ApiError::TodoNotFound(id))
    }
}
