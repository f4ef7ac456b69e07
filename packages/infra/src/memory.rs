//! # インメモリストア
//!
//! テストモード（`APP_ENV=testing`）で PostgreSQL の代わりに使用するストア。
//! [`TxContext`] による書き込みの契約は PostgreSQL 実装と同じ:
//!
//! - 書き込みはトランザクション内にステージされ、`commit()` 時にまとめて反映される
//! - コミットせずにドロップするとステージされた内容は破棄される（ロールバック）
//! - ID はカウンタから採番し、ロールバックや削除があっても再利用しない
//! - `find_by_id_for_update` はストアの書き込みロックを取得し、トランザクション終了まで保持する
//!   （PostgreSQL の `SELECT ... FOR UPDATE` 相当。インメモリでは表単位のロック）
//! - 更新はコミット時点で行が残っている場合のみ反映される
//!
//! `test-utils` feature を有効にすると、障害注入用の API が公開される。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
};

use async_trait::async_trait;
use todo_domain::todo::{NewTodo, Todo, TodoId};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{
    db::{ConnectionProbe, TransactionManager, TxContext},
    error::InfraError,
    repository::TodoRepository,
};

/// インメモリストア本体
///
/// `Clone` はハンドルの複製で、同じデータを共有する。
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    rows:         RwLock<BTreeMap<TodoId, Todo>>,
    write_lock:   Arc<Mutex<()>>,
    next_id:      AtomicI64,
    unavailable:  AtomicBool,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                rows:         RwLock::new(BTreeMap::new()),
                write_lock:   Arc::new(Mutex::new(())),
                next_id:      AtomicI64::new(1),
                unavailable:  AtomicBool::new(false),
                fail_commits: AtomicBool::new(false),
            }),
        }
    }

    /// ストア全体を利用不可にする（疎通確認・読み書き・コミットがすべて失敗する）
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// コミットのみを失敗させる（ステージまでは成功する）
    #[cfg(any(test, feature = "test-utils"))]
    pub fn fail_commits(&self, fail: bool) {
        self.inner.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// コミット済みの件数
    pub async fn len(&self) -> usize {
        self.inner.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> Result<(), InfraError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(InfraError::unavailable("in-memory store is unavailable"));
        }
        Ok(())
    }

    fn allocate_id(&self) -> TodoId {
        TodoId::new(self.inner.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// MemoryTx
// =============================================================================

enum StagedOp {
    Insert(Todo),
    Update(Todo),
    Delete(TodoId),
}

/// インメモリストアのトランザクション
///
/// [`TxContext`] の中身として使われる。単体では公開しない。
pub struct MemoryTx {
    store:      MemoryStore,
    ops:        Vec<StagedOp>,
    // ドロップ（コミット後を含む）で解放される
    write_lock: Option<OwnedMutexGuard<()>>,
}

impl MemoryTx {
    fn new(store: MemoryStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
            write_lock: None,
        }
    }

    /// 書き込みロックを取得する（取得済みなら何もしない）
    async fn lock_for_update(&mut self) {
        if self.write_lock.is_none() {
            let lock = Arc::clone(&self.store.inner.write_lock);
            self.write_lock = Some(lock.lock_owned().await);
        }
    }

    fn stage(&mut self, op: StagedOp) {
        self.ops.push(op);
    }

    pub(crate) async fn commit(mut self) -> Result<(), InfraError> {
        self.store.ensure_available()?;
        if self.store.inner.fail_commits.load(Ordering::SeqCst) {
            return Err(InfraError::unavailable("commit rejected by in-memory store"));
        }

        let ops = std::mem::take(&mut self.ops);
        let mut rows = self.store.inner.rows.write().await;
        for op in ops {
            match op {
                StagedOp::Insert(todo) => {
                    rows.insert(todo.id(), todo);
                }
                StagedOp::Update(todo) => {
                    // 削除済みの行を復活させない
                    if let Some(row) = rows.get_mut(&todo.id()) {
                        *row = todo;
                    }
                }
                StagedOp::Delete(id) => {
                    rows.remove(&id);
                }
            }
        }
        Ok(())
    }
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if !self.ops.is_empty() {
            tracing::debug!(
                staged = self.ops.len(),
                "コミットされなかった変更を破棄しました"
            );
        }
    }
}

#[async_trait]
impl TransactionManager for MemoryStore {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        self.ensure_available()?;
        Ok(TxContext::memory(MemoryTx::new(self.clone())))
    }
}

#[async_trait]
impl ConnectionProbe for MemoryStore {
    async fn ping(&self) -> Result<(), InfraError> {
        self.ensure_available()
    }
}

// =============================================================================
// InMemoryTodoRepository
// =============================================================================

/// インメモリ実装の TodoRepository
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    store: MemoryStore,
}

impl InMemoryTodoRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(title = %new_todo.title()))]
    async fn insert(&self, tx: &mut TxContext, new_todo: &NewTodo) -> Result<Todo, InfraError> {
        self.store.ensure_available()?;
        let tx = tx.memory_tx()?;

        let todo = new_todo.clone().into_todo(self.store.allocate_id());
        tx.stage(StagedOp::Insert(todo.clone()));
        Ok(todo)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, InfraError> {
        self.store.ensure_available()?;
        Ok(self.store.inner.rows.read().await.get(&id).cloned())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id_for_update(
        &self,
        tx: &mut TxContext,
        id: TodoId,
    ) -> Result<Option<Todo>, InfraError> {
        self.store.ensure_available()?;
        let tx = tx.memory_tx()?;

        tx.lock_for_update().await;
        Ok(self.store.inner.rows.read().await.get(&id).cloned())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        self.store.ensure_available()?;
        // BTreeMap のキー順 = ID 昇順
        Ok(self.store.inner.rows.read().await.values().cloned().collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %todo.id()))]
    async fn update(&self, tx: &mut TxContext, todo: &Todo) -> Result<bool, InfraError> {
        self.store.ensure_available()?;
        let tx = tx.memory_tx()?;

        if !self.store.inner.rows.read().await.contains_key(&todo.id()) {
            return Ok(false);
        }
        tx.stage(StagedOp::Update(todo.clone()));
        Ok(true)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, tx: &mut TxContext, id: TodoId) -> Result<bool, InfraError> {
        self.store.ensure_available()?;
        let tx = tx.memory_tx()?;

        if !self.store.inner.rows.read().await.contains_key(&id) {
            return Ok(false);
        }
        tx.stage(StagedOp::Delete(id));
        Ok(true)
    }
}
