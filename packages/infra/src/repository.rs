//! # リポジトリ実装
//!
//! Todo の永続化を担当するトレイトと PostgreSQL 実装を提供する。
//! インメモリ実装は [`crate::memory`] にある。

pub mod todo_repository;

pub use todo_repository::{PostgresTodoRepository, TodoRepository};
