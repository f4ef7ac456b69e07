//! # Todo API インフラ層
//!
//! 永続化ストアへのアクセスを担当するクレート。
//!
//! ## モジュール構成
//!
//! - [`db`]: PostgreSQL 接続プール、マイグレーション、トランザクション管理
//! - [`memory`]: テストモード用のインメモリストア
//! - [`repository`]: Todo リポジトリのトレイトと PostgreSQL 実装
//! - [`error`]: インフラ層のエラー型
//!
//! ## ストアの切り替え
//!
//! アプリケーション層はトレイト（[`repository::TodoRepository`],
//! [`db::TransactionManager`], [`db::ConnectionProbe`]）のみに依存し、
//! 起動時の設定で PostgreSQL とインメモリのどちらを使うかを決める。

pub mod db;
pub mod error;
pub mod memory;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
