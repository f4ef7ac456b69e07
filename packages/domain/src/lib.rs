//! # Todo API ドメイン層
//!
//! Todo 管理のビジネスルールを表現するクレート。
//! I/O を持たず、永続化や HTTP の詳細には依存しない。
//!
//! ## モジュール構成
//!
//! - [`todo`]: Todo エンティティと値オブジェクト
//! - [`clock`]: 時刻プロバイダ（テストで固定時刻を注入するため）
//! - [`error`]: ドメイン層のエラー型

pub mod clock;
pub mod error;
pub mod todo;

pub use error::DomainError;
