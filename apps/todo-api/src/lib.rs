//! # Todo API
//!
//! Todo リストを管理する HTTP/JSON API サーバー。
//!
//! ## モジュール構成
//!
//! - [`config`]: 環境変数からの設定読み込み
//! - [`app_builder`]: 依存の組み立てとルーター構築
//! - [`handler`]: HTTP ハンドラ
//! - [`usecase`]: ユースケース（トランザクション境界）
//! - [`error`]: エラーとエラーエンベロープへの変換
//! - [`extract`]: エラーエンベロープを返すエクストラクタ

pub mod app_builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod usecase;
