//! # ハンドラ
//!
//! HTTP リクエストを受け取り、ユースケースを呼び出してエンベロープを返す。

pub mod health;
pub mod root;
pub mod todo;

pub use health::{HealthState, health_check};
pub use root::service_info;
pub use todo::{TodoState, create_todo, delete_todo, get_todo, list_todos, update_todo};
