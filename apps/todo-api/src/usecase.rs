//! # ユースケース層
//!
//! ハンドラから呼ばれ、ドメインモデルとリポジトリを組み合わせて処理を行う。

pub mod todo;

pub use todo::{CreateTodoInput, TodoUseCaseImpl, UpdateTodoInput};
