//! # 一覧レスポンス
//!
//! 件数付きのリスト形式 API レスポンス型。

use serde::{Deserialize, Serialize};

/// 一覧レスポンス
///
/// `ApiResponse<T>` が単一データ用であるのに対し、
/// `ListResponse<T>` は全件リスト + 件数の形式。
///
/// ## JSON 形式
///
/// ```json
/// {
///   "success": true,
///   "count": 2,
///   "data": [...]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
   pub success: bool,
   pub count:   usize,
   pub data:    Vec<T>,
}

impl<T> ListResponse<T> {
   /// `count` は常に `data` の要素数と一致する
   pub fn new(data: Vec<T>) -> Self {
      Self {
         success: true,
         count: data.len(),
         data,
      }
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_空リストでcountが0になる() {
      let response: ListResponse<String> = ListResponse::new(vec![]);
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(
         json,
         serde_json::json!({ "success": true, "count": 0, "data": [] })
      );
   }

   #[test]
   fn test_countが要素数と一致する() {
      let response = ListResponse::new(vec!["a", "b", "c"]);

      assert_eq!(response.count, 3);
      assert_eq!(response.data.len(), 3);
   }
}
