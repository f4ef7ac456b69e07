//! # 時刻プロバイダ
//!
//! Todo の `created_at` / `updated_at` に使う現在時刻の取得元。
//! ユースケースは [`Clock`] 経由で時刻を受け取り、精度の切り捨てと
//! `updated_at` の単調増加はドメインモデル側（[`crate::todo`]）が担う。

use chrono::{DateTime, Utc};

/// 現在時刻の取得元
pub trait Clock: Send + Sync {
   fn now(&self) -> DateTime<Utc>;
}

/// OS の時計（本番・開発用）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> DateTime<Utc> {
      Utc::now()
   }
}

/// 常に同じ時刻を返す時計
///
/// 同一時刻での作成・更新でもタイムスタンプが前進することをテストで確かめるのに使う。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
   pub fn new(now: DateTime<Utc>) -> Self {
      Self(now)
   }
}

impl Clock for FixedClock {
   fn now(&self) -> DateTime<Utc> {
      self.0
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_fixed_clockは渡した時刻を返し続ける() {
      let at = DateTime::from_timestamp(1_700_000_000, 500).unwrap();
      let clock: &dyn Clock = &FixedClock::new(at);

      assert_eq!(clock.now(), at);
      assert_eq!(clock.now(), clock.now());
   }

   #[test]
   fn test_system_clockはトレイトオブジェクトとして現在時刻を返す() {
      let clock: Box<dyn Clock> = Box::new(SystemClock);
      let before = Utc::now();

      let now = clock.now();

      assert!(now >= before);
   }
}
