//! # 見積金額
//!
//! 見積金額（ユーロ建て）と予約手数料の計算を定義する。
//!
//! ## 設計方針
//!
//! - **f64 の Newtype**: 呼び出し元は JSON の数値をそのまま送ってくるため、
//!   小数を含む金額も受け付ける
//! - **表示形式**: `300.0` は `300`、`250.5` は `250.5` と表示する
//!   （既存の受信者が見慣れた表記を維持する）。絶対値が `1e21` 以上または
//!   `1e-6` 未満の値は `1e+21` / `1.5e-7` のような指数表記になる
//! - **下限チェックなし**: 手数料を差し引いた残額は負になりうる。
//!   `15` の見積は残額 `-5` として表示され、リクエストは拒否しない

use derive_more::Display;
use serde::{Deserialize, Deserializer, de};

/// 予約手数料（ユーロ）
///
/// プラットフォームが受け取る固定額。残りは作業完了時に事業者へ直接支払われる。
pub const BOOKING_FEE: f64 = 20.0;

/// 見積金額（値オブジェクト）
///
/// # 不変条件
///
/// - 有限の値である（NaN / 無限大は不可）
///
/// # デシリアライズ
///
/// JSON の数値と、数値として解釈できる文字列（`"300"`）の両方を受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{}", format_amount(*_0))]
pub struct QuoteAmount(f64);

impl QuoteAmount {
    /// 金額を作成する
    ///
    /// 有限でない値の場合は `None` を返す。
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// 内部の値を取得する
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// 予約手数料を差し引いた残額
    ///
    /// 事業者に直接支払われる金額。負の値もそのまま返す。
    pub fn balance_after_fee(&self) -> Self {
        Self(self.0 - BOOKING_FEE)
    }
}

/// 金額の表示形式
///
/// 通常は最短の十進表記、極端に大きい・小さい値は符号付き指数の指数表記。
/// `-0` は `0` と表示する。
fn format_amount(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exponential = format!("{value:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for QuoteAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) => n,
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid quote amount: {s:?}")))?,
        };

        Self::new(value).ok_or_else(|| de::Error::custom("quote amount must be a finite number"))
    }
}
