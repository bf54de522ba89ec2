//! # BERCERT4U 通知リレー
//!
//! BER 証明書マーケットプレイスのフロントエンドから通知要求を受け取り、
//! テンプレートからメールを生成して送信する HTTP サーバー。
//!
//! ## モジュール構成
//!
//! - `app_builder`: 送信バックエンドの初期化とルーター構築
//! - `config`: 環境変数からの設定読み込み
//! - `error`: エラーと HTTP レスポンスへの変換
//! - `handler`: HTTP ハンドラ
//! - `usecase`: 検証・レンダリング・送信

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
