//! # BERCERT4U 通知リレーサーバー
//!
//! フロントエンドからの通知要求（予約確定、アカウント登録、依頼受付、見積到着）を
//! メールに変換して送信する。
//!
//! ```text
//! ┌──────────────┐  POST /send-*  ┌──────────────┐  SMTP / SES  ┌──────────────┐
//! │ Frontend     │───────────────▶│   Notifier   │─────────────▶│ Mail relay   │
//! └──────────────┘                └──────────────┘              └──────────────┘
//! ```
//!
//! 環境変数は [`config`](bercert_notifier::config) を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（送信せずログ出力のみ）
//! NOTIFICATION_BACKEND=noop EMAIL_USER=dev@example.com cargo run -p bercert-notifier
//!
//! # 本番環境
//! EMAIL_USER=... EMAIL_PASS=... LOG_FORMAT=json cargo run -p bercert-notifier --release
//! ```

use std::net::SocketAddr;

use anyhow::Context as _;
use bercert_notifier::{
    app_builder::{build_router, build_sender, build_service},
    config::NotifierConfig,
};
use bercert_shared::observability::TracingConfig;
use tokio::net::TcpListener;

/// 通知リレーサーバーのエントリーポイント
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. 設定の読み込み
/// 4. 送信バックエンド・テンプレートの初期化
/// 5. HTTP サーバーの起動（SIGTERM / Ctrl-C で graceful shutdown）
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("notifier");
    bercert_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "notifier").entered();

    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "通知リレーサーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let sender = build_sender(&config.notification)
        .await
        .context("送信バックエンドの初期化に失敗しました")?;
    let service = build_service(&config.notification, sender)
        .context("テンプレートの初期化に失敗しました")?;
    let app = build_router(service);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("通知リレーサーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("通知リレーサーバーを停止しました");
    Ok(())
}

/// Ctrl-C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C ハンドラの登録に失敗");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM ハンドラの登録に失敗");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
