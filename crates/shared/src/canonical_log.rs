//! # Canonical Log Line ミドルウェア
//!
//! HTTP リクエスト完了時に、そのリクエストの要点（メソッド、パス、ステータス、
//! 所要時間）を 1 行に集約したサマリログを出力する tower Layer。
//!
//! ## TraceLayer との責務分離
//!
//! - TraceLayer: スパン作成（method, uri, request_id）
//! - CanonicalLogLineLayer: 完了サマリ。スパン内で出力するので request_id が付く
//!
//! ## 出力レベル
//!
//! | 結果 | レベル |
//! |------|--------|
//! | 2xx / 3xx / 4xx | INFO |
//! | 5xx（送信失敗など） | WARN |
//! | Service エラー | ERROR |
//!
//! ヘルスチェックと CORS プリフライト（`OPTIONS`）は出力しない。

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Method, Request, Response};
use tower::{Layer, Service};

fn is_skipped(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS || path.starts_with("/health")
}

/// ステータスコードの大分類
fn outcome(status: u16) -> &'static str {
    match status {
        500.. => "server_error",
        400..=499 => "client_error",
        _ => "success",
    }
}

/// Canonical Log Line を出力する Layer
///
/// ```text
/// TraceLayer → CanonicalLogLineLayer → handler
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

/// [`CanonicalLogLineLayer`] が生成する Service
#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // poll_ready 済みの inner を取り出し、代わりに clone を残す
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        if is_skipped(&method, &path) {
            return Box::pin(async move { inner.call(req).await });
        }

        let start = Instant::now();

        Box::pin(async move {
            let result = inner.call(req).await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::warn!(
                            log.r#type = "canonical",
                            http.method = %method,
                            http.path = %path,
                            http.status_code = status,
                            http.outcome = outcome(status),
                            http.latency_ms = latency_ms,
                            "リクエスト完了"
                        );
                    } else {
                        tracing::info!(
                            log.r#type = "canonical",
                            http.method = %method,
                            http.path = %path,
                            http.status_code = status,
                            http.outcome = outcome(status),
                            http.latency_ms = latency_ms,
                            "リクエスト完了"
                        );
                    }
                }
                Err(err) => {
                    tracing::error!(
                        log.r#type = "canonical",
                        http.method = %method,
                        http.path = %path,
                        http.latency_ms = latency_ms,
                        error.message = %err,
                        "リクエスト処理エラー"
                    );
                }
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        convert::Infallible,
        sync::{Arc, Mutex},
    };

    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    /// 固定ステータスを返す Service
    #[derive(Clone)]
    struct FixedStatus(StatusCode);

    impl Service<Request<()>> for FixedStatus {
        type Error = Infallible;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
        type Response = Response<()>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<()>) -> Self::Future {
            let status = self.0;
            Box::pin(async move { Ok(Response::builder().status(status).body(()).unwrap()) })
        }
    }

    #[derive(Clone)]
    struct Failing;

    impl Service<Request<()>> for Failing {
        type Error = String;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
        type Response = Response<()>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<()>) -> Self::Future {
            Box::pin(async { Err("connection reset".to_string()) })
        }
    }

    #[derive(Debug, Clone)]
    struct Captured {
        level:   tracing::Level,
        message: String,
        fields:  Vec<(String, String)>,
    }

    impl Captured {
        fn field(&self, name: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<Captured>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Capture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = Visitor::default();
            event.record(&mut visitor);
            self.0.lock().unwrap().push(Captured {
                level:   *event.metadata().level(),
                message: visitor.message,
                fields:  visitor.fields,
            });
        }
    }

    #[derive(Default)]
    struct Visitor {
        message: String,
        fields:  Vec<(String, String)>,
    }

    impl tracing::field::Visit for Visitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.push(field.name(), format!("{value:?}"));
        }

        fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
            self.push(field.name(), value.to_string());
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.push(field.name(), value.to_string());
        }
    }

    impl Visitor {
        fn push(&mut self, name: &str, value: String) {
            if name == "message" {
                self.message = value;
            } else {
                self.fields.push((name.to_string(), value));
            }
        }
    }

    /// 返り値の `DefaultGuard` はスコープに保持すること
    fn setup_capture() -> (tracing::subscriber::DefaultGuard, Capture) {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        (tracing::subscriber::set_default(subscriber), capture)
    }

    fn post(path: &str) -> Request<()> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(())
            .unwrap()
    }

    #[test]
    fn test_ヘルスチェックとプリフライトは対象外() {
        assert!(is_skipped(&Method::GET, "/health"));
        assert!(is_skipped(&Method::OPTIONS, "/send-emails"));
        assert!(!is_skipped(&Method::POST, "/send-emails"));
    }

    #[tokio::test]
    async fn test_成功リクエストでinfoレベルのサマリを出力する() {
        let (_guard, capture) = setup_capture();
        let mut sut = CanonicalLogLineLayer.layer(FixedStatus(StatusCode::OK));

        sut.call(post("/send-emails")).await.unwrap();

        let captured = capture.0.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].level, tracing::Level::INFO);
        assert_eq!(captured[0].message, "リクエスト完了");
        assert_eq!(captured[0].field("log.type"), Some("canonical"));
        assert_eq!(captured[0].field("http.method"), Some("POST"));
        assert_eq!(captured[0].field("http.path"), Some("/send-emails"));
        assert_eq!(captured[0].field("http.status_code"), Some("200"));
        assert_eq!(captured[0].field("http.outcome"), Some("success"));
        assert!(captured[0].field("http.latency_ms").is_some());
    }

    #[tokio::test]
    async fn test_400はinfoのままclient_errorとして記録する() {
        let (_guard, capture) = setup_capture();
        let mut sut = CanonicalLogLineLayer.layer(FixedStatus(StatusCode::BAD_REQUEST));

        sut.call(post("/send-signup-emails")).await.unwrap();

        let captured = capture.0.lock().unwrap();
        assert_eq!(captured[0].level, tracing::Level::INFO);
        assert_eq!(captured[0].field("http.outcome"), Some("client_error"));
    }

    #[tokio::test]
    async fn test_500はwarnレベルで出力する() {
        let (_guard, capture) = setup_capture();
        let mut sut =
            CanonicalLogLineLayer.layer(FixedStatus(StatusCode::INTERNAL_SERVER_ERROR));

        let response = sut.call(post("/send-request-email")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let captured = capture.0.lock().unwrap();
        assert_eq!(captured[0].level, tracing::Level::WARN);
        assert_eq!(captured[0].field("http.outcome"), Some("server_error"));
    }

    #[tokio::test]
    async fn test_healthではサマリを出力しない() {
        let (_guard, capture) = setup_capture();
        let mut sut = CanonicalLogLineLayer.layer(FixedStatus(StatusCode::OK));

        sut.call(Request::builder().uri("/health").body(()).unwrap())
            .await
            .unwrap();

        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_serviceエラー時はerrorレベルで出力する() {
        let (_guard, capture) = setup_capture();
        let mut sut = CanonicalLogLineLayer.layer(Failing);

        assert!(sut.call(post("/send-new-quote-email")).await.is_err());

        let captured = capture.0.lock().unwrap();
        assert_eq!(captured[0].level, tracing::Level::ERROR);
        assert_eq!(captured[0].message, "リクエスト処理エラー");
        assert_eq!(captured[0].field("error.message"), Some("connection reset"));
    }
}
