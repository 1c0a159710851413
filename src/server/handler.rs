// src/server/handler.rs
use crate::config::Settings;
use crate::probe;
use crate::report;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::info;

/// Serves the diagnostics page. Every `GET /` takes a fresh probe snapshot;
/// nothing is cached between requests.
#[derive(Clone)]
pub struct ReportHandler {
    settings: Arc<Settings>,
}

impl ReportHandler {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    async fn handle(settings: Arc<Settings>, req: Request<Body>) -> Response<Body> {
        if req.method() != Method::GET || req.uri().path() != "/" {
            return Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::from("Not Found"))
                .unwrap_or_default();
        }

        info!("rendering diagnostics report");
        let snapshot = probe::run_probes(&settings).await;
        let page = report::render(&snapshot, &settings);

        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(Body::from(page))
            .unwrap_or_default()
    }
}

impl Service<Request<Body>> for ReportHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let settings = self.settings.clone();
        Box::pin(async move { Ok(Self::handle(settings, req).await) })
    }
}
