//! Static assets and the root page.
//!
//! File serving is `tower_http::services::ServeDir`. In SPA mode unknown
//! paths fall back to `index.html` with a 200.

use std::convert::Infallible;
use std::path::PathBuf;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::{AssetsConfig, AssetsMode};

/// Static asset settings resolved at startup.
#[derive(Debug, Clone)]
pub struct Assets {
    root: PathBuf,
    mode: AssetsMode,
    greeting: String,
}

impl Assets {
    pub fn from_config(config: &AssetsConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            mode: config.mode,
            greeting: config.greeting.clone(),
        }
    }

    /// `GET /`: greeting text, or the SPA entry point.
    pub async fn root(&self, request: Request<Body>) -> Response {
        match self.mode {
            AssetsMode::Greeting => self.greeting.clone().into_response(),
            AssetsMode::Spa => self.serve(request).await,
        }
    }

    /// Serve a file from the asset root.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        match self.mode {
            AssetsMode::Greeting => into_response(ServeDir::new(&self.root).oneshot(request).await),
            AssetsMode::Spa => {
                let index = ServeFile::new(self.root.join("index.html"));
                into_response(ServeDir::new(&self.root).fallback(index).oneshot(request).await)
            }
        }
    }
}

fn into_response<B>(result: Result<Response<B>, Infallible>) -> Response
where
    B: axum::body::HttpBody<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    match result {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>vote</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        dir
    }

    fn assets(dir: &tempfile::TempDir, mode: AssetsMode) -> Assets {
        Assets::from_config(&AssetsConfig {
            root: dir.path().to_string_lossy().into_owned(),
            mode,
            greeting: "hello".into(),
        })
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn greeting_mode_root_returns_greeting() {
        let dir = site();
        let response = assets(&dir, AssetsMode::Greeting).root(get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "hello");
    }

    #[tokio::test]
    async fn spa_mode_root_returns_index() {
        let dir = site();
        let response = assets(&dir, AssetsMode::Spa).root(get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "<h1>vote</h1>");
    }

    #[tokio::test]
    async fn serves_existing_files() {
        let dir = site();
        let response = assets(&dir, AssetsMode::Greeting).serve(get("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn unknown_path_depends_on_mode() {
        let dir = site();
        let missing = assets(&dir, AssetsMode::Greeting).serve(get("/results/42")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let fallback = assets(&dir, AssetsMode::Spa).serve(get("/results/42")).await;
        assert_eq!(fallback.status(), StatusCode::OK);
        assert_eq!(text(fallback).await, "<h1>vote</h1>");
    }
}
