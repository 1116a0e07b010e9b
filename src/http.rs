use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapter::DistanceEstimator;
use crate::error::{DistanceError, ErrorKind};
use crate::render::render_page;
use crate::shell::Shell;
use crate::validation::validate_query;

#[derive(Clone)]
pub struct AppState {
    pub shell: Shell,
    pub estimator: Arc<dyn DistanceEstimator>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceForm {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorKind,
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/api/distance", post(api_distance))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn show_form(State(app): State<AppState>) -> Html<String> {
    Html(render_page(&app.shell.fresh_state().await))
}

// Each request renders its own state; clients never see each other's forms
async fn submit_form(State(app): State<AppState>, Form(form): Form<DistanceForm>) -> Html<String> {
    let (state, outcome) = app.shell.submit_detached(form.origin, form.destination).await;
    tracing::debug!("Form submission finished: {:?}", outcome);
    Html(render_page(&state))
}

/// JSON entry point; bypasses the shared form state but uses its coordinate.
async fn api_distance(State(app): State<AppState>, Json(body): Json<DistanceForm>) -> Response {
    let query = match validate_query(&body.origin, &body.destination) {
        Ok(q) => q,
        Err(e) => return error_response(e),
    };
    let coordinate = app.shell.coordinate().await;
    match app.estimator.compute_distance(&query, coordinate).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: DistanceError) -> Response {
    let status = match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound | ErrorKind::Request => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorBody {
            error: err.kind(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NOT_FOUND_MESSAGE, Result, VALIDATION_MESSAGE};
    use crate::models::{CalculationResult, DeviceCoordinate, GroundingSource, LocationQuery};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct MockEstimator {
        calls: AtomicUsize,
        outcome: Result<CalculationResult>,
    }

    #[async_trait]
    impl DistanceEstimator for MockEstimator {
        async fn compute_distance(
            &self,
            _query: &LocationQuery,
            _coordinate: DeviceCoordinate,
        ) -> Result<CalculationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn app(outcome: Result<CalculationResult>) -> (Router, Arc<MockEstimator>) {
        let estimator = Arc::new(MockEstimator {
            calls: AtomicUsize::new(0),
            outcome,
        });
        let state = AppState {
            shell: Shell::new(estimator.clone()),
            estimator: estimator.clone(),
        };
        (router(state), estimator)
    }

    fn curitiba_answer() -> CalculationResult {
        CalculationResult {
            text: "~300 km, ~4h by car via BR-101".to_string(),
            sources: vec![GroundingSource {
                title: Some("Florianópolis, SC".to_string()),
                uri: "https://maps.google.com/?cid=42".to_string(),
            }],
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/distance")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_form_submission_renders_text_and_link() {
        let (router, estimator) = app(Ok(curitiba_answer()));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "origin=Curitiba%2C+PR&destination=Florian%C3%B3polis%2C+SC",
            ))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_string(response).await;
        assert!(page.contains("~300 km, ~4h by car via BR-101"));
        assert!(page.contains(r#"href="https://maps.google.com/?cid=42""#));
        assert!(page.contains(r#"value="Florianópolis, SC""#));
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_form_with_blank_field_shows_validation_message() {
        let (router, estimator) = app(Ok(curitiba_answer()));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("origin=+++&destination=X"))
            .unwrap();

        let page = body_string(router.oneshot(request).await.unwrap()).await;
        assert!(page.contains(VALIDATION_MESSAGE));
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_success() {
        let (router, _) = app(Ok(curitiba_answer()));
        let response = router
            .oneshot(json_request(json!({
                "origin": "Curitiba, PR",
                "destination": "Florianópolis, SC"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            body,
            json!({
                "text": "~300 km, ~4h by car via BR-101",
                "sources": [{"title": "Florianópolis, SC", "uri": "https://maps.google.com/?cid=42"}]
            })
        );
    }

    #[tokio::test]
    async fn test_api_validation_error() {
        let (router, estimator) = app(Ok(curitiba_answer()));
        let response = router
            .oneshot(json_request(json!({"origin": "", "destination": "X"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "validation");
        assert_eq!(body["message"], VALIDATION_MESSAGE);
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_upstream_error() {
        let (router, _) = app(Err(DistanceError::NotFound));
        let response = router
            .oneshot(json_request(json!({"origin": "A", "destination": "B"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], NOT_FOUND_MESSAGE);
    }

    // Answers with the origin it was asked about; the first call waits for the gate
    struct GatedEchoEstimator {
        gate: tokio::sync::Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DistanceEstimator for GatedEchoEstimator {
        async fn compute_distance(
            &self,
            query: &LocationQuery,
            _coordinate: DeviceCoordinate,
        ) -> Result<CalculationResult> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
            }
            Ok(CalculationResult {
                text: format!("Rota a partir de {}", query.origin),
                sources: Vec::new(),
            })
        }
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_overlapping_form_posts_each_render_their_own_answer() {
        let estimator = Arc::new(GatedEchoEstimator {
            gate: tokio::sync::Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let router = router(AppState {
            shell: Shell::new(estimator.clone()),
            estimator: estimator.clone(),
        });

        let slow = tokio::spawn(
            router
                .clone()
                .oneshot(form_request("origin=Porto+Alegre&destination=Gramado")),
        );
        while estimator.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fast = router
            .clone()
            .oneshot(form_request("origin=Recife&destination=Natal"))
            .await
            .unwrap();
        let fast_page = body_string(fast).await;

        estimator.gate.notify_one();
        let slow_page = body_string(slow.await.unwrap().unwrap()).await;

        assert!(fast_page.contains("Rota a partir de Recife"));
        assert!(fast_page.contains(r#"value="Natal""#));
        assert!(!fast_page.contains("Porto Alegre"));

        assert!(slow_page.contains("Rota a partir de Porto Alegre"));
        assert!(slow_page.contains(r#"value="Gramado""#));
        assert!(!slow_page.contains("Recife"));

        let fresh = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let fresh_page = body_string(fresh).await;
        assert!(!fresh_page.contains("Recife"));
        assert!(!fresh_page.contains("Porto Alegre"));
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(Ok(curitiba_answer()));
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "ok");
    }
}
