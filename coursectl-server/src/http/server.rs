//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Per-request timeout
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use coursectl_core::{RecordStore, Registrar};

use super::routes;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    pub bind_addr: SocketAddr,

    /// Upper bound on a single request (default: 30s)
    pub request_timeout: Duration,

    /// Allow any origin (default: false = localhost only)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            request_timeout: Duration::from_secs(30),
            cors_permissive: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registrar: Registrar,
    /// Which backend is serving records ("postgres", "memory")
    pub store_kind: &'static str,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, store_kind: &'static str) -> Self {
        Self {
            registrar: Registrar::new(store),
            store_kind,
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let port = config.bind_addr.port();
    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors_layer(config));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::students::router())
        .merge(routes::courses::router())
        .layer(middleware)
        .with_state(Arc::new(state))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), "postgres");
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(store = state.store_kind, "record store ready");
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use coursectl_core::{Course, MemoryStore, Student};
    use tower::ServiceExt;

    fn app() -> (Router, Registrar) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let state = AppState::new(Arc::new(MemoryStore::new()), "memory");
        let registrar = state.registrar.clone();
        (build_router(state, &ServerConfig::default()), registrar)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: &Router, uri: &str, body: &'static str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.cors_permissive);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn test_index_aliases() {
        let (app, _) = app();
        for uri in ["/student", "/student/", "/student/list", "/course", "/course/", "/course/list"] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_student_form_post_redirects() {
        let (app, registrar) = app();

        let response = post_form(
            &app,
            "/student/",
            "id=&name=Aysel&surname=Mammadova&major=Law&date_of_birth=2002-05-01",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/student/");

        let students = registrar.list_students().await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].surname, "Mammadova");

        let page = text(get(&app, "/student/").await).await;
        assert!(page.contains("Aysel"));
    }

    #[tokio::test]
    async fn test_course_form_ignores_counter() {
        let (app, registrar) = app();

        let response = post_form(
            &app,
            "/course/",
            "id=&course_name=Compilers&teacher_name=Aho&course_description=Parsing&credit=6&number_of_students=40",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/course/");

        let courses = registrar.list_courses().await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].credit, 6);
        assert_eq!(courses[0].number_of_students, 0);
    }

    #[tokio::test]
    async fn test_enroll_and_drop_flow() {
        let (app, registrar) = app();
        let sid = registrar
            .save_student(Student::new("Murad", "Hasanov", "Mathematics", None))
            .await
            .unwrap();
        let cid = registrar
            .save_course(Course::new("Topology", "Hausdorff", "Open sets", 5))
            .await
            .unwrap();

        let enroll_uri = format!("/course/takeCourse/{sid}/selectedCourse/{cid}");

        let response = get(&app, &enroll_uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/course/takeCourse/{sid}"));

        let response = get(&app, &enroll_uri).await;
        assert_eq!(location(&response), format!("/student/info/{sid}"));
        assert_eq!(registrar.get_course(cid).await.unwrap().number_of_students, 1);

        let page = text(get(&app, &format!("/student/info/{sid}")).await).await;
        assert!(page.contains("Topology"));
        assert!(page.contains(&format!("/student/drop/{sid}/course/{cid}")));

        let response = get(&app, &format!("/student/drop/{sid}/course/{cid}")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/student/info/{sid}"));
        assert_eq!(registrar.get_course(cid).await.unwrap().number_of_students, 0);
        assert!(registrar.get_student(sid).await.unwrap().courses.is_empty());
    }

    #[tokio::test]
    async fn test_missing_and_malformed_ids() {
        let (app, _) = app();

        let response = get(&app, "/student/info/99").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(text(response).await.contains("student &#39;99&#39; not found"));

        assert_eq!(get(&app, "/course/99").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get(&app, "/course/takeCourse/1/selectedCourse/2").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get(&app, "/student/info/abc").await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sort_links_alternate() {
        let (app, registrar) = app();
        for name in ["Zeynab", "Aysel", "Leyla"] {
            registrar
                .save_student(Student::new(name, "Test", "Law", None))
                .await
                .unwrap();
        }

        let asc = text(get(&app, "/student/sort/name").await).await;
        assert!(asc.contains("/student/sort/name?dir=desc"));
        assert!(asc.find("Aysel").unwrap() < asc.find("Leyla").unwrap());
        assert!(asc.find("Leyla").unwrap() < asc.find("Zeynab").unwrap());

        let desc = text(get(&app, "/student/sort/name?dir=desc").await).await;
        assert!(desc.contains("/student/sort/name?dir=asc"));
        assert!(desc.find("Zeynab").unwrap() < desc.find("Aysel").unwrap());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (app, registrar) = app();
        registrar
            .save_course(Course::new("Linear Algebra", "Strang", "Matrices", 6))
            .await
            .unwrap();
        registrar
            .save_course(Course::new("Ethics", "Kant", "Duty", 3))
            .await
            .unwrap();

        let page = text(get(&app, "/course/search?name=ALGEB").await).await;
        assert!(page.contains("Linear Algebra"));
        assert!(!page.contains("Ethics"));

        let page = text(get(&app, "/course/search?name=").await).await;
        assert!(page.contains("Linear Algebra"));
        assert!(page.contains("Ethics"));
    }

    #[tokio::test]
    async fn test_student_search_by_surname_and_major() {
        let (app, registrar) = app();
        registrar
            .save_student(Student::new("Nigar", "Aliyeva", "Law", None))
            .await
            .unwrap();
        registrar
            .save_student(Student::new("Rauf", "Mammadov", "Physics", None))
            .await
            .unwrap();

        let page = text(get(&app, "/student/search?surname=MAMMA").await).await;
        assert!(page.contains("Rauf"));
        assert!(!page.contains("Nigar"));

        let page = text(get(&app, "/student/search?major=Law").await).await;
        assert!(page.contains("Nigar"));
        assert!(!page.contains("Rauf"));
    }

    #[tokio::test]
    async fn test_delete_course_detaches_students() {
        let (app, registrar) = app();
        let a = registrar
            .save_student(Student::new("Ali", "Aliyev", "Finance", None))
            .await
            .unwrap();
        let b = registrar
            .save_student(Student::new("Nigar", "Karimova", "Finance", None))
            .await
            .unwrap();
        let cid = registrar
            .save_course(Course::new("Accounting", "Pacioli", "Ledgers", 4))
            .await
            .unwrap();
        registrar.enroll(a, cid).await.unwrap();
        registrar.enroll(b, cid).await.unwrap();

        let response = get(&app, &format!("/course/delete/{cid}")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/course/");

        assert!(registrar.list_courses().await.unwrap().is_empty());
        assert!(registrar.get_student(a).await.unwrap().courses.is_empty());
        assert!(registrar.get_student(b).await.unwrap().courses.is_empty());
    }
}
