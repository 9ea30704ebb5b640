//! Portal API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Bearer token resolver → 2. Access logger
//!
//! `/health`, `/login` and `/register` sit outside the stack.

use std::path::PathBuf;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the portal API router over the store at `db_path`.
pub fn portal_router(db_path: impl Into<PathBuf>) -> Router {
    build_router(ApiContext::new(db_path))
}

fn build_router(ctx: ApiContext) -> Router {
    // Middleware uses `Extension<ApiContext>`; handlers use `State<ApiContext>`.
    // Extension must be outermost so the token resolver can reach it.
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/logout", post(endpoints::auth::logout))
        .route("/users", get(endpoints::users::list))
        .route("/users/doctors", post(endpoints::users::add_doctor))
        .route("/users/:email", delete(endpoints::users::remove))
        .route("/doctors", get(endpoints::users::doctors))
        .route(
            "/requests",
            get(endpoints::requests::list).post(endpoints::requests::create),
        )
        .route("/requests/pending", get(endpoints::requests::pending))
        .route("/requests/assign", post(endpoints::requests::assign))
        .route("/requests/:id/status", post(endpoints::requests::set_status))
        .route("/requests/:id/chat", get(endpoints::requests::open_chat))
        .route(
            "/requests/:id/messages",
            get(endpoints::messages::list).post(endpoints::messages::post),
        )
        .route("/submissions", get(endpoints::symptoms::submissions))
        .route("/symptoms/check", post(endpoints::symptoms::check))
        .route(
            "/feedback",
            get(endpoints::feedback::list).post(endpoints::feedback::submit),
        )
        .route("/notifications", get(endpoints::notifications::inbox))
        .route(
            "/notifications/read-all",
            post(endpoints::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id/read",
            post(endpoints::notifications::mark_read),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/login", post(endpoints::auth::login))
        .route("/register", post(endpoints::auth::register))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::accounts;
    use crate::config::SeedCredentials;
    use crate::db;
    use crate::models::enums::UserRole;

    const ADMIN: &str = "admin@app.com";
    const DOCTOR: &str = "doctor@app.com";
    const PATIENT: &str = "p@x.com";

    /// Seeded store in a temp directory with a signed-in token per role.
    /// Keep the store alive for the whole test.
    struct TestStore {
        path: PathBuf,
        admin: String,
        doctor: String,
        patient: String,
        _tmp: tempfile::TempDir,
    }

    fn test_store() -> TestStore {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("carelink.db");
        let conn = db::open_database(&path).unwrap();
        accounts::seed_defaults(&conn, &SeedCredentials::default()).unwrap();
        accounts::register_patient(&conn, PATIENT, "Arshad", "patient", Some("5551239012"))
            .unwrap();

        let token = |email: &str, password: &str, role| {
            accounts::login(&conn, email, password, role).unwrap().token
        };
        TestStore {
            admin: token(ADMIN, "admin", UserRole::Admin),
            doctor: token(DOCTOR, "doctor", UserRole::Doctor),
            patient: token(PATIENT, "patient", UserRole::Patient),
            path,
            _tmp: tmp,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(path: &PathBuf, req: Request<Body>) -> (StatusCode, Value) {
        let response = portal_router(path.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let store = test_store();
        let (status, body) = send(&store.path, request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["users"], 3);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let store = test_store();
        let (status, body) =
            send(&store.path, request("GET", "/api/notifications", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

        let (status, _) = send(
            &store.path,
            request("GET", "/api/notifications", Some("not-a-real-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn claimed_identity_without_credentials_is_rejected() {
        let store = test_store();

        let forged = Request::builder()
            .method("GET")
            .uri("/api/users")
            .header("X-User-Email", ADMIN)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&store.path, forged).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&store.path, request("GET", "/api/users", Some(ADMIN), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let no_scheme = Request::builder()
            .method("GET")
            .uri("/api/users")
            .header("Authorization", store.admin.as_str())
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&store.path, no_scheme).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // A patient's valid token never grants admin rights.
        let (status, _) =
            send(&store.path, request("GET", "/api/users", Some(&store.patient), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn login_checks_password_and_role() {
        let store = test_store();
        let ok = json!({ "email": PATIENT, "password": "patient", "role": "patient" });
        let (status, body) = send(&store.path, request("POST", "/api/login", None, Some(ok))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Arshad");
        assert_eq!(body["role"], "patient");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, _) =
            send(&store.path, request("GET", "/api/notifications", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);

        for bad in [
            json!({ "email": PATIENT, "password": "patient", "role": "doctor" }),
            json!({ "email": PATIENT, "password": "wrong", "role": "patient" }),
            json!({ "email": ADMIN, "password": "", "role": "admin" }),
            json!({ "email": "ghost@x.com", "password": "patient", "role": "patient" }),
        ] {
            let (status, body) =
                send(&store.path, request("POST", "/api/login", None, Some(bad))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.get("token").is_none());
        }
    }

    #[tokio::test]
    async fn register_then_sign_in() {
        let store = test_store();
        let body = json!({
            "email": "new@x.com",
            "name": "New Patient",
            "password": "pw",
            "mobile": "5550001111"
        });
        let (status, user) =
            send(&store.path, request("POST", "/api/register", None, Some(body.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "patient");
        assert!(user.get("password").is_none());

        let (status, _) =
            send(&store.path, request("POST", "/api/register", None, Some(body))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let bad_mobile = json!({
            "email": "other@x.com",
            "name": "Other",
            "password": "pw",
            "mobile": "12ab"
        });
        let (status, _) =
            send(&store.path, request("POST", "/api/register", None, Some(bad_mobile))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let login = json!({ "email": "new@x.com", "password": "pw", "role": "patient" });
        let (status, _) = send(&store.path, request("POST", "/api/login", None, Some(login))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let store = test_store();
        let (status, body) =
            send(&store.path, request("POST", "/api/logout", Some(&store.patient), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ended"], true);

        let (status, _) =
            send(&store.path, request("GET", "/api/notifications", Some(&store.patient), None))
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Other sessions are untouched.
        let (status, _) =
            send(&store.path, request("GET", "/api/notifications", Some(&store.doctor), None))
                .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_reject_other_roles() {
        let store = test_store();
        let (status, _) =
            send(&store.path, request("GET", "/api/users", Some(&store.patient), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&store.path, request("GET", "/api/users", Some(&store.admin), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn doctor_management() {
        let store = test_store();
        let admin = Some(store.admin.as_str());
        let doctor = json!({
            "doc_id": "102",
            "name": "Dr. Sadab",
            "email": "sadab@app.com",
            "specialty": "Neurology",
            "qualification": "MBBS",
            "mobile": "5550100100",
            "password": "neuro"
        });
        let (status, created) = send(
            &store.path,
            request("POST", "/api/users/doctors", admin, Some(doctor.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.get("password").is_none());

        let (status, body) =
            send(&store.path, request("POST", "/api/users/doctors", admin, Some(doctor))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let login = json!({ "email": "sadab@app.com", "password": "neuro", "role": "doctor" });
        let (status, _) = send(&store.path, request("POST", "/api/login", None, Some(login))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &store.path,
            request("GET", "/api/doctors?specialty=Neurology", Some(&store.patient), None),
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(
            &store.path,
            request("DELETE", "/api/users/sadab@app.com", admin, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Dr. Sadab");

        let (status, _) = send(
            &store.path,
            request("DELETE", "/api/users/sadab@app.com", admin, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chat_lifecycle_over_http() {
        let store = test_store();
        let path = &store.path;
        let patient = Some(store.patient.as_str());
        let doctor = Some(store.doctor.as_str());

        let mismatched = json!({
            "doctor_email": DOCTOR,
            "specialty": "Neurology",
            "query": "Headaches."
        });
        let (status, _) =
            send(path, request("POST", "/api/requests", patient, Some(mismatched))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let create = json!({
            "doctor_email": DOCTOR,
            "specialty": "Cardiology",
            "query": "Chest pain during exercise."
        });
        let (status, body) = send(path, request("POST", "/api/requests", patient, Some(create))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "Pending");
        let id = body["request_id"].as_i64().unwrap();
        assert_eq!(id, 10001);

        let (status, waiting) = send(path, request("GET", "/api/requests/pending", doctor, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(waiting[0]["request_id"], id);
        let (status, _) = send(path, request("GET", "/api/requests/pending", patient, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Only the assigned doctor may accept.
        let accept = json!({ "status": "Accepted" });
        let uri = format!("/api/requests/{id}/status");
        let (status, _) = send(path, request("POST", &uri, patient, Some(accept.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(path, request("POST", &uri, doctor, Some(accept.clone()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Accepted");
        let (status, body) = send(path, request("POST", &uri, doctor, Some(accept))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ILLEGAL_TRANSITION");

        let (_, waiting) = send(path, request("GET", "/api/requests/pending", doctor, None)).await;
        assert!(waiting.as_array().unwrap().is_empty());

        let messages = format!("/api/requests/{id}/messages");
        let (status, body) = send(
            path,
            request("POST", &messages, patient, Some(json!({ "text": "Hello doctor" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["sender"], "Arshad");
        assert_eq!(body["role"], "patient");

        let (_, inbox) = send(path, request("GET", "/api/notifications", doctor, None)).await;
        assert_eq!(inbox["unread"], 2);

        let (status, session) = send(
            path,
            request("GET", &format!("/api/requests/{id}/chat"), doctor, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["messages"].as_array().unwrap().len(), 1);
        let (_, inbox) = send(path, request("GET", "/api/notifications", doctor, None)).await;
        assert_eq!(inbox["unread"], 0);

        let close = json!({ "status": "Closed" });
        let (status, _) = send(path, request("POST", &uri, doctor, Some(close))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            path,
            request("POST", &messages, patient, Some(json!({ "text": "Still there?" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (_, history) = send(path, request("GET", &messages, patient, None)).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn request_listing_is_scoped_to_caller() {
        let store = test_store();
        let conn = db::open_database(&store.path).unwrap();
        accounts::register_patient(&conn, "other@x.com", "Other", "pw", None).unwrap();
        let admin = accounts::authenticate(&conn, &store.admin).unwrap();
        crate::requests::assign_chat(&conn, &admin, PATIENT, DOCTOR).unwrap();
        crate::requests::assign_chat(&conn, &admin, "other@x.com", DOCTOR).unwrap();

        let (_, mine) =
            send(&store.path, request("GET", "/api/requests", Some(&store.patient), None)).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let (_, all) =
            send(&store.path, request("GET", "/api/requests", Some(&store.doctor), None)).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, filtered) = send(
            &store.path,
            request("GET", "/api/requests?status=Pending", Some(&store.admin), None),
        )
        .await;
        assert!(filtered.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_assign_over_http() {
        let store = test_store();
        let body = json!({ "patient_email": PATIENT, "doctor_email": DOCTOR });
        let (status, _) = send(
            &store.path,
            request("POST", "/api/requests/assign", Some(&store.patient), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = send(
            &store.path,
            request("POST", "/api/requests/assign", Some(&store.admin), Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "Accepted");
    }

    #[tokio::test]
    async fn symptom_check_and_submissions() {
        let store = test_store();
        let (status, body) = send(
            &store.path,
            request(
                "POST",
                "/api/symptoms/check",
                Some(&store.patient),
                Some(json!({ "symptoms": "Knee pain after a fall" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Consult Orthopedics");

        let (status, _) = send(
            &store.path,
            request(
                "POST",
                "/api/symptoms/check",
                Some(&store.doctor),
                Some(json!({ "symptoms": "x" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, log) =
            send(&store.path, request("GET", "/api/submissions", Some(&store.admin), None)).await;
        assert_eq!(log.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn feedback_round() {
        let store = test_store();
        let (status, _) = send(
            &store.path,
            request(
                "POST",
                "/api/feedback",
                Some(&store.patient),
                Some(json!({ "feedback": "Helpful" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) =
            send(&store.path, request("GET", "/api/feedback", Some(&store.patient), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, all) =
            send(&store.path, request("GET", "/api/feedback", Some(&store.admin), None)).await;
        assert_eq!(all[0]["user_email"], PATIENT);
    }

    #[tokio::test]
    async fn notification_read_marking_is_owner_only() {
        let store = test_store();
        let conn = db::open_database(&store.path).unwrap();
        let n = crate::notifications::notify(&conn, PATIENT, "Hello", None).unwrap();
        crate::notifications::notify(&conn, PATIENT, "Again", None).unwrap();

        let uri = format!("/api/notifications/{}/read", n.id);
        let (status, _) = send(&store.path, request("POST", &uri, Some(&store.doctor), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) =
            send(&store.path, request("POST", &uri, Some(&store.patient), None)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &store.path,
            request("POST", "/api/notifications/read-all", Some(&store.patient), None),
        )
        .await;
        assert_eq!(body["updated"], 1);
    }
}
