mod support;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use roster::{
    gateway::{GatewayState, router},
    rpc,
};
use serde_json::Value;
use support::test_db;
use tokio::{net::TcpListener, sync::oneshot};
use tonic::transport::Endpoint;
use tower::ServiceExt;

/// Port 9 (discard) is never served in CI, so every RPC fails at the transport level.
fn unreachable_gateway() -> Router {
    router(GatewayState::connect_lazy("http://127.0.0.1:9").unwrap())
}

async fn send(app: Router, method: Method, uri: &str, form: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn transport_failure_is_500() {
    let (status, body) = send(unreachable_gateway(), Method::GET, "/student/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, _) = send(unreachable_gateway(), Method::GET, "/teachers/all", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn non_numeric_id_is_bad_input() {
    let (status, body) = send(unreachable_gateway(), Method::GET, "/teacher/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unable to parse id \"abc\"");

    let (status, _) = send(unreachable_gateway(), Method::DELETE, "/student/delete/x1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unparseable_dob_is_bad_input() {
    let (status, body) = send(
        unreachable_gateway(),
        Method::POST,
        "/student/register",
        Some("first_name=Ada&last_name=Lovelace&dob=yesterday&course_id=1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unable to parse date \"yesterday\"");
}

#[tokio::test]
async fn teacher_edit_without_joined_date_is_bad_input() {
    let (status, body) = send(
        unreachable_gateway(),
        Method::PUT,
        "/teacher/edit/4",
        Some("first_name=Charles&last_name=Babbage&dob=1791-12-26T00:00:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing `joined_date` timestamp");
}

async fn spawn_rpc(state: roster::state::RosterState) -> (Router, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(rpc::serve(state, listener, async move {
        let _ = stopped.await;
    }));

    let channel = Endpoint::from_shared(format!("http://{addr}"))
        .unwrap()
        .connect_lazy();
    (router(GatewayState::new(channel)), stop)
}

#[tokio::test]
async fn student_lifecycle_over_http() {
    let Some(db) = test_db().await else { return };
    let course = db.course("Mathematics").await;
    let (app, stop) = spawn_rpc(db.state.clone()).await;

    let (status, body) = send(app.clone(), Method::GET, "/students/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["students"], Value::Array(vec![]));

    let form = format!(
        "first_name=Ada&last_name=Lovelace&dob=1815-12-10T00:00:00Z&course_id={course}"
    );
    let (status, body) = send(app.clone(), Method::POST, "/student/register", Some(&form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(app.clone(), Method::GET, &format!("/student/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["dob"], "1815-12-10T00:00:00Z");
    assert_eq!(body["course"]["id"], course);

    let (status, body) = send(
        app.clone(),
        Method::PUT,
        "/student/edit/999",
        Some("first_name=No&last_name=One&dob=2000-01-01T00:00:00Z&course_id=1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);

    let (status, body) = send(
        app.clone(),
        Method::DELETE,
        &format!("/student/delete/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully deleted");

    let (status, _) = send(app, Method::GET, &format!("/student/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _ = stop.send(());
    db.teardown().await;
}

#[tokio::test]
async fn failed_write_is_still_http_200() {
    let Some(db) = test_db().await else { return };
    let (app, stop) = spawn_rpc(db.state.clone()).await;

    let (status, body) = send(
        app,
        Method::POST,
        "/student/register",
        Some("first_name=Ada&last_name=Lovelace&dob=1815-12-10T00:00:00Z&course_id=31337"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "Cannot insert student");

    let _ = stop.send(());
    db.teardown().await;
}

#[tokio::test]
async fn teacher_register_defaults_joined_date() {
    let Some(db) = test_db().await else { return };
    let (app, stop) = spawn_rpc(db.state.clone()).await;

    let (_, body) = send(
        app.clone(),
        Method::POST,
        "/teacher/register",
        Some("first_name=Charles&last_name=Babbage&dob=1791-12-26T00:00:00Z"),
    )
    .await;
    assert_eq!(body["code"], 200);

    let (status, body) = send(app.clone(), Method::GET, "/teachers/all", None).await;
    assert_eq!(status, StatusCode::OK);
    let teachers = body["teachers"].as_array().unwrap();
    assert_eq!(teachers.len(), 1);
    assert!(teachers[0]["joined_date"].is_string());

    let id = teachers[0]["id"].as_i64().unwrap();
    let (_, body) = send(app, Method::DELETE, &format!("/teacher/delete/{id}"), None).await;
    assert_eq!(body["code"], 200);
    assert_eq!(db.count("teacher").await, 0);

    let _ = stop.send(());
    db.teardown().await;
}

#[tokio::test]
async fn teacher_edit_keeps_joined_date_unless_supplied() {
    let Some(db) = test_db().await else { return };
    let (app, stop) = spawn_rpc(db.state.clone()).await;

    let (_, body) = send(
        app.clone(),
        Method::POST,
        "/teacher/register",
        Some(concat!(
            "first_name=Charles&last_name=Babbage&dob=1791-12-26T00:00:00Z",
            "&joined_date=1828-01-01T00:00:00Z"
        )),
    )
    .await;
    assert_eq!(body["code"], 200);
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send(
        app.clone(),
        Method::PUT,
        &format!("/teacher/edit/{id}"),
        Some("first_name=Chas&last_name=Babbage&dob=1791-12-26T00:00:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(app.clone(), Method::GET, &format!("/teacher/{id}"), None).await;
    assert_eq!(body["first_name"], "Charles");
    assert_eq!(body["joined_date"], "1828-01-01T00:00:00Z");

    let (_, body) = send(
        app.clone(),
        Method::PUT,
        &format!("/teacher/edit/{id}"),
        Some(concat!(
            "first_name=Chas&last_name=Babbage&dob=1791-12-26T00:00:00Z",
            "&joined_date=1830-06-01T00:00:00Z"
        )),
    )
    .await;
    assert_eq!(body["code"], 200);

    let (_, body) = send(app, Method::GET, &format!("/teacher/{id}"), None).await;
    assert_eq!(body["first_name"], "Chas");
    assert_eq!(body["joined_date"], "1830-06-01T00:00:00Z");

    let _ = stop.send(());
    db.teardown().await;
}
