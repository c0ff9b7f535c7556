use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use clinic_api::{router, AppState, ServerConfig};
use clinic_db::testing::{doctor, temp_pool};
use clinic_db::users::create_user;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> Result<(TempDir, SqlitePool, Router)> {
    let (dir, pool) = temp_pool().await?;
    let app = router(AppState { pool: pool.clone() }, &ServerConfig::default());
    Ok((dir, pool, app))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, value))
}

async fn create_patient(app: &Router, name: &str, id_number: &str) -> Result<Value> {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/patients",
        Some(json!({ "name": name, "idNumber": id_number, "phone": "0912-345-678" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    Ok(body)
}

async fn create_appointment(
    app: &Router,
    patient_id: &str,
    title: &str,
    day: u32,
) -> Result<Value> {
    let scheduled_at = Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap();
    let (status, body) = call(
        app,
        Method::POST,
        "/api/appointments",
        Some(json!({
            "patientId": patient_id,
            "physician": "李華醫師",
            "day": day,
            "scheduledAt": scheduled_at,
            "category": "耳鼻喉科",
            "title": title,
            "description": "主訴：喉嚨劇痛、發燒39度、吞嚥困難。",
            "tags": ["發燒", "抗生素治療"]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    Ok(body)
}

#[tokio::test]
async fn test_health_reports_version() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let (status, body) = call(&app, Method::GET, "/api/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::test]
async fn test_create_then_list_patients() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let created = create_patient(&app, "陳小明", "A123456789").await?;
    assert_eq!(created["idNumber"], "A123456789");
    assert!(created["recordId"].as_str().unwrap().starts_with('P'));
    assert!(created.get("password").is_none());

    let (status, body) = call(&app, Method::GET, "/api/patients", None).await?;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    let matching: Vec<_> = list.iter().filter(|p| p["idNumber"] == "A123456789").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], &created);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_id_number_returns_generic_500() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let original = create_patient(&app, "陳小明", "A123456789").await?;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/patients",
        Some(json!({ "name": "其他人", "idNumber": "A123456789" })),
    )
    .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to create patient" }));

    let (_, list) = call(&app, Method::GET, "/api/patients", None).await?;
    assert_eq!(list, json!([original]));
    Ok(())
}

#[tokio::test]
async fn test_patient_edit_keeps_record_id() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let created = create_patient(&app, "林怡君", "B987654321").await?;
    let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

    let (status, updated) = call(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "recordId": "X-1", "allergies": "盤尼西林" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["recordId"], created["recordId"]);
    assert_eq!(updated["allergies"], "盤尼西林");

    let (status, fetched) = call(&app, Method::GET, &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
    Ok(())
}

#[tokio::test]
async fn test_appointments_are_listed_most_recent_first() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let patient = create_patient(&app, "陳小明", "A123456789").await?;
    let patient_id = patient["id"].as_str().unwrap();

    create_appointment(&app, patient_id, "Jan 1", 1).await?;
    create_appointment(&app, patient_id, "Jan 3", 3).await?;
    create_appointment(&app, patient_id, "Jan 2", 2).await?;

    let (status, body) = call(&app, Method::GET, "/api/appointments", None).await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Jan 3", "Jan 2", "Jan 1"]);

    let first = &body[0];
    assert_eq!(first["date"], "09:00 AM");
    assert_eq!(first["tags"], json!(["發燒", "抗生素治療"]));
    assert_eq!(first["physician"], "李華醫師");
    assert_eq!(first["status"], "pending");
    Ok(())
}

#[tokio::test]
async fn test_status_patch_is_reflected_and_nothing_else_changes() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let patient = create_patient(&app, "陳小明", "A123456789").await?;
    let patient_id = patient["id"].as_str().unwrap();
    let created = create_appointment(&app, patient_id, "陳小明 - 急性扁桃腺炎", 1).await?;
    let id = created["id"].as_str().unwrap();

    let (_, before) = call(&app, Method::GET, "/api/appointments", None).await?;

    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/api/appointments/{}", id),
        Some(json!({ "status": "completed", "prescription": "Antihistamine BID" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["prescription"], "Antihistamine BID");

    let (_, after) = call(&app, Method::GET, "/api/appointments", None).await?;
    let mut expected = before.clone();
    expected[0]["status"] = json!("completed");
    assert_eq!(after, expected);

    // Alias /status aceita qualquer valor de status
    let (status, again) = call(
        &app,
        Method::PATCH,
        &format!("/api/appointments/{}/status", id),
        Some(json!({ "status": "waiting-for-lab" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["status"], "waiting-for-lab");
    assert_eq!(again["prescription"], "Antihistamine BID");
    Ok(())
}

#[tokio::test]
async fn test_status_patch_on_unknown_id_fails_without_changes() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let patient = create_patient(&app, "陳小明", "A123456789").await?;
    create_appointment(&app, patient["id"].as_str().unwrap(), "陳小明 - 急性扁桃腺炎", 1).await?;
    let (_, before) = call(&app, Method::GET, "/api/appointments", None).await?;

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/appointments/appointment-404",
        Some(json!({ "status": "completed" })),
    )
    .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update appointment" }));

    let (_, after) = call(&app, Method::GET, "/api/appointments", None).await?;
    assert_eq!(after, before);
    Ok(())
}

#[tokio::test]
async fn test_login_outcomes() -> Result<()> {
    let (_dir, pool, app) = test_app().await?;
    create_user(&pool, doctor()).await?;

    let (status, user) = call(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "doctor@clinic.com", "password": "password123" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "doctor");
    assert_eq!(user["email"], "doctor@clinic.com");
    assert!(user.get("password").is_none());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "doctor@clinic.com", "password": "wrong" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid credentials" }));

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "nobody@clinic.com", "password": "password123" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_bodies_get_the_endpoint_error_message() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let patient = create_patient(&app, "陳小明", "A123456789").await?;
    let patient_id = patient["id"].as_str().unwrap();
    let created = create_appointment(&app, patient_id, "陳小明 - 急性扁桃腺炎", 1).await?;
    let appointment_uri = format!("/api/appointments/{}", created["id"].as_str().unwrap());

    let cases = [
        (Method::POST, "/api/login".to_string(), json!({}), "Login failed"),
        (
            Method::POST,
            "/api/patients".to_string(),
            json!({ "name": "林怡君", "idNumber": "B987654321", "gender": "M" }),
            "Failed to create patient",
        ),
        (
            Method::PATCH,
            format!("/api/patients/{}", patient_id),
            json!({ "height": "tall" }),
            "Failed to update patient",
        ),
        (
            Method::POST,
            "/api/appointments".to_string(),
            json!({ "patientId": patient_id, "title": "x" }),
            "Failed to create appointment",
        ),
        (
            Method::PATCH,
            appointment_uri.clone(),
            json!({ "prescription": "Antihistamine BID" }),
            "Failed to update appointment",
        ),
    ];

    for (method, uri, body, message) in cases {
        let (status, response) = call(&app, method, &uri, Some(body)).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(response, json!({ "error": message }), "{}", uri);
    }

    // Nada foi gravado pelas requisições rejeitadas
    let (_, patients) = call(&app, Method::GET, "/api/patients", None).await?;
    assert_eq!(patients, json!([patient]));
    let (_, cards) = call(&app, Method::GET, "/api/appointments", None).await?;
    assert_eq!(cards[0]["status"], "pending");
    assert_eq!(cards.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_card_time_matches_the_submitted_offset() -> Result<()> {
    let (_dir, _pool, app) = test_app().await?;
    let patient = create_patient(&app, "陳小明", "A123456789").await?;

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/appointments",
        Some(json!({
            "patientId": patient["id"],
            "scheduledAt": "2025-01-03T09:00:00+08:00",
            "category": "家醫科",
            "title": "陳小明 - 高血壓追蹤"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", created);
    assert_eq!(created["scheduledAt"], "2025-01-03T09:00:00+08:00");

    let (_, cards) = call(&app, Method::GET, "/api/appointments", None).await?;
    assert_eq!(cards[0]["date"], "09:00 AM");
    Ok(())
}

#[tokio::test]
async fn test_static_front_end_falls_back_to_index() -> Result<()> {
    let (_dir, pool) = temp_pool().await?;
    let site = tempfile::tempdir()?;
    std::fs::write(site.path().join("index.html"), "<div id=\"root\"></div>")?;

    let config = ServerConfig {
        static_dir: Some(site.path().to_path_buf()),
        ..ServerConfig::default()
    };
    let app = router(AppState { pool }, &config);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/records").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    assert_eq!(&bytes[..], b"<div id=\"root\"></div>");

    let (status, body) = call(&app, Method::GET, "/api/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}
