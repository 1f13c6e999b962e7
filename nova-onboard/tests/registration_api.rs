//! Router-level tests for the employee registration API

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use nova_onboard::api;
use nova_onboard::email::{MailError, Mailer, OutgoingEmail, spawn_notification_worker};
use nova_onboard::media::{MediaError, MediaHost, NormalizedPhoto};
use nova_onboard::registration::{Registrar, RegistrarSettings};
use nova_onboard::state::AppState;
use nova_onboard::store::{EmployeeStore, MemoryStore, StoreError};
use regex::Regex;
use serde_json::{Value, json};
use shared::models::{EmployeeRecord, NewEmployee};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn app(registrar: Registrar) -> Router {
    api::create_router(AppState::new(Arc::new(registrar)))
}

fn memory_app(store: &MemoryStore) -> Router {
    app(Registrar::new(
        Arc::new(store.clone()),
        RegistrarSettings::default(),
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form(pin: &str, confirm: &str) -> Value {
    json!({
        "nom": "Kouame",
        "prenom": "Jean",
        "poste": "Dev",
        "dateNaissance": "1990-01-01",
        "pin": pin,
        "confirmPin": confirm,
    })
}

fn current_year() -> String {
    shared::util::today_utc().format("%Y").to_string()
}

#[tokio::test]
async fn scenario_a_valid_submission_is_registered() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, body) = send(&app, post_json(form("2468", "2468"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let pattern = format!(r"^NOV-KJ-{}-\d{{5}}$", current_year());
    let matricule = body["matricule"].as_str().unwrap();
    assert!(Regex::new(&pattern).unwrap().is_match(matricule), "{matricule}");
    assert!(body["qrId"].as_str().unwrap().starts_with("EMP-"));

    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(body["employeeId"], records[0].id.as_str());
    assert_eq!(records[0].employee.matricule, matricule);
}

#[tokio::test]
async fn scenario_b_second_registration_with_same_pin_conflicts() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, _) = send(&app, post_json(form("1234", "1234"))).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, body) = send(&app, post_json(form("1234", "1234"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Ce code PIN est déjà utilisé. Veuillez en choisir un autre."
        );
    }
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn scenario_c_short_pin_is_rejected_without_touching_the_store() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, body) = send(&app, post_json(form("12", "12"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Le PIN doit contenir entre 4 et 6 chiffres");
    assert_eq!(body["code"], 8010);
    assert!(body["details"]["fields"]["pin"].is_string());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn whitespace_pin_is_rejected_as_malformed() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, body) = send(&app, post_json(form("    ", "    "))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8010);
    assert_eq!(body["error"], "Le PIN doit contenir entre 4 et 6 chiffres");
    assert!(store.is_empty().await);

    let (status, body) = send(&app, get("/api/employees?pin=%20%20%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8010);
}

#[tokio::test]
async fn scenario_d_availability_flips_after_registration() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, body) = send(&app, get("/api/employees?pin=1234")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "available": true }));

    send(&app, post_json(form("1234", "1234"))).await;

    let (_, body) = send(&app, get("/api/employees?pin=1234")).await;
    assert_eq!(body, json!({ "available": false }));
}

#[tokio::test]
async fn availability_requires_a_well_formed_pin() {
    let app = memory_app(&MemoryStore::new());

    let (status, body) = send(&app, get("/api/employees")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le PIN est requis");

    let (status, body) = send(&app, get("/api/employees?pin=12%27)")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8010);
}

#[tokio::test]
async fn mismatched_confirmation_is_a_field_error() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, body) = send(&app, post_json(form("1234", "4321"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Les codes PIN ne correspondent pas");
    assert_eq!(
        body["details"]["fields"]["confirmPin"],
        "Les codes PIN ne correspondent pas"
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn missing_fields_are_listed() {
    let app = memory_app(&MemoryStore::new());

    let (status, body) = send(&app, post_json(json!({ "pin": "1234", "confirmPin": "1234" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tous les champs sont requis");
    let fields = body["details"]["fields"].as_object().unwrap();
    for field in ["nom", "prenom", "poste", "dateNaissance"] {
        assert!(fields.contains_key(field), "missing {field}");
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = memory_app(&MemoryStore::new());
    let request = Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

/// Store whose lookups always fail
struct DownStore;

#[async_trait]
impl EmployeeStore for DownStore {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn find_active_by_pin(&self, _pin: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        Err(StoreError::Status {
            status: 503,
            body: "Service Unavailable".into(),
        })
    }

    async fn create(&self, _employee: NewEmployee) -> Result<EmployeeRecord, StoreError> {
        panic!("create must not be reached when the lookup fails");
    }
}

#[tokio::test]
async fn lookup_failure_is_a_generic_server_error() {
    let app = app(Registrar::new(Arc::new(DownStore), RegistrarSettings::default()));

    let (status, body) = send(&app, post_json(form("1234", "1234"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().contains("503"));

    let (status, _) = send(&app, get("/api/employees?pin=1234")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

/// Store that finds no holder but refuses every insert
struct RejectingStore;

#[async_trait]
impl EmployeeStore for RejectingStore {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    async fn find_active_by_pin(&self, _pin: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(None)
    }

    async fn create(&self, _employee: NewEmployee) -> Result<EmployeeRecord, StoreError> {
        Err(StoreError::Status {
            status: 422,
            body: "INVALID_VALUE_FOR_COLUMN".into(),
        })
    }
}

#[tokio::test]
async fn persist_failure_is_a_generic_server_error() {
    let app = app(Registrar::new(Arc::new(RejectingStore), RegistrarSettings::default()));

    let (status, body) = send(&app, post_json(form("1234", "1234"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 9002);
    assert_eq!(body["error"], "Service temporairement indisponible");
    let raw = body.to_string();
    assert!(!raw.contains("INVALID_VALUE_FOR_COLUMN"));
    assert!(!raw.contains("422"));
    assert!(body.get("matricule").is_none());
}

#[derive(Default)]
struct RecordingMailer {
    fail: bool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.fail {
            return Err(MailError::Transport {
                transport: "recording",
                reason: "connection reset".into(),
            });
        }
        Ok(())
    }
}

#[tokio::test]
async fn notification_failure_does_not_change_the_response() {
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });
    let shutdown = CancellationToken::new();
    let (notifier, worker) = spawn_notification_worker(mailer.clone(), 8, shutdown.clone());
    let store = MemoryStore::new();
    let app = app(
        Registrar::new(Arc::new(store.clone()), RegistrarSettings::default()).with_notifier(notifier),
    );

    let mut body = form("1234", "1234");
    body["email"] = json!("jean.kouame@nova.ci");
    let (status, response) = send(&app, post_json(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(store.len().await, 1);

    shutdown.cancel();
    worker.await.unwrap();
    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jean.kouame@nova.ci");
}

struct StubMedia;

#[async_trait]
impl MediaHost for StubMedia {
    async fn upload(&self, photo: &NormalizedPhoto, public_id: &str) -> Result<String, MediaError> {
        assert_eq!(&photo.jpeg[..2], &[0xFF, 0xD8]);
        Ok(format!("https://cdn.test/{public_id}.jpg"))
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([200, 100, 50]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn multipart_request(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Request<Body> {
    const BOUNDARY: &str = "nova-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

const MULTIPART_FIELDS: &[(&str, &str)] = &[
    ("nom", "Kouame"),
    ("prenom", "Jean"),
    ("poste", "Dev"),
    ("dateNaissance", "1990-01-01"),
    ("pin", "1357"),
    ("confirmPin", "1357"),
];

#[tokio::test]
async fn multipart_submission_with_photo_links_the_upload() {
    let store = MemoryStore::new();
    let app = app(
        Registrar::new(Arc::new(store.clone()), RegistrarSettings::default())
            .with_media(Arc::new(StubMedia)),
    );

    let png = png_bytes();
    let (status, body) = send(&app, multipart_request(MULTIPART_FIELDS, Some(("moi.png", png.as_slice())))).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["photoUrl"].as_str().unwrap();
    assert!(url.starts_with("https://cdn.test/NOV-KJ-"));
    assert_eq!(store.records().await[0].employee.photo_url.as_deref(), Some(url));
}

#[tokio::test]
async fn multipart_with_broken_photo_is_rejected_on_photo_field() {
    let store = MemoryStore::new();
    let app = app(
        Registrar::new(Arc::new(store.clone()), RegistrarSettings::default())
            .with_media(Arc::new(StubMedia)),
    );

    let (status, body) = send(
        &app,
        multipart_request(MULTIPART_FIELDS, Some(("moi.png", &b"definitely not a png"[..]))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["fields"]["photo"].is_string());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn multipart_without_photo_registers() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let (status, body) = send(&app, multipart_request(MULTIPART_FIELDS, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.get("photoUrl").is_none());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn multipart_content_type_is_matched_case_insensitively() {
    let store = MemoryStore::new();
    let app = memory_app(&store);

    let mut request = multipart_request(MULTIPART_FIELDS, None);
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("Multipart/Form-Data; boundary=nova-boundary"),
    );

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn registrations_are_rate_limited_per_ip() {
    let app = memory_app(&MemoryStore::new());
    let request = || {
        Request::builder()
            .method("POST")
            .uri("/api/employees")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(form("12", "12").to_string()))
            .unwrap()
    };

    for _ in 0..10 {
        let (status, _) = send(&app, request()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn health_reports_store_backend() {
    let app = memory_app(&MemoryStore::new());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn unknown_routes_are_json_not_found() {
    let app = memory_app(&MemoryStore::new());

    let (status, body) = send(&app, get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
