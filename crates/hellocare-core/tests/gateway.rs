mod common;

use std::sync::Arc;

use hellocare_core::auth::{
    PassthroughExchanger, SessionStorage, LOGIN_ROUTE, TOKEN_KEY, USER_KEY,
};
use hellocare_core::models::{AppointmentStatus, LogRole};
use hellocare_core::{ApiError, OutboundRequest, SessionEvent};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_path, passthrough_harness, Harness};

/// Serve one response whose body stops short of its Content-Length,
/// then hang up. Returns a harness pointed at it.
async fn truncated_body_harness(server: &MockServer, status_line: &str) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 100\r\n\r\n{{\"da",
        status_line
    );
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    let mut config = common::config_for(server);
    config.api_url = format!("http://{}/v1", addr);
    common::harness_with(&config, Arc::new(PassthroughExchanger))
}

#[tokio::test]
async fn attaches_bearer_when_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/stats")))
        .and(header("authorization", "Bearer demo-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"stats": {
                "doctors": 12,
                "patients": 450,
                "appointments": 89,
                "revenue": 25000
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);
    h.session.demo_login();

    let stats = h.api.fetch_stats().await.unwrap();
    assert_eq!(stats.doctors, 12);
    assert_eq!(stats.revenue, 25000.0);
}

#[tokio::test]
async fn omits_bearer_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/doctors")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);

    let doctors = h.api.fetch_doctors().await.unwrap();
    assert!(doctors.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn rejected_credential_invalidates_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/patients")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Token expired"}})),
        )
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);
    h.session.demo_login();
    let mut events = h.session.subscribe();

    let err = h.api.fetch_patients().await.unwrap_err();
    assert!(matches!(err, ApiError::AuthRejected { .. }));
    assert_eq!(err.message(), Some("Token expired"));

    assert!(!h.session.is_authenticated());
    assert!(h.storage.get(TOKEN_KEY).unwrap().is_none());
    assert!(h.storage.get(USER_KEY).unwrap().is_none());
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Invalidated {
            redirect_to: LOGIN_ROUTE
        }
    );
}

#[tokio::test]
async fn server_errors_leave_session_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/appointments")))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"message": "Database unavailable"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/logs")))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);
    h.session.demo_login();

    match h.api.fetch_appointments(None).await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Database unavailable");
        }
        other => panic!("expected server error, got {:?}", other),
    }

    let err = h.api.fetch_audit_logs(LogRole::Admin, 50).await.unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)));

    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn malformed_success_body_is_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/doctors")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);

    let err = h.api.fetch_doctors().await.unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)));
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let server = MockServer::start().await;
    let mut config = common::config_for(&server);
    config.api_url = "http://127.0.0.1:9/v1".to_string();
    let h = common::harness_with(&config, Arc::new(PassthroughExchanger));

    let err = h.api.get::<Value>("/admin/stats").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn appointments_limit_is_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/appointments")))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"appointments": [
                {
                    "appointmentId": "a1",
                    "patientId": "p1",
                    "patientName": "Sam",
                    "status": "pending"
                }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);

    let appointments = h.api.fetch_appointments(Some(5)).await.unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn update_status_puts_new_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(api_path("/admin/appointments/a1/status")))
        .and(body_json(json!({"status": "confirmed"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);
    h.session.demo_login();

    h.api
        .update_appointment_status("a1", AppointmentStatus::Confirmed)
        .await
        .unwrap();
}

#[tokio::test]
async fn audit_logs_filter_by_role() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/admin/logs")))
        .and(query_param("role", "doctor"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"logs": [{"id": "l1", "action": "LOGIN", "userName": "Dr. Grey"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);

    let logs = h.api.fetch_audit_logs(LogRole::Doctor, 50).await.unwrap();
    assert_eq!(logs[0].actor(), "Dr. Grey");
}

#[tokio::test]
async fn raw_requests_go_through_the_same_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/admin/doctors/d1")))
        .and(header("authorization", "Bearer demo-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"deleted": true}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);
    h.session.demo_login();

    let value: Value = h
        .api
        .send(OutboundRequest::delete("/admin/doctors/d1"))
        .await
        .unwrap();
    assert_eq!(value["data"]["deleted"], true);
}

#[tokio::test]
async fn cut_off_success_body_is_unknown_error() {
    let server = MockServer::start().await;
    let h = truncated_body_harness(&server, "200 OK").await;
    h.session.demo_login();

    let err = h.api.get::<Value>("/admin/stats").await.unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)), "got {:?}", err);
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn cut_off_401_body_still_ends_session() {
    let server = MockServer::start().await;
    let h = truncated_body_harness(&server, "401 Unauthorized").await;
    h.session.demo_login();

    let err = h.api.get::<Value>("/admin/stats").await.unwrap_err();
    assert!(err.is_auth_rejected());
    assert!(!h.session.is_authenticated());
    assert!(h.storage.get(TOKEN_KEY).unwrap().is_none());
}

#[tokio::test]
async fn doctors_with_null_fields_still_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("/doctors")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"doctors": [{
                "doctorId": "d1",
                "name": "Dr. Meredith Grey",
                "specialization": null,
                "email": null,
                "rating": null
            }]}
        })))
        .mount(&server)
        .await;
    let h = passthrough_harness(&server);

    let doctors = h.api.fetch_doctors().await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].name, "Dr. Meredith Grey");
    assert_eq!(doctors[0].specialization, "");
    assert_eq!(doctors[0].rating, 0.0);
}
