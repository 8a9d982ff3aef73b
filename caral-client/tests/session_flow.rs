// caral-client/tests/session_flow.rs
// Login, token rejection and session persistence against the mock backend

mod common;

use caral_client::{ApiGateway, ClientConfig, ClientError, RegisterRequest};
use caral_mock::state::{CUSTOMER_ID, STAFF_EMAIL, STAFF_PASSWORD};
use common::*;
use tempfile::TempDir;

#[tokio::test]
async fn staff_login_starts_a_staff_session() {
    let server = spawn(dining_room()).await;
    let gateway = gateway(&server);

    let session = gateway.login(STAFF_EMAIL, STAFF_PASSWORD).await.unwrap();
    assert!(session.is_staff());
    assert_eq!(session.user.id, 1);
    assert!(gateway.session().is_authenticated());
    assert_eq!(server.request_lines().await, vec!["POST /login"]);
}

#[tokio::test]
async fn wrong_password_is_an_auth_error() {
    let server = spawn(dining_room()).await;
    let gateway = gateway(&server);

    let err = gateway.login(STAFF_EMAIL, "nope").await.unwrap_err();
    match err {
        ClientError::Auth(message) => assert_eq!(message, "Credenciales incorrectas"),
        other => panic!("expected Auth, got {other:?}"),
    }
    assert!(!gateway.session().is_authenticated());
}

#[tokio::test]
async fn register_logs_the_new_customer_in() {
    let server = spawn(dining_room()).await;
    let gateway = gateway(&server);
    let form = RegisterRequest {
        name: "Eva Mamani".into(),
        email: "eva@caral.pe".into(),
        telefono: "955111222".into(),
        password: "secreto".into(),
    };

    let session = gateway.register(&form).await.unwrap();
    assert!(!session.is_staff());
    assert_eq!(session.user.display_name, "Eva Mamani");

    let again = gateway.register(&form).await.unwrap_err();
    assert!(matches!(again, ClientError::Auth(ref m) if m.contains("ya está registrado")));
}

#[tokio::test]
async fn rejected_token_ends_the_session() {
    let server = spawn(dining_room()).await;
    let gateway = staff(&server).await;

    server.state().store.lock().await.tokens.clear();
    let err = gateway.list_rooms().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!gateway.session().is_authenticated());

    // Nothing is sent without a session.
    server.clear_requests().await;
    let err = gateway.list_rooms().await.unwrap_err();
    assert!(matches!(err, ClientError::NoSession));
    assert!(server.requests().await.is_empty());
}

#[tokio::test]
async fn customer_is_forbidden_from_staff_listings_but_stays_logged_in() {
    let server = spawn(dining_room()).await;
    let gateway = customer(&server).await;
    assert_eq!(gateway.session().user().map(|u| u.booking_id()), Some(CUSTOMER_ID));

    let err = gateway.list_customers().await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden));
    assert!(gateway.session().is_authenticated());
}

#[tokio::test]
async fn session_survives_a_restart_and_logout_clears_it() {
    let server = spawn(dining_room()).await;
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::new(server.base_url()).with_session_file(dir.path().join("session.json"));

    let first = ApiGateway::from_config(&config).unwrap();
    first.login(STAFF_EMAIL, STAFF_PASSWORD).await.unwrap();

    let second = ApiGateway::from_config(&config).unwrap();
    assert!(second.session().is_staff());
    assert_eq!(second.list_rooms().await.unwrap().len(), 1);

    second.logout().await;
    assert!(!dir.path().join("session.json").exists());
    let third = ApiGateway::from_config(&config).unwrap();
    assert!(!third.session().is_authenticated());
}
