use std::net::SocketAddr;
use std::sync::Arc;

use rollcall::{
    ClientError, ErrorKind, NameRegistry, NetworkManager, RecordId, Registration, RegistryClient,
    ServiceError,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Service {
    addr: SocketAddr,
    client: RegistryClient,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), ServiceError>>,
}

impl Service {
    async fn start() -> Self {
        let registry = Arc::new(NameRegistry::new());
        let cancel = CancellationToken::new();
        let (addr, handle) = NetworkManager::new(registry)
            .start_server("127.0.0.1:0", cancel.clone())
            .await
            .expect("bind");
        let client = RegistryClient::new(format!("http://{addr}")).expect("client");
        Self {
            addr,
            client,
            cancel,
            handle,
        }
    }

    async fn stop(self) {
        self.cancel.cancel();
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn register_lookup_deregister_over_http() {
    let service = Service::start().await;
    let client = &service.client;

    let rec = client.register("flardman", "127.0.0.1:4951").await.unwrap();
    assert_eq!(rec.id, RecordId(1));

    let found = client.lookup("flardman").await.unwrap();
    assert_eq!(found, rec);

    let ack = client.deregister(rec.id).await.unwrap();
    assert!(ack.success);

    let err = client.lookup("flardman").await.unwrap_err();
    assert!(err.is_not_found());

    service.stop().await;
}

#[tokio::test]
async fn reregister_over_http_keeps_id() {
    let service = Service::start().await;
    let client = &service.client;

    let first = client.register("a", "addr1").await.unwrap();
    let second = client.register("a", "addr2").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(client.lookup("a").await.unwrap().address, "addr2");

    let health = client.health().await.unwrap();
    assert_eq!(health.records, 1);
    assert_eq!(client.records().await.unwrap(), vec![second]);

    service.stop().await;
}

#[tokio::test]
async fn errors_decoded_from_body() {
    let service = Service::start().await;
    let client = &service.client;

    match client.register("", "addr").await {
        Err(ClientError::Registry { kind, .. }) => assert_eq!(kind, ErrorKind::InvalidInput),
        other => panic!("expected invalid input, got {other:?}"),
    }
    let err = client.deregister(RecordId(42)).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(client.lookup("ghost").await.unwrap_err().is_not_found());

    service.stop().await;
}

#[tokio::test]
async fn malformed_bodies_come_back_as_invalid_input() {
    let service = Service::start().await;
    let http = reqwest::Client::new();

    let bodies = [
        ("register", serde_json::json!({"name": "flardman"})),
        ("deregister", serde_json::json!({"id": "abc"})),
        ("lookup", serde_json::json!({})),
    ];
    for (route, body) in bodies {
        let response = http
            .post(format!("http://{}/{route}", service.addr))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST, "{route}");

        let err: rollcall::message::ErrorResponse = response.json().await.unwrap();
        assert_eq!(err.error, ErrorKind::InvalidInput, "{route}");
    }

    service.stop().await;
}

#[tokio::test]
async fn registration_handle_lifecycle() {
    let service = Service::start().await;
    let mut registration = Registration::new(
        service.client.clone(),
        "flardtech",
        "http://localhost:4949",
    );

    let record = registration.register().await.unwrap();
    assert_eq!(registration.id(), Some(record.id));
    assert_eq!(
        service.client.lookup("flardtech").await.unwrap().address,
        "http://localhost:4949"
    );

    match registration.register().await {
        Err(ClientError::AlreadyRegistered(id)) => assert_eq!(id, record.id),
        other => panic!("expected already registered, got {other:?}"),
    }

    let ack = registration.deregister().await.unwrap();
    assert_eq!(ack.id, record.id);
    assert!(!registration.is_registered());
    let err = service.client.lookup("flardtech").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        registration.deregister().await,
        Err(ClientError::NotRegistered)
    ));

    // A fresh registration after withdrawing gets a new id.
    let again = registration.register().await.unwrap();
    assert_ne!(again.id, record.id);

    service.stop().await;
}

#[tokio::test]
async fn registration_forgets_id_the_registry_dropped() {
    let service = Service::start().await;
    let mut registration = Registration::new(service.client.clone(), "callisto", "10.0.0.1:80");

    let record = registration.register().await.unwrap();
    service.client.deregister(record.id).await.unwrap();

    assert!(registration.deregister().await.unwrap_err().is_not_found());
    assert!(!registration.is_registered());

    service.stop().await;
}
