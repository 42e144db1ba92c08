// src/network.rs
//! HTTP transport for the name registry.
//!
//! Routes:
//! - `POST /register`   `{name, address}` -> record
//! - `POST /lookup`     `{name}`          -> record
//! - `POST /deregister` `{id}`            -> `{id, success}`
//! - `GET  /records`                      -> every live record
//! - `GET  /health`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{RegistryError, ServiceError};
use crate::message::{
    DeregisterRequest, DeregisterResponse, HealthResponse, LookupRequest, RegisterRequest,
};
use crate::registry::{NameRegistry, Record};

type AppState = Arc<NameRegistry>;

/// JSON body extractor whose rejections (bad syntax, missing or mistyped
/// fields, wrong content type) surface as `InvalidInput` error bodies.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), "malformed request body");
                Err(RegistryError::InvalidInput(rejection.body_text()).into())
            }
        }
    }
}

pub struct NetworkManager {
    registry: Arc<NameRegistry>,
}

impl NetworkManager {
    pub fn new(registry: Arc<NameRegistry>) -> Self {
        Self { registry }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/lookup", post(lookup))
            .route("/deregister", post(deregister))
            .route("/records", get(records))
            .route("/health", get(health))
            .with_state(self.registry.clone())
    }

    /// Serve on an already bound listener until `cancel` fires.
    pub async fn serve(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), ServiceError> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "registry listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!(%addr, "registry stopped");
        Ok(())
    }

    /// Bind `addr` and serve in a background task.
    /// Returns the bound address, useful when `addr` asks for port 0.
    pub async fn start_server(
        &self,
        addr: &str,
        cancel: CancellationToken,
    ) -> std::io::Result<(SocketAddr, JoinHandle<Result<(), ServiceError>>)> {
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        let manager = NetworkManager::new(self.registry.clone());

        let handle = tokio::spawn(async move { manager.serve(listener, cancel).await });
        Ok((local, handle))
    }
}

async fn register(
    State(registry): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<Record>, ServiceError> {
    let record = registry.register(&req.name, &req.address)?;
    tracing::info!(
        id = %record.id,
        name = %record.name,
        address = %record.address,
        "registered"
    );
    Ok(Json(record))
}

async fn lookup(
    State(registry): State<AppState>,
    JsonBody(req): JsonBody<LookupRequest>,
) -> Result<Json<Record>, ServiceError> {
    let record = registry.lookup(&req.name)?;
    tracing::debug!(id = %record.id, name = %record.name, "lookup hit");
    Ok(Json(record))
}

async fn deregister(
    State(registry): State<AppState>,
    JsonBody(req): JsonBody<DeregisterRequest>,
) -> Result<Json<DeregisterResponse>, ServiceError> {
    let record = registry.deregister(req.id)?;
    tracing::info!(id = %record.id, name = %record.name, "deregistered");
    Ok(Json(DeregisterResponse {
        id: record.id,
        success: true,
    }))
}

async fn records(State(registry): State<AppState>) -> Json<Vec<Record>> {
    Json(registry.records())
}

async fn health(State(registry): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_owned(),
        records: registry.len(),
    })
}
