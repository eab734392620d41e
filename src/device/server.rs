//! HTTP endpoint for the simulated device.
//!
//! Serves the same two routes as the real measurement server:
//! `GET /` returns `{"status":"up"}` and `GET /measure/?angle=<deg>` returns
//! one reading as a bare JSON number.

use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::SimulatedDevice;
use crate::error::ErrorCode;
use crate::measurement::Sampler;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct DeviceState {
    device: Arc<Mutex<SimulatedDevice>>,
}

impl DeviceState {
    pub fn new(device: SimulatedDevice) -> Self {
        Self {
            device: Arc::new(Mutex::new(device)),
        }
    }
}

/// Query payload for the measurement route
#[derive(Debug, Default, Deserialize)]
pub struct MeasureQuery {
    #[serde(default)]
    pub angle: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// HTTP error variants mapped to JSON responses
#[derive(Debug)]
pub enum DeviceHttpError {
    BadRequest(String),
    Internal(&'static str),
}

impl IntoResponse for DeviceHttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Build the Axum router with both device routes
pub fn build_router(state: DeviceState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/measure/", get(measure))
        .with_state(state)
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "up" })
}

pub async fn measure(
    State(state): State<DeviceState>,
    Query(query): Query<MeasureQuery>,
) -> Result<Json<f64>, DeviceHttpError> {
    let mut device = state
        .device
        .lock()
        .map_err(|_| DeviceHttpError::Internal("device state poisoned"))?;
    device
        .measure(query.angle)
        .map(Json)
        .map_err(|err| DeviceHttpError::BadRequest(err.message()))
}

/// Serve `device` on an already bound listener until the task is dropped
pub async fn run_server(
    listener: tokio::net::TcpListener,
    device: SimulatedDevice,
) -> anyhow::Result<()> {
    let router = build_router(DeviceState::new(device));
    axum::serve(listener, router)
        .await
        .context("serving simulated device router")?;
    Ok(())
}

/// Bind `addr` and serve in the foreground until Ctrl+C
pub fn serve(addr: SocketAddr, device: SimulatedDevice) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("building tokio runtime for simulated device")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding simulated device listener on {}", addr))?;
        info!("[SimulatedDevice] Listening on {}", addr);
        let router = build_router(DeviceState::new(device));
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("[SimulatedDevice] Shutting down");
            })
            .await
            .context("serving simulated device router")
    })
}

/// Serve `device` on a background thread with its own runtime
///
/// # Returns
/// The bound address, which differs from `addr` when port 0 was requested
pub fn spawn(addr: SocketAddr, device: SimulatedDevice) -> anyhow::Result<SocketAddr> {
    let (ready_tx, ready_rx) = mpsc::channel();

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ready_tx.send(Err(anyhow::Error::new(err)));
                return;
            }
        };

        runtime.block_on(async move {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    let _ = ready_tx.send(Err(anyhow::Error::new(err)));
                    return;
                }
            };
            let _ = ready_tx.send(listener.local_addr().map_err(anyhow::Error::new));
            if let Err(err) = run_server(listener, device).await {
                error!("[SimulatedDevice] Server stopped: {}", err);
            }
        });
    });

    ready_rx
        .recv()
        .context("simulated device thread exited before binding")?
        .with_context(|| format!("starting simulated device on {}", addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn make_router() -> Router {
        build_router(DeviceState::new(SimulatedDevice::seeded(5)))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = make_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router call");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body bytes");
        let json = serde_json::from_slice::<Value>(&bytes).expect("JSON body");
        (status, json)
    }

    #[tokio::test]
    async fn status_reports_up() {
        let (status, json) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "up");
    }

    #[tokio::test]
    async fn measure_returns_number() {
        let (status, json) = get_json("/measure/?angle=50").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_f64(), Some(100.0));
    }

    #[tokio::test]
    async fn measure_rejects_out_of_domain_angle() {
        let (status, json) = get_json("/measure/?angle=360.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]
            .as_str()
            .is_some_and(|msg| msg.contains("between 0 and 360")));
    }

    #[tokio::test]
    async fn measure_defaults_to_zero_degrees() {
        let (status, json) = get_json("/measure/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_f64().is_some());
    }
}
