use std::net::SocketAddr;

use axum::{
    http::Method,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::service::PatientService;
use crate::storage::Storage;

mod handlers;
mod models;

use handlers::{
    count_patients, create_patient, delete_all_patients, get_patient, get_patient_index, health,
    list_genders, list_patients, not_found, update_patient,
};

#[derive(Clone)]
pub struct AppState<S: Storage> {
    pub patients: PatientService<S>,
    pub started_at: std::time::SystemTime,
}

pub fn router<S: Storage + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::<S>))
        .route(
            "/patients",
            get(list_patients::<S>)
                .post(create_patient::<S>)
                .delete(delete_all_patients::<S>),
        )
        .route("/patients/count", get(count_patients::<S>))
        .route(
            "/patients/:id",
            get(get_patient::<S>).patch(update_patient::<S>),
        )
        .route("/patients/:id/index", get(get_patient_index::<S>))
        .route("/genders", get(list_genders::<S>))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

pub async fn serve<S: Storage + Clone + Send + Sync + 'static>(
    addr: SocketAddr,
    storage: S,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let state = AppState {
        patients: PatientService::new(storage),
        started_at: std::time::SystemTime::now(),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
