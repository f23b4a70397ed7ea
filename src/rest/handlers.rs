use std::{fmt::Display, str::FromStr};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    service::PatientError,
    storage::{traits::PatientId, Storage},
};

use super::{
    models::{
        ContactedQuery, CountResponse, CreatePatientRequest, DeleteResponse,
        DetailedPatientResponse, ErrorResponse, GenderResponse, HealthResponse,
        ListPatientResponse, PatientIndexResponse, UpdatePatientRequest,
    },
    AppState,
};

pub async fn health<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn list_patients<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<ContactedQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match accept(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match state.patients.find(query.contacted) {
        Ok(patients) => Json(
            patients
                .into_iter()
                .map(ListPatientResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn count_patients<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<ContactedQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match accept(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match state.patients.count(query.contacted) {
        Ok(count) => Json(CountResponse { count }).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get_patient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_patient_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.patients.find_one(id) {
        Ok(patient) => Json(DetailedPatientResponse::from(patient)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get_patient_index<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    query: Result<Query<ContactedQuery>, QueryRejection>,
) -> Response {
    let id = match parse_patient_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Query(query) = match accept(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match state.patients.patient_index(id, query.contacted) {
        Ok(index) => Json(PatientIndexResponse::from(index)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn create_patient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match accept(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    match state.patients.create(body.into()) {
        Ok(patient) => (
            StatusCode::CREATED,
            Json(DetailedPatientResponse::from(patient)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn update_patient<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> Response {
    let id = match parse_patient_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(body) = match accept(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    match state.patients.update(id, body.into()) {
        Ok(patient) => Json(DetailedPatientResponse::from(patient)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn delete_all_patients<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    match state.patients.hard_delete_all() {
        Ok(deleted) => Json(DeleteResponse { deleted }).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_genders<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    match state.patients.genders() {
        Ok(genders) => Json(
            genders
                .into_iter()
                .map(GenderResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "endpoint not found".to_string(),
        }),
    )
}

fn parse_patient_id(raw: &str) -> Result<PatientId, Response> {
    PatientId::from_str(raw).map_err(|err| {
        log::warn!("Invalid patient id {}: {}", raw, err);
        message_response(StatusCode::BAD_REQUEST, "invalid patient id")
    })
}

/// Turns an extractor rejection (bad JSON body, bad query string) into the
/// same 400 `{message}` shape the service errors use.
fn accept<T, E: Display>(extracted: Result<T, E>) -> Result<T, Response> {
    extracted.map_err(|rejection| {
        log::warn!("Rejected request: {}", rejection);
        message_response(StatusCode::BAD_REQUEST, rejection.to_string())
    })
}

fn error_response(err: PatientError) -> Response {
    match err {
        PatientError::NotFound(_) => message_response(StatusCode::NOT_FOUND, err.to_string()),
        PatientError::InvalidInput(_) => {
            message_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        PatientError::Storage(ref inner) => {
            log::error!("Patient storage failure: {:?}", inner);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
        .into_response()
}
