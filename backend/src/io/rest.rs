//! REST surface over the domain services.
//!
//! Handlers resolve the current principal from the session provider, delegate
//! to a service, and map [`ServiceError`] variants to HTTP status codes with
//! the localized message in a uniform JSON error body.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::info;

use shared::{
    CreateDebtRequest, ErrorResponse, RegisterVehicleRequest, SessionResponse, SetConfigRequest,
    SignInRequest, SubmitDailyEntryRequest, UpdateExpenseRequest,
};

use crate::domain::{
    ConfigService, DebtService, Principal, RecordService, ReportService, ServiceError,
    SessionProvider, VehicleService,
};
use crate::storage::csv::CsvConnection;
use crate::storage::traits::Connection;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub vehicle_service: VehicleService,
    pub record_service: RecordService,
    pub report_service: ReportService,
    pub config_service: ConfigService,
    pub debt_service: DebtService,
    pub session: Arc<dyn SessionProvider>,
}

impl AppState {
    /// Wire the full service stack over one storage connection.
    pub fn new(connection: CsvConnection, session: Arc<dyn SessionProvider>) -> Self {
        let vehicles = connection.create_vehicle_repository();
        let vehicle_service = VehicleService::new(vehicles.clone());
        let record_service =
            RecordService::new(connection.create_daily_record_repository(), vehicles.clone());
        let config_service =
            ConfigService::new(connection.create_config_repository(), vehicles.clone());
        let report_service = ReportService::new(record_service.clone(), config_service.clone());
        let debt_service = DebtService::new(connection.create_debt_repository(), vehicles);

        Self {
            vehicle_service,
            record_service,
            report_service,
            config_service,
            debt_service,
            session,
        }
    }
}

/// All `/api` routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session).post(sign_in).delete(sign_out))
        .route("/vehicles", get(list_vehicles).post(register_vehicle))
        .route(
            "/vehicles/:plate/records/:date",
            get(get_record).post(submit_daily_entry),
        )
        .route(
            "/vehicles/:plate/records/:date/expenses/:index",
            put(update_expense).delete(remove_expense),
        )
        .route("/vehicles/:plate/reports/daily/:date", get(daily_report))
        .route("/vehicles/:plate/reports/monthly/:month", get(monthly_report))
        .route("/vehicles/:plate/config", get(get_config).put(set_config))
        .route("/vehicles/:plate/debts", get(list_debts).post(add_debt))
        .route("/vehicles/:plate/debts/:debt_id/pay", post(pay_debt))
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) | ServiceError::InvalidPlate(_) => StatusCode::BAD_REQUEST,
        ServiceError::DuplicateVehicle(_) => StatusCode::CONFLICT,
        ServiceError::VehicleNotFound(_)
        | ServiceError::RecordNotFound { .. }
        | ServiceError::DebtNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::SessionExpired | ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ServiceError) -> Response {
    if let ServiceError::Storage(inner) = &err {
        tracing::error!("Storage failure: {inner:?}");
    }
    (
        status_for(&err),
        Json(ErrorResponse {
            message: err.user_message(),
        }),
    )
        .into_response()
}

fn require_principal(state: &AppState) -> Result<Principal, Response> {
    state
        .session
        .current_principal()
        .ok_or_else(|| error_response(ServiceError::SessionExpired))
}

async fn sign_in(State(state): State<AppState>, Json(request): Json<SignInRequest>) -> Response {
    info!("POST /api/session for {}", request.email);

    match state.session.sign_in(&request.email, &request.password) {
        Ok(principal) => (
            StatusCode::OK,
            Json(SessionResponse {
                uid: principal.uid,
                email: principal.email,
            }),
        )
            .into_response(),
        Err(err) => error_response(ServiceError::Auth(err)),
    }
}

async fn get_session(State(state): State<AppState>) -> Response {
    match require_principal(&state) {
        Ok(principal) => (
            StatusCode::OK,
            Json(SessionResponse {
                uid: principal.uid,
                email: principal.email,
            }),
        )
            .into_response(),
        Err(response) => response,
    }
}

async fn sign_out(State(state): State<AppState>) -> Response {
    info!("DELETE /api/session");
    state.session.sign_out();
    StatusCode::NO_CONTENT.into_response()
}

async fn register_vehicle(
    State(state): State<AppState>,
    Json(request): Json<RegisterVehicleRequest>,
) -> Response {
    info!("POST /api/vehicles - plate {}", request.plate);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.vehicle_service.register_vehicle(&principal.uid, request) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_vehicles(State(state): State<AppState>) -> Response {
    info!("GET /api/vehicles");

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.vehicle_service.list_vehicles(&principal.uid) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn submit_daily_entry(
    State(state): State<AppState>,
    Path((plate, date)): Path<(String, String)>,
    Json(request): Json<SubmitDailyEntryRequest>,
) -> Response {
    info!("POST /api/vehicles/{}/records/{}", plate, date);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state
        .record_service
        .submit_daily_entry(&principal.uid, &plate, &date, request)
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_record(
    State(state): State<AppState>,
    Path((plate, date)): Path<(String, String)>,
) -> Response {
    info!("GET /api/vehicles/{}/records/{}", plate, date);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.record_service.get_record(&principal.uid, &plate, &date) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_expense(
    State(state): State<AppState>,
    Path((plate, date, index)): Path<(String, String, usize)>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Response {
    info!("PUT /api/vehicles/{}/records/{}/expenses/{}", plate, date, index);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state
        .record_service
        .update_expense(&principal.uid, &plate, &date, index, request)
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn remove_expense(
    State(state): State<AppState>,
    Path((plate, date, index)): Path<(String, String, usize)>,
) -> Response {
    info!("DELETE /api/vehicles/{}/records/{}/expenses/{}", plate, date, index);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state
        .record_service
        .remove_expense(&principal.uid, &plate, &date, index)
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn daily_report(
    State(state): State<AppState>,
    Path((plate, date)): Path<(String, String)>,
) -> Response {
    info!("GET /api/vehicles/{}/reports/daily/{}", plate, date);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.report_service.daily_report(&principal.uid, &plate, &date) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn monthly_report(
    State(state): State<AppState>,
    Path((plate, month)): Path<(String, String)>,
) -> Response {
    info!("GET /api/vehicles/{}/reports/monthly/{}", plate, month);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state
        .report_service
        .monthly_report(&principal.uid, &plate, &month)
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_config(State(state): State<AppState>, Path(plate): Path<String>) -> Response {
    info!("GET /api/vehicles/{}/config", plate);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.config_service.get_config(&principal.uid, &plate) {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn set_config(
    State(state): State<AppState>,
    Path(plate): Path<String>,
    Json(request): Json<SetConfigRequest>,
) -> Response {
    info!("PUT /api/vehicles/{}/config", plate);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.config_service.set_config(&principal.uid, &plate, request) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_debts(State(state): State<AppState>, Path(plate): Path<String>) -> Response {
    info!("GET /api/vehicles/{}/debts", plate);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.debt_service.list_debts(&principal.uid, &plate) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn add_debt(
    State(state): State<AppState>,
    Path(plate): Path<String>,
    Json(request): Json<CreateDebtRequest>,
) -> Response {
    info!("POST /api/vehicles/{}/debts", plate);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.debt_service.add_debt(&principal.uid, &plate, request) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn pay_debt(
    State(state): State<AppState>,
    Path((plate, debt_id)): Path<(String, String)>,
) -> Response {
    info!("POST /api/vehicles/{}/debts/{}/pay", plate, debt_id);

    let principal = match require_principal(&state) {
        Ok(p) => p,
        Err(response) => return response,
    };
    match state.debt_service.mark_paid(&principal.uid, &plate, &debt_id) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}
