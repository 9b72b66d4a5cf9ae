// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP Surface
//!
//! The `/dbproj` route table. Handlers are thin: resolve the caller via the
//! [`Identity`] extractor, evaluate the operation's [`Requirement`], then
//! delegate to the service behind `AppState`. Data-dependent authorization
//! (the coordinator-of-record check) lives in the grading service, next to
//! the row it reads.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::application::accounts::{AccountService, LoginRequest, RegisterRequest};
use crate::application::enrollment::{
    CourseEditionEnrollRequest, DegreeEnrollRequest, EnrollmentService,
};
use crate::application::grading::{GradeSubmissionRequest, GradingService};
use crate::application::reporting::ReportingService;
use crate::domain::{Identity, RegistryError, Requirement, Role};
use crate::infrastructure::token::TokenVerifier;
use crate::presentation::envelope::{ApiFailure, Envelope};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountService>,
    pub enrollment: Arc<dyn EnrollmentService>,
    pub grading: Arc<dyn GradingService>,
    pub reporting: Arc<dyn ReportingService>,
    pub verifier: TokenVerifier,
}

/// Build the service router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/dbproj/user", put(login))
        .route("/dbproj/register/{role}", post(register))
        .route("/dbproj/enroll_degree/{degree_id}", post(enroll_degree))
        .route(
            "/dbproj/enroll_activity/{activity_id}",
            post(enroll_activity),
        )
        .route(
            "/dbproj/enroll_course_edition/{edition_id}",
            post(enroll_course_edition),
        )
        .route("/dbproj/submit_grades/{edition_id}", post(submit_grades))
        .route("/dbproj/student_details/{student_id}", get(student_details))
        .route("/dbproj/degree_details/{degree_id}", get(degree_details))
        .route("/dbproj/top3", get(top_three))
        .route("/dbproj/top_by_district", get(top_by_district))
        .route("/dbproj/report", get(monthly_report))
        .route("/dbproj/delete_details/{student_id}", delete(delete_student))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Envelope, ApiFailure> {
    let token = state.accounts.login(body).await?;
    Ok(Envelope::ok(json!(token)))
}

async fn register(
    State(state): State<AppState>,
    identity: Identity,
    Path(role): Path<String>,
    Json(body): Json<RegisterRequest>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    let role: Role = role
        .parse()
        .map_err(|_| RegistryError::invalid(format!("Unknown role '{role}'")))?;
    let user_id = state.accounts.register(&identity, role, body).await?;
    Ok(Envelope::ok(json!(user_id)))
}

async fn enroll_degree(
    State(state): State<AppState>,
    identity: Identity,
    Path(degree_id): Path<i64>,
    Json(body): Json<DegreeEnrollRequest>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    state.enrollment.enroll_degree(&identity, degree_id, body).await?;
    Ok(Envelope::ok(Value::Null))
}

async fn enroll_activity(
    State(state): State<AppState>,
    identity: Identity,
    Path(activity_id): Path<i64>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Student).check(&identity)?;
    state.enrollment.enroll_activity(&identity, activity_id).await?;
    Ok(Envelope::ok(Value::Null))
}

async fn enroll_course_edition(
    State(state): State<AppState>,
    identity: Identity,
    Path(edition_id): Path<i64>,
    Json(body): Json<CourseEditionEnrollRequest>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Student).check(&identity)?;
    state
        .enrollment
        .enroll_course_edition(&identity, edition_id, body)
        .await?;
    Ok(Envelope::ok(Value::Null))
}

async fn submit_grades(
    State(state): State<AppState>,
    identity: Identity,
    Path(edition_id): Path<i64>,
    Json(body): Json<GradeSubmissionRequest>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Instructor).check(&identity)?;
    let outcome = state.grading.submit_grades(&identity, edition_id, body).await?;
    Ok(Envelope::ok(json!(outcome)))
}

async fn student_details(
    State(state): State<AppState>,
    identity: Identity,
    Path(student_id): Path<i64>,
) -> Result<Envelope, ApiFailure> {
    Requirement::RoleOrSelf {
        role: Role::Admin,
        subject: student_id,
    }
    .check(&identity)?;
    let records = state.reporting.student_details(&identity, student_id).await?;
    Ok(Envelope::ok(json!(records)))
}

async fn degree_details(
    State(state): State<AppState>,
    identity: Identity,
    Path(degree_id): Path<i64>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    let stats = state.reporting.degree_details(&identity, degree_id).await?;
    Ok(Envelope::ok(json!(stats)))
}

async fn top_three(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    let students = state.reporting.top_three(&identity).await?;
    Ok(Envelope::ok(json!(students)))
}

async fn top_by_district(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    let rows = state.reporting.top_by_district(&identity).await?;
    Ok(Envelope::ok(json!(rows)))
}

async fn monthly_report(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    let rows = state.reporting.monthly_report(&identity).await?;
    Ok(Envelope::ok(json!(rows)))
}

async fn delete_student(
    State(state): State<AppState>,
    identity: Identity,
    Path(student_id): Path<i64>,
) -> Result<Envelope, ApiFailure> {
    Requirement::Role(Role::Admin).check(&identity)?;
    state.accounts.delete_student(&identity, student_id).await?;
    Ok(Envelope::ok(Value::Null))
}
