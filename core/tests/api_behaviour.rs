// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Route-level behaviour tests. The router runs against in-memory stub
//! services, so these cover credential handling, the per-operation
//! requirement guards, request validation, and the envelope shape, without
//! a live database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use aula_core::application::accounts::{AccountService, LoginRequest, RegisterRequest};
use aula_core::application::enrollment::{
    CourseEditionEnrollRequest, DegreeEnrollRequest, EnrollmentService,
};
use aula_core::application::grading::{
    parse_grade_entry, GradeSubmissionOutcome, GradeSubmissionRequest, GradingService,
};
use aula_core::application::reporting::{
    DegreeEditionStats, DistrictTopStudent, MonthlyReportRow, ReportingService,
    StudentCourseRecord, TopStudent,
};
use aula_core::domain::enrollment::grade_in_range;
use aula_core::domain::{AuthRejection, Identity, RegistryError, Role};
use aula_core::infrastructure::config::TokenConfig;
use aula_core::infrastructure::token::{TokenIssuer, TokenVerifier};
use aula_core::presentation::{app, AppState};

const SECRET: &str = "behaviour-test-secret";

/// Edition id the grading stub treats as coordinated by someone else.
const FOREIGN_EDITION: i64 = 99;
/// Edition id the enrollment stub treats as full.
const FULL_EDITION: i64 = 7;
/// Class ids the enrollment stub accepts as belonging to the target edition.
const KNOWN_CLASSES: [i64; 2] = [21, 23];
/// Activity id whose fee charge the enrollment stub treats as failing.
const LEDGER_FAILURE_ACTIVITY: i64 = 55;

struct StubAccounts {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AccountService for StubAccounts {
    async fn login(&self, request: LoginRequest) -> Result<String, RegistryError> {
        let (username, password) = request.validate()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        if username == "alice" && password == "pw1" {
            Ok("issued-token".to_string())
        } else {
            Err(RegistryError::Unauthenticated(AuthRejection::BadCredentials))
        }
    }

    async fn register(
        &self,
        _actor: &Identity,
        _role: Role,
        request: RegisterRequest,
    ) -> Result<i64, RegistryError> {
        request.validate()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(42)
    }

    async fn delete_student(
        &self,
        _actor: &Identity,
        student_id: i64,
    ) -> Result<(), RegistryError> {
        if student_id == 404 {
            return Err(RegistryError::not_found("Student does not exist"));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mirrors the transactional behavior of the real implementation: the call
/// counter only moves when every write of the operation would commit, so a
/// failure partway through must leave it untouched.
struct StubEnrollment {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl EnrollmentService for StubEnrollment {
    async fn enroll_degree(
        &self,
        _actor: &Identity,
        _degree_id: i64,
        request: DegreeEnrollRequest,
    ) -> Result<(), RegistryError> {
        request.validate()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn enroll_activity(
        &self,
        _actor: &Identity,
        activity_id: i64,
    ) -> Result<(), RegistryError> {
        if activity_id == 404 {
            return Err(RegistryError::not_found("Activity does not exist"));
        }
        if activity_id == LEDGER_FAILURE_ACTIVITY {
            // Fee charge fails after the participation insert; both roll
            // back together, so nothing counts as committed.
            return Err(RegistryError::Internal(
                "financial account update failed".to_string(),
            ));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn enroll_course_edition(
        &self,
        _actor: &Identity,
        edition_id: i64,
        request: CourseEditionEnrollRequest,
    ) -> Result<(), RegistryError> {
        let classes = request.validate()?;
        if edition_id == FULL_EDITION {
            return Err(RegistryError::CapacityExceeded);
        }
        for &class_id in classes {
            if !KNOWN_CLASSES.contains(&class_id) {
                return Err(RegistryError::invalid(format!(
                    "Class {class_id} does not belong to course edition {edition_id}"
                )));
            }
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mirrors the all-or-nothing batch semantics of the real implementation:
/// the call counter only moves when the whole batch is accepted.
struct StubGrading {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GradingService for StubGrading {
    async fn submit_grades(
        &self,
        actor: &Identity,
        edition_id: i64,
        request: GradeSubmissionRequest,
    ) -> Result<GradeSubmissionOutcome, RegistryError> {
        let (_, grades) = request.validate()?;
        if edition_id == FOREIGN_EDITION || actor.user_id != 3 {
            return Err(RegistryError::Forbidden(
                "Only the course coordinator can submit grades".to_string(),
            ));
        }

        let mut updated = 0u64;
        let mut skipped = 0u64;
        for raw in grades {
            let Some(entry) = parse_grade_entry(raw) else {
                skipped += 1;
                continue;
            };
            if !entry.grade.as_f64().is_some_and(grade_in_range) {
                return Err(RegistryError::invalid(format!(
                    "Invalid grade for student {}",
                    entry.student_id
                )));
            }
            updated += 1;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GradeSubmissionOutcome { updated, skipped })
    }
}

struct StubReporting;

#[async_trait]
impl ReportingService for StubReporting {
    async fn student_details(
        &self,
        _actor: &Identity,
        student_id: i64,
    ) -> Result<Vec<StudentCourseRecord>, RegistryError> {
        Ok(vec![StudentCourseRecord {
            course_edition_id: 11,
            course_name: "Databases".to_string(),
            course_edition_year: 2026,
            grade: Some(14.0),
            evaluation_period: Some("Normal".to_string()),
            attendance: Some(20),
            course_code: "DB101".to_string(),
            coordinator_id: Some(3),
            coordinator_name: Some(format!("coordinator-of-{student_id}")),
        }])
    }

    async fn degree_details(
        &self,
        _actor: &Identity,
        _degree_id: i64,
    ) -> Result<Vec<DegreeEditionStats>, RegistryError> {
        Ok(vec![])
    }

    async fn top_three(&self, _actor: &Identity) -> Result<Vec<TopStudent>, RegistryError> {
        Ok(vec![])
    }

    async fn top_by_district(
        &self,
        _actor: &Identity,
    ) -> Result<Vec<DistrictTopStudent>, RegistryError> {
        Ok(vec![])
    }

    async fn monthly_report(
        &self,
        _actor: &Identity,
    ) -> Result<Vec<MonthlyReportRow>, RegistryError> {
        Ok(vec![])
    }
}

struct Harness {
    app: axum::Router,
    issuer: TokenIssuer,
    account_calls: Arc<AtomicUsize>,
    enrollment_calls: Arc<AtomicUsize>,
    grading_calls: Arc<AtomicUsize>,
}

fn harness() -> Harness {
    let config = TokenConfig::new(SECRET);
    let account_calls = Arc::new(AtomicUsize::new(0));
    let enrollment_calls = Arc::new(AtomicUsize::new(0));
    let grading_calls = Arc::new(AtomicUsize::new(0));

    let state = AppState {
        accounts: Arc::new(StubAccounts {
            calls: account_calls.clone(),
        }),
        enrollment: Arc::new(StubEnrollment {
            calls: enrollment_calls.clone(),
        }),
        grading: Arc::new(StubGrading {
            calls: grading_calls.clone(),
        }),
        reporting: Arc::new(StubReporting),
        verifier: TokenVerifier::new(&config),
    };

    Harness {
        app: app(state),
        issuer: TokenIssuer::new(&config),
        account_calls,
        enrollment_calls,
        grading_calls,
    }
}

impl Harness {
    fn token(&self, user_id: i64, role: Role) -> String {
        self.issuer.issue(&Identity::new(user_id, role)).unwrap()
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let envelope: Value = serde_json::from_slice(&bytes).unwrap();
    (status, envelope)
}

#[tokio::test]
async fn test_missing_token_is_rejected_before_the_service_runs() {
    let h = harness();
    let (status, envelope) = send(h.app, request("GET", "/dbproj/report", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["status"], 401);
    assert_eq!(envelope["errors"], "Token missing or invalid");
    assert_eq!(envelope["results"], Value::Null);
}

#[tokio::test]
async fn test_expired_token_is_named_as_expired() {
    let h = harness();
    let expired_issuer = TokenIssuer::new(&TokenConfig {
        ttl_hours: -1,
        ..TokenConfig::new(SECRET)
    });
    let token = expired_issuer.issue(&Identity::new(1, Role::Admin)).unwrap();

    let (status, envelope) =
        send(h.app, request("GET", "/dbproj/report", Some(&token), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["errors"], "Token expired");
}

#[tokio::test]
async fn test_tampered_token_is_invalid() {
    let h = harness();
    let foreign = TokenIssuer::new(&TokenConfig::new("some-other-secret"));
    let token = foreign.issue(&Identity::new(1, Role::Admin)).unwrap();

    let (status, envelope) =
        send(h.app, request("GET", "/dbproj/report", Some(&token), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["errors"], "Invalid token");
}

#[tokio::test]
async fn test_login_issues_a_token() {
    let h = harness();
    let body = json!({"username": "alice", "password": "pw1"});
    let (status, envelope) = send(h.app, request("PUT", "/dbproj/user", None, Some(body))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["status"], 200);
    assert_eq!(envelope["errors"], Value::Null);
    assert_eq!(envelope["results"], "issued-token");
}

#[tokio::test]
async fn test_login_with_wrong_credentials_is_401() {
    let h = harness();
    let body = json!({"username": "alice", "password": "wrong"});
    let (status, envelope) = send(h.app, request("PUT", "/dbproj/user", None, Some(body))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["errors"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_with_missing_fields_is_400() {
    let h = harness();
    let body = json!({"username": "alice"});
    let (status, envelope) = send(h.app, request("PUT", "/dbproj/user", None, Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "Username and password are required");
}

#[tokio::test]
async fn test_register_is_admin_only() {
    let h = harness();
    let token = h.token(5, Role::Student);
    let body = json!({"username": "bob", "email": "bob@example.edu", "password": "pw2"});

    let calls = h.account_calls.clone();
    let (status, _) = send(
        h.app,
        request("POST", "/dbproj/register/student", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_register_returns_the_new_user_id() {
    let h = harness();
    let token = h.token(1, Role::Admin);
    let body = json!({
        "username": "carol",
        "email": "carol@example.edu",
        "password": "pw3",
        "is_coordinator": true
    });

    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/register/instructor", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["results"], 42);
}

#[tokio::test]
async fn test_register_with_unknown_role_segment_is_400() {
    let h = harness();
    let token = h.token(1, Role::Admin);
    let body = json!({"username": "bob", "email": "bob@example.edu", "password": "pw2"});

    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/register/registrar", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "Unknown role 'registrar'");
}

#[tokio::test]
async fn test_student_can_read_their_own_details() {
    let h = harness();
    let token = h.token(101, Role::Student);

    let (status, envelope) = send(
        h.app,
        request("GET", "/dbproj/student_details/101", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["results"][0]["course_name"], "Databases");
}

#[tokio::test]
async fn test_student_cannot_read_another_students_details() {
    let h = harness();
    let token = h.token(101, Role::Student);

    let (status, _) = send(
        h.app,
        request("GET", "/dbproj/student_details/102", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_can_read_any_students_details() {
    let h = harness();
    let token = h.token(1, Role::Admin);

    let (status, _) = send(
        h.app,
        request("GET", "/dbproj/student_details/101", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reports_are_admin_only() {
    let h = harness();
    let token = h.token(3, Role::Instructor);

    for uri in ["/dbproj/top3", "/dbproj/top_by_district", "/dbproj/report"] {
        let (status, _) = send(h.app.clone(), request("GET", uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} admitted an instructor");
    }
}

#[tokio::test]
async fn test_degree_enrollment_validates_the_body() {
    let h = harness();
    let token = h.token(1, Role::Admin);
    let body = json!({"student_id": 101});

    let calls = h.enrollment_calls.clone();
    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/enroll_degree/4", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "Student ID and date are required");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_activity_enrollment_is_student_only() {
    let h = harness();
    let token = h.token(1, Role::Admin);

    let (status, _) = send(
        h.app,
        request("POST", "/dbproj/enroll_activity/2", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_edition_reports_capacity() {
    let h = harness();
    let token = h.token(101, Role::Student);
    let body = json!({"classes": [21]});

    let (status, envelope) = send(
        h.app,
        request(
            "POST",
            &format!("/dbproj/enroll_course_edition/{FULL_EDITION}"),
            Some(&token),
            Some(body),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "Course edition is full");
}

#[tokio::test]
async fn test_foreign_class_aborts_the_whole_enrollment() {
    // One class from another edition fails the entire call; the error names
    // the offending class and no enrollment commits.
    let h = harness();
    let token = h.token(101, Role::Student);
    let body = json!({"classes": [21, 22]});

    let calls = h.enrollment_calls.clone();
    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/enroll_course_edition/11", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        envelope["errors"],
        "Class 22 does not belong to course edition 11"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0, "no enrollment may commit");
}

#[tokio::test]
async fn test_valid_class_list_enrolls() {
    let h = harness();
    let token = h.token(101, Role::Student);
    let body = json!({"classes": [21, 23]});

    let calls = h.enrollment_calls.clone();
    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/enroll_course_edition/11", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["errors"], Value::Null);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_fee_charge_leaves_no_participation() {
    // Participation insert and balance update are one unit; when the charge
    // fails the participation must not survive, and the envelope carries
    // only the generic message.
    let h = harness();
    let token = h.token(101, Role::Student);

    let calls = h.enrollment_calls.clone();
    let (status, envelope) = send(
        h.app,
        request(
            "POST",
            &format!("/dbproj/enroll_activity/{LEDGER_FAILURE_ACTIVITY}"),
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(envelope["errors"], "internal server error");
    assert_eq!(
        calls.load(Ordering::SeqCst),
        0,
        "participation must roll back with the charge"
    );
}

#[tokio::test]
async fn test_course_edition_enrollment_requires_a_class_list() {
    let h = harness();
    let token = h.token(101, Role::Student);
    let body = json!({"classes": []});

    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/enroll_course_edition/11", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "At least one class ID is required");
}

#[tokio::test]
async fn test_grade_batch_with_one_bad_grade_is_rejected_whole() {
    let h = harness();
    let token = h.token(3, Role::Instructor);
    let body = json!({"period": "Normal", "grades": [[1, 15.0], [2, 25.0]]});

    let calls = h.grading_calls.clone();
    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/submit_grades/11", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "Invalid grade for student 2");
    assert_eq!(calls.load(Ordering::SeqCst), 0, "batch must not commit");
}

#[tokio::test]
async fn test_malformed_grade_entries_are_counted_not_fatal() {
    let h = harness();
    let token = h.token(3, Role::Instructor);
    let body = json!({"period": "Normal", "grades": [[1, 15.0], [2], [4, 12.5]]});

    let (status, envelope) = send(
        h.app,
        request("POST", "/dbproj/submit_grades/11", Some(&token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["results"]["updated"], 2);
    assert_eq!(envelope["results"]["skipped"], 1);
}

#[tokio::test]
async fn test_non_coordinator_cannot_submit_grades() {
    let h = harness();
    let token = h.token(3, Role::Instructor);
    let body = json!({"period": "Normal", "grades": [[1, 15.0]]});

    let (status, envelope) = send(
        h.app,
        request(
            "POST",
            &format!("/dbproj/submit_grades/{FOREIGN_EDITION}"),
            Some(&token),
            Some(body),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["errors"], "Only the course coordinator can submit grades");
}

#[tokio::test]
async fn test_delete_of_unknown_student_is_400() {
    let h = harness();
    let token = h.token(1, Role::Admin);

    let (status, envelope) = send(
        h.app,
        request("DELETE", "/dbproj/delete_details/404", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["errors"], "Student does not exist");
}
