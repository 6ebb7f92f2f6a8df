use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::assessment::domain::AssessmentError;
use crate::assessment::report::{
    RecommendationSource, ReportExporter, FALLBACK_RECOMMENDATION, REPORT_FILE_NAME,
};
use crate::assessment::service::{AssessmentService, AssessmentServiceError};
use crate::assessment::session::{SessionError, SessionId};

#[tokio::test]
async fn open_submit_and_export_report() {
    let service = build_service(
        heuristic_scorer(),
        Box::new(StaticRecommendations("Walk daily and stop smoking.")),
    );
    let session = service.open_session().expect("session opened");

    let receipt = service
        .submit(&session, &lifestyle_fields())
        .await
        .expect("submission");
    assert!(receipt.export_enabled);

    let report = service.export(&session).await.expect("report");
    assert_eq!(report.file_name, REPORT_FILE_NAME);
    assert_eq!(report.recommendation_source, RecommendationSource::Service);
    assert!(report.body.starts_with("Heart Disease Risk Assessment Report"));
    assert!(report.body.contains("Age: 55 years"));
    assert!(report.body.contains("Smoking: Yes"));
    assert!(report.body.contains("Risk Percentage: 50.00%"));
    assert!(report.body.contains("Risk Level: Moderate"));
    assert!(report.body.contains("Walk daily and stop smoking."));
}

#[tokio::test]
async fn recommendation_failure_falls_back() {
    let service = build_service(heuristic_scorer(), Box::new(FailingRecommendations));
    let session = service.open_session().expect("session opened");
    service
        .submit(&session, &lifestyle_fields())
        .await
        .expect("submission");

    let report = service.export(&session).await.expect("report");

    assert_eq!(report.recommendation_source, RecommendationSource::Fallback);
    assert!(report.body.contains(FALLBACK_RECOMMENDATION));
    assert!(report.body.contains("Risk Level: Moderate"));
}

#[tokio::test]
async fn export_is_disabled_before_any_result() {
    let service = build_service(heuristic_scorer(), Box::new(FailingRecommendations));
    let session = service.open_session().expect("session opened");

    let err = service.export(&session).await.expect_err("nothing rendered");

    assert!(matches!(err, AssessmentServiceError::ExportDisabled));
}

#[tokio::test]
async fn export_is_disabled_after_failed_prediction() {
    let service = build_service(
        remote_scorer(Ok(json!({ "error": "model unavailable" }))),
        Box::new(StaticRecommendations("unused")),
    );
    let session = service.open_session().expect("session opened");
    service
        .submit(&session, &clinical_fields())
        .await
        .expect("submission accepted");

    let err = service.export(&session).await.expect_err("failed result");

    assert!(matches!(err, AssessmentServiceError::ExportDisabled));
}

#[tokio::test]
async fn clinical_report_lists_measurements() {
    let service = build_service(
        remote_scorer(Ok(json!({ "prediction": 0, "probability": 0.25 }))),
        Box::new(StaticRecommendations("Keep it up.")),
    );
    let session = service.open_session().expect("session opened");
    service
        .submit(&session, &clinical_fields())
        .await
        .expect("submission");

    let report = service.export(&session).await.expect("report");

    assert!(report.body.contains("Age: 20228 days"));
    assert!(report.body.contains("Gender: Male"));
    assert!(report.body.contains("Cholesterol Level: Well above normal"));
    assert!(report.body.contains("Risk Percentage: 25.00%"));
    assert!(report
        .body
        .contains("No Cardiovascular Disease. Probability of heart disease: 25.00%"));
}

#[tokio::test]
async fn sessions_are_isolated() {
    let service = build_service(heuristic_scorer(), Box::new(FailingRecommendations));
    let first = service.open_session().expect("first session");
    let second = service.open_session().expect("second session");
    assert_ne!(first, second);

    service
        .submit(&first, &lifestyle_fields())
        .await
        .expect("submission");

    assert!(service.display(&first).expect("display").export_enabled);
    assert!(!service.display(&second).expect("display").export_enabled);
}

#[tokio::test]
async fn invalid_submission_surfaces_field() {
    let service = build_service(heuristic_scorer(), Box::new(FailingRecommendations));
    let session = service.open_session().expect("session opened");
    let mut fields = lifestyle_fields();
    fields.insert("sex", "unknown");

    let err = service
        .submit(&session, &fields)
        .await
        .expect_err("invalid sex");

    assert!(matches!(
        err,
        AssessmentServiceError::Assessment(AssessmentError::InvalidInput { field: "sex", .. })
    ));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let service = build_service(heuristic_scorer(), Box::new(FailingRecommendations));
    let missing = SessionId("session-missing".to_string());

    let err = service
        .submit(&missing, &lifestyle_fields())
        .await
        .expect_err("missing session");

    assert!(matches!(
        err,
        AssessmentServiceError::Session(SessionError::NotFound)
    ));
}

#[test]
fn offline_store_surfaces_unavailable() {
    let service = AssessmentService::new(
        Arc::new(OfflineSessions),
        heuristic_scorer(),
        Arc::new(ReportExporter::new(Box::new(FailingRecommendations))),
    );

    let err = service.open_session().expect_err("store offline");

    assert!(matches!(
        err,
        AssessmentServiceError::Session(SessionError::Unavailable(_))
    ));
}

#[tokio::test]
async fn closed_session_is_gone() {
    let service = build_service(heuristic_scorer(), Box::new(FailingRecommendations));
    let session = service.open_session().expect("session opened");
    let other = service.open_session().expect("second session");
    service
        .submit(&session, &lifestyle_fields())
        .await
        .expect("submission");

    service.close_session(&session).expect("closed");

    assert!(matches!(
        service.display(&session),
        Err(AssessmentServiceError::Session(SessionError::NotFound))
    ));
    assert!(matches!(
        service.close_session(&session),
        Err(AssessmentServiceError::Session(SessionError::NotFound))
    ));
    assert!(service.display(&other).is_ok());
}
