use super::common::*;
use crate::assessment::domain::{AssessmentError, RiskCategory, RiskResult, Severity};
use crate::assessment::renderer::{DisplayState, RenderOutcome, ResultRenderer};

#[test]
fn starts_idle_with_export_disabled() {
    let renderer = ResultRenderer::new();

    assert_eq!(renderer.display(), DisplayState::Idle);
    assert!(!renderer.export_enabled());
    assert!(renderer.exportable().is_none());
}

#[test]
fn begin_shows_pending_and_disables_export() {
    let renderer = ResultRenderer::new();

    let token = renderer.begin(lifestyle_input());

    assert_eq!(token.generation(), 1);
    assert!(renderer.display().is_pending());
    assert!(!renderer.export_enabled());
}

#[test]
fn success_renders_ready_with_severity_and_enables_export() {
    let renderer = ResultRenderer::new();
    let token = renderer.begin(lifestyle_input());

    let outcome = renderer.render(token, Ok(RiskResult::with_advisory(85.0)));

    assert_eq!(outcome, RenderOutcome::Applied);
    match renderer.display() {
        DisplayState::Ready {
            generation,
            score,
            category,
            severity,
            message,
        } => {
            assert_eq!(generation, 1);
            assert_eq!(score, 85.0);
            assert_eq!(category, RiskCategory::High);
            assert_eq!(severity, Severity::Danger);
            assert_eq!(message, RiskCategory::High.advisory());
        }
        other => panic!("expected ready display, got {other:?}"),
    }
    let exportable = renderer.exportable().expect("export enabled");
    assert_eq!(exportable.generation, 1);
    assert_eq!(exportable.input, lifestyle_input());
    assert_eq!(exportable.result.score(), 85.0);
}

#[test]
fn severity_follows_category() {
    let cases = [
        (10.0, Severity::Normal),
        (55.0, Severity::Warning),
        (90.0, Severity::Danger),
    ];
    for (score, expected) in cases {
        let renderer = ResultRenderer::new();
        let token = renderer.begin(lifestyle_input());
        renderer.render(token, Ok(RiskResult::with_advisory(score)));

        match renderer.display() {
            DisplayState::Ready { severity, .. } => assert_eq!(severity, expected),
            other => panic!("expected ready display, got {other:?}"),
        }
    }
}

#[test]
fn failure_renders_failed_and_keeps_export_disabled() {
    let renderer = ResultRenderer::new();
    let token = renderer.begin(lifestyle_input());

    renderer.render(
        token,
        Err(AssessmentError::PredictionUnavailable(
            "model unavailable".to_string(),
        )),
    );

    match renderer.display() {
        DisplayState::Failed {
            generation,
            error,
            detail,
        } => {
            assert_eq!(generation, 1);
            assert_eq!(error, "prediction_unavailable");
            assert!(detail.contains("model unavailable"));
        }
        other => panic!("expected failed display, got {other:?}"),
    }
    assert!(!renderer.export_enabled());
    assert!(renderer.exportable().is_none());
}

#[test]
fn failure_after_success_withdraws_export() {
    let renderer = ResultRenderer::new();
    let first = renderer.begin(lifestyle_input());
    renderer.render(first, Ok(RiskResult::with_advisory(30.0)));
    assert!(renderer.export_enabled());

    let second = renderer.begin(lifestyle_input());
    assert!(!renderer.export_enabled());
    renderer.render(
        second,
        Err(AssessmentError::PredictionUnavailable("timeout".to_string())),
    );

    assert!(!renderer.export_enabled());
    assert!(renderer.exportable().is_none());
}

#[test]
fn stale_token_is_discarded() {
    let renderer = ResultRenderer::new();
    let first = renderer.begin(lifestyle_input());
    let second = renderer.begin(lifestyle_input());

    renderer.render(second, Ok(RiskResult::with_advisory(20.0)));
    let outcome = renderer.render(first, Ok(RiskResult::with_advisory(95.0)));

    assert_eq!(
        outcome,
        RenderOutcome::Discarded {
            current_generation: 2
        }
    );
    match renderer.display() {
        DisplayState::Ready {
            generation, score, ..
        } => {
            assert_eq!(generation, 2);
            assert_eq!(score, 20.0);
        }
        other => panic!("expected ready display, got {other:?}"),
    }
}

#[test]
fn stale_token_cannot_clear_pending_state() {
    let renderer = ResultRenderer::new();
    let first = renderer.begin(lifestyle_input());
    let _second = renderer.begin(lifestyle_input());

    renderer.render(
        first,
        Err(AssessmentError::PredictionUnavailable("late".to_string())),
    );

    assert_eq!(renderer.display(), DisplayState::Pending { generation: 2 });
    assert!(!renderer.export_enabled());
}

#[test]
fn complete_reports_the_display_it_decided_on() {
    let renderer = ResultRenderer::new();
    let first = renderer.begin(lifestyle_input());

    let (outcome, snapshot) = renderer.complete(first, Ok(RiskResult::with_advisory(72.0)));
    assert_eq!(outcome, RenderOutcome::Applied);
    assert!(snapshot.export_enabled);
    assert!(matches!(
        snapshot.display,
        DisplayState::Ready { generation: 1, category: RiskCategory::High, .. }
    ));

    let stale = renderer.begin(lifestyle_input());
    let current = renderer.begin(lifestyle_input());
    let (outcome, snapshot) = renderer.complete(stale, Ok(RiskResult::with_advisory(10.0)));
    assert_eq!(
        outcome,
        RenderOutcome::Discarded {
            current_generation: current.generation()
        }
    );
    assert_eq!(snapshot.display, DisplayState::Pending { generation: 3 });
    assert!(!snapshot.export_enabled);
}
