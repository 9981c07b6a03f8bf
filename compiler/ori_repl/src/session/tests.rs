#![allow(clippy::unwrap_used, clippy::panic, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use super::*;
use crate::testing::{mock_session, mock_session_with, snippet, MockBackend, MockConfig};

fn compiled<A>(result: CompileResult<A>) -> CompiledSnippet<A> {
    match result {
        CompileResult::Compiled(unit) => unit,
        CompileResult::Error(message) => panic!("expected a compiled unit, got error: {message}"),
    }
}

// -- Check --

#[test]
fn test_check_outcomes() {
    let (session, _) = mock_session();

    assert_eq!(session.check(&snippet(0, 0, "1 + 1")).unwrap(), CheckResult::Ok);
    assert_eq!(
        session.check(&snippet(0, 0, "val x =")).unwrap(),
        CheckResult::Incomplete
    );
    assert_eq!(
        session.check(&snippet(0, 0, "(1 + 2")).unwrap(),
        CheckResult::Incomplete
    );
    assert_eq!(
        session.check(&snippet(0, 0, "1 ) + 2 ]")).unwrap(),
        CheckResult::Error("unexpected `)`\nunexpected `]`".to_string())
    );
}

#[test]
fn test_check_initializes_but_never_records() {
    let (session, counters) = mock_session();
    assert_eq!(session.status(), SessionStatus::Uninitialized);

    session.check(&snippet(0, 0, "1 + 1")).unwrap();

    assert_eq!(session.status(), SessionStatus::Initialized);
    assert_eq!(counters.created(), 1);
    assert!(session.history_ids().is_empty());
}

#[test]
fn test_check_reports_init_failure_and_retries_later() {
    let (session, counters) = mock_session_with(MockBackend::new(), MockConfig::failing());

    assert_eq!(
        session.check(&snippet(0, 0, "1")).unwrap(),
        CheckResult::Error("environment unavailable".to_string())
    );
    assert_eq!(session.status(), SessionStatus::Uninitialized);
    assert_eq!(counters.created(), 0);
}

// -- Compile --

#[test]
fn test_compile_returns_full_history() {
    let (session, _) = mock_session();

    compiled(session.compile(&snippet(0, 0, "1 + 1")).unwrap());
    let unit = compiled(session.compile(&snippet(1, 0, "val x = 2")).unwrap());

    assert_eq!(unit.id, LineId::new(1, 0));
    assert_eq!(unit.history, vec![LineId::new(0, 0), LineId::new(1, 0)]);
    assert_eq!(unit.unit_name, "Line_1_gen_0");
    assert!(!unit.has_result);
    assert_eq!(unit.result_type, None);
    assert_eq!(unit.artifact.history_len, 1);
}

#[test]
fn test_compile_failure_leaves_history_untouched() {
    let (session, _) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1")).unwrap());

    let result = session.compile(&snippet(1, 0, "undefined + 1")).unwrap();

    assert_eq!(
        result,
        CompileResult::Error("unresolved reference: undefined".to_string())
    );
    assert_eq!(session.history_ids(), vec![LineId::new(0, 0)]);
    assert_eq!(session.next_line(), LineId::new(1, 0));
    session.with_state(|state| assert_eq!(state.analysis.len(), 1)).unwrap();
}

#[test]
fn test_compile_failure_uses_session_options() {
    let options = ReplOptions {
        diagnostic_limit: 1,
        deduplicate: true,
    };
    let session = ReplSession::with_options(MockBackend::new(), MockConfig::default(), options);

    let result = session.compile(&snippet(0, 0, ") ) ]")).unwrap();
    assert_eq!(
        result,
        CompileResult::Error("unexpected `)`\n... and 1 more".to_string())
    );
}

#[test]
fn test_compile_rejects_out_of_order_line_before_backend() {
    let (session, counters) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1")).unwrap());

    let err = session.compile(&snippet(0, 0, "2")).unwrap_err();

    assert!(matches!(
        err,
        SessionError::History(HistoryError::OutOfOrder { .. })
    ));
    assert_eq!(counters.compiled(), 1);
    session.with_state(|state| assert_eq!(state.analysis.len(), 1)).unwrap();
}

#[test]
fn test_compile_next_mints_ids_in_the_current_generation() {
    let (session, _) = mock_session();

    let first = compiled(session.compile_next("1").unwrap());
    let second = compiled(session.compile_next("val x = 2").unwrap());
    assert_eq!(first.id, LineId::new(0, 0));
    assert_eq!(second.id, LineId::new(1, 0));

    // A failed compile consumes no id.
    assert!(matches!(
        session.compile_next("undefined").unwrap(),
        CompileResult::Error(_)
    ));
    assert_eq!(session.next_line(), LineId::new(2, 0));

    session.reset_to(LineId::new(0, 0)).unwrap();
    let redo = compiled(session.compile_next("x").unwrap());
    assert_eq!(redo.id, LineId::new(1, 1));
    assert_eq!(redo.history, vec![LineId::new(0, 0), LineId::new(1, 1)]);
}

#[test]
fn test_compile_rejects_last_sequence_number() {
    let (session, counters) = mock_session();
    let last = LineId::new(LineId::LAST, 0);

    assert_eq!(
        session.compile(&snippet(LineId::LAST, 0, "1")).unwrap_err(),
        SessionError::History(HistoryError::SequenceExhausted(last))
    );
    assert_eq!(session.next_line(), LineId::new(LineId::FIRST, 0));
    assert_eq!(counters.compiled(), 0);

    compiled(session.compile(&snippet(LineId::LAST - 1, 0, "1")).unwrap());
    assert_eq!(session.next_line(), last);
    assert_eq!(
        session.compile_next("2").unwrap_err(),
        SessionError::History(HistoryError::SequenceExhausted(last))
    );
    assert_eq!(counters.compiled(), 1);
    assert_eq!(session.history_ids(), vec![LineId::new(LineId::LAST - 1, 0)]);
}

// -- Rewind --

#[test]
fn test_reset_to_rewinds_both_ledgers() {
    let (session, _) = mock_session();
    for no in 0..4 {
        compiled(session.compile(&snippet(no, 0, "1")).unwrap());
    }

    let removed = session.reset_to(LineId::new(1, 0)).unwrap();

    assert_eq!(removed, vec![LineId::new(2, 0), LineId::new(3, 0)]);
    assert_eq!(session.generation(), 1);
    assert_eq!(session.next_line(), LineId::new(2, 1));
    let analysis: Vec<_> = session
        .with_state(|state| state.analysis.ids().collect())
        .unwrap();
    assert_eq!(analysis, session.history_ids());
}

#[test]
fn test_reset_to_unknown_line() {
    let (session, _) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1")).unwrap());

    let err = session.reset_to(LineId::new(5, 0)).unwrap_err();

    assert_eq!(
        err,
        SessionError::History(HistoryError::LineNotFound(LineId::new(5, 0)))
    );
    assert_eq!(session.history_ids(), vec![LineId::new(0, 0)]);
}

#[test]
fn test_reset_before_first_use() {
    let (session, counters) = mock_session();

    assert_eq!(session.reset().unwrap(), Vec::new());
    assert_eq!(session.generation(), 1);
    assert_eq!(
        session.reset_to(LineId::new(0, 0)).unwrap_err(),
        SessionError::History(HistoryError::LineNotFound(LineId::new(0, 0)))
    );
    assert_eq!(counters.created(), 0);
}

#[test]
fn test_divergence_poisons_session() {
    let (session, _) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1")).unwrap());
    compiled(session.compile(&snippet(1, 0, "2 #desync")).unwrap());

    let err = session.reset_to(LineId::new(0, 0)).unwrap_err();

    assert_eq!(
        err,
        SessionError::History(HistoryError::Divergence {
            compiled: vec![LineId::new(1, 0)],
            analysis: Vec::new(),
        })
    );
    assert!(err.is_fatal());
    assert!(session.is_poisoned());

    let poisoned = SessionError::History(HistoryError::Poisoned);
    assert_eq!(session.check(&snippet(1, 1, "3")).unwrap_err(), poisoned);
    assert_eq!(session.compile(&snippet(1, 1, "3")).unwrap_err(), poisoned);
    assert_eq!(session.reset().unwrap_err(), poisoned);
}

#[test]
fn test_reset_divergence_reports_both_sides() {
    let (session, _) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1 #desync")).unwrap());
    compiled(session.compile(&snippet(1, 0, "2")).unwrap());

    let err = session.reset().unwrap_err();

    assert_eq!(
        err,
        SessionError::History(HistoryError::Divergence {
            compiled: vec![LineId::new(0, 0), LineId::new(1, 0)],
            analysis: vec![LineId::new(1, 0)],
        })
    );
}

// -- Lifecycle --

#[test]
fn test_dispose_twice_and_later_use() {
    let (session, counters) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1")).unwrap());

    session.dispose();
    session.dispose();

    assert_eq!(counters.disposed(), 1);
    assert_eq!(session.status(), SessionStatus::Disposed);
    assert_eq!(
        session.check(&snippet(1, 0, "2")).unwrap_err(),
        SessionError::Disposed
    );
    assert_eq!(
        session.compile(&snippet(1, 0, "2")).unwrap_err(),
        SessionError::Disposed
    );
    assert_eq!(session.reset().unwrap_err(), SessionError::Disposed);
    assert_eq!(counters.created(), 1);

    // History outlives the backend state.
    assert_eq!(session.history_ids(), vec![LineId::new(0, 0)]);
}

#[test]
fn test_disposal_is_reported_before_line_order() {
    let (session, counters) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1")).unwrap());
    session.dispose();

    // A stale id would be out of order, but the session is gone first.
    assert_eq!(
        session.compile(&snippet(0, 0, "2")).unwrap_err(),
        SessionError::Disposed
    );
    assert_eq!(session.compile_next("2").unwrap_err(), SessionError::Disposed);
    assert_eq!(counters.compiled(), 1);
}

#[test]
fn test_with_state_requires_live_state() {
    let (session, _) = mock_session();
    assert_eq!(
        session.with_state(|state| state.instance).unwrap_err(),
        SessionError::InvalidState
    );

    session.check(&snippet(0, 0, "1")).unwrap();
    assert_eq!(session.with_state(|state| state.instance).unwrap(), 1);

    session.dispose();
    assert_eq!(
        session.with_state(|state| state.instance).unwrap_err(),
        SessionError::InvalidState
    );
}

#[test]
fn test_clones_are_views_of_one_session() {
    let (session, counters) = mock_session();
    let view = session.clone();
    assert!(session.shares_lock_with(&view));

    compiled(view.compile(&snippet(0, 0, "1")).unwrap());
    compiled(session.compile(&snippet(1, 0, "2")).unwrap());

    assert_eq!(session.history_ids(), view.history_ids());
    assert_eq!(counters.created(), 1);

    let (other, _) = mock_session();
    assert!(!session.shares_lock_with(&other));
}

#[test]
fn test_with_history_reads_units() {
    let (session, _) = mock_session();
    compiled(session.compile(&snippet(0, 0, "1 + 1")).unwrap());

    let names: Vec<String> =
        session.with_history(|history| history.iter().map(|entry| entry.payload.name.clone()).collect());
    assert_eq!(names, vec!["Line_0_gen_0".to_string()]);
}
