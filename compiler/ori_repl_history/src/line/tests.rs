use super::*;

#[test]
fn test_line_id_equality_needs_both_fields() {
    assert_eq!(LineId::new(3, 1), LineId::new(3, 1));
    assert_ne!(LineId::new(3, 1), LineId::new(3, 2));
    assert_ne!(LineId::new(3, 1), LineId::new(4, 1));
}

#[test]
fn test_line_id_orders_by_sequence_then_generation() {
    assert!(LineId::new(1, 5) < LineId::new(2, 0));
    assert!(LineId::new(2, 0) < LineId::new(2, 1));
}

#[test]
fn test_successor_keeps_generation() {
    let next = LineId::new(7, 2).successor();
    assert_eq!(next, Some(LineId::new(8, 2)));
}

#[test]
fn test_successor_of_last_sequence_number() {
    assert_eq!(LineId::new(LineId::LAST, 0).successor(), None);
    assert_eq!(
        LineId::new(LineId::LAST - 1, 3).successor(),
        Some(LineId::new(LineId::LAST, 3))
    );
}

#[test]
fn test_display() {
    assert_eq!(LineId::new(0, 1).to_string(), "line 0 (generation 1)");
}

#[test]
fn test_snippet_new() {
    let snippet = Snippet::new(LineId::default(), "1 + 1");
    assert_eq!(snippet.id, LineId::new(LineId::FIRST, 0));
    assert_eq!(snippet.source, "1 + 1");
}
