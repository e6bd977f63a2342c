use super::*;

#[test]
fn rank_matches_spec_table() {
    assert_eq!(Priority::Urgent.rank(), 0);
    assert_eq!(Priority::High.rank(), 1);
    assert_eq!(Priority::Medium.rank(), 2);
    assert_eq!(Priority::Low.rank(), 3);
    assert_eq!(Priority::None.rank(), 4);
}

#[test]
fn parse_aliases_urgent_and_critical() {
    assert_eq!(Priority::parse("Urgent"), Priority::Urgent);
    assert_eq!(Priority::parse("critical"), Priority::Urgent);
}

#[test]
fn parse_aliases_no_priority_variants() {
    assert_eq!(Priority::parse("No priority"), Priority::None);
    assert_eq!(Priority::parse("minimal"), Priority::None);
    assert_eq!(Priority::parse("none"), Priority::None);
}

#[test]
fn parse_defaults_unrecognized_to_medium() {
    assert_eq!(Priority::parse("whatever"), Priority::Medium);
    assert_eq!(Priority::default(), Priority::Medium);
}
