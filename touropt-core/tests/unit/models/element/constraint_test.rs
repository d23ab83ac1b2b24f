use super::*;

#[test]
fn can_harden_mandatory_resource() {
    let constraint = Constraint::mandatory_resource("crane", false).into_hard().unwrap();

    assert!(constraint.is_hard());
}

#[test]
fn can_harden_zone_crossing() {
    let constraint = Constraint::zone_crossing(vec!["north".to_string()], false).into_hard().unwrap();

    assert!(constraint.is_hard());
}

#[test]
fn cannot_harden_magnetic() {
    let constraint = Constraint::magnetic(vec!["anchor".to_string()], true, None);

    assert!(!constraint.is_hard());
    assert!(constraint.into_hard().is_err());
}
