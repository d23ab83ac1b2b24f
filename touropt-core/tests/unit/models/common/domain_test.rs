use super::*;

parameterized_test! {can_detect_intersection, (left, right, expected), {
    can_detect_intersection_impl(left, right, expected);
}}

can_detect_intersection! {
    case_01: ((0., 10.), (5., 15.), true),
    case_02: ((0., 10.), (10., 15.), true),
    case_03: ((0., 10.), (11., 15.), false),
    case_04: ((5., 7.), (0., 10.), true),
}

fn can_detect_intersection_impl(left: (f64, f64), right: (f64, f64), expected: bool) {
    let left = TimeWindow::new(left.0, left.1);
    let right = TimeWindow::new(right.0, right.1);

    assert_eq!(left.intersects(&right), expected);
    assert_eq!(right.intersects(&left), expected);
}

#[test]
fn can_return_overlap() {
    let left = TimeWindow::new(0., 10.);
    let right = TimeWindow::new(5., 15.);

    assert_eq!(left.overlapping(&right), Some(TimeWindow::new(5., 10.)));
    assert_eq!(left.overlapping(&TimeWindow::new(11., 15.)), None);
}

#[test]
fn can_detect_malformed_window() {
    assert!(TimeWindow::new(0., 0.).is_well_formed());
    assert!(TimeWindow::new(0., 1.).is_well_formed());
    assert!(!TimeWindow::new(1., 0.).is_well_formed());
}

#[test]
fn can_compare_same_place() {
    let berlin = Location::new(52.52, 13.405);

    assert!(berlin.is_same_place(&Location::new(52.52, 13.405)));
    assert!(!berlin.is_same_place(&Location::new(52.52, 13.406)));
}

#[test]
fn can_compare_schedules() {
    assert_eq!(Schedule::new(1., 2.), Schedule::new(1., 2.));
    assert_ne!(Schedule::new(1., 2.), Schedule::new(1., 3.));
}
