use super::*;

#[test]
fn can_detect_fit() {
    let capacity = Load::new(vec![10, 5]);

    assert!(capacity.can_fit(&Load::new(vec![10, 5])));
    assert!(capacity.can_fit(&Load::new(vec![1])));
    assert!(!capacity.can_fit(&Load::new(vec![11, 0])));
    assert!(!capacity.can_fit(&Load::new(vec![0, 6])));
}

#[test]
fn can_add_and_subtract() {
    let left = Load::new(vec![3, -2]);
    let right = Load::new(vec![1, 4]);

    assert_eq!((left + right).as_vec(), vec![4, 2]);
    assert_eq!((left - right).as_vec(), vec![2, -6]);
}

#[test]
fn can_take_absolute_and_max() {
    let load = Load::new(vec![-3, 2]);

    assert_eq!(load.abs().as_vec(), vec![3, 2]);
    assert_eq!(load.max_load(Load::new(vec![1, 5])).as_vec(), vec![1, 5]);
}

#[test]
fn can_check_dimension_cap() {
    assert!(Load::try_new(vec![1; 8]).is_ok());

    let result = Load::try_new(vec![1; 9]);

    assert!(result.err().unwrap().to_string().contains("at most 8"));
}

#[test]
fn can_detect_empty() {
    assert!(Load::default().is_empty());
    assert!(Load::new(vec![0, 0]).is_empty());
    assert!(!Load::new(vec![0, 1]).is_empty());
}
