use super::*;

#[test]
fn can_reproduce_sequence_with_seed() {
    let first = DefaultRandom::new_with_seed(42);
    let second = DefaultRandom::new_with_seed(42);

    let left = (0..100).map(|_| first.uniform_int(0, 1000)).collect::<Vec<_>>();
    let right = (0..100).map(|_| second.uniform_int(0, 1000)).collect::<Vec<_>>();

    assert_eq!(left, right);
}

#[test]
fn can_stay_within_bounds() {
    let random = DefaultRandom::new_with_seed(1);

    for _ in 0..1000 {
        let int = random.uniform_int(-5, 5);
        assert!((-5..=5).contains(&int));

        let real = random.uniform_real(0.5, 1.5);
        assert!((0.5..1.5).contains(&real));
    }
}

#[test]
fn can_handle_collapsed_ranges() {
    let random = DefaultRandom::new_with_seed(1);

    assert_eq!(random.uniform_int(7, 7), 7);
    assert_eq!(random.uniform_real(3., 3.), 3.);
}

#[test]
fn can_return_weights() {
    let random = DefaultRandom::new_with_seed(123);
    let weights = &[100, 50, 20];
    let experiments = 10000_usize;
    let total_sum = weights.iter().sum::<usize>();
    let mut counter = [0_usize; 3];

    (0..experiments).for_each(|_| {
        let idx = random.weighted(weights);
        counter[idx] += 1;
    });

    weights.iter().enumerate().for_each(|(idx, weight)| {
        let actual_ratio = counter[idx] as f64 / experiments as f64;
        let expected_ratio = *weight as f64 / total_sum as f64;

        assert!((actual_ratio - expected_ratio).abs() < 0.05);
    });
}
