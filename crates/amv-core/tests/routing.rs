use amv_core::{
    init, validate_size, Dispatcher, KernelConfig, KernelError, Schedule, SquareMatrix,
    Strategy, TileGrid,
};

#[test]
fn boundary_sizes_route_to_expected_kernel() {
    let d = Dispatcher::new(KernelConfig::default().with_worker_count(4)).unwrap();
    let cases = [
        (0, Strategy::Sequential),
        (1, Strategy::Sequential),
        (20, Strategy::Sequential),
        (21, Strategy::FlatParallel),
        (200, Strategy::FlatParallel),
        (201, Strategy::BlockedParallel),
    ];
    for (n, expected) in cases {
        let (a, x) = init::deterministic(n).unwrap();
        let mut y = vec![0; n];
        assert_eq!(d.multiply(&a, &x, &mut y).unwrap(), expected, "n={}", n);
    }
}

#[test]
fn zero_size_is_empty_and_ok() {
    let d = Dispatcher::with_defaults();
    let a = SquareMatrix::allocate(0).unwrap();
    let mut y: Vec<i32> = Vec::new();
    d.multiply(&a, &[], &mut y).unwrap();
    assert!(y.is_empty());
    for s in [Strategy::FlatParallel, Strategy::BlockedParallel] {
        d.kernel(s).multiply(a.view(), &[], &mut y).unwrap();
    }
}

#[test]
fn zero_size_produces_no_work_units() {
    for schedule in [
        Schedule::Static,
        Schedule::Dynamic { chunk: 1 },
        Schedule::Guided { min_chunk: 1 },
    ] {
        for workers in [1, 4, 64] {
            assert!(schedule.partition(0, workers).is_empty(), "{:?}", schedule);
        }
    }
    let grid = TileGrid::new(0, 64);
    assert!(grid.is_empty());
    assert_eq!(grid.iter().count(), 0);
}

#[test]
fn negative_size_rejected() {
    assert_eq!(
        validate_size(-5).unwrap_err(),
        KernelError::InvalidSize { n: -5 }
    );
}

#[test]
fn env_style_config_drives_routing() {
    let config = KernelConfig::from_lookup(|key| match key {
        "AMV_SEQUENTIAL_MAX" => Some("4".to_string()),
        "AMV_FLAT_MAX" => Some("8".to_string()),
        "AMV_WORKERS" => Some("2".to_string()),
        _ => None,
    })
    .unwrap();
    let d = Dispatcher::new(config).unwrap();
    assert_eq!(d.select(4), Strategy::Sequential);
    assert_eq!(d.select(5), Strategy::FlatParallel);
    assert_eq!(d.select(9), Strategy::BlockedParallel);
}
