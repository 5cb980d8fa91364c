use kdindex::{
    squared_euclidean, ColorPoint, KdTree, LinearIndex, NearestNeighbors, SplitStrategy,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_cloud(rng: &mut StdRng, n: usize) -> Vec<ColorPoint> {
    (0..n)
        .map(|_| {
            ColorPoint::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-5.0..5.0),
            )
            .with_color(
                rng.gen_range(0..256),
                rng.gen_range(0..256),
                rng.gen_range(0..256),
            )
        })
        .collect()
}

fn distances<P>(neighbors: &[kdindex::Neighbor<'_, P>]) -> Vec<f64> {
    neighbors.iter().map(|n| n.distance).collect()
}

#[test]
fn test_random() {
    let mut rng = StdRng::seed_from_u64(0);
    let points = random_cloud(&mut rng, 2000);
    let linear = LinearIndex::build(points.clone(), ColorPoint::DIMENSION).unwrap();

    for strategy in [SplitStrategy::Sort, SplitStrategy::Select] {
        let mut tree = KdTree::with_strategy(ColorPoint::DIMENSION, strategy).unwrap();
        tree.build_tree(points.clone()).unwrap();
        assert_eq!(tree.len(), linear.len());

        for _ in 0..100 {
            let query = random_cloud(&mut rng, 1).remove(0);
            let k = rng.gen_range(0..40);

            let actual = tree.k_nearest(&query, k).unwrap();
            let expected = linear.k_nearest(&query, k).unwrap();
            assert_eq!(actual.len(), k.min(tree.len()));
            assert_eq!(distances(&actual), distances(&expected));

            // Reported distances belong to the returned points.
            for neighbor in &actual {
                assert_eq!(neighbor.distance, squared_euclidean(neighbor.point, &query));
            }
        }
    }
}

#[test]
fn test_every_k() {
    let mut rng = StdRng::seed_from_u64(1);
    let points: Vec<[f64; 2]> = (0..64)
        .map(|_| [f64::from(rng.gen_range(0..8_i32)), f64::from(rng.gen_range(0..8_i32))])
        .collect();
    let tree = KdTree::build(points.clone(), 2).unwrap();
    let linear = LinearIndex::build(points, 2).unwrap();

    // Integer grid coordinates give plenty of exact distance ties.
    let query = [3.0, 4.0];
    for k in 0..=tree.len() + 2 {
        let actual = tree.k_nearest(&query, k).unwrap();
        let expected = linear.k_nearest(&query, k).unwrap();
        assert_eq!(distances(&actual), distances(&expected), "k = {k}");
        assert!(actual.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
}

#[test]
fn test_no_duplicates() {
    let mut rng = StdRng::seed_from_u64(2);
    let points: Vec<Vec<f64>> = (0..300_i32)
        .map(|i| vec![f64::from(i), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)])
        .collect();
    let tree = KdTree::build(points, 3).unwrap();

    let result = tree.k_nearest_neighbors(&vec![150.0, 0.0, 0.0], 500).unwrap();
    assert_eq!(result.len(), 300);
    let mut ids: Vec<i64> = result.iter().map(|p| p[0] as i64).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 300);
}

#[test]
fn test_idempotent() {
    let mut rng = StdRng::seed_from_u64(3);
    let tree = KdTree::build(random_cloud(&mut rng, 500), ColorPoint::DIMENSION).unwrap();
    let query = random_cloud(&mut rng, 1).remove(0);

    let first = tree.k_nearest_neighbors(&query, 25).unwrap();
    for _ in 0..5 {
        assert_eq!(tree.k_nearest_neighbors(&query, 25).unwrap(), first);
    }
}

#[test]
fn test_batch() {
    let mut rng = StdRng::seed_from_u64(4);
    let tree = KdTree::build(random_cloud(&mut rng, 1000), ColorPoint::DIMENSION).unwrap();
    let queries = random_cloud(&mut rng, 64);

    let batch = tree.k_nearest_batch(&queries, 10).unwrap();
    assert_eq!(batch.len(), queries.len());
    for (query, result) in queries.iter().zip(&batch) {
        assert_eq!(result, &tree.k_nearest(query, 10).unwrap());
    }

    let bad = vec![vec![0.0; 6], vec![0.0; 5]];
    assert!(tree.k_nearest_batch(&bad, 1).is_err());
}

#[test]
fn test_concurrent_readers() {
    let mut rng = StdRng::seed_from_u64(5);
    let points = random_cloud(&mut rng, 1000);
    let tree = KdTree::build(points.clone(), ColorPoint::DIMENSION).unwrap();
    let linear = LinearIndex::build(points, ColorPoint::DIMENSION).unwrap();
    let queries = random_cloud(&mut rng, 32);

    std::thread::scope(|scope| {
        for chunk in queries.chunks(8) {
            let (tree, linear) = (&tree, &linear);
            scope.spawn(move || {
                for query in chunk {
                    let actual = tree.k_nearest(query, 7).unwrap();
                    let expected = linear.k_nearest(query, 7).unwrap();
                    assert_eq!(distances(&actual), distances(&expected));
                }
            });
        }
    });
}
