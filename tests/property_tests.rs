//! Property-based tests for moea-harness
//!
//! Uses proptest to verify invariants of the Pareto utilities and engines.

use moea_harness::prelude::*;
use proptest::prelude::*;
use rand::SeedableRng;

/// Objective vectors on a coarse grid so ties and dominance both occur often
fn points(max_len: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec((0u8..6).prop_map(f64::from), 2), 1..max_len)
}

fn vertex() -> impl Strategy<Value = VertexPos> {
    (0.0..1.0f64, 0.0..1.0f64).prop_map(|(x, y)| VertexPos::new(x, y))
}

proptest! {
    // ==================== Dominance ====================

    #[test]
    fn dominance_is_irreflexive(a in prop::collection::vec(-10.0..10.0f64, 1..5)) {
        prop_assert!(!dominates(&a, &a));
    }

    #[test]
    fn dominance_is_asymmetric(
        a in prop::collection::vec(-3i8..3, 3),
        b in prop::collection::vec(-3i8..3, 3)
    ) {
        let a: Vec<f64> = a.into_iter().map(f64::from).collect();
        let b: Vec<f64> = b.into_iter().map(f64::from).collect();
        prop_assert!(!(dominates(&a, &b) && dominates(&b, &a)));
    }

    #[test]
    fn dominance_is_transitive(
        a in prop::collection::vec(0u8..4, 2),
        b in prop::collection::vec(0u8..4, 2),
        c in prop::collection::vec(0u8..4, 2)
    ) {
        let [a, b, c] = [a, b, c].map(|v| v.into_iter().map(f64::from).collect::<Vec<f64>>());
        if dominates(&a, &b) && dominates(&b, &c) {
            prop_assert!(dominates(&a, &c));
        }
    }

    // ==================== Non-dominated sort ====================

    #[test]
    fn fronts_partition_the_population(pts in points(40)) {
        let fronts = fast_non_dominated_sort(&pts);
        let mut seen = vec![0usize; pts.len()];
        for front in &fronts {
            prop_assert!(!front.is_empty());
            for &i in front {
                seen[i] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn first_front_is_mutually_non_dominated(pts in points(40)) {
        let fronts = fast_non_dominated_sort(&pts);
        for &i in &fronts[0] {
            for &j in &fronts[0] {
                prop_assert!(!dominates(&pts[i], &pts[j]));
            }
        }
        prop_assert_eq!(non_dominated(&pts), {
            let mut first = fronts[0].clone();
            first.sort_unstable();
            first
        });
    }

    #[test]
    fn later_fronts_are_dominated_by_earlier_ones(pts in points(40)) {
        let fronts = fast_non_dominated_sort(&pts);
        let ranks = ranks_from_fronts(&fronts, pts.len());
        for (k, front) in fronts.iter().enumerate().skip(1) {
            for &i in front {
                prop_assert!(fronts[k - 1].iter().any(|&j| dominates(&pts[j], &pts[i])));
            }
        }
        // nothing is dominated by a member of its own or a later front
        for i in 0..pts.len() {
            for j in 0..pts.len() {
                if dominates(&pts[j], &pts[i]) {
                    prop_assert!(ranks[j] < ranks[i]);
                }
            }
        }
    }

    // ==================== Crowding distance ====================

    #[test]
    fn crowding_extremes_are_infinite(pts in points(30)) {
        let fronts = fast_non_dominated_sort(&pts);
        for front in &fronts {
            let distances = crowding_distance(&pts, front);
            prop_assert_eq!(distances.len(), front.len());
            prop_assert!(distances.iter().all(|&d| d >= 0.0));

            for obj in 0..2 {
                let values: Vec<f64> = front.iter().map(|&i| pts[i][obj]).collect();
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let infinite_at = |target: f64| {
                    values.iter().zip(&distances).any(|(&v, d)| v == target && d.is_infinite())
                };
                prop_assert!(infinite_at(min));
                prop_assert!(infinite_at(max));
            }
        }
    }

    // ==================== Density ====================

    #[test]
    fn knn_density_is_bounded(pts in points(20), k in 1usize..6) {
        for i in 0..pts.len() {
            let density = kth_nearest_neighbor_density(&pts, i, k);
            prop_assert!(density > 0.0 && density <= 0.5);
        }
    }

    #[test]
    fn kth_distance_grows_with_k(pts in points(20)) {
        for i in 0..pts.len() {
            let mut previous = 0.0;
            for k in 1..pts.len() {
                let d = kth_nearest_distance(&pts, i, k);
                prop_assert!(d >= previous);
                previous = d;
            }
        }
    }

    // ==================== Geometry ====================

    #[test]
    fn segment_intersection_is_symmetric(
        a in vertex(),
        b in vertex(),
        c in vertex(),
        d in vertex()
    ) {
        let forward = segments_intersect(a, b, c, d);
        prop_assert_eq!(forward, segments_intersect(c, d, a, b));
        prop_assert_eq!(forward, segments_intersect(b, a, d, c));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // ==================== Engines ====================

    #[test]
    fn sga_keeps_population_size(
        size in 2usize..24,
        generations in 0usize..8,
        seed in any::<u64>()
    ) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let problem = ZdtProblem::new(ZdtVariant::Zdt2, 3).unwrap();
        let config = SgaConfig::default()
            .with_population_size(size)
            .with_mating_pool_percentile(1.0);
        let mut sga = Sga::new(
            problem,
            MaxGenerations::new(generations),
            config,
            Operators::embedded(0.3),
            NullLogger,
        )
        .unwrap();

        let result = sga.run(&mut rng).unwrap();
        prop_assert_eq!(sga.population().len(), size);
        prop_assert_eq!(result.generations, generations);
        prop_assert!(result.history.iter().all(|g| g.population_size == size));
    }

    #[test]
    fn spea2_archive_has_configured_size(
        size in 4usize..20,
        archive_fraction in 0.1..1.0f64,
        seed in any::<u64>()
    ) {
        let archive = ((size as f64 * archive_fraction) as usize).max(1);
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let problem = ZdtProblem::new(ZdtVariant::Zdt1, 3).unwrap();
        let config = Spea2Config::default()
            .with_population_size(size)
            .with_archive_size(archive);
        let mut spea2 = Spea2::new(
            problem,
            MaxGenerations::new(4),
            config,
            Operators::embedded(0.3),
            NullLogger,
        )
        .unwrap();

        spea2.run(&mut rng).unwrap();
        prop_assert_eq!(spea2.archive().len(), archive);
        prop_assert_eq!(spea2.population().len(), size);
    }
}
