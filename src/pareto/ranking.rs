//! Dominance, non-dominated sorting and crowding distance
//!
//! Reference: Deb, K., Pratap, A., Agarwal, S., & Meyarivan, T. (2002).
//! A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II.
//! IEEE Transactions on Evolutionary Computation, 6(2).

/// Check if `a` dominates `b`
/// (all objectives <= and at least one <, since we minimize)
///
/// Vectors are compared component-wise; callers must pass vectors of equal length.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    debug_assert_eq!(a.len(), b.len(), "objective vectors differ in length");
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Fast non-dominated sort
///
/// Returns fronts where `fronts[0]` is the Pareto-optimal front. Every index in
/// `0..points.len()` appears in exactly one front, and the front index is the
/// point's rank.
pub fn fast_non_dominated_sort<P: AsRef<[f64]>>(points: &[P]) -> Vec<Vec<usize>> {
    let n = points.len();
    if n == 0 {
        return vec![];
    }

    // domination_count[i] = number of points that dominate i
    let mut domination_count = vec![0usize; n];
    // dominated_set[i] = points that i dominates
    let mut dominated_set: Vec<Vec<usize>> = vec![vec![]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (points[i].as_ref(), points[j].as_ref());
            if dominates(a, b) {
                dominated_set[i].push(j);
                domination_count[j] += 1;
            } else if dominates(b, a) {
                dominated_set[j].push(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = vec![];
    let mut current_front: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    while !current_front.is_empty() {
        let mut next_front = vec![];
        for &i in &current_front {
            for &j in &dominated_set[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next_front.push(j);
                }
            }
        }
        fronts.push(current_front);
        current_front = next_front;
    }

    fronts
}

/// Per-point rank derived from the output of [`fast_non_dominated_sort`]
pub fn ranks_from_fronts(fronts: &[Vec<usize>], len: usize) -> Vec<usize> {
    let mut ranks = vec![usize::MAX; len];
    for (rank, front) in fronts.iter().enumerate() {
        for &i in front {
            ranks[i] = rank;
        }
    }
    ranks
}

/// Indices of the non-dominated points
pub fn non_dominated<P: AsRef<[f64]>>(points: &[P]) -> Vec<usize> {
    (0..points.len())
        .filter(|&i| {
            !points
                .iter()
                .any(|other| dominates(other.as_ref(), points[i].as_ref()))
        })
        .collect()
}

/// Calculate crowding distance for a front
///
/// The result is aligned with `front`: `distances[k]` belongs to `points[front[k]]`.
/// Boundary points of every objective get `f64::INFINITY`; a dimension where all
/// values coincide contributes nothing.
pub fn crowding_distance<P: AsRef<[f64]>>(points: &[P], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distances = vec![0.0; n];
    let num_objectives = points[front[0]].as_ref().len();
    let value = |k: usize, obj: usize| points[front[k]].as_ref()[obj];

    for obj in 0..num_objectives {
        // positions into `front`, sorted by this objective
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| value(a, obj).total_cmp(&value(b, obj)));

        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        let range = value(order[n - 1], obj) - value(order[0], obj);
        if range > 0.0 && range.is_finite() {
            for w in 1..(n - 1) {
                let gap = value(order[w + 1], obj) - value(order[w - 1], obj);
                distances[order[w]] += gap / range;
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domination() {
        assert!(dominates(&[1.0, 1.0], &[2.0, 2.0]));
        assert!(dominates(&[1.0, 2.0], &[1.0, 3.0]));
        assert!(!dominates(&[1.0, 3.0], &[2.0, 2.0]));
        assert!(!dominates(&[2.0, 2.0], &[1.0, 3.0]));
        assert!(!dominates(&[1.0, 1.0], &[1.0, 1.0]));
    }

    #[test]
    fn test_domination_single_and_many_objectives() {
        assert!(dominates(&[0.5], &[0.7]));
        assert!(!dominates(&[0.7], &[0.5]));
        assert!(dominates(&[0.0, 0.0, 0.0, 1.0], &[0.0, 0.0, 0.0, 2.0]));
    }

    #[test]
    fn test_non_dominated_sort() {
        let points = vec![
            vec![1.0, 5.0], // front 0
            vec![2.0, 4.0], // front 0
            vec![3.0, 3.0], // front 0
            vec![2.0, 5.0], // front 1 (dominated by 0 and 1)
            vec![4.0, 4.0], // front 1
        ];

        let fronts = fast_non_dominated_sort(&points);
        assert_eq!(fronts.len(), 2);

        let mut f0 = fronts[0].clone();
        f0.sort();
        assert_eq!(f0, vec![0, 1, 2]);

        let ranks = ranks_from_fronts(&fronts, points.len());
        assert_eq!(ranks, vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_sort_chain() {
        let points = vec![vec![3.0, 3.0], vec![1.0, 1.0], vec![2.0, 2.0]];
        let fronts = fast_non_dominated_sort(&points);
        assert_eq!(fronts, vec![vec![1], vec![2], vec![0]]);
    }

    #[test]
    fn test_sort_empty() {
        let points: Vec<Vec<f64>> = vec![];
        assert!(fast_non_dominated_sort(&points).is_empty());
    }

    #[test]
    fn test_non_dominated_matches_first_front() {
        let points = vec![vec![1.0, 4.0], vec![2.0, 2.0], vec![3.0, 3.0], vec![4.0, 1.0]];
        let mut front = fast_non_dominated_sort(&points)[0].clone();
        front.sort();
        assert_eq!(non_dominated(&points), front);
    }

    #[test]
    fn test_crowding_distance() {
        let points = vec![
            vec![0.0, 4.0],
            vec![1.0, 3.0],
            vec![2.0, 2.0],
            vec![3.0, 1.0],
            vec![4.0, 0.0],
        ];
        let front = vec![0, 1, 2, 3, 4];
        let d = crowding_distance(&points, &front);

        assert!(d[0].is_infinite());
        assert!(d[4].is_infinite());
        // interior: (2/4) per objective, two objectives
        for k in 1..4 {
            assert!((d[k] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_crowding_distance_small_fronts() {
        let points = vec![vec![1.0, 1.0], vec![2.0, 0.0]];
        assert_eq!(crowding_distance(&points, &[0]), vec![f64::INFINITY]);
        assert_eq!(
            crowding_distance(&points, &[0, 1]),
            vec![f64::INFINITY, f64::INFINITY]
        );
        assert!(crowding_distance(&points, &[]).is_empty());
    }

    #[test]
    fn test_crowding_distance_flat_dimension_contributes_zero() {
        let points = vec![
            vec![0.0, 7.0],
            vec![1.0, 7.0],
            vec![3.0, 7.0],
            vec![4.0, 7.0],
        ];
        let d = crowding_distance(&points, &[0, 1, 2, 3]);
        assert!(d.iter().all(|x| !x.is_nan()));
        assert!((d[1] - 0.75).abs() < 1e-12);
        assert!((d[2] - 0.75).abs() < 1e-12);
    }
}
