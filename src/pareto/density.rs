//! k-th nearest neighbor density estimation
//!
//! Reference: Zitzler, E., Laumanns, M., & Thiele, L. (2001).
//! SPEA2: Improving the Strength Pareto Evolutionary Algorithm.

/// Euclidean distance between two objective vectors
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Symmetric matrix of pairwise objective-space distances
pub fn distance_matrix<P: AsRef<[f64]>>(points: &[P]) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean_distance(points[i].as_ref(), points[j].as_ref());
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

/// Distance from `points[index]` to its k-th closest other point
///
/// `k` is 1-based and clamped to the number of other points; with no other
/// points the distance is `0.0`.
pub fn kth_nearest_distance<P: AsRef<[f64]>>(points: &[P], index: usize, k: usize) -> f64 {
    let me = points[index].as_ref();
    let mut distances: Vec<f64> = points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != index)
        .map(|(_, other)| euclidean_distance(me, other.as_ref()))
        .collect();
    kth_smallest(&mut distances, k)
}

/// SPEA2 density score for a k-th nearest neighbor distance
///
/// Always in `(0, 0.5]`, so it never outweighs one unit of raw fitness.
pub fn knn_density(distance: f64) -> f64 {
    1.0 / (distance + 2.0)
}

/// Density of `points[index]` from its k-th nearest neighbor
pub fn kth_nearest_neighbor_density<P: AsRef<[f64]>>(points: &[P], index: usize, k: usize) -> f64 {
    knn_density(kth_nearest_distance(points, index, k))
}

/// Conventional neighbor count: `sqrt(sample size)`, at least 1
pub fn default_density_k(sample_size: usize) -> usize {
    ((sample_size as f64).sqrt() as usize).max(1)
}

/// k-th smallest value (1-based, clamped) of `values`, reordering it in place
pub(crate) fn kth_smallest(values: &mut [f64], k: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = k.clamp(1, values.len()) - 1;
    let (_, kth, _) = values.select_nth_unstable_by(idx, |a, b| a.total_cmp(b));
    *kth
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_distance() {
        assert_relative_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_kth_nearest_distance() {
        let points = vec![vec![0.0], vec![1.0], vec![3.0], vec![7.0]];
        assert_relative_eq!(kth_nearest_distance(&points, 0, 1), 1.0);
        assert_relative_eq!(kth_nearest_distance(&points, 0, 2), 3.0);
        assert_relative_eq!(kth_nearest_distance(&points, 0, 3), 7.0);
        // clamped to the farthest neighbor
        assert_relative_eq!(kth_nearest_distance(&points, 0, 10), 7.0);
        assert_relative_eq!(kth_nearest_distance(&points, 2, 1), 2.0);
    }

    #[test]
    fn test_kth_nearest_distance_lonely_point() {
        let points = vec![vec![5.0, 5.0]];
        assert_eq!(kth_nearest_distance(&points, 0, 1), 0.0);
    }

    #[test]
    fn test_density() {
        assert_relative_eq!(knn_density(0.0), 0.5);
        assert_relative_eq!(knn_density(2.0), 0.25);

        let points = vec![vec![0.0, 0.0], vec![0.0, 2.0]];
        assert_relative_eq!(kth_nearest_neighbor_density(&points, 0, 1), 0.25);
    }

    #[test]
    fn test_distance_matrix_is_symmetric() {
        let points = vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![6.0, 8.0]];
        let m = distance_matrix(&points);
        assert_relative_eq!(m[0][1], 5.0);
        assert_relative_eq!(m[0][2], 10.0);
        assert_eq!(m[2][0], m[0][2]);
        assert_eq!(m[1][1], 0.0);
    }

    #[test]
    fn test_default_density_k() {
        assert_eq!(default_density_k(100), 10);
        assert_eq!(default_density_k(0), 1);
        assert_eq!(default_density_k(8), 2);
    }
}
