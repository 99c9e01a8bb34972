//! Batch distance calculations with optional parallelism.
//!
//! Used to annotate search results with their distance from the user when
//! the server did not supply one, and to order them nearest first.

use crate::{haversine_distance, Coordinate};

/// Distance in kilometers from `origin` to each of `points`, in input order.
///
/// Invalid coordinates yield `f64::INFINITY`.
///
/// # Example
/// ```
/// use healthwatch_geo::{distances_from, Coordinate};
///
/// let origin = Coordinate::new(5.6037, -0.1870);
/// let points = [Coordinate::new(6.6885, -1.6244), Coordinate::new(91.0, 0.0)];
///
/// let distances = distances_from(&origin, &points);
/// assert!((distances[0] - 199.5).abs() < 2.0);
/// assert!(distances[1].is_infinite());
/// ```
pub fn distances_from(origin: &Coordinate, points: &[Coordinate]) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .map(|point| single_distance(origin, point))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .iter()
            .map(|point| single_distance(origin, point))
            .collect()
    }
}

/// Indices of `points` ordered by distance from `origin`, closest first.
///
/// The sort is stable, so equally distant points keep their input order.
pub fn nearest_first(origin: &Coordinate, points: &[Coordinate]) -> Vec<usize> {
    let distances = distances_from(origin, points);
    let mut indices: Vec<usize> = (0..points.len()).collect();
    indices.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
    indices
}

#[inline]
fn single_distance(origin: &Coordinate, point: &Coordinate) -> f64 {
    if point.is_valid() {
        haversine_distance(origin, point)
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(-1.2921, 36.8219), // Nairobi
            Coordinate::new(6.6885, -1.6244),  // Kumasi
            Coordinate::new(200.0, 0.0),       // invalid
            Coordinate::new(6.5244, 3.3792),   // Lagos
        ]
    }

    #[test]
    fn test_batch_distances() {
        let accra = Coordinate::new(5.6037, -0.1870);
        let distances = distances_from(&accra, &test_points());

        assert_eq!(distances.len(), 4);
        assert!(distances[1] > 150.0 && distances[1] < 250.0);
        assert!(distances[2].is_infinite());
    }

    #[test]
    fn test_nearest_first() {
        let accra = Coordinate::new(5.6037, -0.1870);
        let order = nearest_first(&accra, &test_points());
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_empty_input() {
        let accra = Coordinate::new(5.6037, -0.1870);
        assert!(distances_from(&accra, &[]).is_empty());
        assert!(nearest_first(&accra, &[]).is_empty());
    }
}
