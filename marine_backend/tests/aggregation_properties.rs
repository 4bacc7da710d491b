//! Property tests for cluster and heat aggregation.

use proptest::prelude::*;

use marine_map::{compute_clusters, compute_heat_cells, Point};

fn arb_point() -> impl Strategy<Value = Point> {
    (-80.0f64..80.0, -179.0f64..179.0, -2.0f64..35.0).prop_map(|(lat, lon, temp)| {
        Point::new(format!("{:.4}-{:.4}", lat, lon), lat, lon, temp, 35.0, "Sardine")
    })
}

fn arb_points() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(arb_point(), 0..200)
}

fn arb_cell_size() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.5), Just(1.0), Just(1.5), 0.1f64..5.0]
}

proptest! {
    #[test]
    fn prop_cluster_counts_sum_to_point_count(points in arb_points(), size in arb_cell_size()) {
        let clusters = compute_clusters(&points, size, true).unwrap();
        let total: usize = clusters.iter().map(|c| c.count).sum();
        prop_assert_eq!(total, points.len());
        prop_assert!(clusters.iter().all(|c| c.count >= 1));
    }

    #[test]
    fn prop_cluster_centers_are_cell_midpoints(points in arb_points(), size in arb_cell_size()) {
        for cluster in compute_clusters(&points, size, true).unwrap() {
            let row = (cluster.lat / size - 0.5).round();
            let col = (cluster.lon / size - 0.5).round();
            prop_assert!((cluster.lat - (row + 0.5) * size).abs() < 1e-9);
            prop_assert!((cluster.lon - (col + 0.5) * size).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_heat_intensity_bounded(points in arb_points(), size in arb_cell_size()) {
        let cells = compute_heat_cells(&points, size, true).unwrap();
        prop_assert!(cells.iter().all(|c| c.intensity > 0.0 && c.intensity <= 1.0));
        if !points.is_empty() {
            prop_assert!(cells.iter().any(|c| (c.intensity - 1.0).abs() < f64::EPSILON));
        }
    }

    #[test]
    fn prop_heat_bounds_span_one_cell(points in arb_points(), size in arb_cell_size()) {
        for cell in compute_heat_cells(&points, size, true).unwrap() {
            let [[south, west], [north, east]] = cell.bounds;
            prop_assert!((north - south - size).abs() < 1e-9);
            prop_assert!((east - west - size).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_disabled_layers_are_empty(points in arb_points(), size in arb_cell_size()) {
        prop_assert!(compute_clusters(&points, size, false).unwrap().is_empty());
        prop_assert!(compute_heat_cells(&points, size, false).unwrap().is_empty());
    }

    #[test]
    fn prop_input_order_does_not_matter(points in arb_points(), size in arb_cell_size()) {
        let mut reversed = points.clone();
        reversed.reverse();
        prop_assert_eq!(
            compute_clusters(&points, size, true).unwrap(),
            compute_clusters(&reversed, size, true).unwrap()
        );
        prop_assert_eq!(
            compute_heat_cells(&points, size, true).unwrap(),
            compute_heat_cells(&reversed, size, true).unwrap()
        );
    }
}
