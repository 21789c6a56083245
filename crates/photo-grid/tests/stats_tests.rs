use photo_grid::*;

fn config(rows: usize, columns: usize) -> GridConfig {
    GridConfig {
        rows,
        columns,
        ..Default::default()
    }
}

#[test]
fn test_stats_no_images() {
    let result = calculate_statistics(0, &config(2, 2));
    assert!(matches!(result, Err(GridError::NoImages)));
}

#[test]
fn test_stats_partial_last_page() {
    let stats = calculate_statistics(5, &config(2, 2)).unwrap();

    assert_eq!(stats.images, 5);
    assert_eq!(stats.cells_per_page, 4);
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.last_page_filled, 1);
    assert_eq!(stats.empty_cells, 3);
}

#[test]
fn test_stats_exact_fill() {
    let stats = calculate_statistics(12, &config(3, 4)).unwrap();

    assert_eq!(stats.pages, 1);
    assert_eq!(stats.last_page_filled, 12);
    assert_eq!(stats.empty_cells, 0);
}

#[test]
fn test_stats_page_count_matches_ceiling() {
    for rows in 1..4 {
        for cols in 1..4 {
            for n in 1..30 {
                let stats = calculate_statistics(n, &config(rows, cols)).unwrap();
                assert_eq!(stats.pages, n.div_ceil(rows * cols));
                assert_eq!(
                    (stats.pages - 1) * stats.cells_per_page + stats.last_page_filled,
                    n
                );
            }
        }
    }
}

#[test]
fn test_stats_invalid_config() {
    let result = calculate_statistics(3, &config(0, 2));
    assert!(matches!(result, Err(GridError::Config(_))));
}

#[test]
fn test_stats_oversized_grid_is_config_error() {
    let result = calculate_statistics(3, &config(usize::MAX / 2, 3));
    assert!(matches!(result, Err(GridError::Config(_))));
}
