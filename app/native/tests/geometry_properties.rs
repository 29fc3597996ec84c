//! Property tests for the pure sizing core.

use aurea_lib::config::Config;
use aurea_lib::host::{ContentId, Pane, PaneId};
use aurea_lib::resize::adjacency::detect_axes;
use aurea_lib::resize::geometry::{
    Canvas, ExcludedPaneInfo, ExcludedPanes, PaneGeometry, compute_target, scale_factor,
};
use proptest::prelude::*;

fn pane(id: u32, geometry: PaneGeometry, floating: bool) -> Pane {
    Pane { id: PaneId(id), geometry, content: ContentId(id), floating }
}

fn geometry_strategy() -> impl Strategy<Value = PaneGeometry> {
    (0u32..200, 0u32..400, 1u32..200, 1u32..400)
        .prop_map(|(row, col, height, width)| PaneGeometry::new(row, col, height, width))
}

fn excluded_strategy() -> impl Strategy<Value = ExcludedPanes> {
    prop::collection::vec(geometry_strategy(), 0..6).prop_map(|geometries| {
        geometries
            .iter()
            .zip(10u32..)
            .map(|(geometry, id)| (PaneId(id), ExcludedPaneInfo::from(geometry)))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_auto_scale_never_drops_below_floor(columns in 0u32..20_000) {
        let config = Config { auto_scale: true, ..Config::default() };
        let factor = scale_factor(&config, columns);
        prop_assert!(factor >= 0.4);
        prop_assert!(factor <= 1.0 || columns < 100);
    }

    #[test]
    fn test_auto_scale_is_non_increasing(a in 0u32..20_000, b in 0u32..20_000) {
        let config = Config { auto_scale: true, ..Config::default() };
        let (narrow, wide) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scale_factor(&config, narrow) >= scale_factor(&config, wide));
    }

    #[test]
    fn test_target_fits_the_canvas(
        lines in 1u32..300,
        columns in 1u32..600,
        active in geometry_strategy(),
        excluded in excluded_strategy(),
        ratio in 1.0f64..4.0,
    ) {
        let config = Config { ratio, ..Config::default() };
        let target = compute_target(Canvas::new(lines, columns), &active, &excluded, &config);
        prop_assert!(target.height <= lines);
        prop_assert!(target.width <= columns);
    }

    #[test]
    fn test_max_width_bounds_the_target(
        columns in 1u32..2_000,
        max_width in 1u32..500,
        active in geometry_strategy(),
    ) {
        let config = Config { max_width: Some(max_width), ..Config::default() };
        let target = compute_target(Canvas::new(50, columns), &active, &ExcludedPanes::new(), &config);
        prop_assert!(target.width <= max_width);
    }

    #[test]
    fn test_zero_max_width_is_unset(columns in 1u32..2_000, active in geometry_strategy()) {
        let unset = compute_target(Canvas::new(50, columns), &active, &ExcludedPanes::new(), &Config::default());
        let zero = Config { max_width: Some(0), ..Config::default() };
        prop_assert_eq!(compute_target(Canvas::new(50, columns), &active, &ExcludedPanes::new(), &zero), unset);
    }

    #[test]
    fn test_a_single_normal_pane_has_no_axes(
        active in geometry_strategy(),
        floating in prop::collection::vec(geometry_strategy(), 0..4),
    ) {
        let mut panes = vec![pane(1, active, false)];
        panes.extend(floating.into_iter().zip(2u32..).map(|(geometry, id)| pane(id, geometry, true)));
        prop_assert!(detect_axes(&panes[0], &panes).is_empty());
    }
}
