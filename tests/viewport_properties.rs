#[cfg(test)]
mod viewport_property_tests {
    use wastemap::{
        animation::inertia::InertiaEngine,
        core::{
            config::{MapMode, ViewportConfig},
            geo::Point,
            map::{Driver, MapView},
        },
        input::events::GestureEvent,
        layers::marker::{Category, CategoryFilter, MarkerId, MarkerLayer},
        runtime::FrameLoop,
        ui::popup::{SelectionController, SelectionState},
    };

    const MARKERS: &str = r#"[
        { "id": "c1", "lat": 10.0, "lng": 10.0, "category": "collection", "name": "Bakery bins" },
        { "id": "c2", "lat": 40.0, "lng": 25.0, "category": "collection", "name": "Market" },
        { "id": "v1", "lat": 60.0, "lng": 70.0, "category": "valorisation", "name": "Biogas plant" },
        { "id": "v2", "lat": 75.0, "lng": 35.0, "category": "valorisation", "name": "Compost" },
        { "id": "d1", "lat": 90.0, "lng": 90.0, "category": "distribution", "name": "Food bank" }
    ]"#;

    fn markers() -> MarkerLayer {
        MarkerLayer::from_json(MARKERS).expect("sample markers are valid")
    }

    fn settle(map: &mut MapView, mut now: f64) -> f64 {
        for _ in 0..2000 {
            if map.driver() == Driver::Idle {
                return now;
            }
            now += 16.0;
            map.tick(now);
        }
        panic!("viewport never settled");
    }

    #[test]
    fn test_offset_stays_within_elastic_limit() {
        let config = ViewportConfig::default();
        let mut map = MapView::new(MapMode::Nearby, MarkerLayer::default());
        let elastic_limit = |raw_reach: f64| {
            config.bounds_max + (raw_reach - config.bounds_max).max(0.0) * config.resistance_factor
        };

        let deltas = [
            (120.0, -40.0),
            (380.0, 250.0),
            (-900.0, 900.0),
            (640.0, -720.0),
            (15.0, 5.0),
        ];
        let mut now = 0.0;
        for (dx, dy) in deltas {
            map.handle_gesture(GestureEvent::press(200.0, 400.0, now));
            // Farthest raw offset this gesture can propose on each axis
            let start = map.state().unbounded_offset();
            let limit_x = elastic_limit(start.x.abs() + f64::abs(dx)) + 1e-9;
            let limit_y = elastic_limit(start.y.abs() + f64::abs(dy)) + 1e-9;

            for step in 1..=10 {
                let t = step as f64 / 10.0;
                now += 16.0;
                map.handle_gesture(GestureEvent::moved(200.0 + dx * t, 400.0 + dy * t, now));
                let offset = map.state().offset();
                assert!(
                    offset.x.abs() <= limit_x && offset.y.abs() <= limit_y,
                    "offset {:?} escaped elastic limit ({}, {})",
                    offset,
                    limit_x,
                    limit_y
                );
            }
            now += 16.0;
            map.handle_gesture(GestureEvent::release(200.0 + dx, 400.0 + dy, now));
            now = settle(&mut map, now);
        }
    }

    #[test]
    fn test_inertia_velocity_decays_monotonically() {
        let config = ViewportConfig::default();
        let mut frames = FrameLoop::new();
        let mut engine = InertiaEngine::new();
        let mut state = config.initial_state();

        // Hard enough to hit the bounds on both axes
        engine.start(Point::new(45.0, -38.0), &mut frames);
        let mut previous = engine.velocity();
        while engine.is_running() {
            state = engine.step(&state, &config);
            let current = engine.velocity();
            assert!(current.x.abs() <= previous.x.abs());
            assert!(current.y.abs() <= previous.y.abs());
            assert!(current.length() < previous.length());
            previous = current;
        }
        assert_eq!(engine.velocity(), Point::ZERO);
    }

    #[test]
    fn test_recenter_is_exact_from_any_state() {
        let flings = [(35.0, 0.0), (-80.0, 60.0), (400.0, -400.0)];
        for (dx, dy) in flings {
            let mut map = MapView::new(MapMode::Global, MarkerLayer::default());
            map.zoom_in();
            let now = settle(&mut map, 0.0);

            map.handle_gesture(GestureEvent::press(0.0, 0.0, now));
            map.handle_gesture(GestureEvent::moved(dx, dy, now + 16.0));
            map.handle_gesture(GestureEvent::release(dx, dy, now + 20.0));
            map.tick(now + 32.0);

            map.recenter();
            settle(&mut map, now + 40.0);
            assert_eq!(map.state().offset(), Point::ZERO);
            assert_eq!(map.state().scale(), 1.0);
        }
    }

    #[test]
    fn test_single_selection_under_any_tap_sequence() {
        let layer = markers();
        let mut selection = SelectionController::new();
        let ids = ["c1", "v1", "c1", "d1", "zz", "v2"];

        for (i, id) in ids.iter().enumerate() {
            selection.tap(&MarkerId::from(*id), &layer);
            if i % 3 == 2 {
                selection.close();
            }
            match selection.state() {
                SelectionState::None => assert!(selection.selected().is_none()),
                SelectionState::Selected(selected) => {
                    assert!(layer.is_visible(selected));
                }
            }
        }
        // The last tap was followed by a close
        assert_eq!(selection.state(), &SelectionState::None);
    }

    #[test]
    fn test_filter_returns_exact_category_set() {
        let mut layer = markers();
        for category in Category::ALL {
            layer.set_filter(CategoryFilter::Only(category));
            let visible: Vec<_> = layer.visible().map(|m| m.id.clone()).collect();
            let expected: Vec<_> = layer
                .all()
                .iter()
                .filter(|m| m.category == category)
                .map(|m| m.id.clone())
                .collect();
            assert_eq!(visible, expected);
        }

        layer.set_filter(CategoryFilter::All);
        assert_eq!(layer.visible().count(), layer.all().len());
    }

    #[test]
    fn test_boundary_formula_example() {
        let state = ViewportConfig::default().initial_state();
        let update = state.bounded_update(Point::new(450.0, 0.0));
        assert!((update.state.offset().x - 415.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp_example() {
        let mut map = MapView::new(MapMode::Nearby, MarkerLayer::default());
        let mut now = 0.0;
        for expected in [1.2, 1.4, 1.6, 1.8, 2.0, 2.0] {
            map.zoom_in();
            now = settle(&mut map, now);
            assert_eq!(map.state().scale(), expected);
        }
    }

    #[test]
    fn test_fling_past_bounds_never_jumps_back() {
        let mut map = MapView::new(MapMode::Nearby, MarkerLayer::default());
        map.handle_gesture(GestureEvent::press(0.0, 0.0, 0.0));
        map.handle_gesture(GestureEvent::moved(590.0, 0.0, 16.0));
        map.handle_gesture(GestureEvent::moved(600.0, 0.0, 32.0));
        map.handle_gesture(GestureEvent::release(600.0, 0.0, 32.0));
        assert_eq!(map.driver(), Driver::Inertia);
        assert!((map.state().offset().x - 460.0).abs() < 1e-9);

        let mut now = 32.0;
        let mut previous = map.state().offset().x;
        while map.driver() != Driver::Idle {
            now += 16.0;
            map.tick(now);
            let x = map.state().offset().x;
            assert!(x >= previous, "offset moved from {} back to {}", previous, x);
            previous = x;
        }
        assert!(previous > 460.0);
    }

    #[test]
    fn test_press_halts_inertia_at_current_offset() {
        let mut map = MapView::new(MapMode::Nearby, MarkerLayer::default());
        map.handle_gesture(GestureEvent::press(0.0, 0.0, 0.0));
        map.handle_gesture(GestureEvent::moved(0.0, 24.0, 16.0));
        map.handle_gesture(GestureEvent::release(0.0, 24.0, 20.0));
        assert_eq!(map.driver(), Driver::Inertia);

        for frame in 1..=5 {
            map.tick(20.0 + frame as f64 * 16.0);
        }
        let pending = map.scheduler_mut().take_due();
        let interrupted_at = map.state().offset();

        map.handle_gesture(GestureEvent::press(50.0, 50.0, 110.0));
        for handle in pending {
            assert!(!map.on_frame(handle, 116.0), "stale inertia frame applied");
        }
        assert_eq!(map.state().offset(), interrupted_at);

        map.handle_gesture(GestureEvent::moved(50.0, 60.0, 126.0));
        let offset = map.state().offset();
        assert!((offset.y - (interrupted_at.y + 10.0)).abs() < 1e-9);
        assert_eq!(offset.x, interrupted_at.x);
    }
}
