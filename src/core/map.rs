use crate::{
    animation::{
        inertia::InertiaEngine,
        transitions::{SettleKind, SettlingAnimation},
    },
    constants::{MARKER_HIT_RADIUS, VELOCITY_MAX_AGE_FRAMES},
    core::{
        config::{InteractionProfile, MapMode, ViewportConfig},
        geo::Point,
        viewport::{ViewGeometry, ViewportState},
    },
    input::{
        drag::DragSession,
        events::{GestureEvent, GesturePhase, InputEvent, MapEvent},
        gestures::GestureAdapter,
        handler::EventManager,
    },
    layers::marker::{CategoryFilter, MarkerId, MarkerLayer, MarkerPoint},
    runtime::{FrameHandle, FrameLoop, FrameScheduler},
    ui::popup::{NavigationRequest, SelectionController},
    Result,
};

/// Whatever currently has the right to move the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Idle,
    Dragging,
    Inertia,
    Settling,
}

/// One interactive map screen.
///
/// Owns the viewport state and routes every change through exactly one
/// driver at a time: a drag, an inertia coast or a settle animation. Any
/// press cancels the other two before the new drag starts, and every control
/// action cancels whatever was running before it animates.
///
/// Frames are requested from the scheduler `S`; the host hands each due
/// [`FrameHandle`] back through [`on_frame`](Self::on_frame). Handles that no
/// longer belong to a live driver are ignored.
pub struct MapView<S: FrameScheduler = FrameLoop> {
    config: ViewportConfig,
    mode: MapMode,
    state: ViewportState,
    geometry: ViewGeometry,
    drag: Option<DragSession>,
    inertia: InertiaEngine,
    settle: Option<SettlingAnimation>,
    gestures: GestureAdapter,
    markers: MarkerLayer,
    selection: SelectionController,
    events: EventManager,
    scheduler: S,
}

impl MapView<FrameLoop> {
    /// A map in `mode` driven by an in-process [`FrameLoop`].
    pub fn new(mode: MapMode, markers: MarkerLayer) -> Self {
        let config = mode.profile().resolve();
        Self::build(config, mode, markers, FrameLoop::new())
    }

    /// Delivers every frame due on the loop. Returns how many were applied.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        self.scheduler
            .take_due()
            .into_iter()
            .filter(|handle| self.on_frame(*handle, now_ms))
            .count()
    }
}

impl<S: FrameScheduler> MapView<S> {
    /// A map with a validated profile and a host-provided scheduler.
    ///
    /// Custom profiles start in [`MapMode::Nearby`]; switching modes later
    /// replaces them with the mode's preset.
    pub fn with_scheduler(
        profile: InteractionProfile,
        markers: MarkerLayer,
        scheduler: S,
    ) -> Result<Self> {
        let config = profile.resolve();
        config.validate()?;
        let mode = match profile {
            InteractionProfile::Global => MapMode::Global,
            _ => MapMode::Nearby,
        };
        Ok(Self::build(config, mode, markers, scheduler))
    }

    fn build(config: ViewportConfig, mode: MapMode, markers: MarkerLayer, scheduler: S) -> Self {
        Self {
            state: config.initial_state(),
            config,
            mode,
            geometry: ViewGeometry::default(),
            drag: None,
            inertia: InertiaEngine::new(),
            settle: None,
            gestures: GestureAdapter::new(),
            markers,
            selection: SelectionController::new(),
            events: EventManager::new(),
            scheduler,
        }
    }

    pub fn with_geometry(mut self, geometry: ViewGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn set_geometry(&mut self, geometry: ViewGeometry) {
        self.geometry = geometry;
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn geometry(&self) -> &ViewGeometry {
        &self.geometry
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn inertia_velocity(&self) -> Point {
        self.inertia.velocity()
    }

    pub fn driver(&self) -> Driver {
        if self.drag.is_some() {
            Driver::Dragging
        } else if self.inertia.is_running() {
            Driver::Inertia
        } else if self.settle.as_ref().map_or(false, |s| !s.is_finished()) {
            Driver::Settling
        } else {
            Driver::Idle
        }
    }

    // Gestures

    /// Feeds one raw device event. Returns the gesture it produced, if any.
    pub fn handle_input(&mut self, input: &InputEvent) -> Option<GestureEvent> {
        let gesture = self.gestures.normalize(input)?;
        self.handle_gesture(gesture);
        Some(gesture)
    }

    pub fn handle_gesture(&mut self, event: GestureEvent) {
        match event.phase {
            GesturePhase::Press => self.begin_drag(&event),
            GesturePhase::Move => self.drag_to(&event),
            GesturePhase::Release => self.end_drag(Some(event.timestamp_ms)),
            GesturePhase::Cancel => self.end_drag(None),
        }
    }

    fn begin_drag(&mut self, press: &GestureEvent) {
        self.stop_drivers();
        log::debug!(
            "drag start at ({:.1}, {:.1}), offset ({:.1}, {:.1})",
            press.x,
            press.y,
            self.state.offset().x,
            self.state.offset().y
        );
        self.drag = Some(DragSession::begin(
            press,
            &self.state,
            self.config.frame_interval_ms,
        ));
    }

    fn drag_to(&mut self, event: &GestureEvent) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let first_move = !drag.has_moved();
        let start_offset = self.state.offset();
        let proposed = drag.update(event);
        self.state = self.state.bounded_update(proposed).state;

        if first_move {
            self.events.emit(MapEvent::MoveStart {
                offset: start_offset,
            });
        }
        log::trace!(
            "drag offset ({:.2}, {:.2})",
            self.state.offset().x,
            self.state.offset().y
        );
    }

    /// Ends the drag; a release at `release_ms` may hand over to inertia,
    /// a cancel never does.
    fn end_drag(&mut self, release_ms: Option<f64>) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let coast = release_ms.is_some();
        let max_age_ms = self.config.frame_interval_ms * VELOCITY_MAX_AGE_FRAMES;
        let velocity = release_ms.map_or(Point::ZERO, |at| drag.release_velocity(at, max_age_ms));
        log::debug!(
            "drag end, velocity ({:.2}, {:.2}){}",
            velocity.x,
            velocity.y,
            if coast { "" } else { " (cancelled)" }
        );

        if coast && drag.has_moved() && InertiaEngine::should_start(velocity, &self.config) {
            self.inertia.start(velocity, &mut self.scheduler);
            return;
        }
        if drag.has_moved() {
            self.events.emit(MapEvent::MoveEnd {
                offset: self.state.offset(),
            });
        }
        self.spring_back_if_needed();
    }

    // Frames

    /// Runs the driver that owns `handle`. Returns `false` for stale handles.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> bool {
        if let Some(next) =
            self.inertia
                .on_frame(handle, &self.state, &self.config, &mut self.scheduler)
        {
            self.state = next;
            if !self.inertia.is_running() {
                self.events.emit(MapEvent::MoveEnd {
                    offset: self.state.offset(),
                });
                self.spring_back_if_needed();
            }
            return true;
        }

        if let Some(settle) = self.settle.as_mut() {
            if let Some(next) = settle.on_frame(handle, now_ms, &mut self.scheduler) {
                self.state = next;
                if settle.is_finished() {
                    let kind = settle.kind();
                    self.settle = None;
                    self.finish_settle(kind);
                }
                return true;
            }
        }

        log::warn!("ignoring stale frame handle {}", handle.id());
        false
    }

    fn finish_settle(&mut self, kind: SettleKind) {
        match kind {
            SettleKind::ZoomIn | SettleKind::ZoomOut => {
                self.events.emit(MapEvent::ScaleChanged {
                    scale: self.state.scale(),
                });
            }
            SettleKind::Recenter => {
                self.events.emit(MapEvent::MoveEnd {
                    offset: self.state.offset(),
                });
                self.events.emit(MapEvent::ScaleChanged {
                    scale: self.state.scale(),
                });
            }
            SettleKind::SpringBack => {
                self.events.emit(MapEvent::MoveEnd {
                    offset: self.state.offset(),
                });
            }
        }
    }

    fn spring_back_if_needed(&mut self) {
        if self.config.spring_back && self.state.is_overshooting() {
            self.start_settle(SettlingAnimation::spring_back(self.state, &self.config));
        }
    }

    fn start_settle(&mut self, mut settle: SettlingAnimation) {
        settle.start(&mut self.scheduler);
        self.settle = Some(settle);
    }

    /// Cancels whichever driver is active. Safe to call when idle.
    fn stop_drivers(&mut self) {
        self.inertia.cancel(&mut self.scheduler);
        if let Some(mut settle) = self.settle.take() {
            settle.cancel(&mut self.scheduler);
        }
        if self.drag.take().is_some() {
            log::debug!("drag interrupted");
        }
    }

    // Controls

    pub fn zoom_in(&mut self) {
        self.zoom_by(SettleKind::ZoomIn, self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(SettleKind::ZoomOut, -self.config.zoom_step);
    }

    fn zoom_by(&mut self, kind: SettleKind, step: f64) {
        let in_flight = self
            .settle
            .as_ref()
            .filter(|s| s.kind().is_zoom() && !s.is_finished())
            .map(|s| s.target().scale());
        let from_scale = in_flight.unwrap_or_else(|| self.state.scale());
        let target = self.state.stepped_scale(from_scale, step);

        if in_flight.is_none() && target == self.state.scale() {
            log::debug!("zoom {:?} ignored: scale already at {}", kind, target);
            return;
        }

        self.stop_drivers();
        self.start_settle(SettlingAnimation::zoom(
            kind,
            self.state,
            target,
            &self.config,
        ));
    }

    /// Animates back to offset `(0, 0)` at scale 1.
    pub fn recenter(&mut self) {
        self.stop_drivers();
        if self.state == self.state.recentered() {
            return;
        }
        self.start_settle(SettlingAnimation::recenter(self.state, &self.config));
    }

    /// Switches between nearby and global view, resetting the viewport.
    pub fn set_mode(&mut self, mode: MapMode) {
        if mode == self.mode {
            return;
        }
        log::debug!("mode {:?} -> {:?}", self.mode, mode);
        self.stop_drivers();
        self.gestures.reset();
        self.config = mode.profile().resolve();
        self.state = self.config.initial_state();
        self.mode = mode;
        self.close_popup();
        self.events.emit(MapEvent::ModeChanged { mode });
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if filter == self.markers.filter() {
            return;
        }
        self.markers.set_filter(filter);
        self.clear_hidden_selection();
        self.events.emit(MapEvent::FilterChanged {
            filter,
            visible_count: self.markers.visible_count(),
        });
    }

    /// Replaces the marker data, keeping the current filter.
    pub fn replace_markers(&mut self, markers: Vec<MarkerPoint>) -> Result<()> {
        self.markers.replace(markers)?;
        self.clear_hidden_selection();
        Ok(())
    }

    fn clear_hidden_selection(&mut self) {
        if self.selection.retain_visible(&self.markers) {
            self.events.emit(MapEvent::SelectionCleared);
        }
    }

    // Selection

    /// Opens the popup of a visible marker.
    pub fn tap_marker(&mut self, id: &MarkerId) -> bool {
        if !self.selection.tap(id, &self.markers) {
            return false;
        }
        self.events.emit(MapEvent::MarkerSelected {
            marker_id: id.clone(),
        });
        true
    }

    /// Handles a tap at a screen point: selects the marker under it, or
    /// closes the popup when the backdrop was hit.
    pub fn tap_at(&mut self, screen: Point) -> Option<MarkerId> {
        let hit = self
            .markers
            .marker_at(screen, &self.state, &self.geometry, MARKER_HIT_RADIUS)
            .map(|marker| marker.id.clone());
        match &hit {
            Some(id) => {
                self.tap_marker(id);
            }
            None => {
                self.close_popup();
            }
        }
        hit
    }

    pub fn close_popup(&mut self) -> bool {
        let closed = self.selection.close();
        if closed {
            self.events.emit(MapEvent::SelectionCleared);
        }
        closed
    }

    pub fn view_details(&mut self) -> Option<NavigationRequest> {
        let request = self.selection.view_details(&self.markers);
        self.after_navigation(request)
    }

    pub fn request_pickup(&mut self) -> Option<NavigationRequest> {
        let request = self.selection.request_pickup(&self.markers);
        self.after_navigation(request)
    }

    fn after_navigation(
        &mut self,
        request: Option<NavigationRequest>,
    ) -> Option<NavigationRequest> {
        let request = request?;
        self.events.emit(MapEvent::NavigationRequested {
            request: request.clone(),
        });
        self.events.emit(MapEvent::SelectionCleared);
        Some(request)
    }

    // Output

    /// Screen positions of the visible markers for the current state.
    pub fn marker_positions(&self) -> Vec<(MarkerId, Point)> {
        self.markers
            .screen_positions(&self.state, &self.geometry)
            .map(|(marker, position)| (marker.id.clone(), position))
            .collect()
    }

    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, callback);
    }

    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.process_events()
    }

    /// Cancels any scheduled frame and drops the active gesture.
    pub fn teardown(&mut self) {
        self.stop_drivers();
        self.gestures.reset();
    }
}

impl<S: FrameScheduler> Drop for MapView<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: FrameScheduler> std::fmt::Debug for MapView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("driver", &self.driver())
            .field("selection", self.selection.state())
            .field("markers", &self.markers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::Category;

    const MARKERS: &str = r#"[
        { "id": "c1", "lat": 50.0, "lng": 50.0, "category": "collection", "name": "Centre bins" },
        { "id": "v1", "lat": 20.0, "lng": 80.0, "category": "valorisation", "name": "Compost" }
    ]"#;

    fn map() -> MapView {
        let markers = MarkerLayer::from_json(MARKERS).expect("valid markers");
        MapView::new(MapMode::Nearby, markers)
            .with_geometry(ViewGeometry::filling(Point::new(400.0, 800.0)))
    }

    fn fling(map: &mut MapView, dx: f64) {
        map.handle_gesture(GestureEvent::press(100.0, 100.0, 0.0));
        map.handle_gesture(GestureEvent::moved(100.0 + dx, 100.0, 16.0));
        map.handle_gesture(GestureEvent::release(100.0 + dx, 100.0, 20.0));
    }

    fn run_until_idle(map: &mut MapView) {
        let mut now = 100.0;
        for _ in 0..1000 {
            if map.driver() == Driver::Idle {
                return;
            }
            now += 16.0;
            map.tick(now);
        }
        panic!("map never came to rest");
    }

    #[test]
    fn test_slow_release_does_not_coast() {
        let mut map = map();
        map.handle_gesture(GestureEvent::press(0.0, 0.0, 0.0));
        map.handle_gesture(GestureEvent::moved(0.2, 0.0, 16.0));
        map.handle_gesture(GestureEvent::release(0.2, 0.0, 32.0));
        assert_eq!(map.driver(), Driver::Idle);
        assert!(map.scheduler().is_idle());

        let events = map.process_events();
        assert!(matches!(events.first(), Some(MapEvent::MoveStart { .. })));
        assert!(matches!(events.last(), Some(MapEvent::MoveEnd { .. })));
    }

    #[test]
    fn test_release_after_hold_does_not_coast() {
        let mut map = map();
        map.handle_gesture(GestureEvent::press(100.0, 100.0, 0.0));
        map.handle_gesture(GestureEvent::moved(160.0, 100.0, 16.0));
        map.handle_gesture(GestureEvent::release(160.0, 100.0, 500.0));
        assert_eq!(map.driver(), Driver::Idle);
        assert!(map.scheduler().is_idle());
        assert_eq!(map.state().offset(), Point::new(60.0, 0.0));
    }

    #[test]
    fn test_press_freezes_settle_mid_flight() {
        let mut map = map();
        map.handle_gesture(GestureEvent::press(0.0, 0.0, 0.0));
        map.handle_gesture(GestureEvent::moved(100.0, 0.0, 500.0));
        map.handle_gesture(GestureEvent::release(100.0, 0.0, 1000.0));
        assert_eq!(map.driver(), Driver::Idle);

        map.recenter();
        map.tick(1100.0);
        map.tick(1200.0);
        let stale = map.scheduler_mut().take_due();
        assert_eq!(stale.len(), 1);
        let mid_flight = *map.state();
        // EaseOutCubic at a third of 300ms: 1 - (2/3)^3 of the way home
        assert!((mid_flight.offset().x - 100.0 * 8.0 / 27.0).abs() < 1e-9);

        map.handle_gesture(GestureEvent::press(50.0, 50.0, 1210.0));
        assert_eq!(map.driver(), Driver::Dragging);
        for handle in stale {
            assert!(!map.on_frame(handle, 1216.0));
        }
        assert_eq!(*map.state(), mid_flight);
    }

    #[test]
    fn test_fling_coasts_then_stops() {
        let mut map = map();
        fling(&mut map, 30.0);
        assert_eq!(map.driver(), Driver::Inertia);

        run_until_idle(&mut map);
        assert!(map.state().offset().x > 30.0);
        assert_eq!(map.inertia_velocity(), Point::ZERO);
        assert!(map.scheduler().is_idle());
    }

    #[test]
    fn test_press_cancels_inertia_and_starts_from_current_offset() {
        let mut map = map();
        fling(&mut map, 30.0);
        map.tick(40.0);
        map.tick(56.0);

        let stale = map.scheduler_mut().take_due();
        assert_eq!(stale.len(), 1);
        let frozen = map.state().offset();

        map.handle_gesture(GestureEvent::press(10.0, 10.0, 60.0));
        assert_eq!(map.driver(), Driver::Dragging);
        assert!(!map.on_frame(stale[0], 72.0));
        assert_eq!(map.state().offset(), frozen);

        map.handle_gesture(GestureEvent::moved(15.0, 10.0, 76.0));
        assert!((map.state().offset().x - (frozen.x + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_taps_accumulate_during_settle() {
        let mut map = map();
        map.zoom_in();
        map.zoom_in();
        assert_eq!(map.driver(), Driver::Settling);
        run_until_idle(&mut map);
        assert_eq!(map.state().scale(), 1.4);

        let scale_events = map
            .process_events()
            .into_iter()
            .filter(|e| matches!(e, MapEvent::ScaleChanged { .. }))
            .count();
        assert_eq!(scale_events, 1);
    }

    #[test]
    fn test_zoom_out_at_min_is_noop() {
        let mut map = map();
        for _ in 0..3 {
            map.zoom_out();
        }
        run_until_idle(&mut map);
        assert_eq!(map.state().scale(), 0.5);

        map.zoom_out();
        assert_eq!(map.driver(), Driver::Idle);
    }

    #[test]
    fn test_recenter_cancels_inertia() {
        let mut map = map();
        fling(&mut map, 40.0);
        map.tick(40.0);
        map.recenter();
        assert_eq!(map.driver(), Driver::Settling);
        run_until_idle(&mut map);
        assert_eq!(map.state().offset(), Point::ZERO);
        assert_eq!(map.state().scale(), 1.0);
    }

    #[test]
    fn test_set_mode_resets_everything() {
        let mut map = map();
        fling(&mut map, 40.0);
        map.tap_marker(&MarkerId::from("c1"));

        map.set_mode(MapMode::Global);
        assert_eq!(map.driver(), Driver::Idle);
        assert_eq!(map.state().offset(), Point::ZERO);
        assert_eq!(map.state().bounds().max, 800.0);
        assert_eq!(map.state().max_scale(), 3.0);
        assert!(!map.selection().is_open());
        assert!(map.scheduler().is_idle());

        let events = map.process_events();
        assert!(events.contains(&MapEvent::ModeChanged {
            mode: MapMode::Global
        }));
    }

    #[test]
    fn test_filter_clears_hidden_selection() {
        let mut map = map();
        assert!(map.tap_marker(&MarkerId::from("c1")));
        map.set_filter(CategoryFilter::Only(Category::Valorisation));
        assert!(!map.selection().is_open());

        let events = map.process_events();
        assert!(events.contains(&MapEvent::SelectionCleared));
        assert!(events.contains(&MapEvent::FilterChanged {
            filter: CategoryFilter::Only(Category::Valorisation),
            visible_count: 1,
        }));
    }

    #[test]
    fn test_tap_at_selects_or_closes() {
        let mut map = map();
        // c1 sits in the middle of a 400x800 view at rest
        assert_eq!(
            map.tap_at(Point::new(205.0, 398.0)),
            Some(MarkerId::from("c1"))
        );
        assert_eq!(map.selection().selected(), Some(&MarkerId::from("c1")));

        assert_eq!(map.tap_at(Point::new(20.0, 700.0)), None);
        assert!(!map.selection().is_open());
    }

    #[test]
    fn test_view_details_requests_navigation() {
        let mut map = map();
        assert!(map.view_details().is_none());

        map.tap_marker(&MarkerId::from("v1"));
        map.process_events();
        let request = map.view_details().expect("navigation request");
        assert_eq!(request.name, "Compost");
        assert!(!map.selection().is_open());

        let events = map.process_events();
        assert!(matches!(events[0], MapEvent::NavigationRequested { .. }));
        assert_eq!(events[1], MapEvent::SelectionCleared);
    }

    #[test]
    fn test_spring_back_pulls_into_bounds() {
        let config = ViewportConfig {
            spring_back: true,
            ..Default::default()
        };
        let mut map = MapView::with_scheduler(
            InteractionProfile::Custom(config),
            MarkerLayer::default(),
            FrameLoop::new(),
        )
        .expect("valid config");

        map.handle_gesture(GestureEvent::press(0.0, 0.0, 0.0));
        map.handle_gesture(GestureEvent::moved(500.0, 0.0, 1000.0));
        map.handle_gesture(GestureEvent::moved(500.0, 0.0, 1016.0));
        map.handle_gesture(GestureEvent::release(500.0, 0.0, 1032.0));
        assert!(map.state().is_overshooting());
        assert_eq!(map.driver(), Driver::Settling);

        run_until_idle(&mut map);
        assert_eq!(map.state().offset().x, 400.0);
    }

    #[test]
    fn test_teardown_cancels_frames() {
        let mut map = map();
        fling(&mut map, 30.0);
        assert!(!map.scheduler().is_idle());
        map.teardown();
        assert!(map.scheduler().is_idle());
        assert_eq!(map.driver(), Driver::Idle);
    }
}
