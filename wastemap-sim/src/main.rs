use anyhow::{bail, Context};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wastemap::{
    core::{
        config::{InteractionProfile, MapMode, ViewportConfig},
        geo::Point,
        map::{Driver, MapView},
        viewport::{ViewGeometry, ViewportState},
    },
    input::events::{InputEvent, MapEvent},
    layers::marker::{CategoryFilter, MarkerId, MarkerLayer, MarkerPoint},
    runtime::{FrameClock, FrameLoop, ManualClock},
};

/// Replays a recorded interaction scenario against a map viewport
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Frame period used to pump animations, in milliseconds
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Give up waiting for the map to come to rest after this long
    #[arg(long, default_value_t = 10_000.0)]
    settle_limit_ms: f64,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    mode: MapMode,
    /// Overrides the mode's preset when present
    #[serde(default)]
    config: Option<ViewportConfig>,
    #[serde(default)]
    view_size: Option<Point>,
    #[serde(default)]
    content_size: Option<Point>,
    #[serde(default)]
    markers: Vec<MarkerPoint>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    at_ms: f64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action {
    Input { event: InputEvent },
    ZoomIn,
    ZoomOut,
    Recenter,
    SetMode { mode: MapMode },
    SetFilter { filter: CategoryFilter },
    Tap { x: f64, y: f64 },
    TapMarker { id: MarkerId },
    ClosePopup,
    ViewDetails,
    RequestPickup,
}

#[derive(Debug, Serialize)]
struct Report {
    finished_at_ms: f64,
    state: ViewportState,
    selected: Option<MarkerId>,
    markers: Vec<(MarkerId, Point)>,
    events: Vec<MapEvent>,
}

fn main() -> anyhow::Result<()> {
    wastemap::init_logging();
    let cli = Cli::parse();
    if cli.frame_ms.is_nan() || cli.frame_ms <= 0.0 {
        bail!("--frame-ms must be positive");
    }

    let raw = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("reading {}", cli.scenario.display()))?;
    let mut scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", cli.scenario.display()))?;

    let mut map = build_map(&mut scenario)?;
    let report = replay(&mut map, scenario.steps, &cli)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_map(scenario: &mut Scenario) -> anyhow::Result<MapView> {
    let markers = MarkerLayer::new(std::mem::take(&mut scenario.markers))?;
    let map = match scenario.config.take() {
        Some(config) => MapView::with_scheduler(
            InteractionProfile::Custom(config),
            markers,
            FrameLoop::new(),
        )?,
        None => MapView::new(scenario.mode, markers),
    };

    let geometry = match (scenario.view_size, scenario.content_size) {
        (Some(view), Some(content)) => ViewGeometry::new(view, content),
        (Some(view), None) => ViewGeometry::filling(view),
        _ => ViewGeometry::default(),
    };
    Ok(map.with_geometry(geometry))
}

fn replay(map: &mut MapView, mut steps: Vec<Step>, cli: &Cli) -> anyhow::Result<Report> {
    steps.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    let mut clock = ManualClock::new(0.0);
    let mut events = Vec::new();

    for step in steps {
        while clock.now_ms() + cli.frame_ms <= step.at_ms {
            map.tick(clock.advance(cli.frame_ms));
        }
        log::info!("{:>8.1}ms  {:?}", step.at_ms, step.action);
        apply(map, step.action);
        events.extend(map.process_events());
    }

    let deadline = clock.now_ms() + cli.settle_limit_ms;
    while map.driver() != Driver::Idle {
        if clock.now_ms() >= deadline {
            bail!("map still {:?} after {}ms", map.driver(), cli.settle_limit_ms);
        }
        map.tick(clock.advance(cli.frame_ms));
    }
    events.extend(map.process_events());

    Ok(Report {
        finished_at_ms: clock.now_ms(),
        state: *map.state(),
        selected: map.selection().selected().cloned(),
        markers: map.marker_positions(),
        events,
    })
}

fn apply(map: &mut MapView, action: Action) {
    match action {
        Action::Input { event } => {
            map.handle_input(&event);
        }
        Action::ZoomIn => map.zoom_in(),
        Action::ZoomOut => map.zoom_out(),
        Action::Recenter => map.recenter(),
        Action::SetMode { mode } => map.set_mode(mode),
        Action::SetFilter { filter } => map.set_filter(filter),
        Action::Tap { x, y } => {
            map.tap_at(Point::new(x, y));
        }
        Action::TapMarker { id } => {
            map.tap_marker(&id);
        }
        Action::ClosePopup => {
            map.close_popup();
        }
        Action::ViewDetails => {
            map.view_details();
        }
        Action::RequestPickup => {
            map.request_pickup();
        }
    }
}
