//! impact-viz: drive the visualization engine headlessly over a set of
//! impact scenarios and log what each stage produced.
//!
//! Usage: `impact-viz [scenarios.ron]`. The scenario file holds a RON list of
//! impact descriptions; without one, two built-in scenarios are used.

use std::path::Path;

use anyhow::{Context, Result};
use engine_core::{GeoPosition, ImpactDescription, ImpactFeed, PopulationBreakdown};
use impact_viz::{LifecycleManager, LifecycleState, ResultPanels, VizConfig};
use renderer::{HeadlessFactory, HeadlessHost, SceneHost};

const FRAME_DT: f64 = 1.0 / 60.0;
const FRAMES_PER_SCENARIO: usize = 120;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = VizConfig::load();
    let scenarios = match std::env::args().nth(1) {
        Some(path) => load_scenarios(Path::new(&path))?,
        None => default_scenarios(),
    };
    log::info!("Running {} impact scenario(s)", scenarios.len());

    let mut feed = ImpactFeed::new();
    let mut scene_watch = feed.watch();
    let mut panel_watch = feed.watch();
    let mut panels = ResultPanels::new(config.clone());
    let mut factory = HeadlessFactory::default();
    let mut scene: LifecycleManager<HeadlessHost> = LifecycleManager::new(config);
    scene.mount(&mut factory)?;

    for impact in scenarios {
        let label = impact.location_label.clone().unwrap_or_else(|| "unnamed".into());
        feed.publish(impact);

        for _ in 0..FRAMES_PER_SCENARIO {
            scene.sync_feed(&feed, &mut scene_watch);
            scene.frame(FRAME_DT);
        }
        if panels.sync_feed(&feed, &mut panel_watch) {
            log_panels(&label, &panels);
        }
        log_scene(&label, &scene);
    }

    scene.teardown();
    // A second teardown is a no-op.
    scene.teardown();
    log::info!(
        "Scene {:?}, host destroyed: {}",
        scene.state(),
        scene.host().is_some_and(|h| h.is_destroyed())
    );
    debug_assert_eq!(scene.state(), LifecycleState::Destroyed);
    Ok(())
}

fn load_scenarios(path: &Path) -> Result<Vec<ImpactDescription>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenarios from {}", path.display()))?;
    let scenarios: Vec<ImpactDescription> =
        ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(scenarios)
}

fn default_scenarios() -> Vec<ImpactDescription> {
    vec![
        ImpactDescription::new(
            GeoPosition::new(23.8, 90.4),
            50.0,
            500.0,
            PopulationBreakdown::new(1000, 3000, 500, 4500),
        )
        .with_label("Dhaka, Bangladesh"),
        ImpactDescription::new(
            GeoPosition::new(35.68, 139.69),
            120.0,
            2400.0,
            PopulationBreakdown::from_parts(2_100_000, 5_400_000, 900_000),
        )
        .with_label("Tokyo, Japan"),
    ]
}

fn log_panels(label: &str, panels: &ResultPanels) {
    match panels.params() {
        Some(p) => log::info!(
            "[{label}] zone: {} dots, radius {:.1}px, dot radius {:.2}, color {}",
            panels.zone.filled_circles().count(),
            p.radius_px,
            p.dot_radius,
            p.color_rgb.opaque().to_css()
        ),
        None => log::info!("[{label}] zone: placeholder"),
    }
    log::info!(
        "[{label}] chart: {} wedges, legend {:?}",
        panels.chart.wedges().len(),
        panels.chart.texts()
    );
    log::info!("[{label}] gauges: {:?}", panels.gauges.texts());
}

fn log_scene(label: &str, scene: &LifecycleManager<HeadlessHost>) {
    let Some(host) = scene.host() else {
        return;
    };
    let explosion = scene
        .explosion()
        .and_then(|id| host.overlay(id))
        .and_then(|record| record.position);
    log::info!(
        "[{label}] scene {:?}: {} overlays, explosion at {:?}, camera centre {:?}",
        scene.state(),
        host.overlay_count(),
        explosion,
        host.center()
    );
    if let Some(animator) = scene.animator() {
        let clock = animator.clock();
        log::info!(
            "[{label}] animated {} frames over {:.2}s",
            clock.frame_count(),
            clock.elapsed_seconds()
        );
    }
}
