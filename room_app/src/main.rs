//! Room editor demo
//!
//! Furnishes a room and replays a scripted drag session against the
//! placement engine, logging every outcome. The precise overlap service is
//! reached through the JSON client over an in-process loopback transport.
//!
//! Usage: `room_demo [config.toml|config.ron]`

use placement_engine::foundation::logging;
use placement_engine::foundation::math::constants::HALF_PI;
use placement_engine::overlap::{OverlapRequest, TransportError};
use placement_engine::prelude::*;
use placement_engine::scene::SnapshotError;
use thiserror::Error;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Serves overlap requests in-process, speaking the same JSON as the remote
/// service
struct LoopbackTransport {
    service: LocalOverlapService,
}

impl OverlapTransport for LoopbackTransport {
    async fn send(&self, body: String) -> Result<String, TransportError> {
        let request: OverlapRequest = serde_json::from_str(&body)?;
        let response = self.service.evaluate(&request)?;
        Ok(serde_json::to_string(&response)?)
    }
}

fn furniture_catalog() -> ModelCatalog {
    ModelCatalog::new()
        .with_model("chair", Vec3::new(0.25, 0.45, 0.25))
        .with_model("table", Vec3::new(0.8, 0.375, 0.5))
        .with_model("sofa", Vec3::new(1.0, 0.4, 0.45))
        .with_model("bookshelf", Vec3::new(0.4, 0.9, 0.2))
}

fn load_config() -> Result<PlacementConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => PlacementConfig::load_from_file(path)?,
        None => PlacementConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn report(label: &str, controller: &PlacementController<ModelBoundsGeometry>, id: ObjectId, outcome: MoveOutcome) {
    let position = controller.object(id).map(PlacedObject::position).unwrap_or_default();
    log::info!(
        "{label}: {outcome:?} -> ({:.2}, {:.2}, {:.2})",
        position.x,
        position.y,
        position.z
    );
    if outcome.needs_confirmation() {
        log::info!("{label}: asking the user to confirm entering the contested zone");
    }
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);
    log::info!("Starting room demo with room {:?}", config.room);

    let catalog = furniture_catalog();
    let detector = CollisionDetector::from_config(&config)?;
    let mut controller = PlacementController::new(detector, ModelBoundsGeometry::new(catalog.clone()));
    let service = JsonOverlapClient::new(LoopbackTransport {
        service: LocalOverlapService::new(catalog),
    });

    let table = controller.add_object(
        ObjectDescriptor::new("table", ObjectCategory::Table).at(Vec3::new(0.0, 0.375, 0.0)),
    );
    let chair = controller.add_object(
        ObjectDescriptor::new("chair", ObjectCategory::Chair).at(Vec3::new(2.0, 0.45, 0.0)),
    );
    let sofa = controller.add_object(
        ObjectDescriptor::new("sofa", ObjectCategory::Sofa).at(Vec3::new(-3.0, 0.4, -3.5)),
    );
    controller.add_object(
        ObjectDescriptor::new("bookshelf", ObjectCategory::Shelf).at(Vec3::new(4.3, 0.9, -4.5)),
    );
    log::info!("Furnished room with {} objects", controller.len());

    // Drag the chair toward the table one frame at a time
    let mut flags = MoveFlags::DRAG;
    for step in 1..=12 {
        let target = Vec3::new(2.0 - 0.1 * step as f32, 0.45, 0.0);
        let outcome = pollster::block_on(controller.move_object(chair, target, flags, &service))?;
        report("chair drag", &controller, chair, outcome);

        // The user confirms once and keeps dragging inside the zone
        if outcome.needs_confirmation() {
            flags = MoveFlags::PROVISIONAL;
            let outcome = pollster::block_on(controller.move_object(chair, target, flags, &service))?;
            report("chair drag", &controller, chair, outcome);
        }
    }

    // Drop: settle the placement with the precise check
    let drop_at = controller.object(chair).map(PlacedObject::position).unwrap_or_default();
    let outcome = pollster::block_on(controller.move_object(chair, drop_at, MoveFlags::CONFIRM, &service))?;
    report("chair drop", &controller, chair, outcome);
    if let Some(gap) = controller.clearance(chair) {
        log::info!("chair clearance to nearest object: {gap:.2}");
    }

    // Push the sofa through the back wall
    let outcome = pollster::block_on(controller.move_object(
        sofa,
        Vec3::new(-3.0, 0.4, -4.8),
        MoveFlags::DRAG,
        &service,
    ))?;
    report("sofa push", &controller, sofa, outcome);

    // Turn the table a quarter
    let outcome = pollster::block_on(controller.rotate_object(
        table,
        Vec3::new(0.0, HALF_PI, 0.0),
        MoveFlags::CONFIRM,
        &service,
    ))?;
    report("table rotate", &controller, table, outcome);

    println!("{}", controller.snapshot().to_json()?);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Room demo failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
