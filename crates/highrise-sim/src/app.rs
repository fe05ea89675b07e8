//! Headless run loop.
//!
//! Loads configuration and levels, then plays floors back to back with the
//! scripted pilot until the tick budget runs out, the run is lost or the last
//! floor is cleared.

use std::path::PathBuf;

use anyhow::{Context, Result};
use highrise_gameplay::{
    EventBus, EventHandler, FloorSession, GameEvent, GameplayConfig, LevelSet, SessionPhase,
};
use tracing::{debug, info};

use crate::pilot::Pilot;

/// Levels used when no level file is given.
pub const DEMO_LEVELS: &str = include_str!("../levels/demo.json");

/// Ticks between sweeps of dead NPCs.
const PRUNE_INTERVAL: u64 = 120;

/// Command line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimOptions {
    /// Config file; `highrise.toml` in the working directory when absent
    pub config_path: Option<PathBuf>,
    /// Level file; the built-in demo when absent
    pub level_path: Option<PathBuf>,
    /// Tick budget
    pub ticks: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            level_path: None,
            ticks: 3600,
        }
    }
}

impl SimOptions {
    /// Parses `--config <path> --levels <path> --ticks <n>`.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    options.config_path = Some(args.next().context("--config needs a path")?.into());
                },
                "--levels" => {
                    options.level_path = Some(args.next().context("--levels needs a path")?.into());
                },
                "--ticks" => {
                    let value = args.next().context("--ticks needs a number")?;
                    options.ticks = value
                        .parse()
                        .with_context(|| format!("invalid tick count '{value}'"))?;
                },
                other => anyhow::bail!("unknown argument '{other}'"),
            }
        }
        Ok(options)
    }
}

/// Logs every event and keeps a tally.
#[derive(Debug, Default)]
pub struct LoggingHandler {
    /// NPCs killed
    pub kills: u32,
    /// Bosses killed
    pub bosses: u32,
    /// Player deaths
    pub deaths: u32,
    /// Pickup ticker messages
    pub messages: u32,
}

impl EventHandler for LoggingHandler {
    fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlayerStatsChanged { .. } | GameEvent::AmmoChanged { .. } => {
                debug!("{event:?}");
                return;
            },
            GameEvent::EnemyKilled { .. } => self.kills += 1,
            GameEvent::BossKilled { .. } => self.bosses += 1,
            GameEvent::PlayerDied { .. } => self.deaths += 1,
            GameEvent::PickupMessage { .. } => self.messages += 1,
            _ => {},
        }
        info!("{event:?}");
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    /// Ticks simulated
    pub ticks: u64,
    /// Floors finished through the elevator
    pub floors_cleared: u32,
    /// Floor the run stopped on
    pub last_level: u32,
    /// Phase of the last session
    pub phase: SessionPhase,
    /// NPCs killed
    pub kills: u32,
    /// Player deaths
    pub deaths: u32,
}

fn flush(bus: &EventBus, logger: &mut LoggingHandler) -> usize {
    let mut handlers: [&mut dyn EventHandler; 1] = [logger];
    bus.dispatch(&mut handlers)
}

/// Runs the simulation.
pub fn run(options: &SimOptions) -> Result<SimReport> {
    let config = match &options.config_path {
        Some(path) => GameplayConfig::load_from(path),
        None => GameplayConfig::load(),
    };

    let levels = match &options.level_path {
        Some(path) => LevelSet::load(path)
            .with_context(|| format!("loading levels from {}", path.display()))?,
        None => LevelSet::from_json(DEMO_LEVELS).context("parsing built-in levels")?,
    };
    let mut level_id = levels.first_id().context("level set is empty")?;

    let bus = EventBus::new(config.event_capacity);
    let mut logger = LoggingHandler::default();
    let mut pilot = Pilot::new();

    let mut session = FloorSession::new(levels.get(level_id)?, &config, bus.sender());
    session.announce();
    let mut floors_cleared = 0;
    let mut ticks = 0;

    while ticks < options.ticks {
        let input = pilot.next_input(&session);
        session.tick(config.tick_ms, &input);
        ticks += 1;
        flush(&bus, &mut logger);

        if ticks % PRUNE_INTERVAL == 0 {
            session.prune_dead();
        }

        match session.phase() {
            SessionPhase::LevelComplete => {
                floors_cleared += 1;
                if !levels.has_next(level_id) {
                    info!("All {} floors cleared", floors_cleared);
                    break;
                }
                let snapshot = session.player_snapshot();
                level_id = level_id.saturating_add(1);
                session = FloorSession::with_player(levels.get(level_id)?, &config, &snapshot, bus.sender());
                session.announce();
                pilot = Pilot::new();
            },
            SessionPhase::GameOver => break,
            _ => {},
        }
    }
    flush(&bus, &mut logger);
    debug!(
        "Event tally: {} bosses, {} pickup messages",
        logger.bosses, logger.messages
    );

    let report = SimReport {
        ticks,
        floors_cleared,
        last_level: session.level(),
        phase: session.phase(),
        kills: logger.kills,
        deaths: logger.deaths,
    };
    info!(
        "Run ended after {} ticks on floor {}: {:?}, {} kills, {} deaths",
        report.ticks, report.last_level, report.phase, report.kills, report.deaths
    );
    Ok(report)
}
