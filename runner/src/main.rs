use clap::Parser;
use engine::DEFAULT_TICK_RATE_TPS;
use tracing_subscriber::EnvFilter;
use turborand::{SeededCore, rng::Rng};

use runner::{
  Cli, DEFAULT_TICKS,
  config::{Config, ConfigError},
  runner::Runner,
};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let cli = Cli::parse();

  let config = match load_config(&cli) {
    Ok(config) => config,
    Err(e) => {
      tracing::error!("{e}");
      std::process::exit(1);
    }
  };

  let seed = cli.seed.or(config.runner.seed);
  let rng = match seed {
    Some(seed) => Rng::with_seed(seed),
    None => Rng::new(),
  };
  let ticks = cli.ticks.or(config.runner.ticks).unwrap_or(DEFAULT_TICKS);
  let rate = cli
    .tick_rate
    .or(config.runner.tick_rate)
    .unwrap_or(DEFAULT_TICK_RATE_TPS);

  let mut engine = config.build_engine(rng);
  if let Some(speed) = cli.speed {
    engine.set_speed_multiplier(speed);
  }

  tracing::info!(
    seed = ?seed,
    ticks,
    rate,
    speed = engine.speed_multiplier(),
    "starting simulation with {} aircraft",
    engine.aircraft().len()
  );

  let mut runner = Runner::new(engine, config.script, rate);
  let summary = runner.run(ticks);

  if cli.json {
    match serde_json::to_string_pretty(&summary) {
      Ok(json) => println!("{json}"),
      Err(e) => {
        tracing::error!("failed to serialize summary: {e}");
        std::process::exit(2);
      }
    }
  } else {
    let stats = summary.stats;
    println!(
      "tick {} | score {} | entered {} | landed {} | lost {} \
       (storm {}, fuel {}, collision {}) | conflicts resolved {} | active {}",
      stats.tick,
      stats.score,
      stats.entered,
      stats.landed,
      stats.lost,
      stats.destroyed_by_storm,
      stats.fuel_exhausted,
      stats.collisions,
      stats.conflicts_resolved,
      stats.active_aircraft,
    );
  }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
  match &cli.config_path {
    Some(path) => Config::from_path(path),
    None => Ok(Config::default()),
  }
}
