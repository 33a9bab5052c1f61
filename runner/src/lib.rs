use std::path::PathBuf;

use clap::Parser;

pub mod config;
pub mod runner;

pub const DEFAULT_TICKS: u64 = 600;

#[derive(Debug, Parser)]
#[command(version, about = "Headless airspace simulation driver")]
pub struct Cli {
  /// The path to the config file.
  #[arg(short, long = "config", default_value = None)]
  pub config_path: Option<PathBuf>,

  /// The seed to use for the random number generator.
  #[arg(short, long)]
  pub seed: Option<u64>,

  /// How many ticks to run before printing the summary.
  #[arg(short, long)]
  pub ticks: Option<u64>,

  /// Ticks per second. Zero runs as fast as possible.
  #[arg(short = 'r', long)]
  pub tick_rate: Option<usize>,

  /// Simulated-time multiplier (at least 1).
  #[arg(long)]
  pub speed: Option<f32>,

  /// Print the summary as JSON.
  #[arg(long)]
  pub json: bool,
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use clap::CommandFactory;

  use super::Cli;

  #[test]
  fn test_cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_cli_parses_flags() {
    use clap::Parser;

    let cli = Cli::parse_from([
      "airspace", "--seed", "3", "-t", "20", "-r", "0", "--speed", "8",
      "--json",
    ]);
    assert_eq!(cli.seed, Some(3));
    assert_eq!(cli.ticks, Some(20));
    assert_eq!(cli.tick_rate, Some(0));
    assert_eq!(cli.speed, Some(8.0));
    assert!(cli.json);
    assert!(cli.config_path.is_none());

    let cli =
      Cli::parse_from(["airspace", "--config", "scenarios/near_miss.toml"]);
    assert_eq!(
      cli.config_path,
      Some(PathBuf::from("scenarios/near_miss.toml"))
    );
  }
}
