use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, builder::NonEmptyStringValueParser};
use std::path::PathBuf;
use weather_core::{Config, WeatherService};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Daily weather for a city, cached in Redis")]
pub struct Cli {
    /// City location for the weather lookup, e.g. Wroclaw.
    #[arg(short, long, default_value = "Wroclaw", value_parser = NonEmptyStringValueParser::new())]
    pub location: String,

    /// Date for the weather lookup (YYYY-MM-DD), e.g. 2020-01-01. Defaults to today.
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// File to save the weather data to as CSV, e.g. weather_data.csv.
    /// Printed to standard output when absent.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Path to the YAML configuration file.
    /// Defaults to ./config.yaml, then the platform config directory.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the cache for this run.
    #[arg(long)]
    pub no_cache: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = self.config.unwrap_or_else(Config::default_path);
        let config = Config::load(&config_path)?;
        tracing::debug!("Loaded configuration from {}", config_path.display());

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());

        let service = WeatherService::from_config(config, !self.no_cache)
            .await
            .context("Failed to set up weather service")?;

        service
            .get_weather(date, &self.location, self.file.as_deref())
            .await
            .with_context(|| format!("Failed to get weather for {} on {}", self.location, date))?;

        Ok(())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("'{value}' is not a date in YYYY-MM-DD format: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_wroclaw_today_and_stdout() {
        let cli = Cli::try_parse_from(["weather"]).unwrap();

        assert_eq!(cli.location, "Wroclaw");
        assert!(cli.date.is_none());
        assert!(cli.file.is_none());
        assert!(!cli.no_cache);
    }

    #[test]
    fn parses_short_flags() {
        let cli =
            Cli::try_parse_from(["weather", "-l", "Gdansk", "-d", "2020-01-01", "-f", "out.csv"])
                .unwrap();

        assert_eq!(cli.location, "Gdansk");
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(cli.file, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn parses_long_flags() {
        let cli = Cli::try_parse_from([
            "weather",
            "--location",
            "Krakow",
            "--date",
            "2021-02-28",
            "--config",
            "/etc/weather.yaml",
            "--no-cache",
        ])
        .unwrap();

        assert_eq!(cli.location, "Krakow");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/weather.yaml")));
        assert!(cli.no_cache);
    }

    #[test]
    fn rejects_invalid_date() {
        let err = Cli::try_parse_from(["weather", "-d", "2020-02-30"]).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn rejects_empty_location() {
        assert!(Cli::try_parse_from(["weather", "-l", ""]).is_err());
    }

    #[test]
    fn rejects_unknown_argument() {
        assert!(Cli::try_parse_from(["weather", "--city", "Wroclaw"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
