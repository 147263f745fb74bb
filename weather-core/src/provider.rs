use crate::{
    Config,
    error::Result,
    model::{Coordinates, DailyFigures},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::fmt::Debug;

pub mod openmeteo;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Aggregate figures for `date` at `coordinates`, with days cut at midnight in `timezone`.
    async fn daily_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
        timezone: &str,
    ) -> Result<DailyFigures>;
}

/// Construct the weather provider described by `config`.
pub fn provider_from_config(config: &Config, http: Client) -> Box<dyn WeatherProvider> {
    Box::new(OpenMeteoProvider::new(config.api_url.clone(), http))
}
