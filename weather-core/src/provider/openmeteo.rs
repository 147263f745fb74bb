use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError, truncate_body},
    model::{Coordinates, DailyFigures},
};

use super::WeatherProvider;

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,rain_sum,windspeed_10m_max";

/// Daily aggregates from the Open-Meteo forecast/archive API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    api_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(api_url: impl Into<String>, http: Client) -> Self {
        Self {
            api_url: api_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    temperature_2m_max: Option<Vec<Option<f64>>>,
    temperature_2m_min: Option<Vec<Option<f64>>>,
    rain_sum: Option<Vec<Option<f64>>>,
    windspeed_10m_max: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    daily: Option<OmDaily>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn daily_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
        timezone: &str,
    ) -> Result<DailyFigures> {
        let date = date.to_string();

        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("start_date", date.clone()),
                ("end_date", date),
                ("timezone", timezone.to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
            ])
            .send()
            .await
            .map_err(|source| WeatherError::Transport {
                service: "Open-Meteo",
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| WeatherError::Transport {
            service: "Open-Meteo",
            source,
        })?;

        if !status.is_success() {
            tracing::error!("Open-Meteo request failed with status {}", status);
            return Err(WeatherError::Upstream {
                status,
                body: truncate_body(&body),
            });
        }
        tracing::debug!("Response code from {}: {}", self.api_url, status);

        parse_daily(&body)
    }
}

/// Extracts the first day of each requested `daily` series.
fn parse_daily(body: &str) -> Result<DailyFigures> {
    let parsed: OmResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let daily = parsed
        .daily
        .ok_or_else(|| WeatherError::MalformedResponse("missing 'daily' section".to_string()))?;

    Ok(DailyFigures {
        max_temperature: first_value("temperature_2m_max", daily.temperature_2m_max)?,
        min_temperature: first_value("temperature_2m_min", daily.temperature_2m_min)?,
        rain_sum: first_value("rain_sum", daily.rain_sum)?,
        max_wind_speed: first_value("windspeed_10m_max", daily.windspeed_10m_max)?,
    })
}

fn first_value(name: &str, series: Option<Vec<Option<f64>>>) -> Result<f64> {
    series
        .and_then(|values| values.into_iter().next())
        .flatten()
        .ok_or_else(|| WeatherError::MalformedResponse(format!("missing value for 'daily.{name}'")))
}
