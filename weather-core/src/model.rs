use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Field names of [`WeatherRecord`], in output order.
pub const RECORD_FIELDS: [&str; 6] = [
    "city",
    "date",
    "max_temperature",
    "min_temperature",
    "rain_sum",
    "max_wind_speed",
];

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub location: String,
    pub date: NaiveDate,
}

impl WeatherRequest {
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            location: location.into(),
            date,
        }
    }

    /// Key under which the result for this request is cached, `"{location}_{date}"`.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.location, self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The four daily aggregates a weather provider reports for one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyFigures {
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub rain_sum: f64,
    pub max_wind_speed: f64,
}

/// One day's aggregate weather for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub date: String,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub rain_sum: f64,
    pub max_wind_speed: f64,
}

impl WeatherRecord {
    pub fn new(request: &WeatherRequest, figures: DailyFigures) -> Self {
        Self {
            city: request.location.clone(),
            date: request.date.to_string(),
            max_temperature: figures.max_temperature,
            min_temperature: figures.min_temperature,
            rain_sum: figures.rain_sum,
            max_wind_speed: figures.max_wind_speed,
        }
    }

    /// Field/value pairs in [`RECORD_FIELDS`] order, values rendered as text.
    ///
    /// Measurements always carry a decimal point, so `0.0` stays `"0.0"`.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("city", self.city.clone()),
            ("date", self.date.clone()),
            ("max_temperature", format!("{:?}", self.max_temperature)),
            ("min_temperature", format!("{:?}", self.min_temperature)),
            ("rain_sum", format!("{:?}", self.rain_sum)),
            ("max_wind_speed", format!("{:?}", self.max_wind_speed)),
        ]
    }

    /// Rebuilds a record from the pairs produced by [`Self::to_fields`].
    ///
    /// Fails with a human readable reason when a field is absent or a
    /// measurement is not a number; there is no such thing as a partial record.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, String> {
        let text = |name: &str| {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| format!("missing field '{name}'"))
        };
        let number = |name: &str| -> Result<f64, String> {
            let raw = text(name)?;
            raw.parse::<f64>()
                .map_err(|e| format!("field '{name}' = '{raw}' is not a number: {e}"))
        };

        Ok(Self {
            city: text("city")?,
            date: text("date")?,
            max_temperature: number("max_temperature")?,
            min_temperature: number("min_temperature")?,
            rain_sum: number("rain_sum")?,
            max_wind_speed: number("max_wind_speed")?,
        })
    }
}

impl fmt::Display for WeatherRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .to_fields()
            .into_iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

/// Where a [`WeatherRecord`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Provider,
}

#[derive(Debug, Clone)]
pub struct WeatherLookup {
    pub record: WeatherRecord,
    pub source: Source,
}
