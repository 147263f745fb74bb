//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - YAML configuration loading
//! - Place-name geocoding and the daily weather provider
//! - An optional Redis result cache (skipped when unreachable)
//! - The cache-or-fetch orchestration and its console/CSV output
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod geocode;
pub mod model;
pub mod output;
pub mod provider;
pub mod service;

pub use cache::{CacheError, RedisCache, WeatherCache, connect_cache};
pub use config::{Config, RedisConfig};
pub use error::WeatherError;
pub use geocode::{CoordinateResolver, NominatimResolver};
pub use model::{Coordinates, DailyFigures, Source, WeatherLookup, WeatherRecord, WeatherRequest};
pub use provider::WeatherProvider;
pub use service::WeatherService;
