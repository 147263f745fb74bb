//! Cache-or-fetch orchestration for a single weather lookup.

use chrono::NaiveDate;
use reqwest::Client;
use std::{io::Write, path::Path};
use tracing::{debug, info, warn};

use crate::{
    cache::{CacheError, WeatherCache, connect_cache},
    config::Config,
    error::{Result, WeatherError},
    geocode::{CoordinateResolver, NominatimResolver, USER_AGENT},
    model::{Source, WeatherLookup, WeatherRecord, WeatherRequest},
    output,
    provider::{WeatherProvider, provider_from_config},
};

#[derive(Debug)]
pub struct WeatherService {
    config: Config,
    resolver: Box<dyn CoordinateResolver>,
    provider: Box<dyn WeatherProvider>,
    cache: Option<Box<dyn WeatherCache>>,
}

impl WeatherService {
    pub fn new(
        config: Config,
        resolver: Box<dyn CoordinateResolver>,
        provider: Box<dyn WeatherProvider>,
        cache: Option<Box<dyn WeatherCache>>,
    ) -> Self {
        Self {
            config,
            resolver,
            provider,
            cache,
        }
    }

    /// Wire up Nominatim, Open-Meteo and (optionally) Redis from `config`.
    ///
    /// With `use_cache == false` no cache connection is attempted at all.
    pub async fn from_config(config: Config, use_cache: bool) -> Result<Self> {
        let http = build_http_client(&config).map_err(WeatherError::HttpClient)?;

        let resolver = Box::new(NominatimResolver::new(config.geocoder_url.clone(), http.clone()));
        let provider = provider_from_config(&config, http);
        let cache = if use_cache {
            connect_cache(&config).await
        } else {
            debug!("Caching disabled for this run");
            None
        };

        Ok(Self::new(config, resolver, provider, cache))
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Look up the weather and print it, or save it as CSV to `destination`.
    pub async fn get_weather(
        &self,
        date: NaiveDate,
        location: &str,
        destination: Option<&Path>,
    ) -> Result<WeatherRecord> {
        let lookup = self.lookup(date, location).await?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        render_to(&lookup.record, destination, &mut out)?;

        Ok(lookup.record)
    }

    /// Cache hit, or resolve + fetch + best-effort cache store.
    pub async fn lookup(&self, date: NaiveDate, location: &str) -> Result<WeatherLookup> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::location_not_found(location, "location name is empty"));
        }

        let request = WeatherRequest::new(location, date);
        let cache_key = request.cache_key();

        if let Some(record) = self.cached(&cache_key).await? {
            info!("Fetched {} from cache", cache_key);
            return Ok(WeatherLookup {
                record,
                source: Source::Cache,
            });
        }

        let coordinates = self.resolver.resolve(&request.location).await?;
        let figures = self
            .provider
            .daily_weather(coordinates, request.date, &self.config.timezone)
            .await?;
        let record = WeatherRecord::new(&request, figures);

        self.store(&cache_key, &record).await;

        Ok(WeatherLookup {
            record,
            source: Source::Provider,
        })
    }

    /// Backend hiccups count as a miss; an entry that is present but unreadable does not.
    async fn cached(&self, key: &str) -> Result<Option<WeatherRecord>> {
        let Some(cache) = self.cache.as_deref() else {
            return Ok(None);
        };

        match cache.exists(key).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Cache miss for {}", key);
                return Ok(None);
            }
            Err(e) => {
                warn!("Cache lookup for {} failed, fetching instead: {}", key, e);
                return Ok(None);
            }
        }

        match cache.get(key).await {
            Ok(record) => Ok(record),
            Err(CacheError::InvalidData(reason)) => Err(WeatherError::InvalidCacheData {
                key: key.to_string(),
                reason,
            }),
            Err(e) => {
                warn!("Cache read for {} failed, fetching instead: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn store(&self, key: &str, record: &WeatherRecord) {
        let Some(cache) = self.cache.as_deref() else {
            return;
        };

        debug!("Saving to cache: {}", key);
        if let Err(e) = cache.set(key, record).await {
            warn!("Failed to cache {}: {}", key, e);
        }
    }
}

/// Save `record` as CSV to `destination`, or list it on `out` when there is none.
pub fn render_to<W: Write>(
    record: &WeatherRecord,
    destination: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    match destination {
        Some(path) => output::save_csv(record, path),
        None => output::write_console(record, out),
    }
}

fn build_http_client(config: &Config) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = config.http_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
