//! Home page widgets: current weather and USD exchange rates.
//!
//! Both come from free public APIs and are cached for 10 minutes with `moka`.
//! Failures never fail the page; they become a message next to the widget.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::WidgetConfig;

const WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
const RATES_URL: &str = "https://api.frankfurter.app/latest?from=USD&to=PLN,EUR";
const CACHE_TTL: Duration = Duration::from_secs(600);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub temperature: f64,
    pub windspeed: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyRates {
    pub usd_eur: Option<f64>,
    pub usd_pln: Option<f64>,
    pub date: String,
}

/// Everything the home page shows from outside services.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeWidgets {
    pub weather: Option<Weather>,
    pub weather_error: Option<String>,
    pub currency: Option<CurrencyRates>,
    pub currency_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    date: String,
    rates: Option<std::collections::HashMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WidgetKey {
    Weather,
    Rates,
}

#[derive(Debug, Clone)]
enum WidgetValue {
    Weather(Weather),
    Rates(CurrencyRates),
}

/// Fetches and caches home page widgets.
#[derive(Clone)]
pub struct WidgetService {
    inner: Arc<WidgetServiceInner>,
}

struct WidgetServiceInner {
    client: reqwest::Client,
    config: WidgetConfig,
    cache: Cache<WidgetKey, WidgetValue>,
}

impl WidgetService {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: WidgetConfig) -> Result<Self, WidgetError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(WidgetServiceInner {
                client,
                config,
                cache,
            }),
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.inner.config.enabled
    }

    /// Load both widgets, turning failures into display messages.
    pub async fn home_widgets(&self) -> HomeWidgets {
        if !self.enabled() {
            return HomeWidgets::default();
        }

        let (weather, currency) = tokio::join!(self.weather(), self.rates());
        let mut widgets = HomeWidgets::default();

        match weather {
            Ok(w) => widgets.weather = Some(w),
            Err(e) => {
                warn!(error = %e, "Weather widget unavailable");
                widgets.weather_error = Some(format!("Weather is unavailable: {e}"));
            }
        }
        match currency {
            Ok(c) => widgets.currency = Some(c),
            Err(e) => {
                warn!(error = %e, "Currency widget unavailable");
                widgets.currency_error = Some(format!("Exchange rates are unavailable: {e}"));
            }
        }
        widgets
    }

    /// Current weather at the configured coordinates.
    ///
    /// # Errors
    ///
    /// Returns `WidgetError` if the request fails or the body is unexpected.
    #[instrument(skip(self))]
    pub async fn weather(&self) -> Result<Weather, WidgetError> {
        if let Some(WidgetValue::Weather(w)) = self.inner.cache.get(&WidgetKey::Weather).await {
            debug!("Weather cache hit");
            return Ok(w);
        }

        let config = &self.inner.config;
        let response = self
            .inner
            .client
            .get(WEATHER_URL)
            .query(&[
                ("latitude", config.latitude.to_string()),
                ("longitude", config.longitude.to_string()),
                ("current_weather", "true".to_owned()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WidgetError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        let weather = parse_weather(&body)?;

        self.inner
            .cache
            .insert(WidgetKey::Weather, WidgetValue::Weather(weather.clone()))
            .await;
        Ok(weather)
    }

    /// USD to EUR and PLN.
    ///
    /// # Errors
    ///
    /// Returns `WidgetError` if the request fails or the body has no rates.
    #[instrument(skip(self))]
    pub async fn rates(&self) -> Result<CurrencyRates, WidgetError> {
        if let Some(WidgetValue::Rates(r)) = self.inner.cache.get(&WidgetKey::Rates).await {
            debug!("Rates cache hit");
            return Ok(r);
        }

        let response = self.inner.client.get(RATES_URL).send().await?;
        if !response.status().is_success() {
            return Err(WidgetError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        let rates = parse_rates(&body)?;

        self.inner
            .cache
            .insert(WidgetKey::Rates, WidgetValue::Rates(rates.clone()))
            .await;
        Ok(rates)
    }
}

fn parse_weather(body: &str) -> Result<Weather, WidgetError> {
    let parsed: WeatherResponse =
        serde_json::from_str(body).map_err(|e| WidgetError::Parse(e.to_string()))?;
    Ok(Weather {
        temperature: parsed.current_weather.temperature,
        windspeed: parsed.current_weather.windspeed,
        description: "Current weather".to_owned(),
    })
}

fn parse_rates(body: &str) -> Result<CurrencyRates, WidgetError> {
    let parsed: RatesResponse =
        serde_json::from_str(body).map_err(|e| WidgetError::Parse(e.to_string()))?;
    let rates = parsed
        .rates
        .ok_or_else(|| WidgetError::Parse("no 'rates' in response".to_owned()))?;
    Ok(CurrencyRates {
        usd_eur: rates.get("EUR").copied(),
        usd_pln: rates.get("PLN").copied(),
        date: parsed.date,
    })
}
