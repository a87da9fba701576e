//! Weather lookup (OpenWeatherMap current weather)
//!
//! The HTTP call is blocking, so the manager runs it on a short-lived worker
//! thread and polls the result each frame.

use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no weather API key configured (set DESKWIDGETS_WEATHER_API_KEY)")]
    MissingApiKey,
    #[error("please enter a city name")]
    EmptyCity,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather service answered {0}, please check the city name")]
    Status(u16),
    #[error("unexpected weather response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("weather lookup stopped unexpectedly")]
    Worker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_c: f64,
    pub description: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiWeather>,
}

#[derive(Deserialize)]
struct ApiMain {
    temp: f64,
}

#[derive(Deserialize)]
struct ApiWeather {
    description: String,
}

impl WeatherReport {
    /// Parse a current-weather response body.
    pub fn from_body(city: &str, body: &str) -> Result<Self, WeatherError> {
        let parsed: ApiResponse = serde_json::from_str(body)?;
        Ok(Self {
            city: city.to_string(),
            temperature_c: parsed.main.temp,
            description: parsed
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
        })
    }

    pub fn summary(&self) -> String {
        if self.description.is_empty() {
            format!("{}: {:.1}°C", self.city, self.temperature_c)
        } else {
            format!("{}: {:.1}°C\n{}", self.city, self.temperature_c, self.description)
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, WeatherError> {
        let api_key = api_key.ok_or(WeatherError::MissingApiKey)?;
        Ok(Self { url: url.into(), api_key })
    }

    /// Blocking lookup. Anything but 200 is an error.
    pub fn lookup(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let resp = http
            .get(&self.url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(city, status = status.as_u16(), "weather lookup rejected");
            return Err(WeatherError::Status(status.as_u16()));
        }
        WeatherReport::from_body(city, &resp.text()?)
    }

    /// Run [`lookup`](Self::lookup) on a worker thread.
    pub fn spawn_lookup(&self, city: &str) -> PendingWeather {
        let (tx, rx) = mpsc::channel();
        let client = self.clone();
        let query = city.to_string();
        std::thread::spawn(move || {
            let _ = tx.send(client.lookup(&query));
        });
        PendingWeather { rx }
    }
}

/// A lookup in flight.
pub struct PendingWeather {
    rx: Receiver<Result<WeatherReport, WeatherError>>,
}

impl PendingWeather {
    /// The result, once the worker is done.
    pub fn try_take(&self) -> Option<Result<WeatherReport, WeatherError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(WeatherError::Worker)),
        }
    }
}
