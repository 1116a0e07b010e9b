use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::DeviceCoordinate;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Location lookup is disabled")]
    Disabled,

    #[error("Location service refused the lookup: {0}")]
    Refused(String),

    #[error("Location request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source of the one-time device coordinate.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn locate(&self) -> Result<DeviceCoordinate, LocateError>;
}

/// Behaves like a denied permission prompt.
pub struct NoLocator;

#[async_trait]
impl Locator for NoLocator {
    async fn locate(&self) -> Result<DeviceCoordinate, LocateError> {
        Err(LocateError::Disabled)
    }
}

pub struct FixedLocator {
    coordinate: DeviceCoordinate,
}

impl FixedLocator {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            coordinate: DeviceCoordinate::new(lat, lng),
        }
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<DeviceCoordinate, LocateError> {
        Ok(self.coordinate)
    }
}

// ip-api.com JSON shape
#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximates the device position from the public IP address.
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(url: String) -> Result<Self, LocateError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(5)).build()?,
            url,
        })
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<DeviceCoordinate, LocateError> {
        let lookup: IpLookup = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if lookup.status != "success" {
            return Err(LocateError::Refused(
                lookup.message.unwrap_or(lookup.status),
            ));
        }
        match (lookup.lat, lookup.lon) {
            (Some(lat), Some(lng)) => Ok(DeviceCoordinate::new(lat, lng)),
            _ => Err(LocateError::Refused("response had no coordinates".to_string())),
        }
    }
}

/// Pick the locator named in the configuration.
pub fn from_config(cfg: &Config) -> Box<dyn Locator> {
    match cfg.location.provider.as_str() {
        "fixed" => match (cfg.location.lat, cfg.location.lng) {
            (Some(lat), Some(lng)) => Box::new(FixedLocator::new(lat, lng)),
            _ => {
                tracing::warn!("Fixed location needs lat and lng - location lookup disabled");
                Box::new(NoLocator)
            }
        },
        "ip" => match IpLocator::new(cfg.location.ip_lookup_url.clone()) {
            Ok(locator) => Box::new(locator),
            Err(e) => {
                tracing::warn!("Could not build IP locator: {} - location lookup disabled", e);
                Box::new(NoLocator)
            }
        },
        _ => Box::new(NoLocator),
    }
}
