use crate::model::{AuthScheme, DetailEndpoint, FallbackPolicy, StationListBody};
use config::Config;

pub const BASE_URL: &str = "https://globalapi.solarmanpv.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorMode {
    #[default]
    Off,
    Memory,
    File,
}

/// Process configuration, read from `SOLARMAN_*` environment variables.
///
/// Credentials are optional here so that a missing one turns into a
/// per-request configuration error instead of a failed boot.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub api_id: Option<String>,
    pub api_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    #[serde(default)]
    pub station_list_body: StationListBody,
    #[serde(default)]
    pub detail_endpoint: DetailEndpoint,
    pub device_sn: Option<String>,
    #[serde(default)]
    pub fallback_policy: FallbackPolicy,
    #[serde(default)]
    pub accumulator: AccumulatorMode,
    pub accumulator_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: String::from(BASE_URL),
            api_id: None,
            api_secret: None,
            username: None,
            password: None,
            auth_scheme: AuthScheme::default(),
            station_list_body: StationListBody::default(),
            detail_endpoint: DetailEndpoint::default(),
            device_sn: None,
            fallback_policy: FallbackPolicy::default(),
            accumulator: AccumulatorMode::default(),
            accumulator_path: None,
        }
    }
}

pub fn read_settings() -> Result<Settings, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .set_default("base_url", BASE_URL)?
        .merge(config::Environment::with_prefix("SOLARMAN"))?;

    settings.try_into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(BASE_URL, settings.base_url);
        assert_eq!(AuthScheme::Plaintext, settings.auth_scheme);
        assert_eq!(StationListBody::PageSize, settings.station_list_body);
        assert_eq!(DetailEndpoint::None, settings.detail_endpoint);
        assert_eq!(FallbackPolicy::Truthy, settings.fallback_policy);
        assert_eq!(AccumulatorMode::Off, settings.accumulator);
    }

    #[test]
    fn enums_from_strings() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "base_url": "http://localhost",
            "auth_scheme": "md5_signature",
            "station_list_body": "page_num",
            "detail_endpoint": "device_current_data",
            "device_sn": "2306184422",
            "fallback_policy": "present",
            "accumulator": "file",
            "accumulator_path": "/var/lib/solarman/total.json"
        }))
        .unwrap();

        assert_eq!(AuthScheme::Md5Signature, settings.auth_scheme);
        assert_eq!(StationListBody::PageNum, settings.station_list_body);
        assert_eq!(DetailEndpoint::DeviceCurrentData, settings.detail_endpoint);
        assert_eq!(FallbackPolicy::Present, settings.fallback_policy);
        assert_eq!(AccumulatorMode::File, settings.accumulator);
        assert_eq!(None, settings.api_id);
    }
}
