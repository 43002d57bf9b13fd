use serde::Serialize;
use serde_json::Value;

type KWh = f64;
type Watt = f64;

/// Application credentials issued by the vendor, validated once per invocation.
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// How the password travels to `/account/v1.0/token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    #[default]
    Plaintext,
    Sha256,
    Md5Signature,
}

/// Paging body sent to `/station/v1.0/list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationListBody {
    #[default]
    PageSize,
    PageNum,
    Empty,
}

/// Which detail resource (if any) is fetched after the station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailEndpoint {
    #[default]
    None,
    StationDetail,
    StationEnergy,
    DeviceRealTime,
    DeviceCurrentData,
}

/// Rule used to pick the first usable value out of a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Skips zero, NaN, empty strings and null, like `a || b || 0`.
    #[default]
    Truthy,
    /// Skips only absent values.
    Present,
}

#[derive(Debug, Clone)]
pub struct Api {
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_scheme: AuthScheme,
    pub station_list_body: StationListBody,
    pub detail_endpoint: DetailEndpoint,
    pub device_sn: Option<String>,
    pub fallback_policy: FallbackPolicy,
}

#[derive(Debug)]
pub struct LoggedInApi {
    pub base_url: String,
    pub access_token: String,
    pub client: reqwest::Client,
}

/// A vendor figure and whether it arrived as a JSON string. Strings keep
/// their truthiness even when they read as zero, so `"0"` stops a truthy
/// fallback chain the way it does in `a || b`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Figure {
    pub value: f64,
    pub from_string: bool,
}

impl Figure {
    pub fn number(value: f64) -> Self {
        Figure {
            value,
            from_string: false,
        }
    }

    pub fn text(value: f64) -> Self {
        Figure {
            value,
            from_string: true,
        }
    }
}

impl From<f64> for Figure {
    fn from(value: f64) -> Self {
        Figure::number(value)
    }
}

impl From<Figure> for f64 {
    fn from(figure: Figure) -> Self {
        figure.value
    }
}

/// Snapshot of one site as listed by `/station/v1.0/list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Station {
    /// Kept as sent so detail requests echo the vendor's own type
    pub id: Option<Value>,
    pub name: Option<String>,
    pub station_name: Option<String>,
    pub generation_power: Option<Figure>,
    pub installed_capacity: Option<Figure>,
    pub battery_soc: Option<Figure>,
    pub last_update_time: Option<Value>,
    pub total_energy: Option<Figure>,
    pub total_yield: Option<Figure>,
    pub generation_total: Option<Figure>,
    pub today_energy: Option<Figure>,
    pub generation_value: Option<Figure>,
}

/// Figures read from the configured detail endpoint. Anything the endpoint
/// does not expose stays `None` and falls through to the station list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyReading {
    pub total_energy: Option<Figure>,
    pub today_energy: Option<Figure>,
    pub generation_power: Option<Figure>,
    pub battery_soc: Option<Figure>,
    pub last_update_time: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct NormalizedResponse {
    pub station_name: Option<String>,
    pub total_kwh: KWh,
    pub today_kwh: KWh,
    pub current_power_w: Watt,
    pub battery_soc: Option<f64>,
    pub updated_at: Option<Value>,
}
