pub mod auth;
pub mod endpoint;
pub mod error;
pub mod response;

use crate::accumulator::to_ms;
use crate::model::{self, DetailEndpoint, StationListBody};
pub use error::Error;
use response::current_data::CurrentData;
use response::station_detail::StationDetail;
use response::station_energy::StationEnergy;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::SystemTime;

const MISSING_CREDENTIALS: &str = "Missing API credentials";

pub fn api(settings: &crate::settings::Settings) -> model::Api {
    model::Api {
        base_url: settings.base_url.trim_end_matches('/').to_owned(),
        app_id: settings.api_id.to_owned(),
        app_secret: settings.api_secret.to_owned(),
        username: settings.username.to_owned(),
        password: settings.password.to_owned(),
        auth_scheme: settings.auth_scheme,
        station_list_body: settings.station_list_body,
        detail_endpoint: settings.detail_endpoint,
        device_sn: settings.device_sn.to_owned(),
        fallback_policy: settings.fallback_policy,
    }
}

/// All four credential fields must be present and non-empty.
pub fn credentials(api: &model::Api) -> Result<model::Credentials, Error> {
    let fields = [
        ("SOLARMAN_API_ID", &api.app_id),
        ("SOLARMAN_API_SECRET", &api.app_secret),
        ("SOLARMAN_USERNAME", &api.username),
        ("SOLARMAN_PASSWORD", &api.password),
    ];

    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(Error::ConfigurationError(format!(
            "{}: {}",
            MISSING_CREDENTIALS,
            missing.join(", ")
        )));
    }

    let value = |field: &Option<String>| field.clone().unwrap_or_default();
    Ok(model::Credentials {
        app_id: value(&api.app_id),
        app_secret: value(&api.app_secret),
        email: value(&api.username),
        password: value(&api.password),
    })
}

/// Map transport failures to Error. HTTP status is judged by `read_json`;
/// a send error carries none.
fn map_api_err(error: reqwest::Error) -> Error {
    Error::UpstreamRequestError(error.to_string())
}

/// Read the body of `response`, failing on non-2xx status or a vendor
/// envelope with `"success": false`. The raw body ends up in the message.
async fn read_json(
    endpoint: &endpoint::Endpoint,
    response: reqwest::Response,
) -> Result<Value, Error> {
    let status = response.status();
    let text = response.text().await.map_err(|e| {
        Error::UpstreamRequestError(format!("Error reading {} response: {}", endpoint, e))
    })?;

    log::trace!("endpoint: {}, status: {}, response_text: {}", endpoint, status, text);

    if !status.is_success() {
        return Err(Error::UpstreamRequestError(format!(
            "{} failed: {} {}",
            endpoint, status, text
        )));
    }

    let value = serde_json::from_str::<Value>(&text)
        .map_err(|e| Error::InvalidResponse(text.clone(), e.to_string()))?;

    if response::is_rejected(&value) {
        return Err(Error::UpstreamRequestError(format!(
            "{} rejected: {}",
            endpoint, text
        )));
    }

    Ok(value)
}

/// Exchange credentials for a bearer token. The token is not cached; every
/// invocation logs in again.
pub async fn login(
    api: &model::Api,
    credentials: &model::Credentials,
) -> Result<model::LoggedInApi, Error> {
    let client = reqwest::ClientBuilder::new()
        .build()
        .map_err(|e| Error::InternalError(e.to_string()))?;
    let url = format!("{}{}", api.base_url, endpoint::TOKEN);
    let request = auth::token_request(api.auth_scheme, credentials, to_ms(SystemTime::now()));

    log::info!("Requesting access token ({:?})", api.auth_scheme);

    let response = client
        .post(url)
        .query(&request.query)
        .json(&request.body)
        .send()
        .await
        .map_err(|e| Error::AuthenticationError(format!("Token request failed: {}", e)))?;

    let value = read_json(endpoint::TOKEN, response)
        .await
        .map_err(|e| match e {
            Error::UpstreamRequestError(s) | Error::InvalidResponse(s, _) => {
                Error::AuthenticationError(format!("Token request failed: {}", s))
            }
            other => other,
        })?;

    response::token::extract(&value)
        .ok_or_else(|| Error::AuthenticationError(format!("No access_token returned: {}", value)))
        .map(|token| model::LoggedInApi {
            base_url: api.base_url.to_owned(),
            access_token: token,
            client,
        })
}

async fn post(
    api: &model::LoggedInApi,
    endpoint: &endpoint::Endpoint,
    body: &Value,
) -> Result<Value, Error> {
    let url = format!("{}{}", api.base_url, endpoint);

    let response = api
        .client
        .post(url)
        .bearer_auth(&api.access_token)
        .json(body)
        .send()
        .await
        .map_err(map_api_err)?;

    read_json(endpoint, response).await
}

fn list_body(style: StationListBody) -> Value {
    match style {
        StationListBody::PageSize => json!({"page": 1, "size": 10}),
        StationListBody::PageNum => json!({"pageNum": 1, "pageSize": 10}),
        StationListBody::Empty => json!({}),
    }
}

pub async fn stations(
    api: &model::LoggedInApi,
    style: StationListBody,
) -> Result<Vec<model::Station>, Error> {
    let value = post(api, endpoint::STATIONS, &list_body(style)).await?;

    response::station_list::parse(&value)
        .map_err(|e| Error::InvalidResponse(value.to_string(), e.to_string()))
        .map(|stations| stations.into_iter().map(model::Station::from).collect())
}

/// First listed station. No ranking is applied.
pub async fn first_station(
    api: &model::LoggedInApi,
    style: StationListBody,
) -> Result<model::Station, Error> {
    stations(api, style)
        .await?
        .into_iter()
        .next()
        .ok_or(Error::NoStationFound)
}

fn station_id(station: &model::Station) -> Result<&Value, Error> {
    station
        .id
        .as_ref()
        .ok_or_else(|| Error::UnexpectedApiResponse(String::from("Station entry has no id")))
}

fn deserialize_payload<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(response::payload(value))
        .map_err(|e| Error::InvalidResponse(value.to_string(), e.to_string()))
}

pub async fn station_detail(
    api: &model::LoggedInApi,
    station_id: &Value,
) -> Result<StationDetail, Error> {
    let value = post(api, endpoint::STATION_DETAIL, &json!({ "stationId": station_id })).await?;
    deserialize_payload(&value)
}

pub async fn station_energy(
    api: &model::LoggedInApi,
    station_id: &Value,
) -> Result<StationEnergy, Error> {
    let value = post(api, endpoint::STATION_ENERGY, &json!({ "stationId": station_id })).await?;
    deserialize_payload(&value)
}

pub async fn device_real_time(
    api: &model::LoggedInApi,
    station_id: &Value,
) -> Result<Option<response::device_real_time::Device>, Error> {
    let value = post(api, endpoint::DEVICE_REAL_TIME, &json!({ "stationId": station_id })).await?;
    response::device_real_time::select(&value)
        .map_err(|e| Error::InvalidResponse(value.to_string(), e.to_string()))
}

pub async fn device_current_data(
    api: &model::LoggedInApi,
    device_sn: &str,
) -> Result<CurrentData, Error> {
    let value = post(api, endpoint::DEVICE_CURRENT_DATA, &json!({ "deviceSn": device_sn })).await?;
    deserialize_payload(&value)
}

/// Fetch whichever detail resource is configured and reduce it to an
/// `EnergyReading`. With `DetailEndpoint::None` nothing is requested.
pub async fn reading(
    api: &model::Api,
    logged_in: &model::LoggedInApi,
    station: &model::Station,
) -> Result<model::EnergyReading, Error> {
    let policy = api.fallback_policy;
    log::debug!("Fetching detail via {:?}", api.detail_endpoint);

    match api.detail_endpoint {
        DetailEndpoint::None => Ok(model::EnergyReading::default()),
        DetailEndpoint::StationDetail => station_detail(logged_in, station_id(station)?)
            .await
            .map(|detail| detail.reading(policy)),
        DetailEndpoint::StationEnergy => station_energy(logged_in, station_id(station)?)
            .await
            .map(|energy| energy.reading(policy)),
        DetailEndpoint::DeviceRealTime => device_real_time(logged_in, station_id(station)?)
            .await
            .map(|device| {
                device
                    .map(|d| d.reading(policy))
                    .unwrap_or_default()
            }),
        DetailEndpoint::DeviceCurrentData => device_current_data(logged_in, device_sn(api)?)
            .await
            .map(|data| data.reading()),
    }
}

fn device_sn(api: &model::Api) -> Result<&str, Error> {
    api.device_sn
        .as_deref()
        .filter(|sn| !sn.is_empty())
        .ok_or_else(|| {
            Error::ConfigurationError(String::from(
                "SOLARMAN_DEVICE_SN is required for the device_current_data endpoint",
            ))
        })
}

/// Fail before any network call when the selected endpoint cannot run.
pub fn check_detail_config(api: &model::Api) -> Result<(), Error> {
    if api.detail_endpoint == DetailEndpoint::DeviceCurrentData {
        device_sn(api)?;
    }
    Ok(())
}
