#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

pub mod accumulator;
pub mod api;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod server;
pub mod settings;

use api::Error;
use model::{Api, NormalizedResponse};

/// One invocation: validate configuration, log in, pick the first station,
/// fetch the configured detail resource and normalize. Steps run strictly in
/// order and the first failure aborts the rest.
pub async fn fetch_total(api: &Api) -> Result<NormalizedResponse, Error> {
    let credentials = api::credentials(api)?;
    api::check_detail_config(api)?;

    let logged_in_api = api::login(api, &credentials).await?;
    let station = api::first_station(&logged_in_api, api.station_list_body).await?;
    log::debug!(
        "Selected station {:?} ({:?})",
        station.id,
        station.name.as_ref().or(station.station_name.as_ref())
    );

    let reading = api::reading(api, &logged_in_api, &station).await?;

    Ok(normalize::normalize(api.fallback_policy, &station, &reading))
}
