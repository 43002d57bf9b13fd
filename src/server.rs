use crate::accumulator::{Accumulator, FileStore};
use crate::api::{self, Error};
use crate::metrics;
use crate::model::{Api, NormalizedResponse};
use crate::settings::{AccumulatorMode, Settings};
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::{Build, Rocket, State};
use std::sync::Arc;
use std::time::SystemTime;

const CACHE_PUBLIC: &str = "public, max-age=300";
const CACHE_NONE: &str = "no-cache";

/// Structure containing state for API handlers.
pub struct StateData {
    api: Api,
    /// Present only when the running total is estimated locally
    accumulator: Option<Arc<Accumulator>>,
}

impl StateData {
    pub fn new(settings: &Settings) -> Result<StateData, Error> {
        let accumulator = match settings.accumulator {
            AccumulatorMode::Off => None,
            AccumulatorMode::Memory => Some(Accumulator::in_memory()),
            AccumulatorMode::File => {
                let path = settings
                    .accumulator_path
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        Error::ConfigurationError(String::from(
                            "SOLARMAN_ACCUMULATOR_PATH is required for the file accumulator",
                        ))
                    })?;
                Some(Accumulator::new(Box::new(FileStore::new(path))))
            }
        };

        Ok(StateData {
            api: api::api(settings),
            accumulator: accumulator.map(Arc::new),
        })
    }

    fn cache_control(&self) -> Header<'static> {
        match self.accumulator {
            Some(_) => Header::new("Cache-Control", CACHE_NONE),
            None => Header::new("Cache-Control", CACHE_PUBLIC),
        }
    }

    async fn invoke(&self) -> Result<NormalizedResponse, Error> {
        let mut response = crate::fetch_total(&self.api).await?;

        if let Some(accumulator) = &self.accumulator {
            let accumulator = Arc::clone(accumulator);
            let (power_w, seed_kwh) = (response.current_power_w, response.total_kwh);
            response.total_kwh = tokio::task::spawn_blocking(move || {
                accumulator.observe(power_w, SystemTime::now(), seed_kwh)
            })
            .await
            .map_err(|e| Error::InternalError(e.to_string()))??;
        }

        Ok(response)
    }
}

#[derive(Responder)]
pub struct Total {
    inner: Json<NormalizedResponse>,
    cache_control: Header<'static>,
}

#[get("/total")]
async fn total_route(state: &State<StateData>) -> Result<Total, Error> {
    log::info!("Fetching station totals");

    match state.invoke().await {
        Ok(response) => {
            metrics::record(&response);
            Ok(Total {
                inner: Json(response),
                cache_control: state.cache_control(),
            })
        }
        Err(e) => {
            metrics::record_failure(&e);
            Err(e)
        }
    }
}

#[get("/metrics")]
async fn metrics_route() -> Result<String, Error> {
    metrics::read()
}

pub fn build(settings: &Settings) -> Result<Rocket<Build>, Error> {
    let state = StateData::new(settings)?;

    Ok(rocket::build()
        .manage(state)
        .mount("/", routes![total_route, metrics_route]))
}
