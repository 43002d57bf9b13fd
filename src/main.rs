#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};
use solarman_rs::{server, settings};

#[launch]
fn rocket() -> Rocket<Build> {
    env_logger::init();

    let built = settings::read_settings()
        .map_err(|e| e.to_string())
        .and_then(|settings| server::build(&settings).map_err(|e| e.to_string()));

    match built {
        Ok(rocket) => rocket,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
