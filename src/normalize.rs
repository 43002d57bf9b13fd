//! Merge the station list entry and the detail reading into the stable
//! output shape.
//!
//! Every output field has an ordered list of candidate sources. Which
//! candidate wins depends on [`FallbackPolicy`]: `Truthy` skips zero, NaN,
//! empty strings and null the way `a || b || c || 0` does, so a genuine zero
//! reading is replaced by the next candidate. A figure the vendor sent as a
//! string is truthy even when it reads as zero, since `"0"` is a non-empty
//! string. `Present` only skips values that are absent.

use crate::model::{EnergyReading, FallbackPolicy, Figure, NormalizedResponse, Station};
use num_traits::Zero;
use serde_json::Value;

pub trait Candidate {
    fn is_truthy(&self) -> bool;
}

impl Candidate for f64 {
    fn is_truthy(&self) -> bool {
        !self.is_zero() && !self.is_nan()
    }
}

impl Candidate for Figure {
    fn is_truthy(&self) -> bool {
        self.from_string || self.value.is_truthy()
    }
}

impl Candidate for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Candidate for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(false, |n| n.is_truthy()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// First candidate accepted by `policy`, or `None` when all are rejected.
pub fn first_present<T: Candidate + Clone>(
    policy: FallbackPolicy,
    candidates: &[Option<&T>],
) -> Option<T> {
    candidates
        .iter()
        .flatten()
        .find(|candidate| match policy {
            FallbackPolicy::Truthy => candidate.is_truthy(),
            FallbackPolicy::Present => true,
        })
        .map(|candidate| (*candidate).clone())
}

pub fn normalize(
    policy: FallbackPolicy,
    station: &Station,
    reading: &EnergyReading,
) -> NormalizedResponse {
    NormalizedResponse {
        station_name: first_present(
            policy,
            &[station.name.as_ref(), station.station_name.as_ref()],
        ),
        total_kwh: first_present(
            policy,
            &[
                reading.total_energy.as_ref(),
                station.total_energy.as_ref(),
                station.total_yield.as_ref(),
                station.generation_total.as_ref(),
            ],
        )
        .map_or(0.0, f64::from),
        today_kwh: first_present(
            policy,
            &[
                reading.today_energy.as_ref(),
                station.today_energy.as_ref(),
                station.generation_value.as_ref(),
            ],
        )
        .map_or(0.0, f64::from),
        current_power_w: first_present(
            policy,
            &[
                reading.generation_power.as_ref(),
                station.generation_power.as_ref(),
            ],
        )
        .map_or(0.0, f64::from),
        battery_soc: first_present(
            policy,
            &[reading.battery_soc.as_ref(), station.battery_soc.as_ref()],
        )
        .map(f64::from),
        updated_at: first_present(
            policy,
            &[
                reading.last_update_time.as_ref(),
                station.last_update_time.as_ref(),
            ],
        ),
    }
}
