use super::lenient_number;
use crate::model::{EnergyReading, FallbackPolicy, Figure};
use crate::normalize::first_present;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationEnergy {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_total: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub today_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_value: Option<Figure>,
}

impl StationEnergy {
    pub fn reading(&self, policy: FallbackPolicy) -> EnergyReading {
        EnergyReading {
            total_energy: first_present(
                policy,
                &[self.total_energy.as_ref(), self.generation_total.as_ref()],
            ),
            today_energy: first_present(
                policy,
                &[self.today_energy.as_ref(), self.generation_value.as_ref()],
            ),
            ..EnergyReading::default()
        }
    }
}
