use super::lenient_number;
use crate::model::{EnergyReading, FallbackPolicy, Figure};
use crate::normalize::first_present;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDetail {
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_total: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_value: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub today_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_power: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub battery_soc: Option<Figure>,
    pub last_update_time: Option<Value>,
}

impl StationDetail {
    pub fn reading(&self, policy: FallbackPolicy) -> EnergyReading {
        EnergyReading {
            total_energy: first_present(
                policy,
                &[self.generation_total.as_ref(), self.total_energy.as_ref()],
            ),
            today_energy: first_present(
                policy,
                &[self.generation_value.as_ref(), self.today_energy.as_ref()],
            ),
            generation_power: self.generation_power,
            battery_soc: self.battery_soc,
            last_update_time: self.last_update_time.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::StationDetail;
    use crate::api::response::{payload, test::read_resource};
    use crate::model::FallbackPolicy;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn station_detail() {
        let value = read_resource("stationDetail.json");
        let output = StationDetail::deserialize(payload(&value)).unwrap();
        let reading = output.reading(FallbackPolicy::Truthy);
        assert_eq!(Some(9876.5), reading.total_energy.map(f64::from));
        assert_eq!(Some(21.3), reading.today_energy.map(f64::from));
        assert_eq!(Some(3120.0), reading.generation_power.map(f64::from));
        assert_eq!(Some(64.0), reading.battery_soc.map(f64::from));
    }

    #[test]
    fn zero_string_total_wins_under_truthy() {
        let output: StationDetail =
            serde_json::from_value(json!({"generationTotal": "0", "totalEnergy": 9876.5})).unwrap();
        let reading = output.reading(FallbackPolicy::Truthy);
        assert_eq!(Some(0.0), reading.total_energy.map(f64::from));
    }
}
