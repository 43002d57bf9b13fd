use super::current_data::{keyed_reading, KeyValue};
use super::{lenient_number, list_at};
use crate::model::{EnergyReading, FallbackPolicy, Figure};
use crate::normalize::first_present;
use serde::Deserialize;
use serde_json::Value;

const LIST_PATHS: [&str; 3] = ["/deviceList", "/deviceListItems", "/data"];
const INVERTER: &str = "INVERTER";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_sn: Option<String>,
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_power: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub battery_soc: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub today_energy: Option<Figure>,
    pub collection_time: Option<Value>,
    #[serde(default)]
    pub data_list: Vec<KeyValue>,
}

impl Device {
    /// Own fields first, then the device's keyed list when it carries one.
    pub fn reading(&self, policy: FallbackPolicy) -> EnergyReading {
        let keyed = if self.data_list.is_empty() {
            EnergyReading::default()
        } else {
            keyed_reading(&self.data_list)
        };

        EnergyReading {
            total_energy: first_present(
                policy,
                &[self.total_energy.as_ref(), keyed.total_energy.as_ref()],
            ),
            today_energy: first_present(
                policy,
                &[self.today_energy.as_ref(), keyed.today_energy.as_ref()],
            ),
            generation_power: first_present(
                policy,
                &[self.generation_power.as_ref(), keyed.generation_power.as_ref()],
            ),
            battery_soc: first_present(
                policy,
                &[self.battery_soc.as_ref(), keyed.battery_soc.as_ref()],
            ),
            last_update_time: self.collection_time.clone(),
        }
    }

    fn is_inverter(&self) -> bool {
        self.device_type
            .as_deref()
            .map_or(false, |t| t.eq_ignore_ascii_case(INVERTER))
    }
}

/// Pick the device whose figures describe the station: the first inverter,
/// or the first device when no inverter is listed.
pub fn select(value: &Value) -> Result<Option<Device>, serde_json::Error> {
    let devices = match list_at(value, &LIST_PATHS) {
        Some(list) => list
            .iter()
            .map(|entry| Device::deserialize(entry))
            .collect::<Result<Vec<_>, _>>()?,
        None => return Ok(None),
    };

    let index = devices.iter().position(Device::is_inverter).unwrap_or(0);
    Ok(devices.into_iter().nth(index))
}
