use super::lenient_number;
use crate::model::{EnergyReading, Figure};
use serde::Deserialize;
use serde_json::Value;

/* Known `dataList` keys, preferred key first */
pub const TOTAL_ENERGY_KEYS: &[&str] = &["Et_ge0"];
pub const TODAY_ENERGY_KEYS: &[&str] = &["Etdy_ge1", "Etdy_ge0"];
pub const POWER_KEYS: &[&str] = &["APo_t1", "PG_Pt1"];
pub const BATTERY_SOC_KEYS: &[&str] = &["B_left_cap1", "BMS_SOC"];

#[derive(Debug, Clone, Deserialize)]
pub struct KeyValue {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<Figure>,
}

/// Value stored under the first of `keys` present in `list`, zero otherwise.
pub fn value_or_zero(list: &[KeyValue], keys: &[&str]) -> Figure {
    keys.iter()
        .find_map(|key| list.iter().find(|kv| kv.key == *key))
        .and_then(|kv| kv.value)
        .unwrap_or_default()
}

/// Reading built from a keyed list; every figure defaults to zero.
pub fn keyed_reading(list: &[KeyValue]) -> EnergyReading {
    EnergyReading {
        total_energy: Some(value_or_zero(list, TOTAL_ENERGY_KEYS)),
        today_energy: Some(value_or_zero(list, TODAY_ENERGY_KEYS)),
        generation_power: Some(value_or_zero(list, POWER_KEYS)),
        battery_soc: Some(value_or_zero(list, BATTERY_SOC_KEYS)),
        last_update_time: None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentData {
    pub device_sn: Option<String>,
    #[serde(default)]
    pub data_list: Vec<KeyValue>,
    pub collection_time: Option<Value>,
}

impl CurrentData {
    pub fn reading(&self) -> EnergyReading {
        EnergyReading {
            last_update_time: self.collection_time.clone(),
            ..keyed_reading(&self.data_list)
        }
    }
}
