use super::{lenient_identifier, lenient_number, lenient_text, list_at};
use crate::model::{Figure, Station};
use serde::Deserialize;
use serde_json::Value;

const LIST_PATHS: [&str; 5] = [
    "/stationList",
    "/data/list",
    "/data/stationList",
    "/list",
    "/data",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    #[serde(default, deserialize_with = "lenient_identifier")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub station_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_power: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub installed_capacity: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub battery_soc: Option<Figure>,
    pub last_update_time: Option<Value>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_yield: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_total: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub today_energy: Option<Figure>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub generation_value: Option<Figure>,
}

impl From<Data> for Station {
    fn from(data: Data) -> Self {
        Station {
            id: data.id,
            name: data.name,
            station_name: data.station_name,
            generation_power: data.generation_power,
            installed_capacity: data.installed_capacity,
            battery_soc: data.battery_soc,
            last_update_time: data.last_update_time,
            total_energy: data.total_energy,
            total_yield: data.total_yield,
            generation_total: data.generation_total,
            today_energy: data.today_energy,
            generation_value: data.generation_value,
        }
    }
}

/// Stations listed in the response. A response with no list anywhere reads
/// as an empty list.
pub fn parse(value: &Value) -> Result<Vec<Data>, serde_json::Error> {
    list_at(value, &LIST_PATHS)
        .map(|list| {
            list.iter()
                .map(|entry| Data::deserialize(entry))
                .collect::<Result<Vec<_>, _>>()
        })
        .unwrap_or_else(|| Ok(Vec::new()))
}

#[cfg(test)]
mod test {
    use super::parse;
    use crate::api::response::test::read_resource;
    use crate::model::Figure;
    use serde_json::json;

    #[test]
    fn station_list() {
        let output = parse(&read_resource("stationList.json")).unwrap();
        assert_eq!(1, output.len());
        assert_eq!(Some(json!(64230001)), output[0].id);
        assert_eq!(Some(String::from("Home")), output[0].name);
        assert_eq!(Some(Figure::number(2350.0)), output[0].generation_power);
        assert_eq!(Some(Figure::number(6.6)), output[0].installed_capacity);
        assert_eq!(Some(Figure::number(87.0)), output[0].battery_soc);
    }

    #[test]
    fn data_list_with_string_numbers() {
        let value = json!({
            "data": {
                "list": [
                    {"id": "7", "stationName": "Barn", "totalEnergy": "1234.5"},
                    {"id": 8, "stationName": "Shed"}
                ]
            }
        });
        let output = parse(&value).unwrap();
        assert_eq!(2, output.len());
        assert_eq!(Some(json!("7")), output[0].id);
        assert_eq!(Some(String::from("Barn")), output[0].station_name);
        assert_eq!(Some(Figure::text(1234.5)), output[0].total_energy);
        assert_eq!(Some(json!(8)), output[1].id);
    }

    #[test]
    fn no_list_is_empty() {
        assert!(parse(&json!({"success": true, "total": 0})).unwrap().is_empty());
        assert!(parse(&json!({"stationList": []})).unwrap().is_empty());
    }

    #[test]
    fn odd_names_do_not_fail_the_list() {
        let value = json!({"stationList": [
            {"id": 1, "name": 5, "stationName": "Roof"},
            {"id": 2, "name": {"en": "Barn"}, "stationName": null},
            {"id": 3, "name": true}
        ]});
        let output = parse(&value).unwrap();
        assert_eq!(3, output.len());
        assert_eq!(Some(String::from("5")), output[0].name);
        assert_eq!(Some(String::from("Roof")), output[0].station_name);
        assert_eq!(None, output[1].name);
        assert_eq!(None, output[1].station_name);
        assert_eq!(None, output[2].name);
    }

    #[test]
    fn non_object_entry_is_error() {
        assert!(parse(&json!({"stationList": ["64230001"]})).is_err());
    }
}
