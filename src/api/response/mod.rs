pub mod current_data;
pub mod device_real_time;
pub mod station_detail;
pub mod station_energy;
pub mod station_list;
pub mod token;

use crate::model::Figure;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Detail endpoints answer either with a bare object or wrapped in `data`.
pub fn payload(value: &Value) -> &Value {
    match value.get("data") {
        Some(data) if data.is_object() => data,
        _ => value,
    }
}

/// First array found at any of the JSON pointers in `paths`.
pub fn list_at<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .filter_map(|path| value.pointer(path))
        .find_map(Value::as_array)
}

/// Vendor `false` in `success` means failure regardless of HTTP status.
pub fn is_rejected(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(false)
}

/* The vendor sends figures as numbers on some tenants and as strings on others */

/// Finite figure held by `value`. Anything that overflows or spells out
/// infinity or NaN is treated as absent.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

pub fn as_figure(value: &Value) -> Option<Figure> {
    as_number(value).map(|n| match value {
        Value::String(_) => Figure::text(n),
        _ => Figure::number(n),
    })
}

pub fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Figure>, D::Error> {
    Value::deserialize(d).map(|value| as_figure(&value))
}

/// Identifiers are kept in the JSON type the vendor used.
pub fn lenient_identifier<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(|value| {
        Some(value).filter(|v| match v {
            Value::Number(_) => true,
            Value::String(s) => !s.is_empty(),
            _ => false,
        })
    })
}

/// Display names: strings as sent, numbers in their JSON spelling,
/// anything else absent.
pub fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Value::deserialize(d).map(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod test {
    use crate::model::Figure;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;

    pub fn read_resource(filename: &str) -> Value {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        serde_json::from_str(&fs::read_to_string(d.as_path()).unwrap()).unwrap()
    }

    #[test]
    fn numbers_may_be_strings() {
        assert_eq!(Some(12.5), super::as_number(&json!("12.5")));
        assert_eq!(Some(3.0), super::as_number(&json!(3)));
        assert_eq!(None, super::as_number(&json!("")));
        assert_eq!(None, super::as_number(&json!(null)));
        assert_eq!(None, super::as_number(&json!("n/a")));
    }

    #[test]
    fn non_finite_numbers_are_absent() {
        assert_eq!(None, super::as_number(&json!("inf")));
        assert_eq!(None, super::as_number(&json!("-Infinity")));
        assert_eq!(None, super::as_number(&json!("NaN")));
        assert_eq!(None, super::as_number(&json!("1e400")));
        assert_eq!(Some(1e300), super::as_number(&json!("1e300")));
    }

    #[test]
    fn figures_remember_strings() {
        assert_eq!(Some(Figure::text(0.0)), super::as_figure(&json!("0")));
        assert_eq!(Some(Figure::number(0.0)), super::as_figure(&json!(0)));
        assert_eq!(None, super::as_figure(&json!("")));
        assert_eq!(None, super::as_figure(&json!("nan")));
    }

    #[test]
    fn payload_unwraps_data_object() {
        let wrapped = json!({"success": true, "data": {"totalEnergy": 1}});
        assert_eq!(&json!({"totalEnergy": 1}), super::payload(&wrapped));

        let bare = json!({"totalEnergy": 1, "data": [1, 2]});
        assert_eq!(&bare, super::payload(&bare));
    }

    #[test]
    fn rejected_only_on_explicit_false() {
        assert!(super::is_rejected(&json!({"success": false, "msg": "auth"})));
        assert!(!super::is_rejected(&json!({"success": true})));
        assert!(!super::is_rejected(&json!({"access_token": "t"})));
    }
}
