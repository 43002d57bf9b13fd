use crate::api::Error;
use crate::model::NormalizedResponse;
use prometheus::{Encoder, GaugeVec, IntCounterVec, TextEncoder};

lazy_static! {
    static ref TOTAL_ENERGY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "solarman_total_energy_kwh",
            "cumulative energy produced by the station (in kWh)",
        ),
        &["station_name"],
    )
    .unwrap();
    static ref TODAY_ENERGY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "solarman_today_energy_kwh",
            "energy produced by the station in current day (in kWh)",
        ),
        &["station_name"],
    )
    .unwrap();
    static ref CURRENT_POWER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "solarman_current_power_w",
            "instantaneous generation power (in W)",
        ),
        &["station_name"],
    )
    .unwrap();
    static ref BATTERY_SOC_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("solarman_battery_soc", "battery state of charge (in %)",),
        &["station_name"],
    )
    .unwrap();
    static ref FAILURES_COUNTER: IntCounterVec = register_int_counter_vec!(
        opts!(
            "solarman_failures_total",
            "failed invocations by error kind",
        ),
        &["kind"],
    )
    .unwrap();
}

/// Feed a successful reading to the gauges.
pub fn record(response: &NormalizedResponse) {
    let station = response.station_name.as_deref().unwrap_or("");

    TOTAL_ENERGY_GAUGE
        .with_label_values(&[station])
        .set(response.total_kwh);
    TODAY_ENERGY_GAUGE
        .with_label_values(&[station])
        .set(response.today_kwh);
    CURRENT_POWER_GAUGE
        .with_label_values(&[station])
        .set(response.current_power_w);
    if let Some(soc) = response.battery_soc {
        BATTERY_SOC_GAUGE.with_label_values(&[station]).set(soc);
    }
}

pub fn record_failure(error: &Error) {
    FAILURES_COUNTER.with_label_values(&[error.kind()]).inc();
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::InternalError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| Error::InternalError(e.to_string()))
}
