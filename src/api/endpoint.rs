pub type Endpoint = str;

pub const TOKEN: &Endpoint = "/account/v1.0/token";
pub const STATIONS: &Endpoint = "/station/v1.0/list";
pub const STATION_DETAIL: &Endpoint = "/station/v1.0/station/detail";
pub const STATION_ENERGY: &Endpoint = "/station/v1.0/stationEnergy";
pub const DEVICE_REAL_TIME: &Endpoint = "/device/v1.0/realTime";
pub const DEVICE_CURRENT_DATA: &Endpoint = "/device/v1.0/currentData";
