pub const STATION_DETAIL_LIST: &str = "station_detail_list";
pub const INVERTER_DETAIL_LIST: &str = "inverter_detail_list";
pub const INVERTER_LIST: &str = "inverter_list";
// Intraday points and per-day totals have always lived in separate measurements
pub const INVERTER_DAY: &str = "Inverter_Daily";
pub const INVERTER_DAILY: &str = "inverter_daily";
pub const STATION_LIST: &str = "station_list";
