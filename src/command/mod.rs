mod job;
mod listing;
mod series;

pub use listing::{inverter_details, list_inverters, list_stations, station_details};
pub use series::{inverter_days, inverter_months};
