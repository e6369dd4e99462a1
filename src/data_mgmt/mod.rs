pub mod coerce;
pub mod line_protocol;
pub mod models;
pub mod sink;
