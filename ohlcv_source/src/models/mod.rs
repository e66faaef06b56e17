pub mod bar;
pub mod chart_range;
pub mod currency;
pub mod period;
pub mod request_params;
pub mod symbol;
pub mod time_series;
