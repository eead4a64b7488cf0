pub mod airport;
pub mod forecast_record;
pub mod weather_record;
