use metar_weather::{AirportDirectory, MemoryCache, NoaaFetcher, UnitsFormat, Weather, WeatherError};
use std::env;

#[tokio::main]
async fn main() -> Result<(), WeatherError> {
    let station = env::args().nth(1).unwrap_or_else(|| "KJFK".to_string());

    let weather = Weather::builder()
        .fetcher(NoaaFetcher::default())
        .locations(AirportDirectory::open_default().await?)
        .cache(Box::new(MemoryCache::new()))
        .units_format(UnitsFormat::Metric)
        .build();

    let record = weather
        .current_conditions()
        .location(&station)
        .call()
        .await?;

    println!("{} ({:?})", record.station, record.observed);
    if let Some(wind) = &record.conditions.wind {
        println!("wind: {} {} km/h", wind.direction, wind.speed);
    }
    println!("temperature: {:?} °C", record.conditions.temperature);
    println!("humidity: {:?} %", record.conditions.humidity);
    println!("pressure: {:?} mb", record.conditions.pressure);
    for layer in &record.conditions.clouds {
        println!("clouds: {} at {:?} m", layer.amount, layer.height);
    }
    if !record.unparsed.is_empty() {
        println!("unparsed: {}", record.unparsed.join(" "));
    }

    Ok(())
}
