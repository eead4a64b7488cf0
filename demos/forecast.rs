use metar_weather::{AirportDirectory, ForecastView, NoaaFetcher, Weather, WeatherError};
use std::env;

#[tokio::main]
async fn main() -> Result<(), WeatherError> {
    let station = env::args().nth(1).unwrap_or_else(|| "EGLL".to_string());

    let weather = Weather::builder()
        .fetcher(NoaaFetcher::default())
        .locations(AirportDirectory::open_default().await?)
        .build();

    let forecast = weather.forecast().location(&station).call().await?;
    println!(
        "{} valid {:?} to {:?}",
        forecast.station, forecast.valid_from, forecast.valid_to
    );

    for row in ForecastView::new(&forecast).rows {
        let change = match (row.change, row.probability) {
            (Some(kind), Some(p)) => format!("{kind:?} {p}%"),
            (Some(kind), None) => format!("{kind:?}"),
            (None, _) => String::new(),
        };
        println!(
            "{:>5} {:<10} wind {:<20} vis {:<12} {}",
            row.period,
            change,
            row.wind
                .map(|w| format!("{} {} mph", w.direction, w.speed))
                .unwrap_or_default(),
            row.visibility
                .map(|v| format!("{} sm", v.value))
                .unwrap_or_default(),
            row.condition.unwrap_or_default(),
        );
    }

    Ok(())
}
