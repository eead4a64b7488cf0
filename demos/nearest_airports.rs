use metar_weather::{AirportDirectory, LatLon, NoaaFetcher, Weather, WeatherError};

#[tokio::main]
async fn main() -> Result<(), WeatherError> {
    let weather = Weather::builder()
        .fetcher(NoaaFetcher::default())
        .locations(AirportDirectory::open_default().await?)
        .build();

    let amsterdam = LatLon(52.3676, 4.9041);
    for nearest in weather
        .nearest_airports()
        .location(amsterdam)
        .limit(5)
        .call()
    {
        println!(
            "{} {:<40} {:>6.1} km",
            nearest.airport.id, nearest.airport.name, nearest.distance_km
        );
    }

    let found = weather
        .search_locations()
        .name("schiphol")
        .call()?;
    println!("{found:#?}");

    Ok(())
}
