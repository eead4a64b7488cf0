use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metar_weather::{project, ForecastView, MetarDecoder, TafDecoder, Units};

const METAR: &str = "2024/03/27 14:51
METAR KJFK 271451Z 22015G25KT 180V250 3/4SM R04R/2600FT -RA BR BKN008 OVC015 12/11 A2992
RMK AO2 PK WND 22032/1425 SLP132 P0012 60034 T01220111 10128 20106 58015 $";

const TAF: &str = "2024/03/27 17:30
TAF KJFK 271730Z 271818 19010KT P6SM SCT040 BKN250 TX18/2720Z TNM02/2810Z
     FM2200 22015G25KT 5SM -RA BKN030
     TEMPO 2302 3SM RA BR OVC015
     PROB30 0406 1SM TSRA
     FM0600 27010KT P6SM SKC";

fn bench_decoders(c: &mut Criterion) {
    c.bench_function("decode_metar", |b| {
        b.iter(|| MetarDecoder.decode_text(black_box(METAR)))
    });
    c.bench_function("decode_taf", |b| b.iter(|| TafDecoder.decode_text(black_box(TAF))));

    let forecast = TafDecoder.decode_text(TAF).expect("bulletin decodes");
    c.bench_function("project_and_view_taf", |b| {
        b.iter(|| ForecastView::new(&project(black_box(&forecast), Units::METRIC, None)))
    });
}

criterion_group!(benches, bench_decoders);
criterion_main!(benches);
