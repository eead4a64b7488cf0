pub mod error;
pub mod forecast_view;
pub(crate) mod grammar;
pub(crate) mod lookup;
pub mod metar;
pub mod raw_report;
pub(crate) mod remarks;
pub(crate) mod rules;
pub mod taf;
pub mod tokenizer;
