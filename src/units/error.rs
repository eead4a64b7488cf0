use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Invalid {quantity} unit '{unit}'")]
    InvalidUnit { quantity: &'static str, unit: String },
}

impl UnitError {
    pub(crate) fn invalid(quantity: &'static str, unit: &str) -> Self {
        UnitError::InvalidUnit {
            quantity,
            unit: unit.to_string(),
        }
    }
}
