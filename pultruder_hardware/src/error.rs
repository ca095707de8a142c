use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("requested {requested} mm/min exceeds drive limit of {max} mm/min")]
    SpeedLimit { requested: f64, max: f64 },
    #[error("invalid speed: {0}")]
    InvalidSpeed(f64),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
