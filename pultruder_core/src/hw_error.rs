//! Maps `Box<dyn Error>` from trait boundaries to typed `PultruderError`.
//!
//! The traits in `pultruder_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `pultruder_hardware::HwError`
//! downcasting.

use crate::error::PultruderError;

/// Map a trait-boundary error to a typed `PultruderError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to the message text.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> PultruderError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<pultruder_hardware::error::HwError>() {
            return PultruderError::HardwareFault(hw.to_string());
        }
    }

    PultruderError::Hardware(e.to_string())
}
