mod commission;
mod money;

pub mod op;

pub use commission::{CommissionRate, CommissionRateError, BASIS_POINTS_SCALE};
pub use money::{Cents, CentsConversionError, MINOR_UNITS_PER_WHOLE};
