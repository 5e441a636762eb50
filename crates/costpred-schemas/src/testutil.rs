//! Shared proptest strategies for schema tests.

use proptest::prelude::*;

/// Strategy for category labels, including non-ASCII letters.
pub fn arb_label() -> impl Strategy<Value = String> {
    "[A-Za-zñÑáéíóú ]{1,12}"
}

/// Strategy for finite feature values in a realistic range.
pub fn arb_feature() -> impl Strategy<Value = f64> {
    -10_000.0..10_000.0_f64
}
