//! BAS calculation and lodgement lifecycle

pub mod bas;

pub use bas::{BasCalculator, BasPayload};
