//! Core domain primitives: errors, wide-integer amounts and fixed-point percentages.

pub mod amount;
pub mod error;
pub mod percentage;
