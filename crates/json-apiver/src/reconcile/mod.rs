//! Lockstep walks between a target value and its shadow.

pub mod decode;
pub mod encode;

pub use decode::reconcile_decode;
pub use encode::reconcile_encode;
