pub mod air_handling_unit;
pub mod psychrometrics;
pub(crate) mod solvers;
pub mod units;
