//! Sensor drivers.
//!
//! The only analog input on this board is the battery divider.

pub mod battery;
