//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below exercises the light service end to end against the
//! mock hardware in [`mock_hw`]. Everything runs on the host.

mod button_flow_tests;
mod light_service_tests;
mod mock_hw;
