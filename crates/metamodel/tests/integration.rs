#![allow(unused_crate_dependencies)]

#[path = "integration/common/mod.rs"]
mod common;

#[path = "integration/order_scenario.rs"]
mod order_scenario;

#[path = "integration/loader_lifecycle.rs"]
mod loader_lifecycle;
