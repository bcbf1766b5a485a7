// Library for the binaries and tests to access modules

pub mod collector_worker;
pub mod config;
pub mod error;
pub mod exposition;
pub mod fleet;
pub mod logging;
pub mod models;
pub mod providers;
pub mod push;
pub mod routes;
pub mod signal;
pub mod simulator;
pub mod state;
pub mod version;
pub mod worker;
