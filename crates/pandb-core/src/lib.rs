pub mod config;
pub mod logging;

pub mod batch;
pub mod lookup;
pub mod panrc;
pub mod session;
pub mod settings;
pub mod xapi;
