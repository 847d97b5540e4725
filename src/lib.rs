pub mod config;
pub mod content;
pub mod errors;
pub mod interaction;
pub mod logging;
pub mod orchestrator;
pub mod repo;
pub mod snapshot;
pub mod stage;
pub mod ui;
pub mod validator;
