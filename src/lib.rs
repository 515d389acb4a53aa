pub mod app;
pub mod config;
pub mod goals;
pub mod intake;
pub mod lookup;
pub mod nutrition;
pub mod oracle;
pub mod state;
