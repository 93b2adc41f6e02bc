// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod attempts;
pub mod bank;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod question;
pub mod runtime;
pub mod sampler;
pub mod scorer;
pub mod session;
pub mod timer;
pub mod tracker;
pub mod ui;
