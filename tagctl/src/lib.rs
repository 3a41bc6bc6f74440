pub mod demo;
pub mod settings;

pub use demo::{build_catalog, DemoError, DemoResult};
pub use settings::{Settings, SettingsError, SettingsResult};
