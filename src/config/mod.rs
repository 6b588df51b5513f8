//! Project configuration loaded from `.envseal.toml`.

pub mod settings;

pub use settings::Settings;
