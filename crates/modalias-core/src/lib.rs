#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod alias;
pub mod base;
pub mod config;
pub mod error;
pub mod paths;
pub mod plugin;
pub mod project;
pub mod version;

pub use alias::{resolve, AliasRule, AliasTable, Resolution, ResolutionRequest};
pub use config::Config;
pub use error::Error;
pub use plugin::{AliasPlugin, Plugin, PluginContainer, PluginContext};
pub use project::{load_project_config, ProjectConfig};
pub use version::VERSION;
