pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod reconcile;
pub mod resolver;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use app::pipelines::ReconcilePipeline;
pub use core::etl::EtlEngine;
pub use reconcile::{ReconcilePolicy, Reconciler};
pub use resolver::AddressResolver;
pub use utils::error::{EtlError, Result};
