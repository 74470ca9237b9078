//! Process setup shared by both run modes: config, logging, and the control service.

pub mod config;
pub mod error;

use control_host::MemoryControlService;
use log::{debug, info};

use self::config::ToolConfig;
use self::error::{ToolError, ToolResult};

/// Filter applied when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the `env_logger` backend. `RUST_LOG` overrides `filter`.
pub fn init_logging(filter: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(filter.unwrap_or(DEFAULT_LOG_FILTER));
    if env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .is_err()
    {
        debug!("logger already installed");
    }
}

/// In-process control service with every configured system file announced.
pub fn memory_service(config: &ToolConfig) -> ToolResult<MemoryControlService> {
    let service = MemoryControlService::new();
    for path in &config.announce {
        let descriptor = service.announce_file(path).map_err(|err| {
            ToolError::config(format!("cannot announce system: {err}"))
                .with_operation("announce")
                .with_path(path)
        })?;
        info!(
            "announced system \"{}\" from {}",
            descriptor.name,
            path.display()
        );
    }
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::ToolErrorCategory;
    use std::path::PathBuf;

    #[test]
    fn unreadable_announce_file_is_a_config_error() {
        let config = ToolConfig {
            announce: vec![PathBuf::from("/definitely/not/here.json")],
            ..ToolConfig::default()
        };
        let Err(err) = memory_service(&config) else {
            panic!("missing file should fail");
        };
        assert_eq!(err.category, ToolErrorCategory::Config);
        assert!(err.to_string().contains("[target: /definitely/not/here.json]"));
    }

    #[test]
    fn no_announce_entries_yields_an_empty_network() {
        assert!(memory_service(&ToolConfig::default()).is_ok());
    }
}
