pub mod scaffold;
pub mod serve;
pub mod simulate;

use std::path::Path;

use nurseflow_core::WardConfig;
use tracing::info;

/// Read the ward file, or fall back to the demo ward.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<WardConfig> {
    match path {
        Some(path) => {
            let config = WardConfig::from_file(path)?;
            info!(path = %path.display(), nurses = config.nurses.len(), patients = config.patients.len(), "ward loaded");
            Ok(config)
        }
        None => {
            info!("no ward file given, using the demo ward");
            Ok(WardConfig::scaffold())
        }
    }
}
