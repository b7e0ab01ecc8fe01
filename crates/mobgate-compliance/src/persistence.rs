use mobgate_core::{MobgateError, MobgateResult};
use std::path::Path;

/// Writes a raw compliance payload to `path`, byte for byte.
///
/// Parent directories are created as needed. An existing file is replaced.
pub async fn save_raw_report(path: &Path, body: &str) -> MobgateResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(MobgateError::Io)?;
        }
    }

    tokio::fs::write(path, body)
        .await
        .map_err(MobgateError::Io)?;

    Ok(())
}
