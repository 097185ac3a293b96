use crate::config::AppConfig;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Discover candidate image files under a root directory and feed them to
/// the processing stage.
pub fn start_walking(
    root: &Path,
    config: &AppConfig,
    paths_tx: crossbeam_channel::Sender<PathBuf>,
) -> Result<(), AppError> {
    log::info!("Starting file discovery in {}", root.display());
    log::debug!("Allowed extensions: {:?}", config.allowed_extensions);

    let mut discovered = 0usize;
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if config.allowed_extensions.contains(&ext.to_lowercase()) => {
                log::debug!("Queueing image file: {}", path.display());
                paths_tx.send(path.to_path_buf())?;
                discovered += 1;
            }
            _ => {
                log::trace!("Skipping non-image entry: {}", path.display());
            }
        }
    }

    log::info!("File discovery complete, {} files queued.", discovered);
    Ok(())
}
