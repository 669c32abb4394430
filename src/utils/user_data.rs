use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::UtilError;

/// Writes the user-data for `instance_name` to `<data_dir>/<instance_name>-userdata`,
/// creating `data_dir` if needed, and returns the file path.
pub fn write_user_data(
    instance_name: &str,
    user_data: &str,
    data_dir: &Path,
) -> Result<PathBuf, UtilError> {
    create_dir(data_dir)?;

    let file_path = data_dir.join(format!("{instance_name}-userdata"));
    write_file(&file_path, user_data.as_bytes())?;

    debug!(path = %file_path.display(), bytes = user_data.len(), "Wrote user data");
    Ok(file_path)
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> Result<(), UtilError> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(dir)
        .map_err(|e| UtilError::io(dir, e))
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> Result<(), UtilError> {
    fs::create_dir_all(dir).map_err(|e| UtilError::io(dir, e))
}

#[cfg(unix)]
fn write_file(path: &Path, contents: &[u8]) -> Result<(), UtilError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .map_err(|e| UtilError::io(path, e))?;
    file.write_all(contents).map_err(|e| UtilError::io(path, e))
}

#[cfg(not(unix))]
fn write_file(path: &Path, contents: &[u8]) -> Result<(), UtilError> {
    fs::write(path, contents).map_err(|e| UtilError::io(path, e))
}
