//! Filesystem helpers for provisioning

use super::PlatformResult;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::fs;

/// Create a directory and its parents
pub async fn create_dir<P: AsRef<Path>>(path: P) -> PlatformResult<()> {
    fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}

/// Write `content` through a sibling temp file and rename it into place.
pub async fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> PlatformResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".snapbind-tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, content).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Write a file and mark it executable (0755).
pub async fn write_executable<P: AsRef<Path>>(path: P, content: &str) -> PlatformResult<()> {
    let path = path.as_ref();
    write_atomic(path, content).await?;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

/// Read a file, treating a missing one as empty.
pub async fn read_or_empty<P: AsRef<Path>>(path: P) -> PlatformResult<String> {
    match fs::read_to_string(path.as_ref()).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Delete a file. Returns whether something was removed.
pub async fn remove_if_exists<P: AsRef<Path>>(path: P) -> PlatformResult<bool> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
