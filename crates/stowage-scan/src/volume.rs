//! Capacity of the volume hosting a path.

use std::path::Path;

use stowage_core::{ScanError, VolumeUsage};

/// Query total, used and free bytes of the volume containing `path`.
///
/// The platform figures are passed through as reported; `used + free` may
/// be less than `total` on filesystems that reserve blocks.
pub fn inspect_volume(path: impl AsRef<Path>) -> Result<VolumeUsage, ScanError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScanError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    query_volume(path)
}

/// Like [`inspect_volume`], but never fails: on error the usage is zeroed
/// and the error is handed back alongside it.
pub fn inspect_volume_or_zeroed(path: impl AsRef<Path>) -> (VolumeUsage, Option<ScanError>) {
    match inspect_volume(path) {
        Ok(usage) => (usage, None),
        Err(err) => (VolumeUsage::zeroed(), Some(err)),
    }
}

#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
fn query_volume(path: &Path) -> Result<VolumeUsage, ScanError> {
    let stat = nix::sys::statvfs::statvfs(path)
        .map_err(|errno| ScanError::io(path, std::io::Error::from(errno)))?;

    let fragment = stat.fragment_size() as u64;
    let blocks = stat.blocks() as u64;
    let blocks_free = stat.blocks_free() as u64;
    let blocks_available = stat.blocks_available() as u64;

    Ok(VolumeUsage::new(
        blocks.saturating_mul(fragment),
        blocks.saturating_sub(blocks_free).saturating_mul(fragment),
        blocks_available.saturating_mul(fragment),
    ))
}

#[cfg(not(unix))]
fn query_volume(path: &Path) -> Result<VolumeUsage, ScanError> {
    use sysinfo::Disks;

    let path = std::path::absolute(path).map_err(|e| ScanError::io(path, e))?;
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .ok_or_else(|| ScanError::PathNotFound { path: path.clone() })?;

    let total = disk.total_space();
    let free = disk.available_space();
    Ok(VolumeUsage::new(total, total.saturating_sub(free), free))
}
