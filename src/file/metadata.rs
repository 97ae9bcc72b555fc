use filetime::{set_file_times, FileTime};
use std::fs;
use std::io;
use std::path::Path;

/// Copies modification/access time and permission bits from `source` onto `destination`.
///
/// Times are applied before permissions so a read-only source does not
/// block the timestamp update on the copy.
pub fn copy_metadata(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);
    set_file_times(destination, atime, mtime)?;
    fs::set_permissions(destination, metadata.permissions())?;
    Ok(())
}
