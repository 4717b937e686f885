use std::io;
use std::path::Path;

/// Read a file to a string, returning `None` when it does not exist.
///
/// A missing file is an expected outcome, not an error; `Err` is reserved for
/// actual I/O failures (permissions, encoding, ...).
pub async fn read_file_if_exists(path: impl AsRef<Path>) -> io::Result<Option<String>> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(Some(contents))
}
