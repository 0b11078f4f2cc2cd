//! Streaming asset fetch: download and gunzip run as one pipeline into a
//! temp file that is atomically renamed into place on success.

use curl::easy::Easy;
use flate2::write::GzDecoder;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Error from a single asset fetch (curl failure, HTTP error, or disk I/O).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    #[error("disk I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads `url` and decompresses it into `dest`. The decompressed stream
/// goes to a uniquely-named temp file inside `dir`; only a fully-written
/// file is renamed to `dest`, so a concurrent first run never exposes a
/// partial binary. Runs a blocking transfer; call from `spawn_blocking`
/// when used from async code.
pub(super) fn fetch_gzipped(
    url: &str,
    dir: &Path,
    dest: &Path,
    connect_timeout: Duration,
    timeout: Duration,
) -> Result<(), FetchError> {
    let temp = tempfile::Builder::new()
        .prefix(".asset-")
        .tempfile_in(dir)?;
    let mut decoder = GzDecoder::new(temp.reopen()?);
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(timeout)?;

    let transfer_result = {
        let mut transfer = easy.transfer();
        // A short write aborts the transfer with a curl write error.
        transfer.write_function(|data| match decoder.write_all(data) {
            Ok(()) => Ok(data.len()),
            Err(err) => {
                write_error = Some(err);
                Ok(0)
            }
        })?;
        transfer.perform()
    };
    // A decode/disk error aborts the transfer; report it rather than the
    // curl write error it surfaces as.
    if let Some(err) = write_error.take() {
        return Err(FetchError::Io(err));
    }
    transfer_result?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    // A truncated or corrupt gzip stream fails here, before the rename.
    let file = decoder.finish()?;
    file.sync_all()?;
    temp.persist(dest).map_err(|err| FetchError::Io(err.error))?;
    Ok(())
}
