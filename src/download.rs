use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Size of each read from the response body.
pub const CHUNK_SIZE: usize = 2048;

/// Expand a leading `~` and make `dir` absolute.
pub fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    let expanded = match dir.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .ok_or_else(|| Error::download("cannot determine home directory", None))?
            .join(rest),
        Err(_) => dir.to_path_buf(),
    };

    std::path::absolute(&expanded).map_err(|e| {
        Error::download(format!("cannot resolve {}", expanded.display()), None).with_source(e)
    })
}

/// Copy `body` into `out` in [`CHUNK_SIZE`] pieces, flushing after every
/// non-empty chunk. Returns the number of bytes written.
pub fn stream_to<R: Read, W: Write>(body: &mut R, out: &mut W) -> std::io::Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        out.flush()?;
        total += n as u64;
    }
    Ok(total)
}

/// Stream `body` into `target` through a temporary file in the same directory.
///
/// `target` only appears once the whole body has been written; on failure the
/// temporary file is removed.
pub fn write_atomic<R: Read>(body: &mut R, target: &Path) -> Result<u64> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".chrs-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| {
            Error::download(format!("cannot create file in {}", dir.display()), None).with_source(e)
        })?;
    debug!(tmp = %tmp.path().display(), "streaming into temporary file");

    let written = stream_to(body, &mut tmp)
        .map_err(|e| Error::download("transfer interrupted", None).with_source(e))?;

    tmp.persist(target).map_err(|e| {
        Error::download(format!("cannot move archive to {}", target.display()), None)
            .with_source(e.error)
    })?;
    Ok(written)
}

/// Stream `body` straight into `target`. A failure after the file was created
/// leaves it in place and reports it as a partial file.
pub fn write_direct<R: Read>(body: &mut R, target: &Path) -> Result<u64> {
    let mut file = File::create(target)
        .map_err(|e| {
            Error::download(format!("cannot open {}", target.display()), None).with_source(e)
        })?;

    stream_to(body, &mut file).map_err(|e| {
        warn!(path = %target.display(), "incomplete file left on disk");
        Error::download("transfer interrupted", Some(target.to_path_buf())).with_source(e)
    })
}
