// Copyright (c) 2024-2026 Mikko Tanner. All rights reserved.

use crate::iptools::AddressError;
use std::{
    fs::{metadata, File},
    io,
    path::Path,
};
use tracing::{debug, error};

/**
Opens the given file for reading.

## Arguments
* `path` - a reference to the file path to open

## Returns
An open [File] handle. It is closed when dropped.

## Errors
[AddressError::SourceUnavailable] if the path does not exist, is not a
regular file, or cannot be opened.
*/
pub(crate) fn open_readable(path: &Path) -> Result<File, AddressError> {
    let unavailable = |source: io::Error| AddressError::SourceUnavailable {
        path: path.display().to_string(),
        source,
    };

    if !path.exists() {
        let errmsg: String = format!("File {} does not exist", path.display());
        error!(errmsg);
        return Err(unavailable(io::Error::new(io::ErrorKind::NotFound, errmsg)));
    }

    match metadata(path) {
        Ok(meta) if !meta.is_file() => {
            let errmsg: String = format!("Not a regular file: {}", path.display());
            error!(errmsg);
            return Err(unavailable(io::Error::new(io::ErrorKind::InvalidInput, errmsg)));
        }
        Ok(_) => {}
        Err(e) => {
            error!("Failed to get metadata for {}: {e}", path.display());
            return Err(unavailable(e));
        }
    }

    debug!("opening {}", path.display());
    File::open(path).map_err(|e| {
        error!("Failed to open {}: {e}", path.display());
        unavailable(e)
    })
}

/* ######################################################################### */
