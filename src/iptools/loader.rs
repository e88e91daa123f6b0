// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{list::IpList, strings::*, AddressError};
use crate::filesystem::open_readable;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{info, warn};

lazy_static! {
    // first token of a record: up to whitespace or a comment
    static ref RECORD: Regex = Regex::new(r"^[^\s#]+").expect("record regex");
}

/// A bulk-load line that was skipped.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineWarning {
    /// 1-based
    pub line_no: usize,
    pub line: String,
    pub reason: String,
}

/// Outcome of one or more bulk loads.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
    pub warnings: Vec<LineWarning>,
}

impl LoadStats {
    pub fn merge(&mut self, other: LoadStats) {
        self.loaded += other.loaded;
        self.skipped += other.skipped;
        self.warnings.extend(other.warnings);
    }
}

/**
Split a line of the form `address[/depth] [anything] [#anything]`.

Returns `Ok(None)` for blank and comment lines. A token with more than one
`/` or a depth that is not an integer in `0..=255` is an error; address
validation is left to the caller.
*/
pub(crate) fn parse_record(line: &str) -> Result<Option<(&str, Option<u8>)>, String> {
    let line: &str = line.trim();
    if line.is_empty() || line.starts_with(COMMENT) {
        return Ok(None);
    }
    let token: &str = match RECORD.find(line) {
        Some(m) => m.as_str(),
        None => return Ok(None),
    };

    let mut fields = token.split(SLASH);
    let ip: &str = fields.next().unwrap_or_default();
    let depth: Option<&str> = fields.next();
    if fields.next().is_some() {
        return Err(format!("{ERR_LINE_FIELDS}: '{token}'"));
    }

    match depth {
        None => Ok(Some((ip, None))),
        Some(d) => d
            .parse::<u8>()
            .map(|d| Some((ip, Some(d))))
            .map_err(|e| format!("{ERR_LINE_DEPTH}: '{d}': {e}")),
    }
}

impl IpList {
    /**
    Add every range listed in `reader`, one `address[/depth]` per line.

    Blank lines and `#` comments are skipped, as is anything after the first
    token. Lines that fail to parse are logged, recorded in the returned
    [LoadStats] and otherwise ignored. Both families are sorted once at the end.

    ### Errors
    [AddressError::SourceUnavailable] if reading fails. Lines read before the
    failure stay in the list.
    */
    pub fn bulk_load<R: BufRead>(&mut self, reader: R) -> Result<LoadStats, AddressError> {
        self.load_lines(reader, "-")
    }

    /// [IpList::bulk_load] from a file. The file is closed before returning.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadStats, AddressError> {
        let path: &Path = path.as_ref();
        let file = open_readable(path)?;
        self.load_lines(BufReader::new(file), &path.display().to_string())
    }

    fn load_lines<R: BufRead>(&mut self, mut reader: R, origin: &str) -> Result<LoadStats, AddressError> {
        let mut stats: LoadStats = LoadStats::default();
        let mut failure: Option<std::io::Error> = None;

        let mut buf: Vec<u8> = Vec::new();
        let mut idx: usize = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
            idx += 1;
            // non-UTF-8 bytes become U+FFFD, so such lines fail the grammar instead of the read
            let line: Cow<'_, str> = String::from_utf8_lossy(&buf);

            let parsed = parse_record(&line).and_then(|rec| match rec {
                Some((ip, depth)) => self
                    .append_unsorted(ip, depth)
                    .map(|_| true)
                    .map_err(|e| e.to_string()),
                None => Ok(false),
            });

            match parsed {
                Ok(true) => stats.loaded += 1,
                Ok(false) => {}
                Err(reason) => {
                    warn!("{WARN_LINE} ({origin}:{idx}): {reason}");
                    stats.skipped += 1;
                    stats.warnings.push(LineWarning {
                        line_no: idx,
                        line: line.trim().to_string(),
                        reason,
                    });
                }
            }
        }
        self.sort();

        if let Some(source) = failure {
            return Err(AddressError::SourceUnavailable {
                path: origin.to_string(),
                source,
            });
        }
        info!(
            "loaded {} ranges from {origin} ({} lines skipped)",
            stats.loaded, stats.skipped
        );
        Ok(stats)
    }
}

/* -------------------------------------------------------------------------- */
