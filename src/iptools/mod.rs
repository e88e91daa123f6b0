// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! IP addresses as packed bit strings, and prefix-range membership lists.

mod codec;
mod config;
mod list;
mod loader;
mod shared;
mod strings;
mod structs;

use std::{error, fmt, io};
use strings::*;

pub use codec::*;
pub use config::{ListConfig, Preset};
pub use list::IpList;
pub use loader::{LineWarning, LoadStats};
pub use shared::SharedIpList;
pub use structs::{BitString, IpFam, IPV4_MAPPED_MARKER};

pub(crate) const IPV4_BITS: u8 = 32;
pub(crate) const IPV6_BITS: u8 = 128;
/// Length of the `::ffff:0:0/96` marker in bits.
pub(crate) const MAPPED_BITS: u8 = 96;

#[rustfmt::skip]
#[derive(Debug)]
pub enum AddressError {
    /// malformed address or depth
    Format(String),
    /// IPv6 address is not IPv4-mapped
    NotConvertible(String),
    /// bulk-load source could not be opened or read
    SourceUnavailable { path: String, source: io::Error },
}

impl AddressError {
    pub(crate) fn format(what: &str, input: impl AsRef<str>) -> Self {
        AddressError::Format(format!("{what}: '{}'", input.as_ref()))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, AddressError::Format(_))
    }
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::Format(msg) => {
                write!(f, "{ERR_FORMAT}: {msg}")
            }
            AddressError::NotConvertible(ip) => {
                write!(f, "{ERR_NOT_CONVERTIBLE}: '{ip}'")
            }
            AddressError::SourceUnavailable { path, source } => {
                write!(f, "{ERR_SOURCE}: '{path}': {source}")
            }
        }
    }
}

impl error::Error for AddressError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            AddressError::SourceUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}
