// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{list::IpList, loader::LoadStats, strings::*, AddressError};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};
use tracing::debug;

/// Built-in range sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// loopback, private-use and link-local ranges
    Intranet,
    /// every IPv4 address, via `::ffff:0:0/96`
    Ipv4Only,
}

impl Preset {
    pub fn apply(&self, list: &mut IpList) {
        match self {
            Preset::Intranet => list.set_intranet_addresses(),
            Preset::Ipv4Only => list.set_ipv4_addresses(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Intranet => write!(f, "intranet"),
            Preset::Ipv4Only => write!(f, "ipv4_only"),
        }
    }
}

impl FromStr for Preset {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intranet" => Ok(Preset::Intranet),
            "ipv4_only" | "ipv4-only" => Ok(Preset::Ipv4Only),
            _ => Err(AddressError::format(ERR_PRESET, s)),
        }
    }
}

/**
Declarative description of an [IpList], suitable for embedding in an
application's own configuration.

```ignore
presets = ["intranet"]
entries = ["203.0.113.0/24", "2001:db8::/32"]
files = ["/etc/myapp/banned.txt"]
```
*/
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub presets: Vec<Preset>,
    /// `address[/depth]`, must all be valid
    pub entries: Vec<String>,
    /// bulk-load sources, bad lines are skipped
    pub files: Vec<PathBuf>,
}

impl ListConfig {
    /**
    Build the list: presets first, then inline entries, then files.

    ### Errors
    - [AddressError::Format] on a malformed inline entry
    - [AddressError::SourceUnavailable] if a file cannot be read
    */
    pub fn build(&self) -> Result<(IpList, LoadStats), AddressError> {
        let mut list: IpList = IpList::new();
        let mut stats: LoadStats = LoadStats::default();

        for preset in &self.presets {
            debug!("applying preset {preset}");
            preset.apply(&mut list);
        }
        for entry in &self.entries {
            list.append_cidr(entry)?;
            stats.loaded += 1;
        }
        for file in &self.files {
            stats.merge(list.load_file(file)?);
        }
        Ok((list, stats))
    }
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_preset_from_str() {
        assert_eq!("intranet".parse::<Preset>().unwrap(), Preset::Intranet);
        assert_eq!(" IPv4-Only ".parse::<Preset>().unwrap(), Preset::Ipv4Only);
        assert_eq!(Preset::Ipv4Only.to_string().parse::<Preset>().unwrap(), Preset::Ipv4Only);
        assert!("everything".parse::<Preset>().unwrap_err().is_format());
    }

    #[test]
    fn test_empty_config() {
        let (list, stats) = ListConfig::default().build().unwrap();
        assert!(list.is_empty());
        assert_eq!(stats, LoadStats::default());
    }

    #[test]
    fn test_build() {
        let path = std::env::temp_dir().join(format!("iplist-{}-config.txt", std::process::id()));
        fs::write(&path, "198.51.100.0/24\nnope\n").unwrap();

        let cfg = ListConfig {
            presets: vec![Preset::Intranet],
            entries: vec!["203.0.113.0/24".into(), "2001:db8::/32".into()],
            files: vec![path.clone()],
        };
        let (list, stats) = cfg.build().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(list.len(), 8 + 2 + 1);
        assert_eq!(stats.loaded, 3);
        assert_eq!(stats.skipped, 1);
        for ip in ["10.0.0.1", "203.0.113.1", "2001:db8::5", "198.51.100.99"] {
            assert!(list.contains(ip).unwrap(), "Failed: '{ip}'");
        }
    }

    #[test]
    fn test_bad_entry() {
        let cfg = ListConfig {
            entries: vec!["10.0.0.0/8".into(), "10.0.0.0/40".into()],
            ..Default::default()
        };
        assert!(cfg.build().unwrap_err().is_format());
    }

    #[test]
    fn test_missing_file() {
        let cfg = ListConfig {
            presets: vec![Preset::Ipv4Only],
            files: vec![PathBuf::from("/nonexistent/iplist.txt")],
            ..Default::default()
        };
        assert!(matches!(cfg.build(), Err(AddressError::SourceUnavailable { .. })));
    }
}
