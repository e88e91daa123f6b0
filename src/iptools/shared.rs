// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{list::IpList, loader::LoadStats, AddressError};
use ipnet::IpNet;
use parking_lot::{RwLock, RwLockReadGuard};
use std::{io::BufRead, path::Path, sync::Arc};
use tracing::info;

/**
An [IpList] shared between threads.

Building calls (`append`, `bulk_load`, `load_file`) hold the write lock,
queries hold the read lock. [SharedIpList::rebuild] and
[SharedIpList::reload_file] construct a fresh list without holding any
lock and swap it in at the end. Clones share the same list.
*/
#[derive(Clone, Debug, Default)]
pub struct SharedIpList {
    inner: Arc<RwLock<IpList>>,
}

impl SharedIpList {
    pub fn new(list: IpList) -> Self {
        Self {
            inner: Arc::new(RwLock::new(list)),
        }
    }

    pub fn append(&self, ip: impl AsRef<str>, depth: Option<u8>) -> Result<(), AddressError> {
        self.inner.write().append(ip, depth)
    }

    pub fn bulk_load<R: BufRead>(&self, reader: R) -> Result<LoadStats, AddressError> {
        self.inner.write().bulk_load(reader)
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadStats, AddressError> {
        self.inner.write().load_file(path)
    }

    /**
    Replace the whole list with one built by `build`. If `build` fails the
    current list stays untouched.
    */
    pub fn rebuild<T, F>(&self, build: F) -> Result<T, AddressError>
    where
        F: FnOnce(&mut IpList) -> Result<T, AddressError>,
    {
        let mut fresh: IpList = IpList::new();
        let out: T = build(&mut fresh)?;
        let entries: usize = fresh.len();
        *self.inner.write() = fresh;
        info!("address list replaced ({entries} ranges)");
        Ok(out)
    }

    /// Replace the list with the contents of a file.
    pub fn reload_file(&self, path: impl AsRef<Path>) -> Result<LoadStats, AddressError> {
        self.rebuild(|list| list.load_file(path))
    }

    /// Swap in a ready-made list, returning the previous one.
    pub fn replace(&self, list: IpList) -> IpList {
        std::mem::replace(&mut *self.inner.write(), list)
    }

    pub fn contains(&self, ip: impl AsRef<str>) -> Result<bool, AddressError> {
        self.inner.read().contains(ip)
    }

    pub fn contains_scan(&self, ip: impl AsRef<str>) -> Result<bool, AddressError> {
        self.inner.read().contains_scan(ip)
    }

    pub fn longest_match(&self, ip: impl AsRef<str>) -> Result<Option<IpNet>, AddressError> {
        self.inner.read().longest_match(ip)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Hold the read lock for a batch of queries.
    pub fn read(&self) -> RwLockReadGuard<'_, IpList> {
        self.inner.read()
    }
}

impl From<IpList> for SharedIpList {
    fn from(list: IpList) -> Self {
        Self::new(list)
    }
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Cursor, thread};

    #[test]
    fn test_clones_share_state() {
        let shared = SharedIpList::default();
        let other = shared.clone();
        assert!(other.is_empty());
        shared.append("10.0.0.0", Some(8)).unwrap();
        assert!(other.contains("10.2.3.4").unwrap());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_concurrent_queries() {
        let shared = SharedIpList::from(IpList::intranet());
        thread::scope(|s| {
            for _ in 0..4 {
                let list = shared.clone();
                s.spawn(move || {
                    for _ in 0..500 {
                        assert!(list.contains("192.168.7.7").unwrap());
                        assert!(!list.contains("8.8.8.8").unwrap());
                    }
                });
            }
            shared.bulk_load(Cursor::new("8.8.4.0/24\n")).unwrap();
        });
        assert!(shared.contains("8.8.4.4").unwrap());
    }

    #[test]
    fn test_rebuild_swaps_wholesale() {
        let shared = SharedIpList::from(IpList::intranet());
        let stats = shared
            .rebuild(|list| list.bulk_load(Cursor::new("203.0.113.0/24\nbogus\n")))
            .unwrap();
        assert_eq!(stats.loaded, 1);
        assert_eq!(shared.len(), 1);
        assert!(!shared.contains("10.0.0.1").unwrap());
        assert!(shared.contains("203.0.113.1").unwrap());
    }

    #[test]
    fn test_failed_reload_keeps_list() {
        let shared = SharedIpList::from(IpList::intranet());
        let missing = std::env::temp_dir().join(format!("iplist-{}-missing.txt", std::process::id()));
        assert!(shared.reload_file(&missing).is_err());
        assert!(shared.contains("10.0.0.1").unwrap());

        fs::write(&missing, "198.51.100.0/24\n").unwrap();
        let stats = shared.reload_file(&missing).unwrap();
        fs::remove_file(&missing).unwrap();
        assert_eq!(stats.loaded, 1);
        assert!(!shared.contains("10.0.0.1").unwrap());
        assert!(shared.contains("198.51.100.42").unwrap());
    }

    #[test]
    fn test_replace() {
        let shared = SharedIpList::default();
        let old = shared.replace(IpList::ipv4_only());
        assert!(old.is_empty());
        let guard = shared.read();
        assert!(guard.contains("1.1.1.1").unwrap());
        assert!(!guard.contains("::1").unwrap());
    }
}
