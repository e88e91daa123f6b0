// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    codec::{encode, encode_canonical, strip_mapped},
    strings::*,
    structs::{BitString, IpFam},
    AddressError,
};
use ipnet::IpNet;
use std::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
};
use tracing::debug;
use treebitmap::IpLookupTable;

#[rustfmt::skip]
const INTRANET_V4: [(Ipv4Addr, u8); 5] = [
    (Ipv4Addr::new(127, 0, 0, 1),   8),
    (Ipv4Addr::new(10, 0, 0, 0),    8),
    (Ipv4Addr::new(172, 16, 0, 0),  12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
];

#[rustfmt::skip]
const INTRANET_V6: [(Ipv6Addr, u8); 3] = [
    (Ipv6Addr::LOCALHOST,                         128),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0),  16),
    (Ipv6Addr::new(0xfec0, 0, 0, 0, 0, 0, 0, 0),  16),
];

const IPV4_MAPPED: (Ipv6Addr, u8) = (Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0), 96);

/**
A set of IPv4 and IPv6 network prefixes answering "is this address in any
of them?".

Each family keeps its prefixes as a sorted [Vec] of [BitString]s, with
duplicates allowed. IPv4-mapped IPv6 prefixes (`::ffff:a.b.c.d/n`) are
stored as IPv4 prefixes of depth `n - 96`, so IPv4 and mapped queries hit
the same entries.

Lookups go through a longest-prefix-match table kept next to the sorted
entries. [IpList::contains_scan] runs the older binary search + forward
scan over the sorted entries instead.

The intended lifecycle is build-then-query. For shared use across threads
wrap it in a [SharedIpList](super::SharedIpList).
*/
pub struct IpList {
    ipv4: Vec<BitString>,
    ipv6: Vec<BitString>,
    v4_table: IpLookupTable<Ipv4Addr, ()>,
    v6_table: IpLookupTable<Ipv6Addr, ()>,
    // zero-length prefixes are tracked outside the lookup tables
    v4_any: bool,
    v6_any: bool,
}

impl IpList {
    pub fn new() -> Self {
        Self {
            ipv4: Vec::new(),
            ipv6: Vec::new(),
            v4_table: IpLookupTable::new(),
            v6_table: IpLookupTable::new(),
            v4_any: false,
            v6_any: false,
        }
    }

    /**
    Build a list from `(address, depth)` pairs. A `None` depth means a
    single host. Fails on the first malformed entry.
    */
    pub fn from_entries<I, S>(entries: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = (S, Option<u8>)>,
        S: AsRef<str>,
    {
        let mut list: IpList = IpList::new();
        for (ip, depth) in entries {
            list.append_unsorted(ip.as_ref(), depth)?;
        }
        list.sort();
        Ok(list)
    }

    /// List preloaded with loopback, private and link-local ranges.
    pub fn intranet() -> Self {
        let mut list: IpList = IpList::new();
        list.set_intranet_addresses();
        list
    }

    /// List matching every IPv4 address, native or IPv4-mapped.
    pub fn ipv4_only() -> Self {
        let mut list: IpList = IpList::new();
        list.set_ipv4_addresses();
        list
    }

    /* ---------------------------------- */

    /**
    Add `address/depth` to the list, keeping both families sorted.

    `depth` defaults to the full address length. For an IPv4-mapped IPv6
    address the depth counts the 96 marker bits, so `::ffff:10.0.0.0/104`
    is stored as `10.0.0.0/8`.

    ### Errors
    [AddressError::Format] if the address does not parse, the depth is
    longer than the address, or a mapped depth is below 96.
    */
    pub fn append(&mut self, ip: impl AsRef<str>, depth: Option<u8>) -> Result<(), AddressError> {
        let (fam, prefix) = prefix_of(ip.as_ref(), depth)?;
        self.insert(fam, prefix, true);
        Ok(())
    }

    /// Add a range given as `address[/depth]` text.
    pub fn append_cidr(&mut self, cidr: impl AsRef<str>) -> Result<(), AddressError> {
        let s: &str = cidr.as_ref().trim();
        match s.split_once(SLASH) {
            None => self.append(s, None),
            Some((ip, depth)) => {
                let depth: u8 = depth
                    .parse::<u8>()
                    .map_err(|_| AddressError::format(ERR_LINE_DEPTH, s))?;
                self.append(ip, Some(depth))
            }
        }
    }

    /// Like [IpList::append], but leaves sorting to a later [IpList::sort].
    pub(crate) fn append_unsorted(&mut self, ip: &str, depth: Option<u8>) -> Result<(), AddressError> {
        let (fam, prefix) = prefix_of(ip, depth)?;
        self.insert(fam, prefix, false);
        Ok(())
    }

    pub(crate) fn sort(&mut self) {
        self.ipv4.sort_unstable();
        self.ipv6.sort_unstable();
    }

    fn insert(&mut self, fam: IpFam, prefix: BitString, keep_sorted: bool) {
        let entries: &mut Vec<BitString> = match fam {
            IpFam::V4 => &mut self.ipv4,
            IpFam::V6 => &mut self.ipv6,
        };
        if keep_sorted {
            let pos: usize = entries.partition_point(|e| *e <= prefix);
            entries.insert(pos, prefix);
        } else {
            entries.push(prefix);
        }

        let masklen: u32 = prefix.len() as u32;
        match fam {
            IpFam::V4 if prefix.is_empty() => self.v4_any = true,
            IpFam::V6 if prefix.is_empty() => self.v6_any = true,
            IpFam::V4 => {
                self.v4_table
                    .insert(Ipv4Addr::from(prefix.leading_u32()), masklen, ());
            }
            IpFam::V6 => {
                self.v6_table.insert(Ipv6Addr::from(prefix.bits()), masklen, ());
            }
        };
    }

    /// Add a range known to be well-formed.
    fn insert_addr(&mut self, fam: IpFam, addr: BitString, depth: u8) {
        let (fam, bits, stripped) = strip_mapped(fam, addr);
        self.insert(fam, bits.truncate(depth.saturating_sub(stripped)), true);
    }

    /// Add loopback, private-use and link-local ranges for both families.
    pub fn set_intranet_addresses(&mut self) {
        for (addr, depth) in INTRANET_V4 {
            self.insert_addr(IpFam::V4, addr.into(), depth);
        }
        for (addr, depth) in INTRANET_V6 {
            self.insert_addr(IpFam::V6, addr.into(), depth);
        }
    }

    /// Add `::ffff:0:0/96`, which ends up matching every IPv4 address.
    pub fn set_ipv4_addresses(&mut self) {
        let (addr, depth) = IPV4_MAPPED;
        self.insert_addr(IpFam::V6, addr.into(), depth);
    }

    /* ---------------------------------- */

    /**
    True if any stored prefix contains the address.

    An empty list answers `false` for any input, malformed or not.
    Otherwise a malformed address is an [AddressError::Format].
    */
    pub fn contains(&self, ip: impl AsRef<str>) -> Result<bool, AddressError> {
        if self.is_empty() {
            return Ok(false);
        }
        let (fam, query) = encode_canonical(ip)?;
        Ok(self.lookup(fam, &query).is_some())
    }

    /// The most specific stored range containing the address, if any.
    pub fn longest_match(&self, ip: impl AsRef<str>) -> Result<Option<IpNet>, AddressError> {
        if self.is_empty() {
            return Ok(None);
        }
        let (fam, query) = encode_canonical(ip)?;
        Ok(self.lookup(fam, &query).and_then(|p| p.to_net(fam)))
    }

    fn lookup(&self, fam: IpFam, query: &BitString) -> Option<BitString> {
        match fam {
            IpFam::V4 => self
                .v4_table
                .longest_match(Ipv4Addr::from(query.leading_u32()))
                .map(|(addr, len, _)| BitString::from(addr).truncate(len as u8))
                .or_else(|| self.v4_any.then(BitString::default)),
            IpFam::V6 => self
                .v6_table
                .longest_match(Ipv6Addr::from(query.bits()))
                .map(|(addr, len, _)| BitString::from(addr).truncate(len as u8))
                .or_else(|| self.v6_any.then(BitString::default)),
        }
    }

    /**
    Membership test by binary search over the sorted entries followed by a
    forward scan from the entry just before the insertion point.

    The scan stops at the first entry sorting after the query. With
    overlapping prefixes this can miss a shorter match: given `128.0.0.0/2`
    and `144.0.0.0/4`, the query `160.0.0.1` sorts after both, the scan
    only sees `144.0.0.0/4` and answers `false`. [IpList::contains] does
    not have this problem.
    */
    pub fn contains_scan(&self, ip: impl AsRef<str>) -> Result<bool, AddressError> {
        if self.is_empty() {
            return Ok(false);
        }
        let (fam, query) = encode_canonical(ip)?;
        let entries: &[BitString] = self.entries(fam);
        if entries.is_empty() {
            return Ok(false);
        }

        let pos: usize = entries.partition_point(|e| *e <= query);
        for entry in &entries[pos.saturating_sub(1)..] {
            if query.starts_with(entry) {
                return Ok(true);
            }
            if *entry > query {
                return Ok(false);
            }
        }
        Ok(false)
    }

    /* ---------------------------------- */

    /// Sorted prefixes of one family.
    pub fn entries(&self, fam: IpFam) -> &[BitString] {
        match fam {
            IpFam::V4 => &self.ipv4,
            IpFam::V6 => &self.ipv6,
        }
    }

    pub fn ipv4_entries(&self) -> &[BitString] {
        &self.ipv4
    }

    pub fn ipv6_entries(&self) -> &[BitString] {
        &self.ipv6
    }

    /// Total number of stored prefixes, duplicates included.
    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    /// All stored ranges as CIDRs, IPv4 first.
    pub fn networks(&self) -> Vec<IpNet> {
        let v4 = self.ipv4.iter().filter_map(|p| p.to_net(IpFam::V4));
        let v6 = self.ipv6.iter().filter_map(|p| p.to_net(IpFam::V6));
        v4.chain(v6).collect()
    }
}

/// Encode `ip`, move mapped addresses to IPv4 and cut to `depth`.
fn prefix_of(ip: &str, depth: Option<u8>) -> Result<(IpFam, BitString), AddressError> {
    let (fam, bits) = encode(ip)?;
    let full: u8 = fam.bits();
    let (fam, bits, stripped) = strip_mapped(fam, bits);

    let depth: u8 = match depth {
        None => fam.bits(),
        Some(d) if d > full => {
            return Err(AddressError::format(ERR_DEPTH_LONG, format!("{ip}/{d}")));
        }
        Some(d) => d
            .checked_sub(stripped)
            .ok_or_else(|| AddressError::format(ERR_DEPTH_MAPPED, format!("{ip}/{d}")))?,
    };
    let prefix: BitString = bits.truncate(depth);
    debug!("prefix {ip}/{depth} -> {fam:?} {prefix}");
    Ok((fam, prefix))
}

impl Default for IpList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IpList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpList")
            .field("ipv4", &self.ipv4)
            .field("ipv6", &self.ipv6)
            .finish()
    }
}

/* -------------------------------------------------------------------------- */
