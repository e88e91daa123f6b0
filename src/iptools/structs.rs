// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{IPV4_BITS, IPV6_BITS, MAPPED_BITS};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use lazy_static::lazy_static;
use std::{
    cmp::Ordering,
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
};

lazy_static! {
    /// The `::ffff:0:0/96` prefix. IPv6 bit strings starting with this are IPv4.
    pub static ref IPV4_MAPPED_MARKER: BitString =
        BitString::from(Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0)).truncate(MAPPED_BITS);
}

/// IP address family
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum IpFam {
    V4,
    V6,
}

impl IpFam {
    /// Canonical bit length of an address in this family.
    pub fn bits(&self) -> u8 {
        match self {
            IpFam::V4 => IPV4_BITS,
            IpFam::V6 => IPV6_BITS,
        }
    }
}

/**
A big-endian string of up to 128 bits.

The first bit of the string lives in the most significant bit of `bits`,
so an IPv4 address occupies the top 32 bits. Bits past `len` are always
zero, which keeps the derived equality in line with the ordering below.

Ordering is lexicographic over the digits: the first differing bit decides,
and a string sorts right before every longer string it is a prefix of.
That makes a network prefix sort immediately before the addresses it covers.
*/
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct BitString {
    bits: u128,
    len: u8,
}

impl BitString {
    /// Build from MSB-aligned bits. `len` is capped at 128, excess bits are cleared.
    pub fn new(bits: u128, len: u8) -> Self {
        let len: u8 = len.min(IPV6_BITS);
        Self {
            bits: bits & mask(len),
            len,
        }
    }

    /// Number of bits in the string (the prefix depth).
    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw MSB-aligned bits.
    #[inline]
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Keep at most the first `depth` bits.
    pub fn truncate(&self, depth: u8) -> Self {
        Self::new(self.bits, depth.min(self.len))
    }

    /// True if `prefix` is a leading part of this string (or equal to it).
    #[inline]
    pub fn starts_with(&self, prefix: &BitString) -> bool {
        prefix.len <= self.len && self.bits & mask(prefix.len) == prefix.bits
    }

    /// Drop the first `n` bits.
    pub fn skip(&self, n: u8) -> Self {
        let n: u8 = n.min(self.len);
        Self {
            bits: self.bits.checked_shl(n as u32).unwrap_or(0),
            len: self.len - n,
        }
    }

    /// The leading 32 bits as an integer.
    #[inline]
    pub(crate) fn leading_u32(&self) -> u32 {
        (self.bits >> (IPV6_BITS - IPV4_BITS)) as u32
    }

    /// The CIDR this prefix denotes in the given family.
    pub fn to_net(&self, fam: IpFam) -> Option<IpNet> {
        if self.len > fam.bits() {
            return None;
        }
        match fam {
            IpFam::V4 => Ipv4Net::new(Ipv4Addr::from(self.leading_u32()), self.len)
                .ok()
                .map(IpNet::V4),
            IpFam::V6 => Ipv6Net::new(Ipv6Addr::from(self.bits), self.len)
                .ok()
                .map(IpNet::V6),
        }
    }
}

impl From<Ipv4Addr> for BitString {
    fn from(addr: Ipv4Addr) -> Self {
        Self {
            bits: (u32::from(addr) as u128) << (IPV6_BITS - IPV4_BITS),
            len: IPV4_BITS,
        }
    }
}

impl From<Ipv6Addr> for BitString {
    fn from(addr: Ipv6Addr) -> Self {
        Self {
            bits: u128::from(addr),
            len: IPV6_BITS,
        }
    }
}

impl Ord for BitString {
    fn cmp(&self, other: &Self) -> Ordering {
        let common: u128 = mask(self.len.min(other.len));
        (self.bits & common)
            .cmp(&(other.bits & common))
            .then(self.len.cmp(&other.len))
    }
}

impl PartialOrd for BitString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len as u32 {
            let bit: u128 = (self.bits >> (127 - i)) & 1;
            f.write_str(if bit == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// A u128 with the top `len` bits set.
#[inline]
fn mask(len: u8) -> u128 {
    match len {
        0 => 0,
        l if l >= IPV6_BITS => !0u128,
        l => !0u128 << (IPV6_BITS - l),
    }
}

/* -------------------------------------------------------------------------- */
