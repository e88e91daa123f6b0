// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    strings::*,
    structs::{BitString, IpFam, IPV4_MAPPED_MARKER},
    AddressError, IPV4_BITS, IPV6_BITS, MAPPED_BITS,
};
use std::net::{Ipv4Addr, Ipv6Addr};

const V6_GROUPS: usize = 8;

/**
Encode a dotted-decimal IPv4 address into a 32-bit [BitString].

Exactly four octets are required, each 1-3 decimal digits with a value
of at most 255. Anything else is a [AddressError::Format].
*/
pub fn encode_ipv4(text: impl AsRef<str>) -> Result<BitString, AddressError> {
    let s: &str = text.as_ref();
    if s.is_empty() {
        return Err(AddressError::format(ERR_EMPTY, s));
    }

    let parts: Vec<&str> = s.split(DOT).collect();
    if parts.len() != 4 {
        return Err(AddressError::format(ERR_V4_PARTS, s));
    }

    let mut octets: [u8; 4] = [0; 4];
    for (octet, part) in octets.iter_mut().zip(parts) {
        *octet = parse_octet(part).ok_or_else(|| AddressError::format(ERR_V4_OCTET, s))?;
    }
    Ok(BitString::from(Ipv4Addr::from(octets)))
}

/**
Encode a textual IPv6 address into a 128-bit [BitString].

Supported notation:
- full form: `2001:db8:0:0:0:0:0:1`
- one `::` elision: `2001:db8::1`, `::1`, `fe80::`, `::`
- embedded IPv4 as the final 32 bits: `::ffff:192.0.2.1`

Hex digits are case-insensitive and each group holds 1-4 of them.
*/
pub fn encode_ipv6(text: impl AsRef<str>) -> Result<BitString, AddressError> {
    let s: &str = text.as_ref();
    if s.is_empty() {
        return Err(AddressError::format(ERR_EMPTY, s));
    }

    let (head, tail) = match s.split_once(ELISION) {
        Some((h, t)) => {
            if t.contains(ELISION) {
                return Err(AddressError::format(ERR_V6_ELISION, s));
            }
            (h, Some(t))
        }
        None => (s, None),
    };

    let mut groups: Vec<u16> = parse_groups(head, tail.is_none(), s)?;
    if let Some(tail) = tail {
        let tail: Vec<u16> = parse_groups(tail, true, s)?;
        // an elision may stand for zero groups as well
        let fill: usize = V6_GROUPS
            .checked_sub(groups.len() + tail.len())
            .ok_or_else(|| AddressError::format(ERR_V6_LENGTH, s))?;
        groups.extend(std::iter::repeat(0u16).take(fill));
        groups.extend(tail);
    }

    let segments: [u16; V6_GROUPS] = groups
        .try_into()
        .map_err(|_| AddressError::format(ERR_V6_LENGTH, s))?;
    Ok(BitString::from(Ipv6Addr::from(segments)))
}

/// Parse colon-separated groups on one side of an elision.
fn parse_groups(part: &str, is_last: bool, full: &str) -> Result<Vec<u16>, AddressError> {
    if part.is_empty() {
        return Ok(Vec::new());
    }

    let fields: Vec<&str> = part.split(COLON).collect();
    let last_idx: usize = fields.len() - 1;
    let mut out: Vec<u16> = Vec::with_capacity(V6_GROUPS);

    for (i, field) in fields.into_iter().enumerate() {
        if field.is_empty() {
            return Err(AddressError::format(ERR_V6_COLON, full));
        }
        if field.contains(DOT) {
            if !is_last || i != last_idx {
                return Err(AddressError::format(ERR_V6_EMBEDDED, full));
            }
            let v4: u32 = encode_ipv4(field)?.leading_u32();
            out.push((v4 >> 16) as u16);
            out.push(v4 as u16);
            continue;
        }
        out.push(parse_hextet(field).ok_or_else(|| AddressError::format(ERR_V6_HEXTET, full))?);
    }
    Ok(out)
}

#[inline]
fn parse_octet(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u8>().ok()
}

#[inline]
fn parse_hextet(s: &str) -> Option<u16> {
    if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(s, 16).ok()
}

/// Decode a 32-bit [BitString] back to dotted-decimal text.
pub fn decode_ipv4(bits: &BitString) -> Result<String, AddressError> {
    if bits.len() != IPV4_BITS {
        return Err(AddressError::Format(format!("{ERR_DECODE_LEN} {}", bits.len())));
    }
    Ok(Ipv4Addr::from(bits.leading_u32()).to_string())
}

/**
Strip the `::ffff:0:0/96` marker from a 128-bit IPv4-mapped address,
returning the trailing 32 bits.

Fails with [AddressError::NotConvertible] for any other input.
*/
pub fn to_canonical_ipv4(bits: &BitString) -> Result<BitString, AddressError> {
    if bits.len() != IPV6_BITS || !bits.starts_with(&IPV4_MAPPED_MARKER) {
        let shown: String = match bits.len() {
            IPV6_BITS => Ipv6Addr::from(bits.bits()).to_string(),
            _ => bits.to_string(),
        };
        return Err(AddressError::NotConvertible(shown));
    }
    Ok(bits.skip(MAPPED_BITS))
}

/// Syntactic family check: a colon anywhere means IPv6. Does not validate.
#[inline]
pub fn classify(text: impl AsRef<str>) -> IpFam {
    match text.as_ref().contains(COLON) {
        true => IpFam::V6,
        false => IpFam::V4,
    }
}

#[inline]
pub fn is_ipv4(text: impl AsRef<str>) -> bool {
    classify(text) == IpFam::V4
}

/// True if the address encodes successfully in the family [classify] picks.
pub fn is_valid(text: impl AsRef<str>) -> bool {
    encode(text).is_ok()
}

/// Classify and encode an address in one go.
pub fn encode(text: impl AsRef<str>) -> Result<(IpFam, BitString), AddressError> {
    let s: &str = text.as_ref();
    match classify(s) {
        IpFam::V4 => Ok((IpFam::V4, encode_ipv4(s)?)),
        IpFam::V6 => Ok((IpFam::V6, encode_ipv6(s)?)),
    }
}

/**
Like [encode], but an IPv4-mapped IPv6 address comes back as the IPv4
family with the marker stripped.
*/
pub fn encode_canonical(text: impl AsRef<str>) -> Result<(IpFam, BitString), AddressError> {
    let (fam, bits) = encode(text)?;
    let (fam, bits, _) = strip_mapped(fam, bits);
    Ok((fam, bits))
}

/// Move IPv4-mapped IPv6 bits to the IPv4 family. Also returns the number of bits stripped.
#[inline]
pub(crate) fn strip_mapped(fam: IpFam, bits: BitString) -> (IpFam, BitString, u8) {
    if fam == IpFam::V6 && bits.starts_with(&IPV4_MAPPED_MARKER) {
        return (IpFam::V4, bits.skip(MAPPED_BITS), MAPPED_BITS);
    }
    (fam, bits, 0)
}

/// Convert IPv4-mapped IPv6 text (e.g. `::ffff:10.0.0.1`) to dotted-decimal.
pub fn ipv6_to_ipv4(text: impl AsRef<str>) -> Result<String, AddressError> {
    let bits: BitString = encode_ipv6(text.as_ref())?;
    let v4: BitString = to_canonical_ipv4(&bits)
        .map_err(|_| AddressError::NotConvertible(text.as_ref().to_string()))?;
    decode_ipv4(&v4)
}

/**
Return the IPv4 form of an address. IPv4 text is validated and returned
unchanged, IPv6 text must be IPv4-mapped.
*/
pub fn to_ipv4(text: impl AsRef<str>) -> Result<String, AddressError> {
    let s: &str = text.as_ref();
    if is_ipv4(s) {
        encode_ipv4(s)?;
        return Ok(s.to_string());
    }
    ipv6_to_ipv4(s)
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    const V4_ADDRS: [&str; 6] = [
        "0.0.0.0",
        "10.0.0.1",
        "127.0.0.1",
        "192.168.100.254",
        "203.0.113.5",
        "255.255.255.255",
    ];

    const BAD_V4: [&str; 10] = [
        "",
        "1.2.3",
        "1.2.3.4.5",
        "1.2.3.256",
        "1.2.3.-1",
        "1.2..4",
        "a.b.c.d",
        "1.2.3.4 ",
        "+1.2.3.4",
        "1000.2.3.4",
    ];

    const BAD_V6: [&str; 12] = [
        "",
        ":::",
        "1::2::3",
        ":1::",
        "::1:",
        ":1:2:3:4:5:6:7",
        "1:2:3:4:5:6:7:",
        "1:2:3:4:5:6:7",
        "1:2:3:4:5:6:7:8:9",
        "12345::",
        "g::1",
        "1.2.3.4::",
    ];

    #[test]
    fn test_encode_ipv4() {
        let bits: BitString = encode_ipv4("192.168.1.1").unwrap();
        assert_eq!(bits.len(), 32);
        assert_eq!(bits.to_string(), "11000000101010000000000100000001");
    }

    #[test]
    fn test_ipv4_roundtrip() {
        for ip in V4_ADDRS {
            assert_eq!(decode_ipv4(&encode_ipv4(ip).unwrap()).unwrap(), ip);
        }
    }

    #[test]
    fn test_ipv4_leading_zeros() {
        assert_eq!(decode_ipv4(&encode_ipv4("010.001.000.009").unwrap()).unwrap(), "10.1.0.9");
    }

    #[test]
    fn test_bad_ipv4() {
        for ip in BAD_V4 {
            let res = encode_ipv4(ip);
            assert!(matches!(res, Err(AddressError::Format(_))), "Failed: '{ip}'");
        }
    }

    #[test]
    fn test_encode_ipv6_equivalents() {
        let same: [&str; 5] = [
            "2001:db8:0:0:0:0:0:1",
            "2001:DB8::1",
            "2001:0db8:0000:0000:0000:0000:0000:0001",
            "2001:db8:0::0:1",
            "2001:db8::0.0.0.1",
        ];
        let first: BitString = encode_ipv6(same[0]).unwrap();
        assert_eq!(first.len(), 128);
        for ip in &same[1..] {
            assert_eq!(encode_ipv6(ip).unwrap(), first, "Failed: '{ip}'");
        }
        assert_eq!(first, BitString::from("2001:db8::1".parse::<Ipv6Addr>().unwrap()));
    }

    #[test]
    fn test_encode_ipv6_boundaries() {
        assert_eq!(encode_ipv6("::").unwrap().bits(), 0);
        assert_eq!(encode_ipv6("::1").unwrap().bits(), 1);
        assert_eq!(encode_ipv6("fe80::").unwrap().bits(), 0xfe80u128 << 112);
        // elision standing for zero groups
        assert_eq!(
            encode_ipv6("1:2:3:4:5:6:7::8").unwrap(),
            encode_ipv6("1:2:3:4:5:6:7:8").unwrap()
        );
    }

    #[test]
    fn test_bad_ipv6() {
        for ip in BAD_V6 {
            let res = encode_ipv6(ip);
            assert!(matches!(res, Err(AddressError::Format(_))), "Failed: '{ip}'");
        }
    }

    #[test]
    fn test_mapped_to_canonical() {
        for ip in V4_ADDRS {
            let mapped: BitString = encode_ipv6(format!("::ffff:{ip}")).unwrap();
            assert_eq!(to_canonical_ipv4(&mapped).unwrap(), encode_ipv4(ip).unwrap());
        }
        let hex: BitString = encode_ipv6("::ffff:c000:0201").unwrap();
        assert_eq!(decode_ipv4(&to_canonical_ipv4(&hex).unwrap()).unwrap(), "192.0.2.1");
    }

    #[test]
    fn test_not_convertible() {
        let bits: BitString = encode_ipv6("2001:db8::1").unwrap();
        assert!(matches!(to_canonical_ipv4(&bits), Err(AddressError::NotConvertible(_))));
        let short: BitString = encode_ipv4("1.2.3.4").unwrap();
        assert!(matches!(to_canonical_ipv4(&short), Err(AddressError::NotConvertible(_))));
        assert!(matches!(ipv6_to_ipv4("::1"), Err(AddressError::NotConvertible(_))));
    }

    #[test]
    fn test_decode_wrong_length() {
        let bits: BitString = encode_ipv4("1.2.3.4").unwrap().truncate(24);
        assert!(decode_ipv4(&bits).is_err());
    }

    #[test]
    fn test_classify_and_validate() {
        assert_eq!(classify("1.2.3.4"), IpFam::V4);
        assert_eq!(classify("::1"), IpFam::V6);
        assert_eq!(classify("garbage"), IpFam::V4);
        assert_eq!(classify("gar:bage"), IpFam::V6);

        assert!(is_valid("1.2.3.4"));
        assert!(is_valid("::ffff:1.2.3.4"));
        assert!(!is_valid(""));
        assert!(!is_valid("garbage"));
        assert!(!is_valid("gar:bage"));
    }

    #[test]
    fn test_to_ipv4() {
        assert_eq!(to_ipv4("10.1.2.3").unwrap(), "10.1.2.3");
        assert_eq!(to_ipv4("::ffff:10.1.2.3").unwrap(), "10.1.2.3");
        assert_eq!(ipv6_to_ipv4("::FFFF:a01:203").unwrap(), "10.1.2.3");
        assert!(to_ipv4("10.1.2").is_err());
        assert!(to_ipv4("fe80::1").is_err());
    }

    #[test]
    fn test_encode_canonical() {
        let (fam, bits) = encode_canonical("::ffff:203.0.113.5").unwrap();
        assert_eq!(fam, IpFam::V4);
        assert_eq!(bits, encode_ipv4("203.0.113.5").unwrap());

        let (fam, bits) = encode_canonical("fe80::1").unwrap();
        assert_eq!(fam, IpFam::V6);
        assert_eq!(bits.len(), 128);
    }
}
