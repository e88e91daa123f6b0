// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

pub(crate) static SLASH: &str = "/";
pub(crate) static DOT: char = '.';
pub(crate) static COLON: char = ':';
pub(crate) static ELISION: &str = "::";
pub(crate) static COMMENT: char = '#';

// mod.rs
pub(crate) static ERR_FORMAT: &str = "malformed address";
pub(crate) static ERR_NOT_CONVERTIBLE: &str = "not convertible to IPv4";
pub(crate) static ERR_SOURCE: &str = "cannot read address list";

// codec.rs
pub(crate) static ERR_EMPTY: &str = "empty address";
pub(crate) static ERR_V4_PARTS: &str = "IPv4 address must have exactly 4 octets";
pub(crate) static ERR_V4_OCTET: &str = "invalid IPv4 octet";
pub(crate) static ERR_V6_ELISION: &str = "more than one '::' in IPv6 address";
pub(crate) static ERR_V6_COLON: &str = "stray ':' in IPv6 address";
pub(crate) static ERR_V6_HEXTET: &str = "invalid IPv6 hextet";
pub(crate) static ERR_V6_EMBEDDED: &str = "embedded IPv4 must be the last group";
pub(crate) static ERR_V6_LENGTH: &str = "IPv6 address does not make 128 bits";
pub(crate) static ERR_DECODE_LEN: &str = "IPv4 bit string must be 32 bits, got";

// list.rs
pub(crate) static ERR_DEPTH_LONG: &str = "prefix depth exceeds address length";
pub(crate) static ERR_DEPTH_MAPPED: &str = "IPv4-mapped prefix depth must be >= 96";

// loader.rs
pub(crate) static ERR_LINE_FIELDS: &str = "too many '/' separated fields";
pub(crate) static ERR_LINE_DEPTH: &str = "invalid prefix depth";
pub(crate) static WARN_LINE: &str = "could not parse IP range";

// config.rs
pub(crate) static ERR_PRESET: &str = "unknown preset";
