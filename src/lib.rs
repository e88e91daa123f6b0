// Copyright (c) 2024-2026 Mikko Tanner. All rights reserved.

/*!
IPv4/IPv6 addresses as comparable bit strings, and lists of network ranges
answering "is this address in any of them?".

```ignore
use iplist::IpList;

let mut list = IpList::intranet();
list.append("203.0.113.0", Some(24))?;
list.load_file("/etc/myapp/banned.txt")?;

assert!(list.contains("192.168.1.10")?);
assert!(list.contains("::ffff:203.0.113.7")?);
```
*/

mod filesystem;
pub mod iptools;

pub use iptools::{
    AddressError, BitString, IpFam, IpList, LineWarning, ListConfig, LoadStats, Preset,
    SharedIpList,
};
