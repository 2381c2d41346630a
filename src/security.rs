//! Log/debug-output sanitizing and IP whitelisting.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde_json::Value;

/// Replacement marker used by [`sanitize_json_default`].
pub const STRIPPED: &str = "##STRIPPED##";

/// Key names masked by [`sanitize_json_default`].
pub const DEFAULT_NEEDLES: &[&str] = &["password", "fileHolderBase64", "_token"];

/// Byte budget for string values in [`sanitize_json_default`].
pub const DEFAULT_MAX_STRING_BYTES: usize = 255;

/// Sanitize a JSON tree with the default needles, marker and size limit.
pub fn sanitize_json_default(value: &mut Value) {
    sanitize_json(value, STRIPPED, DEFAULT_NEEDLES, DEFAULT_MAX_STRING_BYTES);
}

/// Recursively sanitize a JSON tree before it is logged or dumped.
///
/// Object values whose key matches one of `needles` (case-insensitive)
/// are replaced with `replacement`. Strings longer than
/// `max_string_bytes` are truncated (on a char boundary) and suffixed
/// with `replacement`. A `max_string_bytes` of 0 disables truncation.
pub fn sanitize_json(value: &mut Value, replacement: &str, needles: &[&str], max_string_bytes: usize) {
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                if needles.iter().any(|n| n.eq_ignore_ascii_case(key)) {
                    *item = Value::String(replacement.to_owned());
                    continue;
                }
                match item {
                    Value::String(s) => truncate_string(s, replacement, max_string_bytes),
                    _ => sanitize_json(item, replacement, needles, max_string_bytes),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                sanitize_json(item, replacement, needles, max_string_bytes);
            }
        }
        Value::String(s) => truncate_string(s, replacement, max_string_bytes),
        _ => {}
    }
}

fn truncate_string(s: &mut String, replacement: &str, max_bytes: usize) {
    if max_bytes == 0 || s.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
    s.push_str(replacement);
}

/// Check whether `ip` is covered by a comma-separated whitelist of plain
/// addresses and CIDR ranges (IPv4 and IPv6).
///
/// Empty or `0.0.0.0` client addresses are never whitelisted, and an
/// empty whitelist matches nothing.
pub fn is_ip_whitelisted(ip: &str, whitelist: &str) -> bool {
    let ip = ip.trim();
    if ip.is_empty() || ip == "0.0.0.0" {
        return false;
    }
    let Ok(addr) = ip.parse::<IpAddr>() else {
        return false;
    };
    whitelist
        .split(',')
        .map(str::trim)
        .filter(|range| !range.is_empty())
        .any(|range| range_contains(range, addr))
}

fn range_contains(range: &str, addr: IpAddr) -> bool {
    match range.split_once('/') {
        None => range.parse::<IpAddr>() == Ok(addr),
        Some((base, prefix)) => {
            let Ok(prefix) = prefix.parse::<u32>() else {
                return false;
            };
            match (base.parse::<Ipv4Addr>(), base.parse::<Ipv6Addr>(), addr) {
                (Ok(net), _, IpAddr::V4(v4)) if prefix <= 32 => {
                    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
                    u32::from(net) & mask == u32::from(v4) & mask
                }
                (_, Ok(net), IpAddr::V6(v6)) if prefix <= 128 => {
                    let mask = if prefix == 0 {
                        0
                    } else {
                        u128::MAX << (128 - prefix)
                    };
                    u128::from(net) & mask == u128::from(v6) & mask
                }
                _ => false,
            }
        }
    }
}
