// Personally identifying information redaction
//
// Hashing keeps values stable across polls so series still line up,
// without exposing the original name or MAC.

use md5::{Digest, Md5};

use unpoller_api::Event;

fn md5_hex(pii: &str) -> String {
    format!("{:x}", Md5::digest(pii.as_bytes()))
}

/// A name or hostname: blanked when dropping, the first 24 hex characters
/// of its MD5 when hashing, untouched otherwise.
pub fn redact_name(pii: &str, hash: bool, drop: bool) -> String {
    if drop {
        return String::new();
    }
    if !hash || pii.is_empty() {
        return pii.to_owned();
    }
    let mut hex = md5_hex(pii);
    hex.truncate(24);
    hex
}

/// A MAC address: like [`redact_name`], but hashed into a MAC-shaped
/// string of seven colon-separated pairs.
pub fn redact_mac(pii: &str, hash: bool, drop: bool) -> String {
    if drop {
        return String::new();
    }
    if !hash || pii.is_empty() {
        return pii.to_owned();
    }
    let hex = md5_hex(pii);
    hex.as_bytes()
        .chunks(2)
        .take(7)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

/// Mask the host and MAC fields of a controller event. The free-text
/// message is left as is.
pub fn redact_event(mut event: Event, hash: bool, drop: bool) -> Event {
    if !hash && !drop {
        return event;
    }

    event.src_ip_geo = unpoller_api::IpGeo::default();
    event.dst_ip_geo = unpoller_api::IpGeo::default();
    event.host = redact_name(&event.host, hash, drop);
    event.hostname = redact_name(&event.hostname, hash, drop);
    event.src_mac = redact_mac(&event.src_mac, hash, drop);
    event.dst_mac = redact_mac(&event.dst_mac, hash, drop);
    event
}
