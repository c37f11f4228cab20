use crate::models::{MAC_SENTINEL, MacDecoding};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::warn;

/// Placeholder some database exports write for NULL.
const NULL_MARKER: &str = "\\N";

pub fn normalize_key(input: &str) -> &str {
    input.trim()
}

/// Normalize a raw MAC column value. `None` means the row is not indexed.
///
/// In passthrough mode NULL markers index as the sentinel, so a later NULL
/// row overwrites an earlier address. In base64 mode they are not indexed.
pub fn normalize_mac(raw: &str, decoding: MacDecoding) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let is_null = s == NULL_MARKER || s == MAC_SENTINEL;
    match decoding {
        MacDecoding::Passthrough if is_null => Some(MAC_SENTINEL.to_string()),
        MacDecoding::Passthrough => Some(s.to_string()),
        MacDecoding::Base64 if is_null => None,
        MacDecoding::Base64 => decode_base64_mac(s),
    }
}

fn decode_base64_mac(encoded: &str) -> Option<String> {
    let bytes = match STANDARD.decode(encoded) {
        Ok(b) => b,
        Err(e) => {
            warn!("cannot decode MAC {:?}: {}", encoded, e);
            return None;
        }
    };
    if bytes.len() < 6 {
        warn!(
            "cannot decode MAC {:?}: {} bytes, need 6",
            encoded,
            bytes.len()
        );
        return None;
    }
    let hex = hex::encode_upper(&bytes[..6]);
    let octets: Vec<&str> = (0..6).map(|i| &hex[i * 2..i * 2 + 2]).collect();
    Some(octets.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_trims() {
        assert_eq!(normalize_key("  bob \t"), "bob");
        assert_eq!(normalize_key("Bob"), "Bob");
    }

    #[test]
    fn test_passthrough_keeps_value() {
        assert_eq!(
            normalize_mac(" aa:bb:cc:dd:ee:ff ", MacDecoding::Passthrough).as_deref(),
            Some("aa:bb:cc:dd:ee:ff")
        );
        // no format validation
        assert_eq!(
            normalize_mac("not-a-mac", MacDecoding::Passthrough).as_deref(),
            Some("not-a-mac")
        );
    }

    #[test]
    fn test_blank_is_never_indexed() {
        for raw in ["", "  "] {
            assert_eq!(normalize_mac(raw, MacDecoding::Passthrough), None, "{raw:?}");
            assert_eq!(normalize_mac(raw, MacDecoding::Base64), None, "{raw:?}");
        }
    }

    #[test]
    fn test_null_markers_by_mode() {
        for raw in ["\\N", " N/A "] {
            assert_eq!(
                normalize_mac(raw, MacDecoding::Passthrough).as_deref(),
                Some(MAC_SENTINEL),
                "{raw:?}"
            );
            assert_eq!(normalize_mac(raw, MacDecoding::Base64), None, "{raw:?}");
        }
    }

    #[test]
    fn test_base64_decodes_to_colon_hex() {
        assert_eq!(
            normalize_mac("qrvM3e7/", MacDecoding::Base64).as_deref(),
            Some("AA:BB:CC:DD:EE:FF")
        );
        assert_eq!(
            normalize_mac("ABEiM0RV", MacDecoding::Base64).as_deref(),
            Some("00:11:22:33:44:55")
        );
    }

    #[test]
    fn test_base64_rejects_garbage_and_short_values() {
        assert_eq!(normalize_mac("***", MacDecoding::Base64), None);
        // "AAEC" is only three bytes
        assert_eq!(normalize_mac("AAEC", MacDecoding::Base64), None);
    }
}
