//! Out-of-band PSK exchange URI (spec §4.8).
//!
//! `algochat-psk://v1?addr=<recipient>&psk=<base64url(32)>&label=<urlencoded>`

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::AlgoChatError;

const SCHEME_PREFIX: &str = "algochat-psk://v1?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeUri {
    pub addr: String,
    pub psk: [u8; 32],
    pub label: String,
}

/// Percent-encode per RFC 3986 `application/x-www-form-urlencoded`-ish rules,
/// matching what a browser's `encodeURIComponent` would produce for a label.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn percent_decode(s: &str) -> Result<String, AlgoChatError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if i + 2 >= bytes.len() {
                    return Err(AlgoChatError::InvalidURI);
                }
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).map_err(|_| AlgoChatError::InvalidURI)?;
                let value = u8::from_str_radix(hex, 16).map_err(|_| AlgoChatError::InvalidURI)?;
                out.push(value);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| AlgoChatError::InvalidURI)
}

/// Encode an exchange URI. `psk` must be exactly 32 bytes; `label` is
/// optional free text, percent-encoded.
pub fn encode(addr: &str, psk: &[u8], label: &str) -> Result<String, AlgoChatError> {
    if psk.len() != 32 {
        return Err(AlgoChatError::InvalidKeyLength);
    }
    let psk_b64 = URL_SAFE_NO_PAD.encode(psk);
    Ok(format!(
        "{SCHEME_PREFIX}addr={}&psk={}&label={}",
        percent_encode(addr),
        psk_b64,
        percent_encode(label)
    ))
}

/// Decode an exchange URI. Rejects any scheme other than `algochat-psk://v1?`,
/// requires `addr` and `psk`, and treats a missing `label` as empty.
pub fn decode(uri: &str) -> Result<ExchangeUri, AlgoChatError> {
    let query = uri.strip_prefix(SCHEME_PREFIX).ok_or(AlgoChatError::InvalidURI)?;

    let mut addr: Option<String> = None;
    let mut psk_b64: Option<&str> = None;
    let mut label = String::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().ok_or(AlgoChatError::InvalidURI)?;
        let value = parts.next().unwrap_or("");
        match key {
            "addr" => addr = Some(percent_decode(value)?),
            "psk" => psk_b64 = Some(value),
            "label" => label = percent_decode(value)?,
            _ => {}
        }
    }

    let addr = addr.ok_or(AlgoChatError::InvalidURI)?;
    let psk_b64 = psk_b64.ok_or(AlgoChatError::InvalidURI)?;
    let psk_bytes = URL_SAFE_NO_PAD
        .decode(psk_b64)
        .map_err(|_| AlgoChatError::InvalidURI)?;
    let psk: [u8; 32] = psk_bytes.try_into().map_err(|_| AlgoChatError::InvalidURI)?;

    Ok(ExchangeUri { addr, psk, label })
}
