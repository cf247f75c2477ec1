//! Stellar strkey account encoding
//!
//! Encodes and decodes G-addresses: base32 (RFC 4648, no padding) over a
//! version byte, the 32-byte ed25519 key, and a CRC16-XModem checksum.

use base32::Alphabet;
use thiserror::Error;

/// Version byte for ed25519 public keys ('G' prefix after base32).
const VERSION_ED25519_PUBLIC_KEY: u8 = 6 << 3;

/// Errors that can occur while decoding a Stellar address
#[derive(Error, Debug)]
pub enum StrkeyError {
    #[error("Invalid Stellar address format: {0}")]
    InvalidFormat(String),

    #[error("Invalid address checksum")]
    InvalidChecksum,
}

/// Decode a G-address into the raw 32-byte ed25519 public key.
pub fn decode_account_id(address: &str) -> Result<[u8; 32], StrkeyError> {
    if !address.starts_with('G') {
        return Err(StrkeyError::InvalidFormat(
            "account addresses must start with 'G'".to_string(),
        ));
    }

    let decoded = base32::decode(Alphabet::Rfc4648 { padding: false }, address)
        .ok_or_else(|| StrkeyError::InvalidFormat("invalid base32 encoding".to_string()))?;

    // 1 version byte + 32 key bytes + 2 checksum bytes
    if decoded.len() != 35 {
        return Err(StrkeyError::InvalidFormat(format!(
            "expected 35 bytes, got {}",
            decoded.len()
        )));
    }

    if decoded[0] != VERSION_ED25519_PUBLIC_KEY {
        return Err(StrkeyError::InvalidFormat(
            "not an ed25519 public key".to_string(),
        ));
    }

    let payload = &decoded[..33];
    let checksum = &decoded[33..35];
    if checksum != crc16_xmodem(payload) {
        return Err(StrkeyError::InvalidChecksum);
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&decoded[1..33]);
    Ok(key)
}

/// Encode a raw 32-byte ed25519 public key as a G-address.
pub fn encode_account_id(key: &[u8; 32]) -> String {
    let mut payload = Vec::with_capacity(35);
    payload.push(VERSION_ED25519_PUBLIC_KEY);
    payload.extend_from_slice(key);
    let checksum = crc16_xmodem(&payload);
    payload.extend_from_slice(&checksum);
    base32::encode(Alphabet::Rfc4648 { padding: false }, &payload)
}

/// CRC16-XModem checksum in little-endian byte order (Stellar convention).
fn crc16_xmodem(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0;

    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }

    [(crc & 0xff) as u8, (crc >> 8) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";

    #[test]
    fn test_decode_valid_address() {
        assert!(decode_account_id(ADDRESS).is_ok());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let key = decode_account_id(ADDRESS).unwrap();
        assert_eq!(encode_account_id(&key), ADDRESS);
    }

    #[test]
    fn test_round_trip_arbitrary_key() {
        let key = [42u8; 32];
        let address = encode_account_id(&key);
        assert!(address.starts_with('G'));
        assert_eq!(decode_account_id(&address).unwrap(), key);
    }

    #[test]
    fn test_invalid_prefix() {
        let address = "SAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";
        assert!(matches!(
            decode_account_id(address),
            Err(StrkeyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_corrupted_checksum() {
        // Flip the final character
        let mut corrupted = ADDRESS.to_string();
        corrupted.pop();
        corrupted.push('A');
        assert!(decode_account_id(&corrupted).is_err());
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            decode_account_id("GABC"),
            Err(StrkeyError::InvalidFormat(_))
        ));
    }
}
