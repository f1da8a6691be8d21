use crate::error::{DakaError, Result};
use num_bigint::BigUint;

/// Encrypts `secret` with textbook RSA against the portal's public key.
///
/// The portal's login page performs the same computation in JavaScript:
/// the raw secret bytes are read as one big-endian integer, raised to the
/// public exponent modulo the modulus, and rendered as lowercase hex
/// left-padded with '0' to 128 characters. There is deliberately no
/// OAEP/PKCS#1 padding; the server decrypts the bare residue.
pub fn rsa_encrypt(secret: &str, exponent_hex: &str, modulus_hex: &str) -> Result<String> {
    let e = BigUint::parse_bytes(exponent_hex.as_bytes(), 16)
        .ok_or_else(|| DakaError::PubKey(format!("bad exponent hex `{exponent_hex}`")))?;
    let n = BigUint::parse_bytes(modulus_hex.as_bytes(), 16)
        .ok_or_else(|| DakaError::PubKey(format!("bad modulus hex `{modulus_hex}`")))?;
    if n.bits() == 0 {
        return Err(DakaError::PubKey("zero modulus".to_string()));
    }

    let m = BigUint::from_bytes_be(secret.as_bytes());
    let c = m.modpow(&e, &n);
    Ok(format!("{:0>128}", c.to_str_radix(16)))
}
