//! Authenticator algorithms and User-Password hiding (RFC 2865 Section 3 and
//! 5.2, RFC 2866 Section 3)

use rand::Rng;
use thiserror::Error;

/// Size of the Authenticator field
pub const AUTHENTICATOR_LENGTH: usize = 16;

/// Longest User-Password plaintext RFC 2865 allows
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid encrypted password length: {0}")]
    InvalidLength(usize),
    #[error("password too long: {0} bytes (max {MAX_PASSWORD_LENGTH})")]
    TooLong(usize),
    #[error("invalid UTF-8 in password")]
    InvalidUtf8,
}

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
///
/// Uses the thread-local generator, so concurrent callers never share state.
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut rng = rand::rng();
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator);
    authenticator
}

/// Random packet identifier
pub fn generate_identifier() -> u8 {
    rand::rng().random()
}

fn digest(
    code: u8,
    identifier: u8,
    length: u16,
    authenticator: &[u8; 16],
    attributes: &[u8],
    secret: &[u8],
) -> [u8; 16] {
    let mut data = Vec::with_capacity(20 + attributes.len() + secret.len());
    data.push(code);
    data.push(identifier);
    data.extend_from_slice(&length.to_be_bytes());
    data.extend_from_slice(authenticator);
    data.extend_from_slice(attributes);
    data.extend_from_slice(secret);
    md5::compute(&data).0
}

/// Calculate Response Authenticator per RFC 2865 Section 3
///
/// Response Authenticator = MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
///
/// Used for Access-Accept/Reject/Challenge, Accounting-Response and the
/// RFC 3576 ACK/NAK replies.
pub fn calculate_response_authenticator(
    code: u8,
    identifier: u8,
    length: u16,
    request_authenticator: &[u8; 16],
    attributes: &[u8],
    secret: &[u8],
) -> [u8; 16] {
    digest(code, identifier, length, request_authenticator, attributes, secret)
}

/// Calculate the Request Authenticator of an Accounting-Request per RFC 2866
/// Section 3 (also used by CoA-Request and Disconnect-Request)
///
/// Request Authenticator = MD5(Code + ID + Length + 16 zero octets + Attributes + Secret)
pub fn calculate_accounting_request_authenticator(
    code: u8,
    identifier: u8,
    length: u16,
    attributes: &[u8],
    secret: &[u8],
) -> [u8; 16] {
    digest(code, identifier, length, &[0u8; 16], attributes, secret)
}

/// Compare two authenticators without short-circuiting on the first
/// differing byte
pub fn authenticators_match(a: &[u8; 16], b: &[u8; 16]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Compare two byte strings of possibly different lengths, visiting every
/// byte of the longer one
pub fn secrets_match(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let diff = (0..len).fold(0u8, |acc, i| {
        acc | (a.get(i).copied().unwrap_or(0) ^ b.get(i).copied().unwrap_or(0))
    });
    diff == 0 && a.len() == b.len()
}

/// Encrypt User-Password attribute per RFC 2865 Section 5.2
///
/// The password is first padded to a multiple of 16 bytes, then XORed with
/// MD5(secret + request_authenticator) for the first 16 bytes, and
/// MD5(secret + previous_block) for subsequent blocks.
pub fn encrypt_user_password(
    password: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PasswordError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong(password.len()));
    }

    let mut padded = password.to_vec();
    let blocks = padded.len().div_ceil(16).max(1);
    padded.resize(blocks * 16, 0);

    let mut result = Vec::with_capacity(padded.len());
    let mut previous_block: [u8; 16] = *authenticator;

    for chunk in padded.chunks(16) {
        let hash = block_key(secret, &previous_block);
        for (i, byte) in previous_block.iter_mut().enumerate() {
            *byte = chunk[i] ^ hash[i];
        }
        result.extend_from_slice(&previous_block);
    }

    Ok(result)
}

/// Decrypt User-Password attribute per RFC 2865 Section 5.2
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<String, PasswordError> {
    if encrypted.len() % 16 != 0 || encrypted.is_empty() {
        return Err(PasswordError::InvalidLength(encrypted.len()));
    }

    let mut result = Vec::with_capacity(encrypted.len());
    let mut previous_block: &[u8] = authenticator;

    for chunk in encrypted.chunks(16) {
        let hash = block_key(secret, previous_block);
        result.extend(chunk.iter().zip(hash.iter()).map(|(c, h)| c ^ h));
        previous_block = chunk;
    }

    // Remove padding (null bytes at the end)
    while result.last() == Some(&0) {
        result.pop();
    }

    String::from_utf8(result).map_err(|_| PasswordError::InvalidUtf8)
}

fn block_key(secret: &[u8], previous: &[u8]) -> [u8; 16] {
    let mut data = Vec::with_capacity(secret.len() + previous.len());
    data.extend_from_slice(secret);
    data.extend_from_slice(previous);
    md5::compute(&data).0
}
