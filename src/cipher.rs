use crate::archive::Archive;
use crate::error::{Error, Result};

const KEY_MUL_A: u64 = 0x4165;
const KEY_MUL_B: u64 = 0xA3;
const KEY_SEED_MUL: u64 = 0x95;
const KEY_BASE: u64 = 0x65;
const KEY_STEP: u64 = 0xA3;

/// Initial keystream value for a given seed byte.
///
/// Only the low byte is ever applied, so wrapping arithmetic gives the same
/// keystream as unbounded integers would.
pub fn initial_key(seed: u8) -> u64 {
    let seed: u64 = seed as u64;

    seed.wrapping_mul(KEY_MUL_A)
        .wrapping_mul(KEY_MUL_B)
        .wrapping_add(seed.wrapping_mul(KEY_SEED_MUL))
        .wrapping_add(KEY_BASE)
}

/// Decrypts one `lby` file. The first byte is the keystream seed and is not
/// part of the output, so the result is one byte shorter than `data`.
pub fn decrypt(data: &[u8]) -> Vec<u8> {
    let Some((&seed, body)) = data.split_first() else {
        return Vec::new();
    };

    let mut decrypted: Vec<u8> = Vec::with_capacity(body.len());
    let mut key: u64 = initial_key(seed);

    for item in body {
        let mut value: u8 = item ^ (key & 0xff) as u8;

        if value > 0x7f {
            value -= 0x80;
        }

        decrypted.push(value);
        key = key.wrapping_add(KEY_STEP);
    }

    decrypted
}

/// Reads `entry` from the archive afresh and decrypts it.
pub fn decrypt_entry(archive: &mut Archive, entry: &str) -> Result<Vec<u8>> {
    let raw: Vec<u8> = archive
        .read_entry(entry)?
        .ok_or_else(|| Error::MissingAsset(entry.to_string()))?;

    Ok(decrypt(&raw))
}
