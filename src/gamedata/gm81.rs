//! The GM8.1 stream cipher. A pair of seeds, one read from the stream and
//! one hashed from a formatted key string, drive two interleaved 16-bit
//! LCGs whose output is XORed over the data one dword at a time.

use super::read_u32_at;
use crate::Error;
use byteorder::{ByteOrder, LE};
use log::debug;

const CRC_POLYNOMIAL: u32 = 0x04C1_1DB7;

fn crc_reflect(mut value: u32, bits: u8) -> u32 {
    let mut reflected = 0;
    for i in 1..=bits {
        if value & 1 != 0 {
            reflected |= 1 << (bits - i);
        }
        value >>= 1;
    }
    reflected
}

fn crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut value = crc_reflect(i as u32, 8) << 24;
        for _ in 0..8 {
            let xor = if value & 0x8000_0000 != 0 { CRC_POLYNOMIAL } else { 0 };
            value = (value << 1) ^ xor;
        }
        *entry = crc_reflect(value, 32);
    }
    table
}

/// The vendor's CRC-32: standard reflected table, initial value 0xFFFFFFFF,
/// but without the final xor-out.
fn crc32(bytes: &[u8], table: &[u32; 256]) -> u32 {
    let mut result = 0xFFFF_FFFF_u32;
    for &b in bytes {
        result = (result >> 8) ^ table[((result & 0xFF) as u8 ^ b) as usize];
    }
    result
}

fn next_mask(seed1: &mut u32, seed2: &mut u32) -> u32 {
    *seed1 = (*seed1 & 0xFFFF).wrapping_mul(0x9069).wrapping_add(*seed1 >> 16);
    *seed2 = (*seed2 & 0xFFFF).wrapping_mul(0x4650).wrapping_add(*seed2 >> 16);
    (*seed1 << 16).wrapping_add(*seed2 & 0xFFFF)
}

/// Removes the 8.1 encryption in place. On entry `pos` must point at the key
/// seed dword (right after the magic pair); it is advanced past the two seed
/// dwords. Everything from there to the end of the buffer is decrypted,
/// except a short leading gap and a trailing partial dword.
pub fn decrypt(data: &mut [u8], pos: &mut usize) -> Result<(), Error> {
    // The hash key is the seed formatted into a fixed template, with every
    // character widened to a 2-byte little-endian code unit. This reproduces
    // the vendor's wide-string hashing and must stay bit-for-bit identical.
    let key_seed = read_u32_at(data, *pos)? as i32;
    let hash_key = format!("_MJD{}#RWK", key_seed);
    let mut wide = Vec::with_capacity(hash_key.len() * 2);
    for c in hash_key.bytes() {
        wide.push(c);
        wide.push(0);
    }

    let table = crc_table();
    let mut seed2 = crc32(&wide, &table);
    let mut seed1 = read_u32_at(data, *pos + 4)?;
    *pos += 8;

    // This leading span is never encrypted.
    let mut enc_pos = *pos + (seed2 & 0xFF) as usize + 10;
    debug!("gm81 decryption starting at 0x{:X}", enc_pos);

    while data.len().saturating_sub(enc_pos) >= 4 {
        let word = LE::read_u32(&data[enc_pos..enc_pos + 4]) ^ next_mask(&mut seed1, &mut seed2);
        LE::write_u32(&mut data[enc_pos..enc_pos + 4], word);
        enc_pos += 4;
    }

    Ok(())
}
