//! The substitution/transposition layer protecting the asset data region.
//! Present in every GM8 exe, on top of the 8.1 stream cipher when that one
//! applies.

use super::read_u32_at;
use crate::Error;
use log::debug;

/// Removes the data-region encryption in place. On entry `pos` must point at
/// the two garbage-table length dwords; on exit it points at the start of the
/// decrypted span.
pub fn decrypt(data: &mut [u8], pos: &mut usize) -> Result<(), Error> {
    // The swap table sits between two garbage tables whose lengths come first.
    let garbage1_len = read_u32_at(data, *pos)? as usize * 4;
    let garbage2_len = read_u32_at(data, *pos + 4)? as usize * 4;
    let mut p = *pos + 8 + garbage1_len;

    let mut swap_table = [0u8; 256];
    let table_src = data.get(p..p + 256).ok_or(Error::Truncated { pos: p, wanted: 256 })?;
    swap_table.copy_from_slice(table_src);
    p += 256 + garbage2_len;

    let mut reverse_table = [0u8; 256];
    for (i, &b) in swap_table.iter().enumerate() {
        reverse_table[b as usize] = i as u8;
    }

    let len = read_u32_at(data, p)? as usize;
    let start = p + 4;
    if data.len() < start + len {
        return Err(Error::Truncated { pos: start, wanted: len });
    }

    // First pass: backwards over the span, excluding its first byte. Each
    // byte is unsubstituted and has the previous byte plus its distance from
    // the span start subtracted off, all in wrapping 8-bit arithmetic.
    for i in (start + 2..=start + len).rev() {
        let distance = (i - (start + 1)) as u8;
        data[i - 1] = reverse_table[data[i - 1] as usize].wrapping_sub(data[i - 2].wrapping_add(distance));
    }

    // Second pass: backwards again, excluding the last byte touched above.
    // Each byte swaps with an earlier one picked by the forward table,
    // clamped so it never reaches before the span start.
    for i in (start + 1..start + len).rev() {
        let j = match i.checked_sub(swap_table[(i - start) & 0xFF] as usize) {
            Some(j) if j >= start => j,
            _ => start,
        };
        data.swap(i, j);
    }

    debug!("decrypted {} bytes of asset data at 0x{:X}", len, start);
    *pos = start;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Inverse of `decrypt`'s two passes, for building reference vectors.
    /// `table` must be a permutation of 0-255.
    pub fn encrypt_span(plain: &[u8], table: &[u8; 256]) -> Vec<u8> {
        let mut enc = plain.to_vec();
        // invert the second pass: same swaps, in the opposite order
        for i in 1..enc.len() {
            let j = match i.checked_sub(table[i & 0xFF] as usize) {
                Some(j) => j,
                None => 0,
            };
            enc.swap(i, j);
        }
        // invert the first pass, walking forwards so the previous byte is
        // already in its encrypted form
        for i in 1..enc.len() {
            let value = enc[i].wrapping_add(enc[i - 1]).wrapping_add(i as u8);
            enc[i] = table[value as usize];
        }
        enc
    }

    /// Wraps an encrypted span in the on-disk region layout (garbage lengths,
    /// swap table, span length).
    pub fn build_region(enc: &[u8], table: &[u8; 256]) -> Vec<u8> {
        let mut region = Vec::new();
        region.extend_from_slice(&0u32.to_le_bytes());
        region.extend_from_slice(&0u32.to_le_bytes());
        region.extend_from_slice(table);
        region.extend_from_slice(&(enc.len() as u32).to_le_bytes());
        region.extend_from_slice(enc);
        region
    }

    fn identity_table() -> [u8; 256] {
        let mut table = [0u8; 256];
        for (i, b) in table.iter_mut().enumerate() {
            *b = i as u8;
        }
        table
    }

    #[test]
    fn micro_vector() {
        // With an identity table and span [5, 10]:
        // pass 1 turns 10 into 10 - (5 + 1) = 4, pass 2 swaps the two bytes.
        let table = identity_table();
        let mut data = build_region(&[5, 10], &table);
        let mut pos = 0;
        decrypt(&mut data, &mut pos).unwrap();
        assert_eq!(&data[pos..], &[4, 5]);
    }

    #[test]
    fn round_trip_with_shuffled_table() {
        let mut table = [0u8; 256];
        for (i, b) in table.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(167).wrapping_add(13); // 167 is odd, so this is a permutation
        }
        let plain: Vec<u8> = (0..=255u8).chain(0..=255u8).map(|x| x.wrapping_mul(31)).collect();

        let mut data = build_region(&encrypt_span(&plain, &table), &table);
        let mut pos = 0;
        decrypt(&mut data, &mut pos).unwrap();
        assert_eq!(&data[pos..], &plain[..]);
    }

    #[test]
    fn truncated_span_is_an_error() {
        let table = identity_table();
        let mut data = build_region(&[1, 2, 3], &table);
        data.truncate(data.len() - 2);
        assert!(matches!(decrypt(&mut data, &mut 0), Err(Error::Truncated { .. })));
    }
}
