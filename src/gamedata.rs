//! Locating the gamedata header inside the executable, and the two
//! version-specific encryption layers on top of it.

pub mod gm80;
pub mod gm81;

use crate::{Error, GameVersion};
use byteorder::{ByteOrder, LE};
use log::debug;

pub(crate) fn read_u32_at(data: &[u8], pos: usize) -> Result<u32, Error> {
    data.get(pos..pos.wrapping_add(4)).map(LE::read_u32).ok_or(Error::Truncated { pos, wanted: 4 })
}

/// GM8.0 exes keep a constant marker dword at this fixed offset.
const GM80_MAGIC_POS: usize = 2_000_000;
const GM80_MAGIC: u32 = 1_234_321;

/// GM8.1 exes keep a masked marker pair somewhere in a window after this
/// offset instead.
const GM81_MAGIC_POS: usize = 3_800_004;
const GM81_MAGIC_CANDIDATES: usize = 1024;

/// Identifies the game version and the start of the gamedata header.
/// Also removes the 8.1 stream cipher when present, so the returned
/// position can be read directly.
pub fn find(data: &mut [u8]) -> Result<(GameVersion, usize), Error> {
    if read_u32_at(data, GM80_MAGIC_POS).map(|w| w == GM80_MAGIC).unwrap_or(false) {
        debug!("found GM8.0 magic at 0x{:X}", GM80_MAGIC_POS);
        return Ok((GameVersion::GameMaker8_0, GM80_MAGIC_POS + 12))
    }

    let mut pos = GM81_MAGIC_POS;
    for _ in 0..GM81_MAGIC_CANDIDATES {
        let word0 = match read_u32_at(data, pos) {
            Ok(w) => w,
            Err(_) => break,
        };
        pos += 4;
        if word0 & 0xFF00_FF00 == 0xF700_0000 {
            let word1 = match read_u32_at(data, pos) {
                Ok(w) => w,
                Err(_) => break,
            };
            if word1 & 0x00FF_00FF == 0x0014_0067 {
                pos += 4;
                debug!("found GM8.1 magic pair at 0x{:X}", pos - 8);
                gm81::decrypt(data, &mut pos)?;
                // 8.1-specific header
                return Ok((GameVersion::GameMaker8_1, pos + 16))
            }
        }
    }

    Err(Error::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gm80_marker() {
        let mut data = vec![0u8; GM80_MAGIC_POS + 4];
        data[GM80_MAGIC_POS..].copy_from_slice(&GM80_MAGIC.to_le_bytes());
        let (version, pos) = find(&mut data).unwrap();
        assert_eq!(version, GameVersion::GameMaker8_0);
        assert_eq!(pos, GM80_MAGIC_POS + 12);
    }

    #[test]
    fn unrecognized_file() {
        let mut data = vec![0u8; 64];
        assert!(matches!(find(&mut data), Err(Error::UnknownFormat)));
    }
}
