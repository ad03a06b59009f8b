//! Extension packages. Unlike the other categories these are stored in the
//! clear (no per-asset zlib block); instead each package carries a scrambled
//! data span holding the zlib-compressed contents of its files.

use crate::{stream::DataCursor, zlib, ByteString, Error};

pub struct Extension {
    pub name: ByteString,

    /// The folder the extension installs from, usually empty in packages
    pub folder_name: ByteString,

    pub files: Vec<ExtensionFile>,
}

pub struct ExtensionFile {
    pub file_name: ByteString,
    pub kind: FileKind,

    /// Name of the function called when the file is loaded, if any
    pub initializer: ByteString,

    /// Name of the function called at game end, if any
    pub finalizer: ByteString,

    pub functions: Vec<ExtensionFunction>,
    pub constants: Vec<ExtensionConstant>,

    /// The file contents, descrambled and inflated
    pub data: Box<[u8]>,
}

#[derive(Copy, Clone, Eq, PartialEq)]
pub enum FileKind {
    DynamicLibrary,
    GmlScript,
    ActionLibrary,
    Other,
}

pub struct ExtensionFunction {
    pub name: ByteString,

    /// The exported symbol this function maps to
    pub external_name: ByteString,

    /// Calling convention: 11 for stdcall, 12 for cdecl
    pub convention: u32,

    pub arg_count: u32,

    /// Argument types: 1 for string, 2 for real. All 17 slots are stored
    /// regardless of `arg_count`.
    pub arg_types: [u32; 17],

    /// Return type, same encoding as the argument types
    pub return_type: u32,
}

pub struct ExtensionConstant {
    pub name: ByteString,
    pub value: ByteString,
}

impl Extension {
    pub fn deserialize(cur: &mut DataCursor, scratch: &mut Vec<u8>) -> Result<Self, Error> {
        cur.skip(4)?; // data version, 700
        let name = cur.read_pas_string()?;
        let folder_name = cur.read_pas_string()?;

        let file_count = cur.read_u32()? as usize;
        let mut files = Vec::with_capacity(file_count.min(cur.remaining() / 24));
        for _ in 0..file_count {
            cur.skip(4)?; // data version, 700
            let file_name = cur.read_pas_string()?;
            let kind = match cur.read_u32()? {
                1 => FileKind::DynamicLibrary,
                2 => FileKind::GmlScript,
                3 => FileKind::ActionLibrary,
                _ => FileKind::Other,
            };
            let initializer = cur.read_pas_string()?;
            let finalizer = cur.read_pas_string()?;

            let count = cur.read_u32()? as usize;
            let mut functions = Vec::with_capacity(count.min(cur.remaining() / 88));
            for _ in 0..count {
                cur.skip(4)?; // data version, 700
                let name = cur.read_pas_string()?;
                let external_name = cur.read_pas_string()?;
                let convention = cur.read_u32()?;
                cur.skip(4)?; // always zero
                let arg_count = cur.read_u32()?;
                let mut arg_types = [0u32; 17];
                for ty in arg_types.iter_mut() {
                    *ty = cur.read_u32()?;
                }
                let return_type = cur.read_u32()?;
                functions.push(ExtensionFunction {
                    name,
                    external_name,
                    convention,
                    arg_count,
                    arg_types,
                    return_type,
                });
            }

            let count = cur.read_u32()? as usize;
            let mut constants = Vec::with_capacity(count.min(cur.remaining() / 12));
            for _ in 0..count {
                cur.skip(4)?; // data version, 700
                constants.push(ExtensionConstant {
                    name: cur.read_pas_string()?,
                    value: cur.read_pas_string()?,
                });
            }

            files.push(ExtensionFile {
                file_name,
                kind,
                initializer,
                finalizer,
                functions,
                constants,
                data: Box::default(),
            });
        }

        // The data span: a seed dword followed by the files' zlib blocks,
        // scrambled bytewise. Descrambling works on an owned copy so the
        // source buffer keeps its position-dependent layout intact.
        let span_len = cur.read_u32()? as usize;
        let mut payload = cur.take(span_len)?.to_vec();
        let seed = DataCursor::new(&payload).read_i32()?;
        let table = descramble_table(seed)?;
        for byte in payload.iter_mut().skip(5) {
            *byte = table[usize::from(*byte) + 0x100];
        }

        let mut data_cur = DataCursor::with_position(&payload, 4);
        for file in files.iter_mut() {
            let len = zlib::inflate_block(&mut data_cur, scratch)?;
            file.data = scratch[..len].to_vec().into_boxed_slice();
        }

        Ok(Extension { name, folder_name, files })
    }
}

/// Builds the 512-byte substitution table seeded by the span's first dword.
/// The lower half scrambles, the upper half is its inverse and is what
/// decoding uses. The two seed components get one +100 correction when
/// negative; a seed they cannot correct marks the block as corrupt.
fn descramble_table(seed: i32) -> Result<[u8; 512], Error> {
    let mut seed1 = seed / 0xFA;
    let mut seed2 = (seed % 0xFA) + 6;
    if seed1 < 0 {
        seed1 += 100;
    }
    if seed2 < 0 {
        seed2 += 100;
    }
    if seed1 < 0 || seed2 < 0 {
        return Err(Error::CorruptBlock(format!("extension data seed {} out of range", seed)))
    }
    let (seed1, seed2) = (seed1 as u32, seed2 as u32);

    let mut table = [0u8; 512];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = i as u8;
    }
    for i in 1..0x2711u32 {
        let pos = (((i * seed2) + seed1) % 0xFE + 1) as usize;
        table.swap(pos, pos + 1);
    }
    for i in 1..=0x100usize {
        let scrambled = table[i];
        table[usize::from(scrambled) + 0x100] = i as u8;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zlib::tests::deflate_block;

    #[test]
    fn table_halves_are_inverses() {
        for seed in [0i32, 1, 249, 250, 0x1234_5678, -7, -249] {
            let table = descramble_table(seed).unwrap();
            for b in 0..=0xFFusize {
                assert_eq!(table[usize::from(table[b]) + 0x100], b as u8, "seed {}, byte {}", seed, b);
            }
        }
    }

    #[test]
    fn unrecoverable_seed_is_an_error() {
        assert!(matches!(descramble_table(i32::MIN), Err(Error::CorruptBlock(_))));
    }

    fn pas_string(s: &[u8]) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s);
        out
    }

    #[test]
    fn package_round_trip() {
        let seed = 0x0BAD_CAFEi32;
        let table = descramble_table(seed).unwrap();

        // seed dword, one raw byte, then the scrambled file block
        let mut span = seed.to_le_bytes().to_vec();
        let block = deflate_block(b"GML file body");
        span.push(block[0]);
        span.extend(block[1..].iter().map(|&b| table[usize::from(b)]));

        let mut raw = Vec::new();
        raw.extend_from_slice(&[0, 0, 0, 0]); // data version
        raw.extend_from_slice(&pas_string(b"TestExt"));
        raw.extend_from_slice(&pas_string(b""));
        raw.extend_from_slice(&1u32.to_le_bytes()); // one file
        raw.extend_from_slice(&[0, 0, 0, 0]);
        raw.extend_from_slice(&pas_string(b"helper.gml"));
        raw.extend_from_slice(&2u32.to_le_bytes()); // gml script
        raw.extend_from_slice(&pas_string(b"init"));
        raw.extend_from_slice(&pas_string(b""));
        raw.extend_from_slice(&1u32.to_le_bytes()); // one function
        raw.extend_from_slice(&[0, 0, 0, 0]);
        raw.extend_from_slice(&pas_string(b"do_thing"));
        raw.extend_from_slice(&pas_string(b"do_thing"));
        raw.extend_from_slice(&12u32.to_le_bytes());
        raw.extend_from_slice(&[0, 0, 0, 0]);
        raw.extend_from_slice(&2u32.to_le_bytes()); // two args
        for ty in [2u32, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0] {
            raw.extend_from_slice(&ty.to_le_bytes());
        }
        raw.extend_from_slice(&2u32.to_le_bytes()); // returns a real
        raw.extend_from_slice(&0u32.to_le_bytes()); // no constants
        raw.extend_from_slice(&(span.len() as u32).to_le_bytes());
        raw.extend_from_slice(&span);

        let mut cur = DataCursor::new(&raw);
        let ext = Extension::deserialize(&mut cur, &mut Vec::new()).unwrap();
        assert_eq!(cur.remaining(), 0);
        assert_eq!(ext.name.0, b"TestExt");
        assert_eq!(ext.files.len(), 1);
        let file = &ext.files[0];
        assert!(matches!(file.kind, FileKind::GmlScript));
        assert_eq!(file.data.as_ref(), b"GML file body");
        assert_eq!(file.functions[0].arg_count, 2);
        assert_eq!(file.functions[0].arg_types[..2], [2, 1]);
    }
}
