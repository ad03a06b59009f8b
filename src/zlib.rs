//! Helpers for inflating the zlib-compressed blocks the container is made of.

use crate::{stream::DataCursor, Error};
use flate2::bufread::ZlibDecoder;
use std::io::Read;

/// Inflates one zlib stream into `scratch`, returning the decoded byte
/// count. The scratch buffer is cleared but its capacity is kept, so one
/// buffer can serve every block of a load.
pub fn inflate(chunk: &[u8], scratch: &mut Vec<u8>) -> Result<usize, Error> {
    scratch.clear();
    ZlibDecoder::new(chunk)
        .read_to_end(scratch)
        .map_err(|e| Error::CorruptBlock(format!("inflate failed: {}", e)))
}

/// Inflates a length-prefixed zlib block at the cursor into `scratch`.
pub fn inflate_block(cur: &mut DataCursor, scratch: &mut Vec<u8>) -> Result<usize, Error> {
    let len = cur.read_u32()? as usize;
    inflate(cur.take(len)?, scratch)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::Write;

    pub(crate) fn deflate_block(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        let compressed = enc.finish().unwrap();
        let mut out = (compressed.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(&compressed);
        out
    }

    #[test]
    fn round_trip_reuses_scratch() {
        let block_a = deflate_block(b"some first block contents");
        let block_b = deflate_block(&[0xAB; 4096]);
        let stream: Vec<u8> = block_a.iter().chain(block_b.iter()).copied().collect();

        let mut cur = DataCursor::new(&stream);
        let mut scratch = Vec::new();
        let n = inflate_block(&mut cur, &mut scratch).unwrap();
        assert_eq!(&scratch[..n], b"some first block contents");

        let n = inflate_block(&mut cur, &mut scratch).unwrap();
        assert_eq!(n, 4096);
        assert!(scratch[..n].iter().all(|&b| b == 0xAB));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn corrupt_stream_is_an_error() {
        let mut block = deflate_block(b"payload");
        let tail = block.len() - 1;
        block[tail] ^= 0xFF;
        block[tail - 1] ^= 0xFF; // break the adler checksum
        let mut cur = DataCursor::new(&block);
        assert!(matches!(inflate_block(&mut cur, &mut Vec::new()), Err(Error::CorruptBlock(_))));
    }

    #[test]
    fn truncated_prefix_is_an_error() {
        let mut cur = DataCursor::new(&[0xFF, 0x00, 0x00, 0x00, 0x78]);
        assert!(matches!(inflate_block(&mut cur, &mut Vec::new()), Err(Error::Truncated { .. })));
    }
}
