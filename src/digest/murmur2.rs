//! CurseForge file fingerprint: MurmurHash2 (32-bit, seed 1) over the file
//! content with tab, line feed, carriage return and space bytes removed.

const SEED: u32 = 1;
const M: u32 = 0x5bd1_e995;
const R: u32 = 24;

fn is_stripped(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\r' | b' ')
}

/// Content with the whitespace bytes the catalog ignores removed.
pub fn normalize(data: &[u8]) -> Vec<u8> {
    data.iter().copied().filter(|b| !is_stripped(*b)).collect()
}

/// Fingerprint of raw file content.
pub fn fingerprint(data: &[u8]) -> u32 {
    murmur2(&normalize(data), SEED)
}

/// Plain MurmurHash2, little-endian block reads.
pub fn murmur2(data: &[u8], seed: u32) -> u32 {
    let mut h = seed ^ data.len() as u32;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let mut k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = blocks.remainder();
    if tail.len() >= 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        h ^= u32::from(tail[0]);
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}
