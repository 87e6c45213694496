//! MurmurHash3 x64/128, fixed seed (spec.md §4.3: "a fixed-seed
//! MurmurHash over the resulting word stream").
//!
//! A self-contained implementation rather than an external crate — the
//! word stream this hashes is a closed implementation detail of
//! `crate::hash`, so there's no benefit to a general-purpose streaming
//! API, and keeping it in-tree avoids a dependency for 150 lines of
//! well-known bit-twiddling.

/// The fixed seed every deep hash is computed with (spec.md §4.3,
/// §9: "the hash is stable across runs" demands a constant, not a
/// per-process random seed).
pub const SEED: u64 = 42;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Computes the 128-bit MurmurHash3 x64 digest of `data` under
/// [`SEED`], returned as two little-endian 64-bit lanes (`h1`, `h2`)
/// per the reference algorithm's output convention.
pub fn hash128(data: &[u8]) -> (u64, u64) {
    let mut h1 = SEED;
    let mut h2 = SEED;

    let chunks = data.chunks_exact(16);
    let tail = chunks.remainder();
    for chunk in chunks {
        let mut k1 = u64::from_le_bytes(chunk[0..8].try_into().unwrap());
        let mut k2 = u64::from_le_bytes(chunk[8..16].try_into().unwrap());

        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(C1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let mut k1: u64 = 0;
    let mut k2: u64 = 0;
    let tail_len = tail.len();
    if tail_len > 8 {
        let mut buf = [0u8; 8];
        buf[..tail_len - 8].copy_from_slice(&tail[8..]);
        k2 = u64::from_le_bytes(buf);
        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
    }
    if tail_len > 0 {
        let mut buf = [0u8; 8];
        let first_len = tail_len.min(8);
        buf[..first_len].copy_from_slice(&tail[..first_len]);
        k1 = u64::from_le_bytes(buf);
        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u64;
    h2 ^= data.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_deterministic() {
        let a = hash128(&[]);
        let b = hash128(&[]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_usually_differ() {
        let a = hash128(b"loom");
        let b = hash128(b"lool");
        assert_ne!(a, b);
    }

    #[test]
    fn long_input_exercises_the_tail_path() {
        let data = (0u8..37).collect::<Vec<u8>>();
        let a = hash128(&data);
        let b = hash128(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn changing_length_changes_the_digest() {
        let a = hash128(&[1, 2, 3]);
        let b = hash128(&[1, 2, 3, 0]);
        assert_ne!(a, b);
    }
}
