//! Content key derivation
//!
//! The header carries the content key masked with a keystream. The keystream
//! is TEA (fixed key, 16 rounds) applied to successive counter pairs
//! `(seed, seed + 1)`, `(seed + 2, seed + 3)`, ... packed big-endian.
//!
//! The masked buffer is two zero bytes followed by the 16 header key bytes.
//! Blocks are generated for `8 * (18 / 8) + 8 = 24` bytes; keystream bytes past
//! the end of the buffer are dropped. The content key is buffer bytes `2..18`.
//!
//! Since the mask is a plain XOR, applying the derivation to a content key
//! yields the header key that would unmask to it.

use crate::crypto::tea::{Tea, BLOCK_SIZE, KEY_SIZE};
use byteorder::{BigEndian, ByteOrder};

/// Fixed key for the header keystream
const AA_FIXED_KEY: [u8; KEY_SIZE] = [
    0x77, 0x21, 0x4d, 0x4b, 0x19, 0x6a, 0x87, 0xcd, 0x52, 0x00, 0x45, 0xfd, 0x2a, 0x51, 0xd6, 0x73,
];

/// Zero bytes in front of the header key
const PADDING_LEN: usize = 2;

const MASKED_LEN: usize = PADDING_LEN + KEY_SIZE;

/// Keystream length, always one block past the last full block
const KEYSTREAM_LEN: usize = BLOCK_SIZE * (MASKED_LEN / BLOCK_SIZE) + BLOCK_SIZE;

/// Derive the 128-bit content key from the header seed and masked header key
pub fn derive_key(header_seed: u32, header_key: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    let tea = Tea::new(&AA_FIXED_KEY);

    let mut masked = [0u8; MASKED_LEN];
    masked[PADDING_LEN..].copy_from_slice(header_key);

    (0..KEYSTREAM_LEN)
        .step_by(BLOCK_SIZE)
        .fold(header_seed, |seed, offset| {
            let block = keystream_block(&tea, seed);
            let end = (offset + BLOCK_SIZE).min(MASKED_LEN);
            for (byte, mask) in masked[offset..end].iter_mut().zip(block.iter()) {
                *byte ^= mask;
            }
            seed.wrapping_add(2)
        });

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&masked[PADDING_LEN..]);
    key
}

/// Encrypted counter pair `(seed, seed + 1)`
fn keystream_block(tea: &Tea, seed: u32) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    BigEndian::write_u32(&mut block[..4], seed);
    BigEndian::write_u32(&mut block[4..], seed.wrapping_add(1));
    tea.encrypt_block(&mut block);
    block
}
