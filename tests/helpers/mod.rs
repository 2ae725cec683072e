//! Test helpers for building synthetic encrypted sources
//!
//! Payloads are plain byte patterns run through TEA with the same codec
//! block partitioning the `.aa` format uses, so tests can compare decrypted
//! output against known plaintext.

#![allow(dead_code)]

use aa_core::crypto::tea::{Tea, BLOCK_SIZE};
use aa_core::crypto::derive_key;
use aa_core::{HeaderFields, TocEntry};
use std::collections::BTreeMap;

/// `.aa` magic number
pub const AA_MAGIC: u32 = 0x5790_7536;

pub const HEADER_SEED: u32 = 1;

pub const HEADER_KEY: [u8; 16] = [
    0x10, 0x32, 0x54, 0x76, 0x98, 0xba, 0xdc, 0xfe, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
];

/// Content key the pipeline should derive from `HEADER_SEED`/`HEADER_KEY`
pub fn content_key() -> [u8; 16] {
    derive_key(HEADER_SEED, &HEADER_KEY)
}

/// Deterministic byte pattern
pub fn pattern(len: usize, salt: u8) -> Vec<u8> {
    (0..len)
        .map(|i| ((i * 7 + i / 251) as u8) ^ salt)
        .collect()
}

/// Encrypt `plain` the way the format stores it: codec blocks of
/// `block_size`, full 8-byte cipher blocks encrypted, remainders in the clear
pub fn encrypt_payload(key: &[u8; 16], plain: &[u8], block_size: usize) -> Vec<u8> {
    let tea = Tea::new(key);
    let mut out = Vec::with_capacity(plain.len());
    for codec_block in plain.chunks(block_size) {
        let mut codec_block = codec_block.to_vec();
        for chunk in codec_block.chunks_exact_mut(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            tea.encrypt_block(&mut block);
            chunk.copy_from_slice(&block);
        }
        out.extend_from_slice(&codec_block);
    }
    out
}

/// Reference decryption, independent of the demuxer
pub fn reference_decrypt(key: &[u8; 16], cipher: &[u8], block_size: usize) -> Vec<u8> {
    let tea = Tea::new(key);
    let mut out = Vec::with_capacity(cipher.len());
    for codec_block in cipher.chunks(block_size) {
        let full = codec_block.len() / BLOCK_SIZE * BLOCK_SIZE;
        for chunk in codec_block[..full].chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            tea.decrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        out.extend_from_slice(&codec_block[full..]);
    }
    out
}

/// Audio region bytes: chapter headers followed by the given ciphertexts
pub fn audio_region(chapters: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut data_offset = 0u32;
    for payload in chapters {
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&data_offset.to_be_bytes());
        out.extend_from_slice(payload);
        data_offset += payload.len() as u32;
    }
    out
}

/// Source file of `lead` filler bytes, the audio region, then 16 trailer
/// bytes; returns the bytes and the TOC describing them
pub fn synthetic_source(chapters: &[Vec<u8>], lead: usize) -> (Vec<u8>, Vec<TocEntry>) {
    let mut source = vec![0x5Au8; lead];
    let region = audio_region(chapters);
    let start = source.len() as u32;
    source.extend_from_slice(&region);
    let end = source.len() as u32;
    source.extend_from_slice(&[0xC3; 16]);

    let toc = vec![
        TocEntry::new(0, start),
        TocEntry::new(start, end),
        TocEntry::new(end, end + 16),
    ];
    (source, toc)
}

pub fn header_fields(codec: &str, title: Option<&str>, toc: Vec<TocEntry>) -> HeaderFields {
    let mut tags = BTreeMap::new();
    tags.insert("codec".to_string(), codec.to_string());
    if let Some(title) = title {
        tags.insert("title".to_string(), title.to_string());
    }
    HeaderFields {
        tags,
        toc,
        header_seed: HEADER_SEED,
        header_key: HEADER_KEY,
    }
}

/// Complete `.aa` file with the given tags and audio chapters
///
/// `HeaderSeed`/`HeaderKey` tags are added from `HEADER_SEED`/`HEADER_KEY`.
pub fn aa_file(tags: &[(&str, &str)], chapters: &[Vec<u8>]) -> Vec<u8> {
    let key_words: Vec<String> = HEADER_KEY
        .chunks(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]).to_string())
        .collect();
    let seed = HEADER_SEED.to_string();
    let key = key_words.join(" ");

    let mut all_tags: Vec<(&str, &str)> = tags.to_vec();
    all_tags.push(("HeaderSeed", seed.as_str()));
    all_tags.push(("HeaderKey", key.as_str()));

    let toc_count = 3u32;
    let tags_len: usize = all_tags.iter().map(|(k, v)| 9 + k.len() + v.len()).sum();
    let header_len = 16 + 12 * toc_count as usize + 24 + 4 + tags_len;

    let region = audio_region(chapters);
    let audio_start = header_len as u32;
    let audio_size = region.len() as u32;
    let trailer_start = audio_start + audio_size;
    let trailer = [0xEEu8; 32];
    let file_size = trailer_start + trailer.len() as u32;

    let mut out = Vec::new();
    out.extend_from_slice(&file_size.to_be_bytes());
    out.extend_from_slice(&AA_MAGIC.to_be_bytes());
    out.extend_from_slice(&toc_count.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    for (index, (offset, size)) in [
        (0u32, audio_start),
        (audio_start, audio_size),
        (trailer_start, trailer.len() as u32),
    ]
    .iter()
    .enumerate()
    {
        out.extend_from_slice(&(index as u32 + 1).to_be_bytes());
        out.extend_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&size.to_be_bytes());
    }
    out.extend_from_slice(&[0u8; 24]);
    out.extend_from_slice(&(all_tags.len() as u32).to_be_bytes());
    for (k, v) in &all_tags {
        out.push(0);
        out.extend_from_slice(&(k.len() as u32).to_be_bytes());
        out.extend_from_slice(&(v.len() as u32).to_be_bytes());
        out.extend_from_slice(k.as_bytes());
        out.extend_from_slice(v.as_bytes());
    }
    assert_eq!(out.len(), header_len);

    out.extend_from_slice(&region);
    out.extend_from_slice(&trailer);
    out
}

/// Little-endian u32 at `offset`
pub fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_decrypt_inverts_encrypt() {
        let key = content_key();
        let plain = pattern(4000, 3);
        let cipher = encrypt_payload(&key, &plain, 3982);
        assert_ne!(cipher, plain);
        // 3982 = 497 * 8 + 6 and 18 = 2 * 8 + 2
        assert_eq!(&cipher[3976..3982], &plain[3976..3982]);
        assert_ne!(&cipher[3982..3990], &plain[3982..3990]);
        assert_eq!(&cipher[3998..], &plain[3998..]);
        assert_eq!(reference_decrypt(&key, &cipher, 3982), plain);
    }
}
