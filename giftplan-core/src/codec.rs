//! Shareable selection token.
//!
//! Layout before compression:
//!
//! | byte   | meaning                                                    |
//! |--------|------------------------------------------------------------|
//! | 0      | flag: 1 = bitfield lists selected ids, 2 = unselected ids  |
//! | 1..3   | highest known id, u16 little-endian                        |
//! | 3..    | bitfield, bit `i % 8` of byte `i / 8` set when `i` listed  |
//!
//! The bytes are raw-deflated and base64 encoded with the URL-safe alphabet
//! (no padding). Decoding also accepts the standard alphabet with padding,
//! so tokens written by the browser's `btoa` still open here. The reverse
//! does not hold: a token containing `-` or `_` is rejected by a plain
//! `atob` reader.
//!
//! Inflated payloads are capped at the header plus the largest bitfield a
//! 16-bit id range needs.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use thiserror::Error;

use crate::constants::{SHARE_FLAG_SELECTED, SHARE_FLAG_UNSELECTED, SHARE_HEADER_LEN};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("character id {0} does not fit the 16-bit token range")]
    IdOutOfRange(u32),
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token could not be inflated: {0}")]
    Inflate(std::io::Error),
    #[error("token could not be compressed: {0}")]
    Deflate(std::io::Error),
    #[error("token payload too short ({0} bytes)")]
    Truncated(usize),
    #[error("unknown token flag {0}")]
    UnknownFlag(u8),
    #[error("token payload exceeds {0} bytes")]
    TooLarge(usize),
}

const MAX_PAYLOAD_LEN: usize = SHARE_HEADER_LEN + (u16::MAX as usize + 1) / 8;

/// Encode `selected` against the universe `known`.
///
/// Returns `Ok(None)` when nothing is selected or no ids are known: an empty
/// selection has no token. Selected ids above the highest known id are not
/// representable and are dropped.
///
/// # Errors
///
/// Returns [`CodecError::IdOutOfRange`] when the highest known id exceeds
/// `u16::MAX`.
pub fn encode_selection(selected: &[u32], known: &[u32]) -> Result<Option<String>, CodecError> {
    if selected.is_empty() {
        return Ok(None);
    }
    let Some(max_id) = known.iter().copied().max() else {
        return Ok(None);
    };
    let max_id16 = u16::try_from(max_id).map_err(|_| CodecError::IdOutOfRange(max_id))?;

    let selected_set: BTreeSet<u32> = selected.iter().copied().collect();
    let unselected: BTreeSet<u32> = known
        .iter()
        .copied()
        .filter(|id| !selected_set.contains(id))
        .collect();

    let (flag, listed) = if selected_set.len() > unselected.len() {
        (SHARE_FLAG_UNSELECTED, unselected)
    } else {
        (SHARE_FLAG_SELECTED, selected_set)
    };

    let bitfield_len = (max_id as usize + 1).div_ceil(8);
    let mut payload = Vec::with_capacity(SHARE_HEADER_LEN + bitfield_len);
    payload.push(flag);
    payload.extend_from_slice(&max_id16.to_le_bytes());
    payload.resize(SHARE_HEADER_LEN + bitfield_len, 0);
    for id in listed.into_iter().filter(|id| *id <= max_id) {
        let index = id as usize;
        payload[SHARE_HEADER_LEN + index / 8] |= 1 << (index % 8);
    }

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&payload).map_err(CodecError::Deflate)?;
    let compressed = encoder.finish().map_err(CodecError::Deflate)?;
    Ok(Some(URL_SAFE_NO_PAD.encode(compressed)))
}

/// Decode a token back into the selected ids, ascending.
///
/// A bitfield shorter than the header's id range reads the missing bits as
/// unset.
///
/// # Errors
///
/// Returns an error for tokens that are not base64, do not inflate, are
/// shorter than the header, or carry an unknown flag.
pub fn decode_selection(token: &str) -> Result<Vec<u32>, CodecError> {
    let compressed = decode_base64(token)?;
    let mut payload = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_PAYLOAD_LEN as u64 + 1)
        .read_to_end(&mut payload)
        .map_err(CodecError::Inflate)?;

    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(CodecError::TooLarge(MAX_PAYLOAD_LEN));
    }
    if payload.len() < SHARE_HEADER_LEN {
        return Err(CodecError::Truncated(payload.len()));
    }
    let flag = payload[0];
    let max_id = u32::from(u16::from_le_bytes([payload[1], payload[2]]));
    let bitfield = &payload[SHARE_HEADER_LEN..];
    let listed = |id: u32| {
        let index = id as usize;
        bitfield
            .get(index / 8)
            .is_some_and(|byte| (byte >> (index % 8)) & 1 == 1)
    };

    match flag {
        SHARE_FLAG_SELECTED => Ok((0..=max_id).filter(|id| listed(*id)).collect()),
        SHARE_FLAG_UNSELECTED => Ok((0..=max_id).filter(|id| !listed(*id)).collect()),
        other => Err(CodecError::UnknownFlag(other)),
    }
}

fn decode_base64(token: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = token.trim().trim_end_matches('=');
    let engine = if trimmed.contains(['+', '/']) {
        &STANDARD_NO_PAD
    } else {
        &URL_SAFE_NO_PAD
    };
    Ok(engine.decode(trimmed)?)
}

/// Inspect a token's flag without materializing the id list.
///
/// # Errors
///
/// Same failure modes as [`decode_selection`].
pub fn token_flag(token: &str) -> Result<u8, CodecError> {
    let compressed = decode_base64(token)?;
    let mut header = [0u8; SHARE_HEADER_LEN];
    let mut decoder = DeflateDecoder::new(compressed.as_slice());
    let mut filled = 0;
    while filled < SHARE_HEADER_LEN {
        let read = decoder
            .read(&mut header[filled..])
            .map_err(CodecError::Inflate)?;
        if read == 0 {
            return Err(CodecError::Truncated(filled));
        }
        filled += read;
    }
    Ok(header[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_payload(token: &str) -> Vec<u8> {
        let compressed = URL_SAFE_NO_PAD.decode(token).unwrap();
        let mut payload = Vec::new();
        DeflateDecoder::new(compressed.as_slice())
            .read_to_end(&mut payload)
            .unwrap();
        payload
    }

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn small_selection_lists_selected_ids() {
        let known: Vec<u32> = (0..=10).collect();
        let token = encode_selection(&[2, 5], &known).unwrap().unwrap();
        let payload = raw_payload(&token);
        assert_eq!(payload, vec![1, 10, 0, 0b0010_0100, 0]);
        assert_eq!(decode_selection(&token).unwrap(), vec![2, 5]);
        assert_eq!(token_flag(&token).unwrap(), 1);
    }

    #[test]
    fn large_selection_lists_complement() {
        let known: Vec<u32> = (0..=10).collect();
        let selected: Vec<u32> = (0..=10).filter(|id| *id != 4).collect();
        let token = encode_selection(&selected, &known).unwrap().unwrap();
        assert_eq!(token_flag(&token).unwrap(), 2);
        assert_eq!(raw_payload(&token)[3..], [0b0001_0000, 0]);
        assert_eq!(decode_selection(&token).unwrap(), selected);
    }

    #[test]
    fn highest_id_on_byte_boundary_is_encoded() {
        let known: Vec<u32> = (0..=16).collect();
        let token = encode_selection(&[16], &known).unwrap().unwrap();
        assert_eq!(raw_payload(&token).len(), 3 + 3);
        assert_eq!(decode_selection(&token).unwrap(), vec![16]);
    }

    #[test]
    fn empty_selection_has_no_token() {
        assert!(encode_selection(&[], &[1, 2, 3]).unwrap().is_none());
        assert!(encode_selection(&[1], &[]).unwrap().is_none());
    }

    #[test]
    fn oversized_ids_are_rejected() {
        assert!(matches!(
            encode_selection(&[1], &[1, 70_000]),
            Err(CodecError::IdOutOfRange(70_000))
        ));
    }

    #[test]
    fn corrupt_tokens_fail_cleanly() {
        assert!(matches!(decode_selection("!!!"), Err(CodecError::Base64(_))));
        let not_deflate = URL_SAFE_NO_PAD.encode([0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(decode_selection(&not_deflate).is_err());
        let short = URL_SAFE_NO_PAD.encode(deflate(&[1, 2]));
        assert!(matches!(decode_selection(&short), Err(CodecError::Truncated(2))));
        let bad_flag = URL_SAFE_NO_PAD.encode(deflate(&[9, 3, 0, 0xFF]));
        assert!(matches!(
            decode_selection(&bad_flag),
            Err(CodecError::UnknownFlag(9))
        ));
    }

    #[test]
    fn short_bitfield_reads_missing_bits_as_unset() {
        // Header promises ids up to 8 but only one bitfield byte follows.
        let token = STANDARD_NO_PAD.encode(deflate(&[1, 8, 0, 0b0000_0011]));
        assert_eq!(decode_selection(&token).unwrap(), vec![0, 1]);
        let complement = URL_SAFE_NO_PAD.encode(deflate(&[2, 8, 0, 0b1111_1110]));
        assert_eq!(decode_selection(&complement).unwrap(), vec![0, 8]);
    }

    #[test]
    fn standard_padded_alphabet_is_accepted() {
        let compressed = deflate(&[1, 10, 0, 0b0010_0100, 0]);
        let padded = base64::engine::general_purpose::STANDARD.encode(&compressed);
        assert_eq!(decode_selection(&padded).unwrap(), vec![2, 5]);
    }

    #[test]
    fn inflated_payload_is_capped() {
        let mut bomb = vec![1, 0xFF, 0xFF];
        bomb.resize(1 << 20, 0);
        let token = URL_SAFE_NO_PAD.encode(deflate(&bomb));
        assert!(token.len() < 4096);
        assert!(matches!(
            decode_selection(&token),
            Err(CodecError::TooLarge(_))
        ));
    }

    #[test]
    fn widest_id_range_still_decodes() {
        let known = [0, u32::from(u16::MAX)];
        let token = encode_selection(&[u32::from(u16::MAX)], &known)
            .unwrap()
            .unwrap();
        assert_eq!(raw_payload(&token).len(), MAX_PAYLOAD_LEN);
        assert_eq!(decode_selection(&token).unwrap(), vec![u32::from(u16::MAX)]);
    }
}
