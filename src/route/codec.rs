//! Fixed-width path records.
//!
//! A plain hop is one 32 byte word: 11 zero bytes, the 20 byte asset, then the
//! venue flag. An intermediary record is 10 zero bytes, the flag of the first
//! leg in flow order, the 20 byte asset (zero for none), then the flag of the
//! second leg in flow order.

use alloy::primitives::Address;
use itertools::Itertools;

use crate::error::{Result, RouterError};
use crate::route::hop::{Hop, Intermediary, Venue};

/// Width of every record
pub const HOP_WIDTH: usize = 32;

/// Leading zero bytes of a plain hop
const HOP_PADDING: usize = 11;

/// Leading zero bytes of an intermediary record
const INTERMEDIARY_PADDING: usize = 10;

/// Encodes one plain hop.
#[must_use]
pub fn encode_hop(hop: &Hop) -> [u8; HOP_WIDTH] {
    let mut word = [0u8; HOP_WIDTH];
    word[HOP_PADDING..HOP_WIDTH - 1].copy_from_slice(hop.asset.as_slice());
    word[HOP_WIDTH - 1] = hop.venue.flag();
    word
}

/// Decodes one plain hop.
///
/// # Errors
/// * [`RouterError::MalformedPath`] if the padding is not zero
pub fn decode_hop(word: &[u8; HOP_WIDTH]) -> Result<Hop> {
    if word[..HOP_PADDING].iter().any(|byte| *byte != 0) {
        return Err(RouterError::malformed("nonzero hop padding"));
    }
    Ok(Hop::new(
        Address::from_slice(&word[HOP_PADDING..HOP_WIDTH - 1]),
        Venue::from_flag(word[HOP_WIDTH - 1]),
    ))
}

/// Encodes one intermediary record.
#[must_use]
pub fn encode_intermediary(intermediary: &Intermediary) -> [u8; HOP_WIDTH] {
    let mut word = [0u8; HOP_WIDTH];
    word[INTERMEDIARY_PADDING] = intermediary.previous_venue.flag();
    word[INTERMEDIARY_PADDING + 1..HOP_WIDTH - 1]
        .copy_from_slice(intermediary.asset.unwrap_or(Address::ZERO).as_slice());
    word[HOP_WIDTH - 1] = intermediary.next_venue.flag();
    word
}

/// Decodes one intermediary record.
///
/// # Errors
/// * [`RouterError::MalformedPath`] if the padding is not zero
pub fn decode_intermediary(word: &[u8; HOP_WIDTH]) -> Result<Intermediary> {
    if word[..INTERMEDIARY_PADDING].iter().any(|byte| *byte != 0) {
        return Err(RouterError::malformed("nonzero intermediary padding"));
    }
    let asset = Address::from_slice(&word[INTERMEDIARY_PADDING + 1..HOP_WIDTH - 1]);
    Ok(Intermediary {
        previous_venue: Venue::from_flag(word[INTERMEDIARY_PADDING]),
        asset: (asset != Address::ZERO).then_some(asset),
        next_venue: Venue::from_flag(word[HOP_WIDTH - 1]),
    })
}

/// Splits `bytes` into records
fn words(bytes: &[u8]) -> Result<impl Iterator<Item = &[u8; HOP_WIDTH]>> {
    if bytes.len() % HOP_WIDTH != 0 {
        return Err(RouterError::malformed("length is not a multiple of 32"));
    }
    Ok(bytes
        .chunks_exact(HOP_WIDTH)
        .filter_map(|chunk| <&[u8; HOP_WIDTH]>::try_from(chunk).ok()))
}

/// Decodes a list of intermediary records.
///
/// # Errors
/// * [`RouterError::MalformedPath`] if the length is not a multiple of 32 or a
///   record is malformed
pub fn decode_intermediaries(bytes: &[u8]) -> Result<Vec<Intermediary>> {
    words(bytes)?.map(decode_intermediary).collect()
}

/// Encodes a list of intermediary records.
#[must_use]
pub fn encode_intermediaries(intermediaries: &[Intermediary]) -> Vec<u8> {
    intermediaries
        .iter()
        .flat_map(encode_intermediary)
        .collect()
}

/// A decoded simple route of at least two hops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Hops in route order
    hops: Vec<Hop>,
}

impl Path {
    /// Creates a path.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] with fewer than two hops, or when a leg
    ///   swaps an asset for itself
    pub fn new(hops: Vec<Hop>) -> Result<Self> {
        if hops.len() < 2 {
            return Err(RouterError::malformed("path needs at least two hops"));
        }
        if hops
            .iter()
            .tuple_windows()
            .any(|(from, to)| from.asset == to.asset)
        {
            return Err(RouterError::malformed("leg swaps an asset for itself"));
        }
        Ok(Self { hops })
    }

    /// Decodes a path of plain hop records.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] if the bytes are not a valid path
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let hops = words(bytes)?.map(decode_hop).collect::<Result<Vec<_>>>()?;
        Self::new(hops)
    }

    /// Parses a path from `0x` prefixed hex words, one per hop.
    ///
    /// # Errors
    /// * [`RouterError::MalformedPath`] if a word is not hex or the path is invalid
    pub fn from_hex_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let mut bytes = Vec::with_capacity(words.len() * HOP_WIDTH);
        for word in words {
            let word = word.as_ref();
            let decoded = hex::decode(word.strip_prefix("0x").unwrap_or(word))
                .map_err(|_| RouterError::malformed("hop is not hex"))?;
            bytes.extend(decoded);
        }
        Self::decode(&bytes)
    }

    /// Encodes the path.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.hops.iter().flat_map(encode_hop).collect()
    }

    /// Hops in route order.
    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Asset the route starts from.
    #[must_use]
    pub fn source(&self) -> Address {
        self.hops.first().map_or(Address::ZERO, |hop| hop.asset)
    }

    /// Asset the route ends in.
    #[must_use]
    pub fn destination(&self) -> Address {
        self.hops.last().map_or(Address::ZERO, |hop| hop.asset)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_helpers::{address_from_str, hops};

    #[test]
    fn test_hop_layout() {
        let asset = address_from_str("A");
        let word = encode_hop(&Hop::new(asset, Venue::B));
        assert!(word[..11].iter().all(|byte| *byte == 0));
        assert_eq!(&word[11..31], asset.as_slice());
        assert_eq!(word[31], 1);
        assert_eq!(decode_hop(&word).unwrap(), Hop::new(asset, Venue::B));
    }

    #[test]
    fn test_any_nonzero_flag_is_venue_b() {
        let mut word = encode_hop(&Hop::new(address_from_str("A"), Venue::A));
        word[31] = 0x80;
        assert_eq!(decode_hop(&word).unwrap().venue, Venue::B);
    }

    #[test]
    fn test_intermediary_layout() {
        let asset = address_from_str("A");
        let intermediary = Intermediary {
            previous_venue: Venue::B,
            asset: Some(asset),
            next_venue: Venue::A,
        };
        let word = encode_intermediary(&intermediary);
        assert!(word[..10].iter().all(|byte| *byte == 0));
        assert_eq!(word[10], 1);
        assert_eq!(&word[11..31], asset.as_slice());
        assert_eq!(word[31], 0);
        assert_eq!(decode_intermediary(&word).unwrap(), intermediary);

        // A plain zero hop reads as a direct leg on venue A
        let zero = decode_intermediary(&[0u8; 32]).unwrap();
        assert_eq!(zero.asset, None);
        assert_eq!(zero.previous_venue, Venue::A);
    }

    #[test]
    fn test_path_decode() {
        let route = hops("A", &[("B", Venue::B), ("C", Venue::A)]);
        let path = Path::new(route.clone()).unwrap();
        let decoded = Path::decode(&path.encode()).unwrap();
        assert_eq!(decoded.hops(), route.as_slice());
        assert_eq!(decoded.source(), address_from_str("A"));
        assert_eq!(decoded.destination(), address_from_str("C"));
    }

    #[test]
    fn test_malformed_paths() {
        let path = Path::new(hops("A", &[("B", Venue::A)])).unwrap().encode();

        for (bytes, reason) in &[
            (path[..63].to_vec(), "length is not a multiple of 32"),
            (path[..32].to_vec(), "path needs at least two hops"),
            (Vec::new(), "path needs at least two hops"),
        ] {
            assert_eq!(
                Path::decode(bytes),
                Err(RouterError::malformed(*reason))
            );
        }

        let mut dirty = path.clone();
        dirty[0] = 1;
        assert_eq!(
            Path::decode(&dirty),
            Err(RouterError::malformed("nonzero hop padding"))
        );

        assert_eq!(
            Path::new(hops("A", &[("A", Venue::A)])),
            Err(RouterError::malformed("leg swaps an asset for itself"))
        );
        assert_eq!(
            decode_intermediaries(&[0u8; 33]),
            Err(RouterError::malformed("length is not a multiple of 32"))
        );
    }

    #[test]
    fn test_hex_words() {
        // Built by hand: 31 zero-padded bytes of the asset, then the flag
        let a = format!("0x{:0>62}00", "41");
        let b = format!("0x{:0>62}01", "42");
        let path = Path::from_hex_words(&[a, b]).unwrap();
        assert_eq!(path.hops()[1], Hop::new(address_from_str("B"), Venue::B));
        assert_eq!(
            Path::from_hex_words(&["0xzz"]),
            Err(RouterError::malformed("hop is not hex"))
        );
    }
}
