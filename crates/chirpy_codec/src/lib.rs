//! # Chirpy Codec
//!
//! Serializes the whole document store to and from a byte buffer.
//!
//! The persisted form is one JSON object with three collections. The schema
//! is fixed so files written by earlier releases keep loading:
//!
//! - chirps and users are keyed by their id as a decimal string
//! - tokens are keyed by the raw token string
//! - password digests are standard base64
//! - revocation times are RFC 3339, with `0001-01-01T00:00:00Z` meaning
//!   "not revoked"
//!
//! ## Usage
//!
//! ```
//! use chirpy_codec::{decode, encode, Chirp, StoreImage};
//!
//! let mut image = StoreImage::new();
//! image.chirps.insert(1, Chirp { id: 1, body: "hello".into(), author_id: 1 });
//!
//! let bytes = encode(&image).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), image);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod fields;
mod image;
mod records;

pub use error::{CodecError, CodecResult};
pub use image::{decode, encode, StoreImage};
pub use records::{Chirp, RevocableToken, User};

/// Trait for types that can be encoded to the persisted byte form.
pub trait Encode {
    /// Encode this value to bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from the persisted byte form.
pub trait Decode: Sized {
    /// Decode this value from bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl Encode for StoreImage {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        image::encode(self)
    }
}

impl Decode for StoreImage {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        image::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;

    fn arb_image() -> impl Strategy<Value = StoreImage> {
        let chirps = btree_map(1u64..10_000, (".{0,140}", 1u64..100), 0..20).prop_map(|m| {
            m.into_iter()
                .map(|(id, (body, author_id))| (id, Chirp { id, body, author_id }))
                .collect()
        });
        let users = btree_map(1u64..10_000, (vec(any::<u8>(), 0..64), any::<bool>()), 0..20)
            .prop_map(|m| {
                m.into_iter()
                    .map(|(id, (password_digest, premium))| {
                        let user = User {
                            id,
                            email: format!("user{id}@example.com"),
                            password_digest,
                            premium,
                        };
                        (id, user)
                    })
                    .collect()
            });
        let tokens = vec("[A-Za-z0-9._-]{1,40}", 0..10).prop_map(|names| {
            names
                .into_iter()
                .map(|t| (t.clone(), RevocableToken::issued(t)))
                .collect()
        });
        (chirps, users, tokens).prop_map(|(chirps, users, tokens)| StoreImage {
            chirps,
            users,
            tokens,
        })
    }

    proptest! {
        #[test]
        fn any_valid_image_survives_encoding(image in arb_image()) {
            let bytes = image.encode().unwrap();
            let decoded = StoreImage::decode(&bytes).unwrap();
            prop_assert_eq!(decoded, image);
        }
    }
}
