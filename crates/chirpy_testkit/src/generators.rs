//! Property-based test generators using proptest.
//!
//! Provides strategies for generating store inputs and whole operation
//! sequences.

use chirpy_core::{CoreError, Database};
use proptest::prelude::*;

/// Strategy for generating emails from a small pool, so collisions happen.
pub fn email_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-d]{1,2}@(x|y)\\.com").expect("Invalid regex")
}

/// Strategy for generating chirp bodies.
pub fn chirp_body_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,140}").expect("Invalid regex")
}

/// Strategy for generating token strings.
pub fn token_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_-]{4,12}").expect("Invalid regex")
}

/// One store mutation.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// `create_chirp(body, author_id)`.
    CreateChirp(String, u64),
    /// `delete_chirp(id)`.
    DeleteChirp(u64),
    /// `add_user(email, digest)`.
    AddUser(String, Vec<u8>),
    /// `update_user(id, email, digest)`.
    UpdateUser(u64, String, Vec<u8>),
    /// `set_premium(id)`.
    SetPremium(u64),
    /// `add_token(token)`.
    AddToken(String),
    /// `revoke_token(token)`.
    RevokeToken(String),
}

impl StoreOp {
    /// Applies the operation, discarding the returned value.
    pub fn apply(&self, db: &Database) -> Result<(), CoreError> {
        match self {
            StoreOp::CreateChirp(body, author) => db.create_chirp(body.clone(), *author).map(drop),
            StoreOp::DeleteChirp(id) => db.delete_chirp(*id).map(drop),
            StoreOp::AddUser(email, digest) => db.add_user(email.clone(), digest.clone()).map(drop),
            StoreOp::UpdateUser(id, email, digest) => db
                .update_user(*id, email.clone(), digest.clone())
                .map(drop),
            StoreOp::SetPremium(id) => db.set_premium(*id),
            StoreOp::AddToken(token) => db.add_token(token),
            StoreOp::RevokeToken(token) => db.revoke_token(token),
        }
    }
}

/// Strategy for generating a single store operation.
///
/// Ids are drawn from a small range so operations often hit existing
/// records, and often miss.
pub fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    let id = 0u64..8;
    let digest = prop::collection::vec(any::<u8>(), 0..16);
    prop_oneof![
        3 => (chirp_body_strategy(), 1u64..5).prop_map(|(b, a)| StoreOp::CreateChirp(b, a)),
        1 => id.clone().prop_map(StoreOp::DeleteChirp),
        3 => (email_strategy(), digest.clone()).prop_map(|(e, d)| StoreOp::AddUser(e, d)),
        1 => (id.clone(), email_strategy(), digest).prop_map(|(i, e, d)| StoreOp::UpdateUser(i, e, d)),
        1 => id.prop_map(StoreOp::SetPremium),
        2 => token_strategy().prop_map(StoreOp::AddToken),
        2 => token_strategy().prop_map(StoreOp::RevokeToken),
    ]
}

/// Strategy for generating operation sequences.
pub fn store_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<StoreOp>> {
    prop::collection::vec(store_op_strategy(), 0..max_len)
}
