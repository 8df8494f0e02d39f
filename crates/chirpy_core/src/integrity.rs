//! Store integrity checking.

use chirpy_codec::StoreImage;
use std::collections::HashMap;
use std::fmt;

/// One problem found by an integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A chirp or user is stored under id 0.
    ZeroId {
        /// `"chirp"` or `"user"`.
        collection: &'static str,
    },
    /// A record's id differs from the key it is stored under.
    KeyMismatch {
        /// `"chirp"` or `"user"`.
        collection: &'static str,
        /// The map key.
        key: u64,
        /// The id inside the record.
        id: u64,
    },
    /// Several users share one email.
    DuplicateEmail {
        /// The shared email.
        email: String,
        /// Ids of every user holding it.
        user_ids: Vec<u64>,
    },
    /// A token record is stored under another token's string.
    MisfiledToken {
        /// The map key.
        key: String,
    },
    /// An id counter would hand out an id that is already taken.
    CounterBehind {
        /// `"chirp"` or `"user"`.
        collection: &'static str,
        /// The next id the counter would assign.
        next: u64,
        /// The largest id present.
        max: u64,
    },
    /// The backing file does not hold the in-memory state.
    FileDiverged {
        /// What differs or why the file could not be read.
        detail: String,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::ZeroId { collection } => write!(f, "{collection} stored under id 0"),
            IntegrityIssue::KeyMismatch { collection, key, id } => {
                write!(f, "{collection} stored under key {key} has id {id}")
            }
            IntegrityIssue::DuplicateEmail { email, user_ids } => {
                write!(f, "email {email:?} is shared by users {user_ids:?}")
            }
            IntegrityIssue::MisfiledToken { key } => {
                write!(f, "token record under {key:?} holds a different token")
            }
            IntegrityIssue::CounterBehind {
                collection,
                next,
                max,
            } => write!(f, "next {collection} id {next} is not above existing id {max}"),
            IntegrityIssue::FileDiverged { detail } => write!(f, "backing file diverged: {detail}"),
        }
    }
}

/// Result of [`Database::check_integrity`](crate::Database::check_integrity).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Every problem found, in discovery order.
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// Returns true if nothing was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

pub(crate) fn check_image(image: &StoreImage, report: &mut IntegrityReport) {
    for (&key, chirp) in &image.chirps {
        if key == 0 {
            report.issues.push(IntegrityIssue::ZeroId {
                collection: "chirp",
            });
        }
        if chirp.id != key {
            report.issues.push(IntegrityIssue::KeyMismatch {
                collection: "chirp",
                key,
                id: chirp.id,
            });
        }
    }

    let mut by_email: HashMap<&str, Vec<u64>> = HashMap::new();
    for (&key, user) in &image.users {
        if key == 0 {
            report.issues.push(IntegrityIssue::ZeroId { collection: "user" });
        }
        if user.id != key {
            report.issues.push(IntegrityIssue::KeyMismatch {
                collection: "user",
                key,
                id: user.id,
            });
        }
        by_email.entry(user.email.as_str()).or_default().push(key);
    }
    let mut shared: Vec<_> = by_email
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect();
    shared.sort();
    for (email, user_ids) in shared {
        report.issues.push(IntegrityIssue::DuplicateEmail {
            email: email.to_string(),
            user_ids,
        });
    }

    for (key, token) in &image.tokens {
        if token.token != *key {
            report
                .issues
                .push(IntegrityIssue::MisfiledToken { key: key.clone() });
        }
    }
}

pub(crate) fn check_counter(
    collection: &'static str,
    next: u64,
    max: Option<u64>,
    report: &mut IntegrityReport,
) {
    if let Some(max) = max {
        if next <= max {
            report.issues.push(IntegrityIssue::CounterBehind {
                collection,
                next,
                max,
            });
        }
    }
}
