//! Many threads against one store.

use chirpy_core::{ChirpQuery, CoreError};
use chirpy_testkit::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: u64 = 8;
const PER_THREAD: u64 = 25;

#[test]
fn concurrent_chirps_get_distinct_ids() {
    let db = Arc::new(TestDatabase::memory());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| db.create_chirp(format!("{t}/{i}"), t + 1).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for h in handles {
        for id in h.join().unwrap() {
            assert!(ids.insert(id), "id {id} handed out twice");
        }
    }
    assert_eq!(ids, (1..=THREADS * PER_THREAD).collect());
}

#[test]
fn last_write_holds_every_mutation() {
    let db = Arc::new(TestDatabase::file());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    match i % 3 {
                        0 => {
                            db.create_chirp("x", t + 1).unwrap();
                        }
                        1 => {
                            db.add_token(&format!("{t}-{i}")).unwrap();
                        }
                        _ => {
                            let _ = db.add_user(format!("u{t}-{i}@x.com"), Vec::new());
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let in_memory = db.snapshot();
    let Ok(test_db) = Arc::try_unwrap(db) else {
        panic!("all writer threads have finished");
    };

    let reopened = test_db.reopen();
    assert_eq!(reopened.snapshot(), in_memory);
}

#[test]
fn readers_run_alongside_writers() {
    let db = Arc::new(TestDatabase::memory());
    db.add_user("reader@x.com", TestDatabase::digest("pw")).unwrap();

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for i in 0..100 {
                db.create_chirp(format!("{i}"), 1).unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for _ in 0..100 {
                    let chirps = db.list_chirps(ChirpQuery::all());
                    assert!(chirps.windows(2).all(|w| w[0].id < w[1].id));
                    assert!(db.authenticate_user("reader@x.com", b"pw").is_ok());
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(db.counts().chirps, 100);
}

#[test]
fn concurrent_revocation_succeeds_once() {
    let db = Arc::new(TestDatabase::memory());
    db.add_token("shared").unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || db.revoke_token("shared"))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(CoreError::AlreadyRevoked))));
}
