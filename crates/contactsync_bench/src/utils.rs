//! Benchmark utilities.

use contactsync_model::{LocalRecord, RemoteContact};
use contactsync_testkit::{minimal_contact, sample_contact};
use rand::seq::SliceRandom;
use rand::Rng;

/// Returns the external id used for the `n`th generated contact.
pub fn external_id(n: usize) -> String {
    format!("r{n:06}")
}

/// Generate `count` fully populated remote contacts.
pub fn generate_remote(count: usize) -> Vec<RemoteContact> {
    (0..count).map(|n| sample_contact(&external_id(n))).collect()
}

/// Generate `count` remote contacts that carry only an id.
pub fn generate_minimal(count: usize) -> Vec<RemoteContact> {
    (0..count).map(|n| minimal_contact(&external_id(n))).collect()
}

/// Generate local records for a store that mirrors `overlap` of `count`
/// remote contacts and holds `count - overlap` stale ones.
///
/// Records are shuffled so lookups do not benefit from remote order.
pub fn generate_local(count: usize, overlap: f64) -> Vec<LocalRecord> {
    let mut rng = rand::thread_rng();
    let mirrored = (count as f64 * overlap.clamp(0.0, 1.0)) as usize;
    let mut records: Vec<LocalRecord> = (0..count)
        .map(|n| {
            let id = if n < mirrored {
                external_id(n)
            } else {
                format!("stale{n:06}")
            };
            LocalRecord::managed(n as i64 + 1, id)
        })
        .collect();
    records.shuffle(&mut rng);

    // A few handmade contacts the pass must ignore.
    let unmanaged = rng.gen_range(0..=count / 10);
    records.extend((0..unmanaged).map(|n| LocalRecord::unmanaged((count + n) as i64 + 1)));
    records
}
