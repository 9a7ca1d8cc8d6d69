//! Property-based test generators using proptest.
//!
//! Provides strategies for remote contacts and for remote/local set pairs
//! whose external ids overlap in every possible way.

use chrono::NaiveDate;
use contactsync_model::{
    Address, AddressKind, ContactEvent, Email, EmailKind, Photo, PhoneKind, RemoteContact,
    StructuredName, Telephone,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for external ids drawn from a small space, so that generated
/// sets collide often.
pub fn external_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-f][0-9]{1,2}").expect("Invalid regex")
}

/// Strategy for text that is blank about a third of the time.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        prop::string::string_regex("[A-Za-z][A-Za-z .@+-]{0,15}").expect("Invalid regex"),
    ]
}

/// Strategy for optional text.
pub fn optional_text_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(text_strategy())
}

/// Strategy for e-mail kinds.
pub fn email_kind_strategy() -> impl Strategy<Value = EmailKind> {
    prop_oneof![
        Just(EmailKind::Unspecified),
        Just(EmailKind::Home),
        Just(EmailKind::Work),
        Just(EmailKind::Other),
    ]
}

/// Strategy for telephone kinds.
pub fn phone_kind_strategy() -> impl Strategy<Value = PhoneKind> {
    prop_oneof![
        Just(PhoneKind::Telephone),
        Just(PhoneKind::Home),
        Just(PhoneKind::Work),
        Just(PhoneKind::Other),
        Just(PhoneKind::Mobile),
        Just(PhoneKind::Main),
        Just(PhoneKind::Fax),
        Just(PhoneKind::Pager),
    ]
}

/// Strategy for address kinds.
pub fn address_kind_strategy() -> impl Strategy<Value = AddressKind> {
    prop_oneof![
        Just(AddressKind::Unspecified),
        Just(AddressKind::Home),
        Just(AddressKind::Work),
        Just(AddressKind::Other),
    ]
}

/// Strategy for valid calendar dates.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2030, 1u32..=12, 1u32..=28).prop_map(|(year, month, day)| {
        NaiveDate::from_ymd_opt(year, month, day).expect("Day 1-28 is always valid")
    })
}

/// Strategy for events, some of which carry no date.
pub fn event_strategy() -> impl Strategy<Value = Option<ContactEvent>> {
    prop::option::of(
        (prop::option::of(date_strategy()), optional_text_strategy())
            .prop_map(|(date, text)| ContactEvent { date, text }),
    )
}

/// Strategy for postal addresses, some of which are blank.
pub fn address_strategy() -> impl Strategy<Value = Address> {
    (
        address_kind_strategy(),
        optional_text_strategy(),
        optional_text_strategy(),
        optional_text_strategy(),
        optional_text_strategy(),
        optional_text_strategy(),
    )
        .prop_map(
            |(kind, street, locality, region, postal_code, country)| Address {
                kind,
                street,
                locality,
                region,
                postal_code,
                country,
            },
        )
}

fn texts(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(text_strategy(), 0..max)
}

/// Strategy for a remote contact carrying `id`.
pub fn remote_contact_strategy(id: String) -> impl Strategy<Value = RemoteContact> {
    let names = (
        optional_text_strategy(),
        prop::option::of(
            (optional_text_strategy(), optional_text_strategy())
                .prop_map(|(given, family)| StructuredName { given, family }),
        ),
    );
    let channels = (
        prop::collection::vec(
            (text_strategy(), email_kind_strategy()).prop_map(|(value, kind)| Email { value, kind }),
            0..3,
        ),
        prop::collection::vec(
            (text_strategy(), phone_kind_strategy()).prop_map(|(text, kind)| Telephone { text, kind }),
            0..3,
        ),
        prop::collection::vec(address_strategy(), 0..2),
    );
    let events = (event_strategy(), event_strategy());
    let extras = (
        texts(3),
        texts(2),
        texts(2),
        texts(2),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..8), 0..3),
    );

    (names, channels, events, extras).prop_map(
        move |(
            (formatted_name, structured_name),
            (emails, telephones, addresses),
            (birthday, anniversary),
            (notes, organizations, titles, urls, photos),
        )| RemoteContact {
            id: Some(id.clone()),
            formatted_name,
            structured_name,
            emails,
            telephones,
            addresses,
            birthday,
            anniversary,
            notes,
            organizations,
            titles,
            urls,
            photos: photos
                .into_iter()
                .map(|data| Photo {
                    data,
                    media_type: None,
                })
                .collect(),
        },
    )
}

/// Strategy for any remote contact with a usable id.
pub fn any_remote_contact_strategy() -> impl Strategy<Value = RemoteContact> {
    external_id_strategy().prop_flat_map(remote_contact_strategy)
}

/// Strategy for a remote set with unique external ids, sorted by id.
pub fn remote_set_strategy(max: usize) -> impl Strategy<Value = Vec<RemoteContact>> {
    prop::collection::btree_set(external_id_strategy(), 0..max).prop_flat_map(|ids| {
        ids.into_iter()
            .map(remote_contact_strategy)
            .collect::<Vec<_>>()
    })
}

/// A remote set and the ids a previous pass left in the local mirror.
#[derive(Debug, Clone)]
pub struct SyncScenario {
    /// Remote contacts with unique ids.
    pub remote: Vec<RemoteContact>,
    /// External ids already mirrored locally.
    pub mirrored: BTreeSet<String>,
    /// Number of hand-made local contacts.
    pub unmanaged: usize,
}

/// Strategy for sync scenarios.
pub fn sync_scenario_strategy(max: usize) -> impl Strategy<Value = SyncScenario> {
    (
        remote_set_strategy(max),
        prop::collection::btree_set(external_id_strategy(), 0..max),
        0usize..4,
    )
        .prop_map(|(remote, mirrored, unmanaged)| SyncScenario {
            remote,
            mirrored,
            unmanaged,
        })
}

/// Configuration for property-based tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn remote_set_ids_are_unique(remote in remote_set_strategy(16)) {
            let ids: HashSet<&str> = remote.iter().filter_map(RemoteContact::external_id).collect();
            prop_assert_eq!(ids.len(), remote.len());
        }

        #[test]
        fn generated_contacts_have_ids(contact in any_remote_contact_strategy()) {
            prop_assert!(contact.external_id().is_some());
        }

        #[test]
        fn dates_are_valid(date in date_strategy()) {
            prop_assert!(date.format("%Y-%m-%d").to_string().len() == 10);
        }
    }
}
