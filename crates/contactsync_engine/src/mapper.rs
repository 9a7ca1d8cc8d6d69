//! Field mapping from remote contacts to local field rows.
//!
//! Mapping is pure: the same contact always yields the same ordered rows.
//! Absent properties produce no row and blank strings are skipped.

use contactsync_model::{
    AccountKey, Address, ContactEvent, EmailType, EventType, FieldEntry, NameField, Operation,
    OrganizationSlot, OrganizationType, PhoneType, PostalField, PostalType, RemoteContact,
    WebsiteType,
};

/// Field rows of one remote contact, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedContact {
    /// External id of the container.
    pub external_id: String,
    /// Ordered field rows.
    pub fields: Vec<FieldEntry>,
}

impl MappedContact {
    /// Returns the operations inserting this contact: the container first,
    /// then every field pointing back at it.
    pub fn into_operations(self, account: &AccountKey) -> Vec<Operation> {
        let mut operations = Vec::with_capacity(self.fields.len() + 1);
        operations.push(Operation::insert_container(account, self.external_id));
        operations.extend(
            self.fields
                .into_iter()
                .map(|field| Operation::insert_field(0, field)),
        );
        operations
    }
}

/// Maps a contact to its field rows.
///
/// Returns `None` when the contact has no usable external id.
pub fn map_contact(contact: &RemoteContact) -> Option<MappedContact> {
    let external_id = contact.external_id()?.to_string();
    Some(MappedContact {
        external_id,
        fields: map_fields(contact),
    })
}

/// Returns the operations inserting `contact` under `account`, or `None`
/// when the contact has no usable external id.
pub fn insert_batch(account: &AccountKey, contact: &RemoteContact) -> Option<Vec<Operation>> {
    map_contact(contact).map(|mapped| mapped.into_operations(account))
}

/// Maps every supported property of `contact`, in a fixed order.
pub fn map_fields(contact: &RemoteContact) -> Vec<FieldEntry> {
    let mut fields = Vec::new();

    if let Some(name) = map_name(contact) {
        fields.push(FieldEntry::Name(name));
    }

    for email in &contact.emails {
        if let Some(address) = trimmed(&email.value) {
            fields.push(FieldEntry::Email {
                address: address.to_string(),
                kind: EmailType::from(email.kind),
            });
        }
    }

    for phone in &contact.telephones {
        if let Some(number) = trimmed(&phone.text) {
            fields.push(FieldEntry::Phone {
                number: number.to_string(),
                kind: PhoneType::from(phone.kind),
            });
        }
    }

    fields.extend(
        contact
            .addresses
            .iter()
            .filter(|address| !address.is_blank())
            .map(|address| FieldEntry::Address(map_address(address))),
    );

    if let Some(field) = map_event(contact.birthday.as_ref(), EventType::Birthday) {
        fields.push(field);
    }
    if let Some(field) = map_event(contact.anniversary.as_ref(), EventType::Anniversary) {
        fields.push(field);
    }

    fields.extend(non_blank(&contact.notes).map(|text| FieldEntry::Note {
        text: text.to_string(),
    }));

    fields.extend(
        non_blank(&contact.organizations)
            .map(|value| organization(OrganizationSlot::Company, value)),
    );
    fields.extend(
        non_blank(&contact.titles).map(|value| organization(OrganizationSlot::Title, value)),
    );

    fields.extend(non_blank(&contact.urls).map(|url| FieldEntry::Website {
        url: url.to_string(),
        kind: WebsiteType::Homepage,
    }));

    if let Some(photo) = contact.photos.first().filter(|photo| !photo.data.is_empty()) {
        fields.push(FieldEntry::Photo {
            data: photo.data.clone(),
        });
    }

    fields
}

fn map_name(contact: &RemoteContact) -> Option<NameField> {
    let structured = contact.structured_name.as_ref();
    let name = NameField {
        display_name: contact.formatted_name.as_deref().and_then(owned_trimmed),
        given_name: structured
            .and_then(|name| name.given.as_deref())
            .and_then(owned_trimmed),
        family_name: structured
            .and_then(|name| name.family.as_deref())
            .and_then(owned_trimmed),
    };

    if name == NameField::default() {
        None
    } else {
        Some(name)
    }
}

fn map_address(address: &Address) -> PostalField {
    PostalField {
        street: address.street.clone(),
        city: address.locality.clone(),
        region: address.region.clone(),
        postcode: address.postal_code.clone(),
        country: address.country.clone(),
        kind: PostalType::from(address.kind),
    }
}

fn map_event(event: Option<&ContactEvent>, kind: EventType) -> Option<FieldEntry> {
    let date = event?.date?;
    Some(FieldEntry::Event {
        start_date: date.format("%Y-%m-%d").to_string(),
        kind,
    })
}

fn organization(slot: OrganizationSlot, value: &str) -> FieldEntry {
    FieldEntry::Organization {
        slot,
        value: value.to_string(),
        kind: OrganizationType::Other,
    }
}

fn trimmed(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn owned_trimmed(value: &str) -> Option<String> {
    trimmed(value).map(str::to_string)
}

/// Values that are not blank, carried verbatim.
fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contactsync_model::{AddressKind, ContainerRef, EmailKind, FieldKind, PhoneKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account() -> AccountKey {
        AccountKey::new("alice@example.com", "contactsync")
    }

    #[test]
    fn map_full_contact_in_order() {
        let contact = RemoteContact::new("u1")
            .with_formatted_name("Ada Lovelace")
            .with_name("Ada", "Lovelace")
            .with_email(" ada@example.com ", EmailKind::Work)
            .with_phone("+41 44 000 00 00", PhoneKind::Mobile)
            .with_address(Address {
                kind: AddressKind::Home,
                street: Some("1 Analytical Row".into()),
                locality: Some("London".into()),
                ..Address::default()
            })
            .with_birthday(date(1815, 12, 10))
            .with_note("met at the engine demo")
            .with_organization("Analytical Society")
            .with_title("Countess")
            .with_url("https://example.com/ada")
            .with_photo(vec![1, 2, 3]);

        let mapped = map_contact(&contact).unwrap();
        assert_eq!(mapped.external_id, "u1");

        let kinds: Vec<FieldKind> = mapped.fields.iter().map(FieldEntry::kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Name,
                FieldKind::Email,
                FieldKind::Phone,
                FieldKind::Address,
                FieldKind::Event,
                FieldKind::Note,
                FieldKind::Organization,
                FieldKind::Organization,
                FieldKind::Website,
                FieldKind::Photo,
            ]
        );

        assert_eq!(
            mapped.fields[1],
            FieldEntry::Email {
                address: "ada@example.com".into(),
                kind: EmailType::Work,
            }
        );
        assert_eq!(
            mapped.fields[4],
            FieldEntry::Event {
                start_date: "1815-12-10".into(),
                kind: EventType::Birthday,
            }
        );
        assert!(matches!(
            &mapped.fields[7],
            FieldEntry::Organization { slot: OrganizationSlot::Title, value, .. } if value == "Countess"
        ));
    }

    #[test]
    fn blank_values_produce_no_rows() {
        let mut contact = RemoteContact::new("u1")
            .with_formatted_name("   ")
            .with_email("", EmailKind::Home)
            .with_phone("  ", PhoneKind::Home)
            .with_address(Address::default())
            .with_note("")
            .with_organization(" ")
            .with_title("")
            .with_url("\t")
            .with_photo(Vec::new());
        contact.birthday = Some(ContactEvent {
            date: None,
            text: Some("sometime in spring".into()),
        });

        assert!(map_fields(&contact).is_empty());
    }

    #[test]
    fn missing_external_id_is_not_mapped() {
        let mut contact = RemoteContact::new("  ").with_note("orphan");
        assert!(map_contact(&contact).is_none());
        contact.id = None;
        assert!(insert_batch(&account(), &contact).is_none());
    }

    #[test]
    fn only_first_photo_is_kept() {
        let contact = RemoteContact::new("u1")
            .with_photo(vec![1])
            .with_photo(vec![2]);
        assert_eq!(map_fields(&contact), vec![FieldEntry::Photo { data: vec![1] }]);
    }

    #[test]
    fn name_parts_without_display_name() {
        let contact = RemoteContact::new("u1").with_name("Grace", " ");
        assert_eq!(
            map_fields(&contact),
            vec![FieldEntry::Name(NameField {
                display_name: None,
                given_name: Some("Grace".into()),
                family_name: None,
            })]
        );
    }

    #[test]
    fn notes_are_not_concatenated() {
        let contact = RemoteContact::new("u1")
            .with_note("first")
            .with_note("second");
        assert_eq!(map_fields(&contact).len(), 2);
    }

    #[test]
    fn insert_batch_references_container() {
        let contact = RemoteContact::new("u1")
            .with_email("a@example.com", EmailKind::Unspecified)
            .with_anniversary(date(2001, 6, 2));
        let operations = insert_batch(&account(), &contact).unwrap();

        assert_eq!(operations.len(), 3);
        assert_eq!(operations[0], Operation::insert_container(&account(), "u1"));
        for operation in &operations[1..] {
            assert!(matches!(
                operation,
                Operation::InsertField {
                    parent: ContainerRef::BackReference(0),
                    ..
                }
            ));
        }
    }
}
