//! Typed field entries of the local contact store.
//!
//! The local store keeps one row per property, tagged with a flat
//! [`FieldKind`] and a type label from a small fixed vocabulary. The remote
//! schema is richer, so converting a source type into a target type can
//! lose information. Every such narrowing is a total `From` table below,
//! never a fallthrough branch, so the loss is visible and testable.

use crate::contact::{AddressKind, EmailKind, PhoneKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat kind of a field row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    /// Display and structured name.
    Name,
    /// E-mail address.
    Email,
    /// Telephone number.
    Phone,
    /// Postal address.
    Address,
    /// Dated event (birthday, anniversary).
    Event,
    /// Free-text note.
    Note,
    /// Organization name or job title.
    Organization,
    /// Web address.
    Website,
    /// Photo.
    Photo,
}

impl FieldKind {
    /// Returns the stable label of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Address => "address",
            FieldKind::Event => "event",
            FieldKind::Note => "note",
            FieldKind::Organization => "organization",
            FieldKind::Website => "website",
            FieldKind::Photo => "photo",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target type of an e-mail field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailType {
    /// Home.
    Home,
    /// Work.
    Work,
    /// Other.
    Other,
}

impl EmailType {
    /// Returns the stable label of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailType::Home => "home",
            EmailType::Work => "work",
            EmailType::Other => "other",
        }
    }
}

impl From<EmailKind> for EmailType {
    fn from(kind: EmailKind) -> Self {
        match kind {
            EmailKind::Home => EmailType::Home,
            EmailKind::Work => EmailType::Work,
            EmailKind::Other | EmailKind::Unspecified => EmailType::Other,
        }
    }
}

/// Target type of a phone field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneType {
    /// Main number.
    Main,
    /// Home.
    Home,
    /// Work.
    Work,
    /// Other.
    Other,
    /// Mobile.
    Mobile,
    /// Fax, filed under "other".
    OtherFax,
    /// Pager.
    Pager,
}

impl PhoneType {
    /// Returns the stable label of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::Main => "main",
            PhoneType::Home => "home",
            PhoneType::Work => "work",
            PhoneType::Other => "other",
            PhoneType::Mobile => "mobile",
            PhoneType::OtherFax => "other-fax",
            PhoneType::Pager => "pager",
        }
    }
}

impl From<PhoneKind> for PhoneType {
    fn from(kind: PhoneKind) -> Self {
        match kind {
            // The untyped legacy value and "main" collapse onto the same row type.
            PhoneKind::Telephone | PhoneKind::Main => PhoneType::Main,
            PhoneKind::Home => PhoneType::Home,
            PhoneKind::Work => PhoneType::Work,
            PhoneKind::Other => PhoneType::Other,
            PhoneKind::Mobile => PhoneType::Mobile,
            PhoneKind::Fax => PhoneType::OtherFax,
            PhoneKind::Pager => PhoneType::Pager,
        }
    }
}

/// Target type of a postal address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostalType {
    /// Home.
    Home,
    /// Work.
    Work,
    /// Other.
    Other,
}

impl PostalType {
    /// Returns the stable label of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostalType::Home => "home",
            PostalType::Work => "work",
            PostalType::Other => "other",
        }
    }
}

impl From<AddressKind> for PostalType {
    fn from(kind: AddressKind) -> Self {
        match kind {
            AddressKind::Home => PostalType::Home,
            AddressKind::Work => PostalType::Work,
            AddressKind::Other | AddressKind::Unspecified => PostalType::Other,
        }
    }
}

/// Sub-type of an event field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Birthday.
    Birthday,
    /// Anniversary.
    Anniversary,
}

impl EventType {
    /// Returns the stable label of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Birthday => "birthday",
            EventType::Anniversary => "anniversary",
        }
    }
}

/// Type of an organization field. The remote schema carries no type for
/// organizations or titles, so there is a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrganizationType {
    /// Other.
    #[default]
    Other,
}

impl OrganizationType {
    /// Returns the stable label of this type.
    pub fn as_str(&self) -> &'static str {
        "other"
    }
}

/// Which slot of an organization row a value occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationSlot {
    /// Company name.
    Company,
    /// Job title.
    Title,
}

/// Type of a website field. Every URL is filed as a homepage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WebsiteType {
    /// Homepage.
    #[default]
    Homepage,
}

impl WebsiteType {
    /// Returns the stable label of this type.
    pub fn as_str(&self) -> &'static str {
        "homepage"
    }
}

/// Name row contents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NameField {
    /// Pre-formatted display name; wins over the parts when the store
    /// reconciles them.
    pub display_name: Option<String>,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
}

/// Postal address row contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalField {
    /// Street.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Target type.
    pub kind: PostalType,
}

/// One typed property row of a local contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldEntry {
    /// Name row.
    Name(NameField),
    /// E-mail row.
    Email {
        /// Trimmed address.
        address: String,
        /// Target type.
        kind: EmailType,
    },
    /// Phone row.
    Phone {
        /// Trimmed number.
        number: String,
        /// Target type.
        kind: PhoneType,
    },
    /// Postal address row.
    Address(PostalField),
    /// Event row.
    Event {
        /// Date in `YYYY-MM-DD` form.
        start_date: String,
        /// Sub-type.
        kind: EventType,
    },
    /// Note row.
    Note {
        /// Note text.
        text: String,
    },
    /// Organization row holding either a company or a title.
    Organization {
        /// Slot the value belongs to.
        slot: OrganizationSlot,
        /// Company name or title.
        value: String,
        /// Target type.
        kind: OrganizationType,
    },
    /// Website row.
    Website {
        /// URL.
        url: String,
        /// Target type.
        kind: WebsiteType,
    },
    /// Photo row.
    Photo {
        /// Encoded image data.
        data: Vec<u8>,
    },
}

impl FieldEntry {
    /// Returns the flat kind of this row.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldEntry::Name(_) => FieldKind::Name,
            FieldEntry::Email { .. } => FieldKind::Email,
            FieldEntry::Phone { .. } => FieldKind::Phone,
            FieldEntry::Address(_) => FieldKind::Address,
            FieldEntry::Event { .. } => FieldKind::Event,
            FieldEntry::Note { .. } => FieldKind::Note,
            FieldEntry::Organization { .. } => FieldKind::Organization,
            FieldEntry::Website { .. } => FieldKind::Website,
            FieldEntry::Photo { .. } => FieldKind::Photo,
        }
    }

    /// Returns the type label of this row, if its kind carries one.
    pub fn type_label(&self) -> Option<&'static str> {
        match self {
            FieldEntry::Email { kind, .. } => Some(kind.as_str()),
            FieldEntry::Phone { kind, .. } => Some(kind.as_str()),
            FieldEntry::Address(postal) => Some(postal.kind.as_str()),
            FieldEntry::Event { kind, .. } => Some(kind.as_str()),
            FieldEntry::Organization { kind, .. } => Some(kind.as_str()),
            FieldEntry::Website { kind, .. } => Some(kind.as_str()),
            FieldEntry::Name(_) | FieldEntry::Note { .. } | FieldEntry::Photo { .. } => None,
        }
    }

    /// Returns a short human-readable rendering of the row value.
    pub fn summary(&self) -> String {
        match self {
            FieldEntry::Name(name) => name
                .display_name
                .clone()
                .unwrap_or_else(|| {
                    [name.given_name.as_deref(), name.family_name.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ")
                }),
            FieldEntry::Email { address, .. } => address.clone(),
            FieldEntry::Phone { number, .. } => number.clone(),
            FieldEntry::Address(postal) => [
                postal.street.as_deref(),
                postal.postcode.as_deref(),
                postal.city.as_deref(),
                postal.region.as_deref(),
                postal.country.as_deref(),
            ]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
            FieldEntry::Event { start_date, .. } => start_date.clone(),
            FieldEntry::Note { text } => text.clone(),
            FieldEntry::Organization { slot, value, .. } => match slot {
                OrganizationSlot::Company => value.clone(),
                OrganizationSlot::Title => format!("title: {value}"),
            },
            FieldEntry::Website { url, .. } => url.clone(),
            FieldEntry::Photo { data } => format!("<{} bytes>", data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_table_is_total() {
        let table = [
            (PhoneKind::Telephone, "main"),
            (PhoneKind::Home, "home"),
            (PhoneKind::Work, "work"),
            (PhoneKind::Other, "other"),
            (PhoneKind::Mobile, "mobile"),
            (PhoneKind::Main, "main"),
            (PhoneKind::Fax, "other-fax"),
            (PhoneKind::Pager, "pager"),
        ];

        for (source, label) in table {
            assert_eq!(PhoneType::from(source).as_str(), label, "{source:?}");
        }
    }

    #[test]
    fn email_and_postal_fall_back_to_other() {
        assert_eq!(EmailType::from(EmailKind::Unspecified), EmailType::Other);
        assert_eq!(EmailType::from(EmailKind::Other), EmailType::Other);
        assert_eq!(EmailType::from(EmailKind::Home), EmailType::Home);
        assert_eq!(PostalType::from(AddressKind::Unspecified), PostalType::Other);
        assert_eq!(PostalType::from(AddressKind::Work), PostalType::Work);
    }

    #[test]
    fn kinds_and_labels() {
        let title = FieldEntry::Organization {
            slot: OrganizationSlot::Title,
            value: "CTO".into(),
            kind: OrganizationType::Other,
        };
        assert_eq!(title.kind(), FieldKind::Organization);
        assert_eq!(title.type_label(), Some("other"));
        assert_eq!(title.summary(), "title: CTO");

        let note = FieldEntry::Note { text: "hi".into() };
        assert_eq!(note.kind(), FieldKind::Note);
        assert_eq!(note.type_label(), None);
    }

    #[test]
    fn name_summary_falls_back_to_parts() {
        let name = FieldEntry::Name(NameField {
            display_name: None,
            given_name: Some("Ada".into()),
            family_name: Some("Lovelace".into()),
        });
        assert_eq!(name.summary(), "Ada Lovelace");
    }
}
