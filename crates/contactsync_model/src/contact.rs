//! Remote contact records.
//!
//! A [`RemoteContact`] is an immutable snapshot of one decrypted contact as
//! the remote side knows it. Property types mirror the vCard-style
//! vocabulary of the remote schema, which is richer than what the local
//! store can express; see [`crate::field`] for the narrowed target types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Source type of an e-mail address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
    /// No type given.
    #[default]
    Unspecified,
    /// Personal address.
    Home,
    /// Work address.
    Work,
    /// Any other address.
    Other,
}

/// Source type of a telephone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneKind {
    /// Plain telephone, the legacy untyped value.
    #[default]
    Telephone,
    /// Home number.
    Home,
    /// Work number.
    Work,
    /// Other number.
    Other,
    /// Mobile number.
    Mobile,
    /// Main number.
    Main,
    /// Fax number.
    Fax,
    /// Pager number.
    Pager,
}

/// Source type of a postal address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    /// No type given.
    #[default]
    Unspecified,
    /// Home address.
    Home,
    /// Work address.
    Work,
    /// Other address.
    Other,
}

/// Structured name parts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredName {
    /// Given (first) name.
    pub given: Option<String>,
    /// Family (last) name.
    pub family: Option<String>,
}

/// A typed e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// The address as entered remotely, possibly padded with whitespace.
    pub value: String,
    /// Source type.
    #[serde(default)]
    pub kind: EmailKind,
}

/// A typed telephone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telephone {
    /// The number as entered remotely.
    pub text: String,
    /// Source type.
    #[serde(default)]
    pub kind: PhoneKind,
}

/// A typed postal address. Components are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Source type.
    pub kind: AddressKind,
    /// Street and house number.
    pub street: Option<String>,
    /// City or locality.
    pub locality: Option<String>,
    /// Region, state or province.
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

impl Address {
    /// Returns true if no component carries a non-blank value.
    pub fn is_blank(&self) -> bool {
        [
            &self.street,
            &self.locality,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|part| part.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// A dated event such as a birthday.
///
/// Remote events may carry only free text (e.g. "spring 1980"); those have
/// no `date` and are not representable locally.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactEvent {
    /// Calendar date, if the event has one.
    pub date: Option<NaiveDate>,
    /// Free-text form of the event.
    pub text: Option<String>,
}

impl ContactEvent {
    /// Creates an event on the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            text: None,
        }
    }
}

/// Contact photo bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Encoded image data.
    pub data: Vec<u8>,
    /// Media type of `data`, if known.
    #[serde(default)]
    pub media_type: Option<String>,
}

/// A decrypted remote contact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteContact {
    /// Stable external id. Contacts without one are never synced.
    pub id: Option<String>,
    /// Pre-formatted display name.
    pub formatted_name: Option<String>,
    /// Structured name parts.
    pub structured_name: Option<StructuredName>,
    /// E-mail addresses.
    pub emails: Vec<Email>,
    /// Telephone numbers.
    pub telephones: Vec<Telephone>,
    /// Postal addresses.
    pub addresses: Vec<Address>,
    /// Birthday.
    pub birthday: Option<ContactEvent>,
    /// Anniversary.
    pub anniversary: Option<ContactEvent>,
    /// Free-text notes.
    pub notes: Vec<String>,
    /// Organization names.
    pub organizations: Vec<String>,
    /// Job titles.
    pub titles: Vec<String>,
    /// Web addresses.
    pub urls: Vec<String>,
    /// Photos; only the first one is synced.
    pub photos: Vec<Photo>,
}

impl RemoteContact {
    /// Creates an empty contact with the given external id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Returns the external id if it is present and not blank.
    pub fn external_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Sets the formatted display name.
    #[must_use]
    pub fn with_formatted_name(mut self, name: impl Into<String>) -> Self {
        self.formatted_name = Some(name.into());
        self
    }

    /// Sets the structured name.
    #[must_use]
    pub fn with_name(mut self, given: impl Into<String>, family: impl Into<String>) -> Self {
        self.structured_name = Some(StructuredName {
            given: Some(given.into()),
            family: Some(family.into()),
        });
        self
    }

    /// Adds an e-mail address.
    #[must_use]
    pub fn with_email(mut self, value: impl Into<String>, kind: EmailKind) -> Self {
        self.emails.push(Email {
            value: value.into(),
            kind,
        });
        self
    }

    /// Adds a telephone number.
    #[must_use]
    pub fn with_phone(mut self, text: impl Into<String>, kind: PhoneKind) -> Self {
        self.telephones.push(Telephone {
            text: text.into(),
            kind,
        });
        self
    }

    /// Adds a postal address.
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    /// Sets the birthday.
    #[must_use]
    pub fn with_birthday(mut self, date: NaiveDate) -> Self {
        self.birthday = Some(ContactEvent::on(date));
        self
    }

    /// Sets the anniversary.
    #[must_use]
    pub fn with_anniversary(mut self, date: NaiveDate) -> Self {
        self.anniversary = Some(ContactEvent::on(date));
        self
    }

    /// Adds a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds an organization name.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organizations.push(organization.into());
        self
    }

    /// Adds a job title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.titles.push(title.into());
        self
    }

    /// Adds a web address.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    /// Adds a photo.
    #[must_use]
    pub fn with_photo(mut self, data: Vec<u8>) -> Self {
        self.photos.push(Photo {
            data,
            media_type: None,
        });
        self
    }
}
