//! Contact records and the in-memory contact store.
//!
//! Contacts are produced once by `herald import` and loaded at startup.
//! JSON keys follow the registration export format so older
//! `contacts.json` files load unchanged.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

use crate::error::HeraldError;

/// One recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u32,
    /// Digits only, country-code prefixed.
    #[serde(default)]
    pub phone: String,
    #[serde(
        rename = "noRegistrasi",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_number: Option<String>,
    #[serde(flatten)]
    pub details: ContactDetails,
}

/// Category-specific fields, tagged by `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ContactDetails {
    Running(RunningEntry),
    Senam(SenamEntry),
    Tenant(TenantEntry),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningEntry {
    #[serde(rename = "namaPendaftar", default)]
    pub registrant_name: String,
    #[serde(rename = "noPeserta", default)]
    pub participant_number: String,
    #[serde(rename = "namaPeserta", default)]
    pub participant_name: String,
    #[serde(rename = "jenisKelamin", default)]
    pub gender: String,
    #[serde(rename = "noBib", default)]
    pub bib_number: String,
    #[serde(rename = "statusPembayaran", default)]
    pub payment_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenamEntry {
    #[serde(rename = "namaPendaftar", default)]
    pub registrant_name: String,
    #[serde(rename = "noKupon", default)]
    pub coupon_number: String,
    #[serde(rename = "namaPeserta", default)]
    pub participant_name: String,
    #[serde(rename = "jenisKelamin", default)]
    pub gender: String,
    #[serde(rename = "usia", default)]
    pub age: String,
    #[serde(rename = "statusKonfirmasi", default)]
    pub confirmation_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantEntry {
    #[serde(rename = "namaTenant", default)]
    pub tenant_name: String,
    #[serde(rename = "namaPenanggungJawab", default)]
    pub responsible_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "jenisProduk", default)]
    pub product_type: String,
    #[serde(rename = "namaProdukUtama", default)]
    pub main_product: String,
    #[serde(rename = "statusPembayaran", default)]
    pub payment_status: String,
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl ContactDetails {
    /// Lowercase category label, as used in JSON.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Running(_) => "running",
            Self::Senam(_) => "senam",
            Self::Tenant(_) => "tenant",
        }
    }
}

impl Contact {
    pub fn category(&self) -> &'static str {
        self.details.category()
    }

    /// The name to greet this contact with, if the record has one.
    ///
    /// Participants are greeted by their own name. Tenants by the tenant
    /// name, then by the person responsible for the stand.
    pub fn display_name(&self) -> Option<&str> {
        match &self.details {
            ContactDetails::Running(r) => non_empty(&r.participant_name),
            ContactDetails::Senam(s) => non_empty(&s.participant_name),
            ContactDetails::Tenant(t) => {
                non_empty(&t.tenant_name).or_else(|| non_empty(&t.responsible_person))
            }
        }
    }

    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display_name().unwrap_or(fallback)
    }

    /// The person who filled in the registration form.
    pub fn registrant_name(&self) -> Option<&str> {
        match &self.details {
            ContactDetails::Running(r) => non_empty(&r.registrant_name),
            ContactDetails::Senam(s) => non_empty(&s.registrant_name),
            ContactDetails::Tenant(t) => non_empty(&t.responsible_person),
        }
    }

    pub fn registration_number(&self) -> Option<&str> {
        self.registration_number.as_deref().and_then(non_empty)
    }
}

/// Immutable, ordered collection of contacts with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    index: HashMap<u32, usize>,
}

impl ContactStore {
    /// Build a store, rejecting duplicate ids.
    pub fn new(contacts: Vec<Contact>) -> Result<Self, HeraldError> {
        let mut index = HashMap::with_capacity(contacts.len());
        for (pos, contact) in contacts.iter().enumerate() {
            if index.insert(contact.id, pos).is_some() {
                return Err(HeraldError::Store(format!(
                    "duplicate contact id {}",
                    contact.id
                )));
            }
        }
        Ok(Self { contacts, index })
    }

    /// Load contacts from a JSON array file.
    ///
    /// A missing file yields an empty store.
    pub fn load(path: &str) -> Result<Self, HeraldError> {
        let path = Path::new(path);
        if !path.exists() {
            warn!(
                "contacts file not found at {}, starting with no contacts (run `herald import`)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let contacts: Vec<Contact> = serde_json::from_str(&content).map_err(|e| {
            HeraldError::Store(format!("failed to parse {}: {e}", path.display()))
        })?;
        let store = Self::new(contacts)?;
        info!("loaded {} contacts from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn get(&self, id: u32) -> Option<&Contact> {
        self.index.get(&id).map(|&pos| &self.contacts[pos])
    }

    pub fn all(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn count_by_category(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for contact in &self.contacts {
            *counts.entry(contact.category()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(id: u32, participant: &str, registrant: &str) -> Contact {
        Contact {
            id,
            phone: format!("62812000000{id:02}"),
            registration_number: Some(format!("REG-{id}")),
            details: ContactDetails::Running(RunningEntry {
                registrant_name: registrant.to_string(),
                participant_name: participant.to_string(),
                ..Default::default()
            }),
        }
    }

    fn tenant(id: u32, tenant_name: &str, responsible: &str) -> Contact {
        Contact {
            id,
            phone: "6281300000000".to_string(),
            registration_number: None,
            details: ContactDetails::Tenant(TenantEntry {
                tenant_name: tenant_name.to_string(),
                responsible_person: responsible.to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_display_name_per_category() {
        assert_eq!(running(1, "Ann", "Bob").display_name(), Some("Ann"));
        assert_eq!(running(1, "  ", "Bob").display_name(), None);
        assert_eq!(
            tenant(2, "Kopi Kita", "Dewi").display_name(),
            Some("Kopi Kita")
        );
        assert_eq!(tenant(2, "", "Dewi").display_name(), Some("Dewi"));
        assert_eq!(tenant(2, "", "").name_or("Sir/Madam"), "Sir/Madam");
    }

    #[test]
    fn test_registrant_name_per_category() {
        assert_eq!(running(1, "Ann", "Bob").registrant_name(), Some("Bob"));
        assert_eq!(tenant(2, "Kopi", "Dewi").registrant_name(), Some("Dewi"));
    }

    #[test]
    fn test_deserialize_export_format() {
        let json = r#"[
            {
                "id": 1,
                "category": "running",
                "noRegistrasi": "RM-001",
                "namaPendaftar": "Budi",
                "phone": "6281234567890",
                "noPeserta": "1",
                "namaPeserta": "Ani",
                "jenisKelamin": "P",
                "noBib": "5K-12",
                "statusPembayaran": "Lunas"
            },
            {
                "id": 2,
                "category": "tenant",
                "noRegistrasi": "TN-9",
                "namaTenant": "Es Teh",
                "namaPenanggungJawab": "Sari",
                "phone": "6285700000000",
                "email": "",
                "jenisProduk": "Minuman",
                "namaProdukUtama": "Es Teh Manis",
                "statusPembayaran": ""
            }
        ]"#;
        let contacts: Vec<Contact> = serde_json::from_str(json).unwrap();
        assert_eq!(contacts[0].category(), "running");
        assert_eq!(contacts[0].display_name(), Some("Ani"));
        assert_eq!(contacts[0].registration_number(), Some("RM-001"));
        match &contacts[0].details {
            ContactDetails::Running(r) => assert_eq!(r.bib_number, "5K-12"),
            other => panic!("unexpected details: {other:?}"),
        }
        assert_eq!(contacts[1].display_name(), Some("Es Teh"));
        assert_eq!(contacts[1].registrant_name(), Some("Sari"));
    }

    #[test]
    fn test_serialize_keeps_category_tag() {
        let value = serde_json::to_value(running(3, "Ann", "Bob")).unwrap();
        assert_eq!(value["category"], "running");
        assert_eq!(value["namaPeserta"], "Ann");
        assert_eq!(value["noRegistrasi"], "REG-3");
    }

    #[test]
    fn test_store_lookup_and_order() {
        let store =
            ContactStore::new(vec![running(7, "A", "X"), tenant(3, "T", ""), running(5, "B", "Y")])
                .unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(3).map(|c| c.id), Some(3));
        assert!(store.get(4).is_none());
        let ids: Vec<u32> = store.all().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7, 3, 5]);
        assert_eq!(store.count_by_category().get("running"), Some(&2));
    }

    #[test]
    fn test_store_rejects_duplicate_ids() {
        let err = ContactStore::new(vec![running(1, "A", "X"), running(1, "B", "Y")]).unwrap_err();
        assert!(err.to_string().contains("duplicate contact id 1"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = ContactStore::load("/nonexistent/__herald_contacts__.json").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        let contacts = vec![running(1, "Ann", "Bob"), tenant(2, "Kopi", "Dewi")];
        std::fs::write(&path, serde_json::to_string_pretty(&contacts).unwrap()).unwrap();

        let store = ContactStore::load(path.to_str().unwrap()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2), Some(&contacts[1]));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = ContactStore::load(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
