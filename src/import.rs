//! `herald import`: build `contacts.json` from registration CSV exports.
//!
//! Three exports are understood. Running and senam exports list one
//! registrant row followed by its participants, so rows are grouped by the
//! last seen `No Registrasi`. The tenant export has one stand per row.

use herald_core::contact::{Contact, ContactDetails, RunningEntry, SenamEntry, TenantEntry};
use herald_core::error::HeraldError;
use herald_core::phone::{is_valid_phone, normalize_phone};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

type Row = HashMap<String, String>;

/// Inputs for one import run. Absent sources are skipped.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub running: Option<PathBuf>,
    pub senam: Option<PathBuf>,
    pub tenant: Option<PathBuf>,
    pub output: PathBuf,
    pub country_code: String,
}

/// What an import produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Contacts read per category, before phone filtering.
    pub parsed: BTreeMap<&'static str, usize>,
    /// Contacts read in total.
    pub total: usize,
    /// Contacts written, i.e. those with a usable phone number.
    pub written: usize,
    /// Written contacts per category.
    pub by_category: BTreeMap<&'static str, usize>,
}

/// Run the import and write the result to `options.output`.
pub fn run(options: &ImportOptions) -> Result<ImportSummary, HeraldError> {
    let mut summary = ImportSummary::default();
    let mut contacts = Vec::new();

    let sources: [(&'static str, &Option<PathBuf>, fn(&[Row], &str) -> Vec<Contact>); 3] = [
        ("running", &options.running, process_running),
        ("senam", &options.senam, process_senam),
        ("tenant", &options.tenant, process_tenant),
    ];

    for (category, path, process) in sources {
        let Some(path) = path else { continue };
        if !path.exists() {
            warn!("{category} export not found at {}, skipping", path.display());
            continue;
        }
        let rows = read_rows(path)?;
        let parsed = process(&rows, &options.country_code);
        info!("{category}: {} contacts from {}", parsed.len(), path.display());
        summary.parsed.insert(category, parsed.len());
        contacts.extend(parsed);
    }

    for (index, contact) in contacts.iter_mut().enumerate() {
        contact.id = index as u32 + 1;
    }
    summary.total = contacts.len();

    contacts.retain(|c| is_valid_phone(&c.phone));
    summary.written = contacts.len();
    for contact in &contacts {
        *summary.by_category.entry(contact.category()).or_insert(0) += 1;
    }

    let json = serde_json::to_string_pretty(&contacts)?;
    std::fs::write(&options.output, json).map_err(|e| {
        HeraldError::Import(format!("failed to write {}: {e}", options.output.display()))
    })?;

    info!(
        "import complete: {} of {} contacts written to {}",
        summary.written,
        summary.total,
        options.output.display()
    );
    Ok(summary)
}

/// Read a CSV export into header-keyed rows.
fn read_rows(path: &Path) -> Result<Vec<Row>, HeraldError> {
    let content = std::fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let fail = |e: csv::Error| HeraldError::Import(format!("failed to read {}: {e}", path.display()));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers().map_err(fail)?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(fail)?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or_default()
}

fn phone_of(row: &Row, key: &str, country_code: &str) -> String {
    normalize_phone(field(row, key), country_code).unwrap_or_default()
}

/// The registrant a run of participant rows belongs to.
struct Registrant {
    number: String,
    name: String,
    phone: String,
}

/// Walk grouped rows, calling `make` for each participant row.
fn grouped(
    rows: &[Row],
    country_code: &str,
    mut make: impl FnMut(&Registrant, &Row) -> Contact,
) -> Vec<Contact> {
    let mut current: Option<Registrant> = None;
    let mut contacts = Vec::new();

    for row in rows {
        if !field(row, "No Registrasi").is_empty() {
            current = Some(Registrant {
                number: field(row, "No Registrasi").to_string(),
                name: field(row, "Nama Pendaftar").to_string(),
                phone: phone_of(row, "No HP", country_code),
            });
        }
        if let Some(registrant) = &current {
            if !field(row, "Nama Peserta").is_empty() {
                contacts.push(make(registrant, row));
            }
        }
    }
    contacts
}

pub fn process_running(rows: &[Row], country_code: &str) -> Vec<Contact> {
    grouped(rows, country_code, |reg, row| {
        let participant_number = match field(row, "No Peserta") {
            "" => "0",
            n => n,
        };
        Contact {
            id: 0,
            phone: reg.phone.clone(),
            registration_number: Some(reg.number.clone()),
            details: ContactDetails::Running(RunningEntry {
                registrant_name: reg.name.clone(),
                participant_number: participant_number.to_string(),
                participant_name: field(row, "Nama Peserta").to_string(),
                gender: field(row, "Jenis Kelamin").to_string(),
                bib_number: field(row, "No Bib").to_string(),
                payment_status: field(row, "Status Pembayaran").to_string(),
            }),
        }
    })
}

pub fn process_senam(rows: &[Row], country_code: &str) -> Vec<Contact> {
    grouped(rows, country_code, |reg, row| Contact {
        id: 0,
        phone: reg.phone.clone(),
        registration_number: Some(reg.number.clone()),
        details: ContactDetails::Senam(SenamEntry {
            registrant_name: reg.name.clone(),
            coupon_number: field(row, "No Kupon").to_string(),
            participant_name: field(row, "Nama Peserta").to_string(),
            gender: field(row, "Jenis Kelamin").to_string(),
            age: field(row, "Usia").to_string(),
            confirmation_status: field(row, "Status Konfirmasi").to_string(),
        }),
    })
}

pub fn process_tenant(rows: &[Row], country_code: &str) -> Vec<Contact> {
    rows.iter()
        .filter(|row| {
            !field(row, "No Registrasi").is_empty() && !field(row, "Nama Tenant").is_empty()
        })
        .map(|row| Contact {
            id: 0,
            phone: phone_of(row, "No Telepon", country_code),
            registration_number: Some(field(row, "No Registrasi").to_string()),
            details: ContactDetails::Tenant(TenantEntry {
                tenant_name: field(row, "Nama Tenant").to_string(),
                responsible_person: field(row, "Nama Penanggung Jawab").to_string(),
                email: field(row, "Email").to_string(),
                product_type: field(row, "Jenis Produk").to_string(),
                main_product: field(row, "Nama Produk Utama").to_string(),
                payment_status: field(row, "Status Pembayaran").to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::contact::ContactStore;

    const RUNNING_CSV: &str = "\u{feff}No Registrasi,Nama Pendaftar,No HP,No Peserta,Nama Peserta,Jenis Kelamin,No Bib,Status Pembayaran
RM-001,Budi Santoso,0812-3456-7890,1,Budi Santoso,L,5K-001,Lunas
,,,2,\"Ani, Putri\",P,5K-002,
RM-002,Citra,123,1,Citra,P,,Lunas
";

    const SENAM_CSV: &str = "No Registrasi,Nama Pendaftar,No HP,No Kupon,Nama Peserta,Jenis Kelamin,Usia,Status Konfirmasi
SN-01,Dewi,+62 857 1111 2222,K-9,Dewi,P,34,Hadir
,,,K-10,,P,,
";

    const TENANT_CSV: &str = "No Registrasi,Nama Tenant,Nama Penanggung Jawab,No Telepon,Email,Jenis Produk,Nama Produk Utama,Status Pembayaran
TN-1,Es Teh Manis,Sari,81399998888,sari@example.com,Minuman,Es Teh,Lunas
TN-2,,Joko,081300000000,,,,
";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_rows_strips_bom_and_handles_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "running.csv", RUNNING_CSV);
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(field(&rows[0], "No Registrasi"), "RM-001");
        assert_eq!(field(&rows[1], "Nama Peserta"), "Ani, Putri");
        assert_eq!(field(&rows[1], "No Registrasi"), "");
    }

    #[test]
    fn test_running_rows_grouped_by_registrant() {
        let dir = tempfile::tempdir().unwrap();
        let rows = read_rows(&write(dir.path(), "running.csv", RUNNING_CSV)).unwrap();
        let contacts = process_running(&rows, "62");

        assert_eq!(contacts.len(), 3);
        // The second participant inherits the registrant's number and phone.
        assert_eq!(contacts[1].registration_number(), Some("RM-001"));
        assert_eq!(contacts[1].phone, "6281234567890");
        assert_eq!(contacts[1].display_name(), Some("Ani, Putri"));
        assert_eq!(contacts[1].registrant_name(), Some("Budi Santoso"));
        match &contacts[2].details {
            ContactDetails::Running(r) => {
                assert_eq!(r.participant_number, "1");
                assert_eq!(r.bib_number, "");
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_running_participant_number_defaults_to_zero() {
        let row: Row = [
            ("No Registrasi", "RM-9"),
            ("No HP", "08123456789"),
            ("Nama Peserta", "Eko"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let contacts = process_running(&[row], "62");
        match &contacts[0].details {
            ContactDetails::Running(r) => assert_eq!(r.participant_number, "0"),
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_rows_before_first_registrant_are_ignored() {
        let row: Row = [("Nama Peserta", "Orphan")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert!(process_senam(&[row], "62").is_empty());
    }

    #[test]
    fn test_tenant_requires_number_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let rows = read_rows(&write(dir.path(), "tenant.csv", TENANT_CSV)).unwrap();
        let contacts = process_tenant(&rows, "62");
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phone, "6281399998888");
        assert_eq!(contacts[0].display_name(), Some("Es Teh Manis"));
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("contacts.json");
        let options = ImportOptions {
            running: Some(write(dir.path(), "running.csv", RUNNING_CSV)),
            senam: Some(write(dir.path(), "senam.csv", SENAM_CSV)),
            tenant: Some(write(dir.path(), "tenant.csv", TENANT_CSV)),
            output: output.clone(),
            country_code: "62".into(),
        };

        let summary = run(&options).unwrap();
        assert_eq!(summary.parsed.get("running"), Some(&3));
        assert_eq!(summary.parsed.get("senam"), Some(&1));
        assert_eq!(summary.parsed.get("tenant"), Some(&1));
        assert_eq!(summary.total, 5);
        // Citra's phone "123" is too short.
        assert_eq!(summary.written, 4);
        assert_eq!(summary.by_category.get("running"), Some(&2));

        let store = ContactStore::load(output.to_str().unwrap()).unwrap();
        let ids: Vec<u32> = store.all().iter().map(|c| c.id).collect();
        // Ids are assigned before filtering, so the dropped contact leaves a gap.
        assert_eq!(ids, vec![1, 2, 4, 5]);
        assert_eq!(store.get(4).map(|c| c.category()), Some("senam"));
        assert_eq!(store.get(4).map(|c| c.phone.as_str()), Some("6285711112222"));
        assert_eq!(store.get(5).map(|c| c.category()), Some("tenant"));
    }

    #[test]
    fn test_run_skips_missing_sources() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("contacts.json");
        let options = ImportOptions {
            running: Some(dir.path().join("nope.csv")),
            senam: None,
            tenant: None,
            output: output.clone(),
            country_code: "62".into(),
        };
        let summary = run(&options).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(std::fs::read_to_string(output).unwrap(), "[]");
    }
}
