//! Clinic visit records and the loaded dataset.

use serde::{Deserialize, Serialize};

/// A single clinic visit.
///
/// Every field other than the pet name is optional: values that fail
/// vocabulary or format checks during load are kept as unknown (`None`)
/// rather than dropping the row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    /// Pet name
    pub pet_name: String,
    /// Pet age in years (non-negative)
    pub age: Option<f64>,
    /// Pet gender category
    pub gender: Option<String>,
    /// Attending veterinarian
    pub doctor: Option<String>,
    /// Shift period (e.g., "Manhã", "Tarde", "Noite")
    pub shift: Option<String>,
    /// Whether a certificate was issued
    pub certificate_issued: Option<bool>,
    /// Whether the visit was with a cross-species vet
    pub cross_species_vet: Option<bool>,
    /// Respiratory symptom flag (synthetic unless the source file carries it)
    pub respiratory_symptom: Option<bool>,
}

impl VisitRecord {
    /// Create a record with only a pet name set.
    pub fn new(pet_name: impl Into<String>) -> Self {
        Self {
            pet_name: pet_name.into(),
            ..Self::default()
        }
    }

    /// True only when a certificate is known to have been issued.
    pub fn has_certificate(&self) -> bool {
        self.certificate_issued == Some(true)
    }

    /// True only when a respiratory symptom is known to be present.
    pub fn has_respiratory_symptom(&self) -> bool {
        self.respiratory_symptom == Some(true)
    }
}

/// Which of the categorical columns to aggregate over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Doctor,
    Gender,
    Shift,
}

impl CategoryField {
    /// Read this category from a record.
    pub fn value_of<'r>(&self, record: &'r VisitRecord) -> Option<&'r str> {
        match self {
            CategoryField::Doctor => record.doctor.as_deref(),
            CategoryField::Gender => record.gender.as_deref(),
            CategoryField::Shift => record.shift.as_deref(),
        }
    }
}

/// The loaded visit table. Immutable once built.
///
/// Shared between components as `Arc<Dataset>`; nothing hands out `&mut`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    records: Vec<VisitRecord>,
}

impl Dataset {
    /// Build a dataset from already-normalized records.
    pub fn new(records: Vec<VisitRecord>) -> Self {
        Self { records }
    }

    /// All records, in load order.
    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records.
    pub fn iter(&self) -> std::slice::Iter<'_, VisitRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a VisitRecord;
    type IntoIter = std::slice::Iter<'a, VisitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
