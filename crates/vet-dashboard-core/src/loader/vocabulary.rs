//! Locale vocabulary for the clinic's visit sheets.
//!
//! Handles:
//! - Header resolution (source sheet headers and export headers → [`Column`])
//! - Two-valued flag words (Sim/Não, 1/0 → bool)
//!
//! All Portuguese text lives here so the rest of the crate stays
//! language-agnostic.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a header to resolve by fuzzy match.
const FUZZY_HEADER_THRESHOLD: f64 = 0.92;

/// A logical column of the visit table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    PetName,
    Age,
    Gender,
    Doctor,
    Certificate,
    CrossSpeciesVet,
    Shift,
    RespiratorySymptom,
}

impl Column {
    /// All columns, in export order.
    pub const ALL: [Column; 8] = [
        Column::PetName,
        Column::Age,
        Column::Gender,
        Column::Doctor,
        Column::Certificate,
        Column::CrossSpeciesVet,
        Column::Shift,
        Column::RespiratorySymptom,
    ];

    /// Columns the source sheet must carry. The symptom column is optional.
    pub fn is_required(&self) -> bool {
        !matches!(self, Column::RespiratorySymptom)
    }

    /// Header written by the table export.
    pub fn export_header(&self) -> &'static str {
        match self {
            Column::PetName => "Pet",
            Column::Age => "Idade",
            Column::Gender => "Gênero",
            Column::Doctor => "Medico",
            Column::Certificate => "Atestado",
            Column::CrossSpeciesVet => "VetAnimais",
            Column::Shift => "Turno",
            Column::RespiratorySymptom => "Sindrespiratoria",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_header())
    }
}

/// How a file header was resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderMatch {
    /// Header text as it appeared in the file (trimmed)
    pub header: String,
    /// Column it resolved to
    pub column: Column,
    /// Similarity score; 1.0 for exact matches
    pub similarity: f64,
}

impl HeaderMatch {
    /// Whether the header matched a known alias exactly (ignoring case and spacing).
    pub fn is_exact(&self) -> bool {
        self.similarity >= 1.0
    }
}

/// Result of reading a two-valued flag cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    /// Recognised word
    Known(bool),
    /// Blank cell
    Empty,
    /// Non-blank value outside the vocabulary
    Unmapped,
}

/// Header and flag mapping tables.
pub struct Vocabulary {
    /// Header key → column
    headers: HashMap<String, Column>,
    /// Flag word → value
    flags: HashMap<String, bool>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// Create a vocabulary with the clinic's default mappings.
    pub fn new() -> Self {
        Self {
            headers: Self::default_headers(),
            flags: Self::default_flags(),
        }
    }

    /// Resolve a single header exactly (case and spacing insensitive).
    pub fn resolve_exact(&self, header: &str) -> Option<Column> {
        self.headers.get(&header_key(header)).copied()
    }

    /// Resolve a single header by fuzzy match against every known alias.
    pub fn resolve_fuzzy(&self, header: &str) -> Option<HeaderMatch> {
        let key = header_key(header);
        if key.is_empty() {
            return None;
        }

        self.headers
            .iter()
            .map(|(alias, column)| (jaro_winkler(&key, alias), *column))
            .filter(|(score, _)| *score >= FUZZY_HEADER_THRESHOLD)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(similarity, column)| HeaderMatch {
                header: header.trim().to_string(),
                column,
                similarity,
            })
    }

    /// Resolve a full header row.
    ///
    /// Returns one slot per file column. Exact matches win; remaining
    /// headers may claim a still-unclaimed column by fuzzy match. A column
    /// is claimed at most once (first occurrence wins).
    pub fn resolve_headers<'h, I>(&self, headers: I) -> Vec<Option<HeaderMatch>>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let mut slots: Vec<Option<HeaderMatch>> = vec![None; headers.len()];
        let mut claimed: Vec<Column> = Vec::new();

        for (i, header) in headers.iter().enumerate() {
            if let Some(column) = self.resolve_exact(header) {
                if !claimed.contains(&column) {
                    claimed.push(column);
                    slots[i] = Some(HeaderMatch {
                        header: header.trim().to_string(),
                        column,
                        similarity: 1.0,
                    });
                }
            }
        }

        for (i, header) in headers.iter().enumerate() {
            if slots[i].is_some() || self.resolve_exact(header).is_some() {
                continue;
            }
            if let Some(found) = self.resolve_fuzzy(header) {
                if !claimed.contains(&found.column) {
                    claimed.push(found.column);
                    slots[i] = Some(found);
                }
            }
        }

        slots
    }

    /// Read a two-valued flag cell.
    pub fn parse_flag(&self, raw: &str) -> FlagValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FlagValue::Empty;
        }
        match self.flags.get(&trimmed.to_lowercase()) {
            Some(value) => FlagValue::Known(*value),
            None => FlagValue::Unmapped,
        }
    }

    /// Add a custom header alias.
    pub fn add_header(&mut self, header: &str, column: Column) {
        self.headers.insert(header_key(header), column);
    }

    /// Add a custom flag word.
    pub fn add_flag_word(&mut self, word: &str, value: bool) {
        self.flags.insert(word.trim().to_lowercase(), value);
    }

    /// Default header mappings.
    fn default_headers() -> HashMap<String, Column> {
        let mut map = HashMap::new();

        // Source sheet headers
        map.insert(header_key("NOME DO PET"), Column::PetName);
        map.insert(header_key("IDADE DO PET"), Column::Age);
        map.insert(header_key("GÊNERO DO PET"), Column::Gender);
        map.insert(header_key("VETERINÁRIO"), Column::Doctor);
        map.insert(header_key("ATESTADO"), Column::Certificate);
        map.insert(header_key("VET ANIMAIS"), Column::CrossSpeciesVet);
        map.insert(header_key("TURNO"), Column::Shift);

        // Export headers
        for column in Column::ALL {
            map.insert(header_key(column.export_header()), column);
        }

        // Unaccented spellings
        map.insert(header_key("GENERO DO PET"), Column::Gender);
        map.insert(header_key("VETERINARIO"), Column::Doctor);
        map.insert(header_key("Genero"), Column::Gender);

        map
    }

    /// Default flag words.
    fn default_flags() -> HashMap<String, bool> {
        let mut map = HashMap::new();

        map.insert("sim".into(), true);
        map.insert("não".into(), false);
        map.insert("nao".into(), false);

        // Export encoding
        map.insert("1".into(), true);
        map.insert("0".into(), false);
        map.insert("1.0".into(), true);
        map.insert("0.0".into(), false);

        map
    }
}

/// Lowercase a header and drop whitespace and underscores.
fn header_key(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
