//! Normalized entries - the typed view of a knowledge-base record.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::document::{AspectsDocument, RawEntry};
use crate::error::{sample_listing, ModelError};

/// One knowledge-base record, reduced to what graph analysis needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Case-sensitive canonical identifier.
    pub slug: String,

    /// Lower-cased slug, used for collision checks and mention matching.
    pub slug_lower: String,

    /// Slug of the owning section.
    pub section_id: String,

    pub tags: BTreeSet<String>,

    /// Provenance source paths.
    pub sources: BTreeSet<String>,

    /// Lower-cased `name + "\n" + description`.
    pub searchable_text: String,
}

impl Entry {
    /// Create an entry with no tags, sources or text.
    pub fn new(slug: impl Into<String>, section_id: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            slug_lower: slug.to_lowercase(),
            slug,
            section_id: section_id.into(),
            tags: BTreeSet::new(),
            sources: BTreeSet::new(),
            searchable_text: "\n".to_string(),
        }
    }

    /// Add a tag to this entry.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags to this entry.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add a provenance source path.
    pub fn with_source(mut self, path: impl Into<String>) -> Self {
        self.sources.insert(path.into());
        self
    }

    /// Set the searchable text from a name and a description.
    pub fn with_text(mut self, name: &str, description: &str) -> Self {
        self.searchable_text = searchable_text(name, description);
        self
    }

    fn from_raw(slug: String, section_id: &str, raw: &RawEntry) -> Self {
        Self {
            slug_lower: slug.to_lowercase(),
            slug,
            section_id: section_id.to_string(),
            tags: raw.tags.iter().cloned().collect(),
            sources: raw.source_paths().map(str::to_string).collect(),
            searchable_text: searchable_text(
                raw.name.as_deref().unwrap_or_default(),
                raw.description.as_deref().unwrap_or_default(),
            ),
        }
    }
}

fn searchable_text(name: &str, description: &str) -> String {
    format!("{}\n{}", name, description).to_lowercase()
}

/// The full, validated entry collection of one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "UncheckedEntrySet")]
pub struct EntrySet {
    entries: Vec<Entry>,
}

/// Wire shape of an [`EntrySet`] before the slug checks run.
#[derive(Deserialize)]
struct UncheckedEntrySet {
    entries: Vec<Entry>,
}

impl TryFrom<UncheckedEntrySet> for EntrySet {
    type Error = ModelError;

    fn try_from(unchecked: UncheckedEntrySet) -> Result<Self, Self::Error> {
        Self::from_entries(unchecked.entries)
    }
}

impl EntrySet {
    /// Normalize a parsed document.
    ///
    /// Sections and entries without a slug are skipped. Case-insensitive slug
    /// collisions and duplicate ids anywhere in the document fail the load.
    pub fn from_document(document: AspectsDocument) -> Result<Self, ModelError> {
        let mut entries = Vec::new();
        let mut ids = Vec::new();

        for section in &document.sections {
            let Some(section_slug) = section.slug.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            for raw in &section.entries {
                let Some(slug) = raw.slug.as_deref().filter(|s| !s.is_empty()) else {
                    continue;
                };
                if let Some(id) = raw.id.as_deref().filter(|id| !id.is_empty()) {
                    ids.push(id.to_string());
                }
                entries.push(Entry::from_raw(slug.to_string(), section_slug, raw));
            }
        }

        check_unique_slugs(&entries)?;
        check_unique_ids(&ids)?;

        tracing::debug!("Normalized {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Build a set from already-normalized entries.
    pub fn from_entries(entries: Vec<Entry>) -> Result<Self, ModelError> {
        check_unique_slugs(&entries)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    /// Look up an entry by its exact slug.
    pub fn get(&self, slug: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }

    /// Every slug in the collection.
    pub fn slugs(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|entry| entry.slug.as_str()).collect()
    }

    /// Slugs grouped by section, both levels sorted.
    pub fn sections(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut sections: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for entry in &self.entries {
            sections
                .entry(entry.section_id.as_str())
                .or_default()
                .insert(entry.slug.as_str());
        }
        sections
    }
}

fn check_unique_slugs(entries: &[Entry]) -> Result<(), ModelError> {
    // slug_lower -> (first spelling seen, occurrences)
    let mut seen: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    for entry in entries {
        seen.entry(entry.slug_lower.as_str())
            .or_insert((entry.slug.as_str(), 0))
            .1 += 1;
    }

    let duplicates: Vec<String> = seen
        .values()
        .filter(|(_, count)| *count > 1)
        .map(|(spelling, _)| spelling.to_string())
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ModelError::DuplicateSlugs(sample_listing(duplicates)))
    }
}

fn check_unique_ids(ids: &[String]) -> Result<(), ModelError> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id.as_str()).or_default() += 1;
    }

    let duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ModelError::DuplicateIds(sample_listing(duplicates)))
    }
}
