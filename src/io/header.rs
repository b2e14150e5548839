//! Typed tables for the `##` metadata lines of a VCF.
//!
//! Each parse call owns its catalog, so translating several files in one run never mixes their
//! descriptors.

use std::collections::{BTreeMap, HashMap};

/// One FILTER/INFO/FORMAT/ALT definition. Fields absent from the header line are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub id: String,
    pub number: String,
    pub value_type: String,
    pub description: String,
    pub source: String,
    pub version: String,
}

impl Descriptor {
    fn from_fields(fields: &[(String, String)]) -> Option<Self> {
        let mut descriptor = Descriptor::default();
        for (key, value) in fields {
            match key.to_ascii_uppercase().as_str() {
                "ID" => descriptor.id = value.clone(),
                "NUMBER" => descriptor.number = value.clone(),
                "TYPE" => descriptor.value_type = value.clone(),
                "DESCRIPTION" => descriptor.description = value.clone(),
                "SOURCE" => descriptor.source = value.clone(),
                "VERSION" => descriptor.version = value.clone(),
                _ => {}
            }
        }
        (!descriptor.id.is_empty()).then_some(descriptor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKey {
    Contig,
    Filter,
    Info,
    Format,
    Alt,
}

impl HeaderKey {
    fn from_name(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "CONTIG" => Some(HeaderKey::Contig),
            "FILTER" => Some(HeaderKey::Filter),
            "INFO" => Some(HeaderKey::Info),
            "FORMAT" => Some(HeaderKey::Format),
            "ALT" => Some(HeaderKey::Alt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCatalog {
    /// Contig ID -> the raw bracketed metadata, e.g. `ID=MN908947.3,length=29903`.
    pub contigs: BTreeMap<String, String>,
    pub filters: HashMap<String, Descriptor>,
    pub infos: HashMap<String, Descriptor>,
    pub formats: HashMap<String, Descriptor>,
    pub alts: HashMap<String, Descriptor>,
    /// Unstructured `##key=value` lines such as `fileformat` or `source`.
    pub metadata: Vec<(String, String)>,
}

impl HeaderCatalog {
    pub fn parse<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut catalog = HeaderCatalog::default();
        for line in lines {
            catalog.add_line(line);
        }
        log::trace!(
            "Header catalog: {} contig(s), {} INFO, {} FORMAT, {} FILTER, {} ALT",
            catalog.contigs.len(),
            catalog.infos.len(),
            catalog.formats.len(),
            catalog.filters.len(),
            catalog.alts.len()
        );
        catalog
    }

    /// Adds one `##` line. Lines that do not fit a known shape are skipped.
    pub fn add_line(&mut self, line: &str) {
        let Some(body) = line.trim_end().strip_prefix("##") else {
            return;
        };
        let Some((key, value)) = body.split_once('=') else {
            return;
        };

        let Some(content) = value
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            self.metadata.push((key.to_string(), value.to_string()));
            return;
        };

        let Some(header_key) = HeaderKey::from_name(key) else {
            log::trace!("Skipping unsupported header key '{key}'");
            return;
        };
        let fields = split_structured_fields(content);

        if header_key == HeaderKey::Contig {
            match fields.iter().find(|(k, _)| k.eq_ignore_ascii_case("ID")) {
                Some((_, id)) => {
                    self.contigs.insert(id.clone(), content.to_string());
                }
                None => log::trace!("Skipping contig header without ID: {line}"),
            }
            return;
        }

        let Some(descriptor) = Descriptor::from_fields(&fields) else {
            log::trace!("Skipping header line without ID: {line}");
            return;
        };
        let table = match header_key {
            HeaderKey::Filter => &mut self.filters,
            HeaderKey::Info => &mut self.infos,
            HeaderKey::Format => &mut self.formats,
            HeaderKey::Alt => &mut self.alts,
            HeaderKey::Contig => unreachable!(),
        };
        table.insert(descriptor.id.clone(), descriptor);
    }

    pub fn fileformat(&self) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(key, _)| key == "fileformat")
            .map(|(_, value)| value.as_str())
    }
}

/// Splits `ID=DP,Number=1,Description="Depth, total"` into key/value pairs.
///
/// Commas inside quotes never split. A segment without `=` outside quotes is the tail of an
/// unquoted free-text value and is glued back onto the previous value.
fn split_structured_fields(content: &str) -> Vec<(String, String)> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in content.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    segments.push(current);

    let mut fields: Vec<(String, String)> = Vec::new();
    for segment in segments {
        match segment.split_once('=') {
            Some((key, value)) if !key.is_empty() && !key.contains(' ') => {
                fields.push((key.to_string(), value.trim_matches('"').to_string()));
            }
            _ => match fields.last_mut() {
                Some((_, value)) => {
                    value.push(',');
                    value.push_str(segment.trim_matches('"'));
                }
                None => log::trace!("Dropping header segment '{segment}'"),
            },
        }
    }
    fields
}
