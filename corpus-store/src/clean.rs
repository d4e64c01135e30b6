use std::path::Path;

use corpus_common::CorpusRecord;
use corpus_text::normalize;

use crate::{CorpusWriter, StoreError, corpus::read_records};

/// Write a normalized copy of the store at `input` to `output`, replacing any
/// existing file. Returns the number of records written.
///
/// Headline and body both go through [`normalize`]; a field that cleans down to
/// nothing is written as empty. Records are never dropped.
pub fn clean_corpus(input: &Path, output: &Path) -> Result<usize, StoreError> {
    let records = read_records(input)?;
    let mut writer = CorpusWriter::create(output)?;

    for rec in &records {
        writer.append(&clean_record(rec))?;
    }

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        records = records.len(),
        "clean.done"
    );
    Ok(records.len())
}

fn clean_record(rec: &CorpusRecord) -> CorpusRecord {
    let clean = |field: &Option<String>| {
        Some(normalize(field.as_deref())).filter(|s| !s.is_empty())
    };
    CorpusRecord {
        address: rec.address.clone(),
        headline: clean(&rec.headline),
        body: clean(&rec.body),
    }
}
