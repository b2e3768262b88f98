use crate::types::JobBatch;

/// Concatenates batches in the order given.
///
/// The result's columns are the union of the inputs' columns in first-seen
/// order. Empty inputs contribute nothing; all-empty input yields an empty
/// batch.
pub fn combine<I>(batches: I) -> JobBatch
where
    I: IntoIterator<Item = JobBatch>,
{
    let mut combined = JobBatch::new();
    for batch in batches.into_iter().filter(|b| !b.is_empty()) {
        combined.append(batch);
    }
    combined
}
