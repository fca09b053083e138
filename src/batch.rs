//! Corpus-level helpers that keep going past bad instances.

use tracing::{debug, warn};

use crate::collector::StatisticsCollector;
use crate::extract::FeatureExtractor;
use crate::types::{Document, DocumentPair, FeatureSet};
use crate::{GramstatError, Result};

/// Something with an optional instance id, used when reporting failures.
pub trait Instance {
    fn instance_id(&self) -> Option<&str>;
}

impl Instance for Document {
    fn instance_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Instance for DocumentPair {
    fn instance_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// One instance that could not be processed.
#[derive(Debug)]
pub struct InstanceFailure {
    /// Position in the input sequence.
    pub index: usize,
    pub id: Option<String>,
    pub error: GramstatError,
}

/// Outcome of a batch: how many instances succeeded and which ones failed.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub failures: Vec<InstanceFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Instance errors are recorded; anything else aborts the batch.
    fn record<I: Instance>(&mut self, index: usize, instance: &I, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.processed += 1;
                Ok(())
            }
            Err(error) if error.is_instance_error() => {
                let id = instance.instance_id().map(str::to_string);
                warn!(index, id = ?id, %error, "skipping instance");
                self.failures.push(InstanceFailure { index, id, error });
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

/// Features of a batch, in input order, with failed instances left out.
#[derive(Debug, Default)]
pub struct ExtractedBatch {
    pub features: Vec<(usize, FeatureSet)>,
    pub report: BatchReport,
}

/// Feeds every document to `collector`.
pub fn collect<'a, I>(collector: &mut StatisticsCollector, documents: I) -> Result<BatchReport>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut report = BatchReport::default();
    for (index, document) in documents.into_iter().enumerate() {
        report.record(index, document, collector.observe(document))?;
    }
    debug!(
        batch.processed = report.processed,
        batch.failed = report.failures.len(),
        "collected documents"
    );
    Ok(report)
}

/// Feeds every pair to `collector`.
pub fn collect_pairs<'a, I>(collector: &mut StatisticsCollector, pairs: I) -> Result<BatchReport>
where
    I: IntoIterator<Item = &'a DocumentPair>,
{
    let mut report = BatchReport::default();
    for (index, pair) in pairs.into_iter().enumerate() {
        report.record(index, pair, collector.observe_pair(pair))?;
    }
    debug!(
        batch.processed = report.processed,
        batch.failed = report.failures.len(),
        "collected pairs"
    );
    Ok(report)
}

/// Extracts features of every instance. With the `parallel` feature the
/// instances are spread over the rayon pool; output order is unchanged.
pub fn extract_batch<E>(extractor: &E, instances: &[E::Input]) -> Result<ExtractedBatch>
where
    E: FeatureExtractor,
    E::Input: Instance,
{
    #[cfg(feature = "parallel")]
    let results: Vec<Result<FeatureSet>> = {
        use rayon::prelude::*;
        instances
            .par_iter()
            .map(|instance| extractor.extract(instance))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<FeatureSet>> = instances
        .iter()
        .map(|instance| extractor.extract(instance))
        .collect();

    let mut batch = ExtractedBatch::default();
    for (index, (instance, result)) in instances.iter().zip(results).enumerate() {
        match result {
            Ok(features) => {
                batch.features.push((index, features));
                batch.report.record(index, instance, Ok(()))?;
            }
            Err(error) => batch.report.record(index, instance, Err(error))?,
        }
    }
    debug!(
        batch.processed = batch.report.processed,
        batch.failed = batch.report.failures.len(),
        "extracted batch"
    );
    Ok(batch)
}
