use anyhow::{Context as _, Result};
use rayon::prelude::*;

use crate::feature::{Context, Feature};
use crate::filter::{Filter, evaluate_filter};
use crate::sinks::DataSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub total: u64,
    pub matched: u64,
}

/// Evaluate `filter` against every feature in parallel, keeping input order.
pub fn select_matches<'a>(
    features: &'a [Feature],
    filter: &Filter,
    ctx: &Context,
) -> Vec<&'a Feature> {
    features
        .par_iter()
        .filter(|feature| evaluate_filter(filter, feature, ctx))
        .collect()
}

/// Filter `features` and write the matches to `sink`. The sink is not
/// finished here.
pub fn run_match(
    features: &[Feature],
    filter: &Filter,
    ctx: &Context,
    sink: &mut dyn DataSink,
) -> Result<MatchStats> {
    let matches = select_matches(features, filter, ctx);

    for feature in &matches {
        sink.add_feature(feature)
            .context("Pipeline: Failed to write feature")?;
    }

    Ok(MatchStats {
        total: features.len() as u64,
        matched: matches.len() as u64,
    })
}
