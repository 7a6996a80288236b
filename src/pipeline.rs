//! One full harvest run: fetch, extract, validate, merge, write.

use log::info;

use crate::config::Settings;
use crate::emit::{emit_all, select_targets};
use crate::error::Result;
use crate::extract::RecordExtractor;
use crate::fetch::Fetcher;
use crate::harvest::Harvester;
use crate::normalize::KeyNormalizer;
use crate::prior::fetch_prior;
use crate::reconcile::reconcile;
use crate::server::{ServerRecord, Validator};
use crate::store::ConfigStore;

/// Run a harvest and return the merged list.
///
/// Nothing is written when the harvest comes back empty or when
/// `settings.dry_run` is set.
pub async fn run<F: Fetcher, S: ConfigStore>(
    settings: &Settings,
    fetcher: &F,
    store: &S,
) -> Result<Vec<ServerRecord>> {
    let harvester = Harvester::new(
        fetcher,
        RecordExtractor::new(KeyNormalizer::new(
            settings
                .labels
                .iter()
                .map(|(label, field)| (label.as_str(), field.as_str())),
        )),
        Validator::new(&settings.fallback_method, &settings.group),
    );

    info!("📋 Harvesting {} source(s)", settings.sources.len());
    let (fresh, prior) = tokio::join!(
        harvester.harvest(&settings.sources),
        fetch_prior(fetcher, settings.prior_url.as_ref())
    );
    let prior = prior.map(|entries| harvester.validator().validate_all(&entries));

    let servers = reconcile(fresh, prior)?;

    if settings.dry_run {
        info!("Dry run, leaving config files alone");
        return Ok(servers);
    }

    let targets = select_targets(settings, store).await;
    emit_all(store, &targets, &servers, &settings.group).await?;

    Ok(servers)
}
