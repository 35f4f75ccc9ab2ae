// One scrape: fetch, fan out, emit, encode
//
// Eight export tasks turn the bundle into sample batches and push them
// through a bounded channel. A single emitter drains the channel into a
// registry built for this scrape. The channel closes once every task has
// dropped its sender.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use unpoller_core::{Collect, Filter, Metrics};

use crate::clients::DpiTotals;
use crate::config::PromConfig;
use crate::descs::Descs;
use crate::export::Batch;
use crate::output::PLUGIN_NAME;
use crate::report::Report;
use crate::uap::export_uap;
use crate::udm::export_udm;
use crate::usg::export_usg;
use crate::usw::export_usw;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Sites,
    SitesDpi,
    Clients,
    ClientsDpi,
    Uaps,
    Udms,
    Usgs,
    Usws,
}

impl Kind {
    const ALL: [Kind; 8] = [
        Kind::Sites,
        Kind::SitesDpi,
        Kind::Clients,
        Kind::ClientsDpi,
        Kind::Uaps,
        Kind::Udms,
        Kind::Usgs,
        Kind::Usws,
    ];
}

type Closed = mpsc::error::SendError<Batch>;

async fn send(tx: &mpsc::Sender<Batch>, batch: Batch) -> Result<(), Closed> {
    if batch.is_empty() {
        return Ok(());
    }
    tx.send(batch).await
}

/// Export every record of one kind. Stops early if the emitter is gone.
async fn send_all(
    kind: Kind,
    descs: Arc<Descs>,
    m: Arc<Metrics>,
    tx: mpsc::Sender<Batch>,
) -> Result<(), Closed> {
    let devices = m.devices.as_ref();

    match kind {
        Kind::Sites => {
            for s in &m.sites {
                send(&tx, descs.site.export(s)).await?;
            }
        }
        Kind::SitesDpi => {
            for t in &m.sites_dpi {
                send(&tx, descs.site.export_dpi(t)).await?;
            }
        }
        Kind::Clients => {
            for c in &m.clients {
                send(&tx, descs.client.export(c)).await?;
            }
        }
        Kind::ClientsDpi => {
            let mut totals = DpiTotals::default();
            for t in &m.clients_dpi {
                send(&tx, descs.client.export_dpi(t, &mut totals)).await?;
            }
            send(&tx, descs.client.export_totals(&totals)).await?;
        }
        Kind::Uaps => {
            for d in devices.map_or(&[][..], |d| d.uaps.as_slice()) {
                send(&tx, export_uap(&descs, d)).await?;
            }
        }
        Kind::Udms => {
            for d in devices.map_or(&[][..], |d| d.udms.as_slice()) {
                send(&tx, export_udm(&descs, d)).await?;
            }
        }
        Kind::Usgs => {
            for d in devices.map_or(&[][..], |d| d.usgs.as_slice()) {
                send(&tx, export_usg(&descs, d)).await?;
            }
        }
        Kind::Usws => {
            for d in devices.map_or(&[][..], |d| d.usws.as_slice()) {
                send(&tx, export_usw(&descs, d)).await?;
            }
        }
    }

    Ok(())
}

/// The encoded body of one scrape.
#[derive(Debug)]
pub struct Scraped {
    pub body: String,
    pub report: Report,
    /// The fetch error, when some controller failed.
    pub error: Option<String>,
}

/// Collect through `filter`, export and encode.
///
/// A fetch error does not fail the scrape: the data that arrived is still
/// exported, behind a `# ERROR` comment line.
pub async fn scrape(collect: &dyn Collect, config: &PromConfig, filter: &Filter) -> Result<Scraped> {
    let start = Instant::now();
    let collected = collect.metrics_from(filter).await;
    let fetch = start.elapsed();

    let error = collected.error.map(|e| e.to_string());
    let metrics = Arc::new(collected.data);

    let registry = Registry::new();
    let descs = Arc::new(
        Descs::new(&registry, &config.namespace()).context("registering metric descriptors")?,
    );

    let mut report = Report::new(&metrics);
    report.fetch = fetch;

    let (tx, mut rx) = mpsc::channel(config.buffer());
    let mut tasks = JoinSet::new();
    for kind in Kind::ALL {
        tasks.spawn(send_all(kind, Arc::clone(&descs), Arc::clone(&metrics), tx.clone()));
    }
    drop(tx);

    while let Some(batch) = rx.recv().await {
        for sample in batch.into_samples() {
            match sample.record() {
                Ok(value) => report.record(sample.desc.id(), value),
                Err(err) => report.error(err),
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            report.error(format!("export task failed: {err}"));
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("encoding metrics")?;
    let text = String::from_utf8(buffer).context("converting metrics to string")?;

    let body = match &error {
        Some(err) => format!("# ERROR metric fetch failed: {err}\n{text}"),
        None => text,
    };

    report.elapsed = start.elapsed();
    for err in &report.errors {
        collect.log_debugf(PLUGIN_NAME, format_args!("{err}"));
    }
    collect.logf(PLUGIN_NAME, format_args!("UniFi Measurements Exported. {report}"));

    Ok(Scraped {
        body,
        report,
        error,
    })
}
