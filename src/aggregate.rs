//! # Tier Aggregator
//!
//! Runs every extractor over every tier workbook and assembles the
//! [`FullDataset`]. Missing workbooks, missing sheets and failing channels
//! are logged and left out; the build itself always completes.
//!
//! Tiers do not depend on each other, so with `parallel` set each present
//! workbook is read and extracted on its own scoped thread. Results are
//! collected back in tier order once every thread has finished.
use crate::catalog::ChannelConfig;
use crate::catalog::Tier;
use crate::catalog::CHANNELS;
use crate::catalog::OPERATION_LAYOUT;
use crate::catalog::TIERS;
use crate::catalog::US_STATES;
use crate::catalog::VAS_SHEET;
use crate::catalog::WAREHOUSES;
use crate::catalog::ZIP_SHEET;
use crate::catalog::ZIP_SOURCE_TIER;
use crate::dataset::ChannelResult;
use crate::dataset::FullDataset;
use crate::dataset::Ordered;
use crate::dataset::TierDataset;
use crate::dataset::ZipRecord;
use crate::error::RateCardError;
use crate::error::ResultMessage;
use crate::extract::channel;
use crate::extract::fuel;
use crate::extract::operation;
use crate::extract::vas;
use crate::extract::zipcode;
use crate::extract::Note;
use crate::spreadsheet::Workbook;
use chrono::Utc;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

/// Longest failure message logged for an omitted channel.
const FAILURE_MESSAGE_CHARS: usize = 50;

/// What became of one tier.
#[derive(Debug)]
pub enum TierOutcome {
    Built(TierRun),
    /// The tier's workbook does not exist
    Missing(PathBuf),
    /// The workbook exists but could not be read
    Unreadable(RateCardError),
}

/// A tier that was extracted.
#[derive(Debug)]
pub struct TierRun {
    pub dataset: TierDataset,
    /// ZIP table, present for the ZIP-source tier only
    pub zips: Option<BTreeMap<String, ZipRecord>>,
    pub channels_omitted: usize,
}

/// Counts reported at the end of a build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub tiers_built: Vec<&'static str>,
    pub tiers_skipped: Vec<&'static str>,
    pub channels_built: usize,
    pub channels_omitted: usize,
    pub zip_count: usize,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tiers built [{}], skipped [{}]; {} channel tables, {} omitted; {} ZIP codes",
            self.tiers_built.join(", "),
            self.tiers_skipped.join(", "),
            self.channels_built,
            self.channels_omitted,
            self.zip_count,
        )
    }
}

/// Builds the dataset from the tier workbooks in `data_dir`.
pub fn build_dataset(data_dir: &Path, parallel: bool) -> (FullDataset, BuildSummary) {
    let mut summary = BuildSummary::default();
    let mut tiers = Ordered::new();
    let mut gofo_zips = BTreeMap::new();

    for (tier, outcome) in run_tiers(data_dir, parallel) {
        match outcome {
            TierOutcome::Built(run) => {
                info!(tier = tier.id, channels = run.dataset.channels.len(), "tier built");
                summary.tiers_built.push(tier.id);
                summary.channels_built += run.dataset.channels.len();
                summary.channels_omitted += run.channels_omitted;
                if let Some(zips) = run.zips {
                    gofo_zips = zips;
                }
                tiers.insert(tier.id, run.dataset);
            }
            TierOutcome::Missing(path) => {
                warn!(tier = tier.id, path = %path.display(), "workbook not found, tier skipped");
                summary.tiers_skipped.push(tier.id);
            }
            TierOutcome::Unreadable(error) => {
                error!(tier = tier.id, %error, "workbook unreadable, tier skipped");
                summary.tiers_skipped.push(tier.id);
            }
        }
    }
    summary.zip_count = gofo_zips.len();

    let dataset = FullDataset {
        warehouses: WAREHOUSES,
        channels: CHANNELS,
        gofo_zips,
        us_states_cn: US_STATES,
        tiers,
        generated_at: Utc::now(),
    };
    (dataset, summary)
}

/// Processes every tier, concurrently when `parallel`, returning outcomes in tier order.
fn run_tiers(data_dir: &Path, parallel: bool) -> Vec<(Tier, TierOutcome)> {
    if !parallel {
        return TIERS
            .iter()
            .map(|tier| (*tier, process_tier(*tier, &data_dir.join(tier.file_name))))
            .collect();
    }
    thread::scope(|scope| {
        let pending: Vec<_> = TIERS
            .iter()
            .map(|tier| {
                let path = data_dir.join(tier.file_name);
                if path.exists() {
                    Ok(scope.spawn(move || process_tier(*tier, &path)))
                } else {
                    Err(TierOutcome::Missing(path))
                }
            })
            .collect();
        TIERS
            .iter()
            .zip(pending)
            .map(|(tier, pending)| {
                let outcome = match pending {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|payload| tier_failure(*tier, payload.as_ref())),
                    Err(missing) => missing,
                };
                (*tier, outcome)
            })
            .collect()
    })
}

/// Reads one tier workbook and extracts everything it carries.
///
/// A panic while reading or extracting reports the tier as unreadable.
pub fn process_tier(tier: Tier, path: &Path) -> TierOutcome {
    if !path.exists() {
        return TierOutcome::Missing(path.to_path_buf());
    }
    guard_tier(tier, || read_tier(tier, path))
}

fn guard_tier(tier: Tier, run: impl FnOnce() -> TierOutcome) -> TierOutcome {
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| tier_failure(tier, payload.as_ref()))
}

fn tier_failure(tier: Tier, payload: &(dyn Any + Send)) -> TierOutcome {
    TierOutcome::Unreadable(RateCardError::WithContextError(format!(
        "{}: {}",
        tier.file_name,
        failure_message(payload)
    )))
}

fn read_tier(tier: Tier, path: &Path) -> TierOutcome {
    debug!(tier = tier.id, path = %path.display(), "reading workbook");
    let workbook = match Workbook::open(path).with_prefix(tier.file_name) {
        Ok(workbook) => workbook,
        Err(error) => return TierOutcome::Unreadable(error),
    };
    TierOutcome::Built(extract_tier(tier, &workbook))
}

/// Extracts fees, fuel rate and channel prices from an opened tier workbook.
pub fn extract_tier(tier: Tier, workbook: &Workbook) -> TierRun {
    let fuel_rate = fuel::extract(workbook);
    log_notes(tier, "fuel", &fuel_rate.notes);
    let operation = operation::extract(workbook, &OPERATION_LAYOUT);
    log_notes(tier, "operation", &operation.notes);
    let vas = vas::extract(workbook, VAS_SHEET);
    log_notes(tier, "vas", &vas.notes);

    let mut channels = Ordered::new();
    let mut channels_omitted = 0;
    for config in CHANNELS {
        match extract_channel(tier, workbook, config) {
            Some(result) => channels.insert(config.id, result),
            None => channels_omitted += 1,
        }
    }

    let zips = (tier == ZIP_SOURCE_TIER).then(|| {
        let zips = zipcode::extract(workbook, ZIP_SHEET);
        log_notes(tier, "zipcode", &zips.notes);
        info!(tier = tier.id, count = zips.value.len(), "ZIP table loaded");
        zips.value
    });

    TierRun {
        dataset: TierDataset {
            fuel_rate: fuel_rate.value,
            outbound: operation.value.outbound,
            pickup: operation.value.pickup,
            vas: vas.value,
            channels,
        },
        zips,
        channels_omitted,
    }
}

/// Extracts one channel. Any failure, including a panic inside the
/// extractor, omits the channel from the tier.
fn extract_channel(tier: Tier, workbook: &Workbook, config: &ChannelConfig) -> Option<ChannelResult> {
    let Some(sheet) = workbook.find_sheet(config.sheet_name) else {
        log_channel_notes(tier, config, &[Note::MissingSheet(config.sheet_name.to_owned())]);
        return None;
    };
    match panic::catch_unwind(AssertUnwindSafe(|| channel::extract(sheet, config))) {
        Ok(extraction) => {
            log_channel_notes(tier, config, &extraction.notes);
            if extraction.value.prices.is_empty() {
                warn!(tier = tier.id, channel = config.id, "no prices extracted, channel omitted");
                return None;
            }
            debug!(tier = tier.id, channel = config.id, entries = extraction.value.prices.len(), "channel extracted");
            Some(extraction.value)
        }
        Err(payload) => {
            let message = failure_message(payload.as_ref());
            error!(tier = tier.id, channel = config.id, %message, "extraction failed, channel omitted");
            None
        }
    }
}

/// Panic payload text, cut to a loggable length.
fn failure_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown failure".to_owned());
    message.chars().take(FAILURE_MESSAGE_CHARS).collect()
}

fn log_notes(tier: Tier, feature: &str, notes: &[Note]) {
    for note in notes {
        match note {
            Note::SkippedRows { .. } | Note::DefaultFuelRate(_) => info!(tier = tier.id, feature, "{note}"),
            _ => warn!(tier = tier.id, feature, "{note}"),
        }
    }
}

fn log_channel_notes(tier: Tier, config: &ChannelConfig, notes: &[Note]) {
    for note in notes {
        match note {
            Note::SkippedRows { .. } => info!(tier = tier.id, feature = "channel", channel = config.id, "{note}"),
            _ => warn!(tier = tier.id, feature = "channel", channel = config.id, "{note}"),
        }
    }
}
