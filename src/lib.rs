//! # Rate Card Builder
//!
//! Turns tiered shipping rate-card workbooks into the pricing dataset behind
//! the storefront quote page.
//!
//! Each pricing tier (`T0` … `T3`) is one `.xlsx` workbook written by hand:
//! tables float under banners and notes, two channels may share a sheet, and
//! fees sit in fixed cells. The extractors in [`extract`] find the tables by
//! their header markers, normalize prices and fees, and report what they had
//! to skip instead of failing.
//!
//! ## Pipeline
//!
//! - [`spreadsheet`]: reads xlsx packages into sparse in-memory sheets
//! - [`extract`]: header location, number normalization and one extractor per feature
//! - [`aggregate`]: runs the extractors over every tier and assembles the [`dataset`]
//! - [`render`]: serializes the dataset and injects it into the page template
//!
//! Reference tables (warehouses, channels, states) are compiled in, see [`catalog`].
pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
mod helpers;
pub mod render;
pub mod spreadsheet;

use crate::aggregate::BuildSummary;
use crate::config::BuildOptions;
use crate::error::RateCardError;
use std::path::PathBuf;

/// Builds the dataset from `options.data_dir` and writes the output file.
///
/// Only writing the output can fail; problems with the workbooks are logged
/// and reflected in the returned summary.
pub fn run(options: &BuildOptions) -> Result<(PathBuf, BuildSummary), RateCardError> {
    let (dataset, summary) = aggregate::build_dataset(&options.data_dir, options.parallel);
    let path = render::write_output(&dataset, options)?;
    Ok((path, summary))
}
