//! End-to-end driver
//!
//! parse source -> extract -> (parse header -> extract -> merge -> splice)
//! or synthesize a new header.

use cprotogen_core::{Config, Error, ExtractMode, ExtractionResult, Result, SignatureMap};
use cprotogen_parser::{extract_signatures, get_parser, ExtractOptions, Parser};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::merge::merge_prototypes;
use crate::writer::{splice_prototypes, synthesize_header, write_header_file, SpliceRegion};

/// What to do with the extracted prototypes
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Header to create or update
    pub header: Option<PathBuf>,
    /// Allow updating a header that already exists
    pub overwrite: bool,
}

/// Extract the prototypes of `source` and, when a header is requested,
/// create or update it. Returns the source's prototypes in source order.
///
/// An existing header without `overwrite` fails with
/// [`Error::HeaderExists`] before anything is parsed or written.
pub fn generate_prototypes(
    source: &Path,
    options: &GenerateOptions,
    config: &Config,
) -> Result<Vec<String>> {
    if let Some(header) = &options.header {
        if header.exists() && !options.overwrite {
            return Err(Error::HeaderExists(header.clone()));
        }
    }

    let parser = get_parser(&config.parser)?;
    debug!("Using {} parser", parser.name());

    let extract_options = ExtractOptions {
        include_static: config.header.include_static,
    };
    let source_tree = parser.parse_file(source)?;
    let source_result =
        extract_signatures(&source_tree, ExtractMode::from_path(source), &extract_options)?;
    info!(
        "{}: {} prototypes",
        source.display(),
        source_result.by_name.len()
    );

    if let Some(header) = &options.header {
        if header.exists() && !is_blank(header)? {
            update_header(parser.as_ref(), header, &source_result, config)?;
        } else {
            // One prototype per name, so a rerun on the same source is a no-op
            let prototypes = merge_prototypes(&SignatureMap::new(), &source_result.by_name);
            let contents = synthesize_header(source, &prototypes);
            write_header_file(header, &contents, config.header.atomic_write)?;
            info!("Created {}", header.display());
        }
    }

    Ok(source_result.prototypes())
}

/// A header holding nothing but whitespace is treated as missing
fn is_blank(header: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(header)?;
    Ok(content.trim().is_empty())
}

fn update_header(
    parser: &dyn Parser,
    header: &Path,
    source_result: &ExtractionResult,
    config: &Config,
) -> Result<()> {
    let header_tree = parser.parse_file(header)?;
    let header_result =
        extract_signatures(&header_tree, ExtractMode::Header, &ExtractOptions::default())?;

    let region = match SpliceRegion::from_bounds(&header_result.bounds) {
        Some(region) => {
            let stray = header_result
                .bounds
                .len()
                .saturating_sub(header_result.covered_lines);
            if stray > 0 {
                warn!(
                    "{}: lines {} hold {} non-prototype lines that will be replaced",
                    header.display(),
                    header_result.bounds,
                    stray
                );
            }
            region
        }
        None => {
            // No prototypes yet: go right before the include guard's #endif
            let index = header_tree
                .include_guard_end()
                .map(|line| line - 1)
                .unwrap_or(0);
            debug!(
                "{} declares no prototypes, inserting at line {}",
                header.display(),
                index + 1
            );
            SpliceRegion::insertion(index)
        }
    };

    let merged = merge_prototypes(&header_result.by_name, &source_result.by_name);
    let content = std::fs::read_to_string(header)?;
    let updated = splice_prototypes(&content, region, &merged);
    write_header_file(header, &updated, config.header.atomic_write)?;

    info!(
        "Updated {} ({} -> {} prototypes)",
        header.display(),
        header_result.by_name.len(),
        merged.len()
    );
    Ok(())
}
