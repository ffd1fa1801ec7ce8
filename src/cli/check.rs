//! `hashpack check`: discovery, graph and depth, without touching any file.

use anyhow::Result;

use crate::config::PackConfig;
use crate::log;
use crate::pipeline::Packer;
use crate::utils::plural_count;

pub fn check(config: &PackConfig) -> Result<()> {
    // Opening the configured store would reset it.
    let packer = Packer::in_memory(config)?;
    let report = packer.check()?;

    let counts = report.counts;
    log!(
        "check";
        "{}, {}, {} skipped",
        plural_count(counts.sources, "source"),
        plural_count(counts.resources, "resource"),
        report.discovery.skipped
    );
    log!(
        "check";
        "{} source references, {} resource references, max depth {}",
        counts.link1,
        counts.link2,
        report.max_depth
    );
    for path in &report.unused {
        log!("unused"; "{}", config.root_relative(path).display());
    }
    Ok(())
}
