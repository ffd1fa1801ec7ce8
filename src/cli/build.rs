//! `hashpack build`: the full pipeline.

use std::time::Instant;

use anyhow::Result;

use crate::config::PackConfig;
use crate::{debug, log};
use crate::pipeline::Packer;
use crate::utils::plural_count;

pub fn build(config: &PackConfig) -> Result<()> {
    let started = Instant::now();
    let mut packer = Packer::open(config)?;
    let report = packer.run()?;

    debug!(
        "build";
        "{} / {} discovered, {} references, max depth {}",
        plural_count(report.discovery.sources, "source"),
        plural_count(report.discovery.resources, "resource"),
        report.graph.link1 + report.graph.link2,
        report.max_depth
    );

    log!(
        "build";
        "{} optimized, {} rewritten, {} written in {:.2?}",
        plural_count(report.optimized, "resource"),
        plural_count(report.rewritten, "source"),
        plural_count(report.post.written, "file"),
        started.elapsed()
    );
    Ok(())
}
