//! Optimization engine: leaves first, layer by layer, so every dependency
//! already carries its final URI when its user is processed.

use anyhow::{Context, Result};

use crate::analyzer::ResourceKind;
use crate::config::PackConfig;
use crate::debug;
use crate::logger::ProgressLine;
use crate::store::{Resource, Store};

/// Optimize every layered resource. Returns the number optimized.
pub fn run(config: &PackConfig, store: &Store, max_depth: i64) -> Result<usize> {
    let layers = (1..=max_depth)
        .map(|depth| store.resources_at_depth(depth))
        .collect::<Result<Vec<_>>>()?;

    let mut progress =
        (!config.quiet).then(|| ProgressLine::new("optimize", &kind_totals(&layers)));

    let mut count = 0;
    for resource in layers.iter().flatten() {
        optimize_one(config, store, resource)?;
        if let Some(progress) = &mut progress {
            progress.inc(resource.kind.as_str());
        }
        count += 1;
    }

    if let Some(progress) = progress {
        progress.finish();
    }
    Ok(count)
}

fn optimize_one(config: &PackConfig, store: &Store, resource: &Resource) -> Result<()> {
    let deps = store.resources_referenced_by(resource.id)?;
    for dep in &deps {
        dep.uri(&resource.path)?;
    }

    let analyzer = resource.kind.analyzer();
    let optimized = analyzer
        .optimize(resource, &deps, config)
        .with_context(|| format!("Failed to optimize {}", config.root_relative(&resource.path).display()))?;
    let uri = analyzer.output_uri(resource, &optimized, config);
    debug!(
        "optimize";
        "{} -> {uri} (depth {})",
        config.root_relative(&resource.path).display(),
        resource.depth.unwrap_or_default()
    );
    store.set_optimized(resource, &optimized, &uri)
}

fn kind_totals(layers: &[Vec<Resource>]) -> Vec<(&'static str, usize)> {
    ResourceKind::ALL
        .iter()
        .map(|kind| {
            let total = layers.iter().flatten().filter(|r| r.kind == *kind).count();
            (kind.as_str(), total)
        })
        .collect()
}
