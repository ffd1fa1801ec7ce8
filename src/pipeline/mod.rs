//! The packing pipeline.
//!
//! ```text
//! discover ──► graph ──► depth ──► optimize ──► rewrite ──► post
//!   files       Link1/2    layers    1..D         sources     outputs, .gz/.br
//! ```
//!
//! Every phase runs to completion before the next starts, over one store
//! opened per run. Order is always path order, then edge order, so two runs
//! over the same tree produce the same bytes.

mod depth;
mod discover;
mod graph;
mod optimize;
mod post;
mod rewrite;


pub use discover::Discovery;
pub use graph::GraphSummary;
pub use post::PostSummary;

use std::path::PathBuf;

use anyhow::Result;

use crate::analyzer::Registry;
use crate::config::PackConfig;
use crate::store::{Counts, Store};
use crate::utils::plural_count;
use crate::{debug, log};

/// Outcome of a full build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub discovery: Discovery,
    pub graph: GraphSummary,
    pub max_depth: i64,
    pub optimized: usize,
    pub rewritten: usize,
    pub post: PostSummary,
}

/// Outcome of a dry run: nothing is written.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub discovery: Discovery,
    pub counts: Counts,
    pub max_depth: i64,
    /// Resources nothing reaches, in path order.
    pub unused: Vec<PathBuf>,
}

/// One pipeline run over one store.
pub struct Packer<'a> {
    config: &'a PackConfig,
    store: Store,
}

impl<'a> Packer<'a> {
    /// Open the configured store, or an in-memory one.
    pub fn open(config: &'a PackConfig) -> Result<Self> {
        let store = Store::open(config.paths.store.as_deref())?;
        Ok(Self { config, store })
    }

    /// Packer over a fresh in-memory store, regardless of configuration.
    pub fn in_memory(config: &'a PackConfig) -> Result<Self> {
        Ok(Self {
            config,
            store: Store::open(None)?,
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Seed the type bindings and insert every classifiable file.
    pub fn discover(&self) -> Result<Discovery> {
        discover::seed_types(self.config, &self.store)?;
        let registry = Registry::load(&self.store)?;
        let found = discover::discover(self.config, &self.store, &registry)?;
        debug!(
            "discover";
            "{}, {}, {} skipped",
            plural_count(found.sources, "source"),
            plural_count(found.resources, "resource"),
            found.skipped
        );
        Ok(found)
    }

    pub fn build_graph(&self) -> Result<GraphSummary> {
        let summary = graph::build(self.config, &self.store)?;
        log!(
            "graph";
            "{}, {}",
            plural_count(summary.link1 + summary.link2, "reference"),
            plural_count(summary.virtual_resources, "combined group")
        );
        Ok(summary)
    }

    /// Layer the graph and prune what nothing reaches. Returns the max depth.
    pub fn resolve_depth(&self) -> Result<i64> {
        let max_depth = depth::resolve(&self.store)?;
        let unused = self.store.unused_resources()?.len();
        log!("depth"; "max depth {max_depth}, {} unused", unused);
        Ok(max_depth)
    }

    pub fn optimize(&self, max_depth: i64) -> Result<usize> {
        optimize::run(self.config, &self.store, max_depth)
    }

    pub fn rewrite(&self) -> Result<usize> {
        let written = rewrite::run(self.config, &self.store)?;
        log!("rewrite"; "{}", plural_count(written, "source"));
        Ok(written)
    }

    pub fn post_process(&mut self) -> Result<PostSummary> {
        let summary = post::run(self.config, &mut self.store)?;
        if summary.deleted_unused > 0 {
            log!("unused"; "deleted {}", plural_count(summary.deleted_unused, "file"));
        }
        debug!(
            "post";
            "{} written, {} unchanged, {} compressed",
            summary.written,
            summary.unchanged,
            summary.compressed
        );
        Ok(summary)
    }

    /// Run every phase in order.
    pub fn run(&mut self) -> Result<BuildReport> {
        let discovery = self.discover()?;
        let graph = self.build_graph()?;
        let max_depth = self.resolve_depth()?;
        let optimized = self.optimize(max_depth)?;
        let rewritten = self.rewrite()?;
        let post = self.post_process()?;
        Ok(BuildReport {
            discovery,
            graph,
            max_depth,
            optimized,
            rewritten,
            post,
        })
    }

    /// Discovery, graph and depth only.
    pub fn check(&self) -> Result<CheckReport> {
        let discovery = self.discover()?;
        self.build_graph()?;
        let max_depth = self.resolve_depth()?;
        let unused = self
            .store
            .unused_resources()?
            .into_iter()
            .filter(|r| !r.kind.is_virtual())
            .map(|r| r.path)
            .collect();
        Ok(CheckReport {
            discovery,
            counts: self.store.counts()?,
            max_depth,
            unused,
        })
    }
}
