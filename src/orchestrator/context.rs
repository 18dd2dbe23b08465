use crate::config::{PipelineConfig, ProjectLayout};
use std::path::PathBuf;
use tracing::{info_span, Span};

/// Everything a stage may read: where files live, the settings, where
/// external scripts are looked up, and the span of the current run.
#[derive(Clone, Debug)]
pub struct RunContext {
    layout: ProjectLayout,
    config: PipelineConfig,
    search_paths: Vec<PathBuf>,
    span: Span,
}

impl RunContext {
    pub fn new(layout: ProjectLayout, config: PipelineConfig) -> Self {
        let search_paths = config
            .scripts
            .search_paths
            .iter()
            .map(|p| layout.root().join(p))
            .collect();
        let span = info_span!("pipeline", root = %layout.root().display());
        Self {
            layout,
            config,
            search_paths,
            span,
        }
    }

    /// Replace the script search path; relative entries resolve against the root.
    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths = paths
            .into_iter()
            .map(|p| self.layout.root().join(p.into()))
            .collect();
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
