use crate::error::Result;
use crate::orchestrator::RunContext;
use crate::serialization::write_atomic;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

pub const CALLABLE: &str = "save::run";

/// Contents of the artifact manifest.
struct Manifest {
    generated_at: DateTime<Utc>,
    models: Vec<String>,
    reports: Vec<String>,
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Models and reports generated by pipeline")?;
        writeln!(f, "generated_at: {}", self.generated_at.to_rfc3339())?;
        writeln!(f, "models:")?;
        for name in &self.models {
            writeln!(f, "  - {}", name)?;
        }
        writeln!(f, "reports:")?;
        for name in &self.reports {
            writeln!(f, "  - {}", name)?;
        }
        Ok(())
    }
}

/// Write `models/artifacts_manifest.txt` listing the produced files.
pub fn run(ctx: &RunContext) -> Result<()> {
    let layout = ctx.layout();
    let manifest = layout.manifest();

    let contents = Manifest {
        generated_at: Utc::now(),
        models: list_files(&layout.models_dir(), &manifest)?,
        reports: list_files(&layout.reports_dir(), &manifest)?,
    };
    write_atomic(&manifest, contents.to_string().as_bytes())?;
    info!(
        path = %manifest.display(),
        models = contents.models.len(),
        reports = contents.reports.len(),
        "wrote artifact manifest"
    );
    Ok(())
}

/// File names directly under `dir`, sorted, leaving out `exclude`.
fn list_files(dir: &Path, exclude: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() || entry.path() == exclude {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
