//! Executable units a stage can resolve to.

use crate::error::{FailureCause, PipelineError, Result};
use crate::orchestrator::{RunContext, Stage};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use tracing::info;

/// In-process body of a stage.
pub trait StageAction: Send + Sync {
    fn run(&self, ctx: &RunContext) -> Result<()>;
}

impl<F> StageAction for F
where
    F: Fn(&RunContext) -> Result<()> + Send + Sync,
{
    fn run(&self, ctx: &RunContext) -> Result<()> {
        self(ctx)
    }
}

/// One entry in a stage's resolution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    /// A callable registered under this name.
    InProcess(String),
    /// A script base name, tried as-is and with `.sh` and `.py`.
    Script(String),
}

impl Candidate {
    pub fn in_process(name: impl Into<String>) -> Self {
        Candidate::InProcess(name.into())
    }

    pub fn script(name: impl Into<String>) -> Self {
        Candidate::Script(name.into())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::InProcess(name) => write!(f, "callable {}", name),
            Candidate::Script(name) => write!(f, "script {}", name),
        }
    }
}

const SCRIPT_EXTENSIONS: [&str; 3] = ["", ".sh", ".py"];

/// First existing script for `base` across `search_paths`.
///
/// Names are tried in extension order, and for each name every search
/// directory is tried in order.
pub fn find_script(base: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    SCRIPT_EXTENSIONS.iter().find_map(|ext| {
        let file_name = format!("{}{}", base, ext);
        search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    })
}

/// A resolved stage implementation.
#[derive(Clone)]
pub enum Implementation {
    InProcess {
        name: String,
        action: Arc<dyn StageAction>,
    },
    ExternalProcess {
        program: OsString,
        args: Vec<OsString>,
        script: PathBuf,
    },
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::InProcess { name, .. } => {
                f.debug_struct("InProcess").field("name", name).finish()
            }
            Implementation::ExternalProcess {
                program,
                args,
                script,
            } => f
                .debug_struct("ExternalProcess")
                .field("program", program)
                .field("args", args)
                .field("script", script)
                .finish(),
        }
    }
}

impl Implementation {
    /// Build the command line for a script, picking the interpreter by extension.
    pub fn for_script(script: PathBuf, python: &str) -> Self {
        let (program, args) = match script.extension().and_then(|e| e.to_str()) {
            Some("py") => (OsString::from(python), vec![script.clone().into_os_string()]),
            Some("sh") => (OsString::from("sh"), vec![script.clone().into_os_string()]),
            _ => (script.clone().into_os_string(), Vec::new()),
        };
        Implementation::ExternalProcess {
            program,
            args,
            script,
        }
    }

    /// Run to completion. Any failure is attributed to `stage`.
    pub fn execute(&self, stage: Stage, ctx: &RunContext) -> Result<()> {
        match self {
            Implementation::InProcess { name, action } => {
                info!(callable = %name, "calling in-process implementation");
                action.run(ctx).map_err(|e| e.in_stage(stage))
            }
            Implementation::ExternalProcess {
                program,
                args,
                script,
            } => {
                info!(script = %script.display(), "running external script");
                let status = Command::new(program)
                    .args(args)
                    .current_dir(ctx.layout().root())
                    .status()
                    .map_err(|e| PipelineError::StageExecution {
                        stage,
                        cause: FailureCause::Spawn(e),
                    })?;
                check_status(stage, status)
            }
        }
    }

    pub fn script(&self) -> Option<&Path> {
        match self {
            Implementation::ExternalProcess { script, .. } => Some(script),
            Implementation::InProcess { .. } => None,
        }
    }
}

fn check_status(stage: Stage, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let cause = match status.code() {
        Some(code) => FailureCause::ExitCode(code),
        None => signal_cause(status),
    };
    Err(PipelineError::StageExecution { stage, cause })
}

#[cfg(unix)]
fn signal_cause(status: ExitStatus) -> FailureCause {
    use std::os::unix::process::ExitStatusExt;
    status
        .signal()
        .map_or(FailureCause::Terminated, FailureCause::Signal)
}

#[cfg(not(unix))]
fn signal_cause(_status: ExitStatus) -> FailureCause {
    FailureCause::Terminated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_interpreter_by_extension() {
        let imp = Implementation::for_script(PathBuf::from("scripts/train_model.py"), "python3");
        match imp {
            Implementation::ExternalProcess { program, args, .. } => {
                assert_eq!(program, OsString::from("python3"));
                assert_eq!(args, vec![OsString::from("scripts/train_model.py")]);
            }
            other => panic!("unexpected implementation: {:?}", other),
        }

        let imp = Implementation::for_script(PathBuf::from("scripts/dashboard"), "python3");
        match imp {
            Implementation::ExternalProcess { program, args, .. } => {
                assert_eq!(program, OsString::from("scripts/dashboard"));
                assert!(args.is_empty());
            }
            other => panic!("unexpected implementation: {:?}", other),
        }
    }

    #[test]
    fn test_find_script_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(second.join("evaluate_model.sh"), "exit 0\n").unwrap();
        fs::write(first.join("evaluate_model.py"), "").unwrap();

        let paths = vec![first.clone(), second.clone()];
        assert_eq!(
            find_script("evaluate_model", &paths),
            Some(second.join("evaluate_model.sh"))
        );
        assert_eq!(find_script("train_model", &paths), None);
    }

    #[test]
    fn test_directories_are_not_scripts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dashboard")).unwrap();
        assert_eq!(find_script("dashboard", &[dir.path().to_path_buf()]), None);
    }
}
