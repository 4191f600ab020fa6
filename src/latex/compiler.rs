//! Bridge to the external LaTeX-to-PDF script.
//!
//! The script is invoked as `<interpreter> <script> --tex <file> --out <dir> --cleanup`
//! and reports the produced PDF as a `{"pdf": "<path>"}` line on stdout.

use crate::config::LatexConfig;
use crate::utils::error::CustomError;
use crate::utils::helpers::random_hex;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use uuid::Uuid;

/// Byproducts removed from the artifact directory after each compile.
pub const ARTIFACT_EXTENSIONS: [&str; 6] = [".pdf", ".log", ".aux", ".out", ".toc", ".synctex.gz"];

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("No LaTeX content to compile")]
    EmptyInput,

    #[error("PDF compiler is not available: {0}")]
    Configuration(String),

    #[error("PDF compilation timed out after {0:?}")]
    Timeout(Duration),

    #[error("PDF compilation failed with exit code {code:?}")]
    Compilation { code: Option<i32>, stderr: String },

    #[error("Unexpected PDF compiler output: {0}")]
    Parsing(String),

    #[error("PDF compilation I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CompileError> for CustomError {
    fn from(err: CompileError) -> Self {
        match &err {
            CompileError::Compilation { stderr, .. } if !stderr.is_empty() => {
                CustomError::internal_with(err.to_string(), stderr)
            }
            _ => CustomError::internal(err.to_string()),
        }
    }
}

/// A compiled document. Call [`CompiledPdf::cleanup`] once the bytes are sent.
#[derive(Debug)]
pub struct CompiledPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
    workdir: PathBuf,
}

impl CompiledPdf {
    pub fn new(bytes: Vec<u8>, filename: String, workdir: PathBuf) -> Self {
        CompiledPdf {
            bytes,
            filename,
            workdir,
        }
    }

    #[cfg(test)]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub async fn cleanup(self) {
        remove_workdir(&self.workdir).await;
    }
}

#[async_trait]
pub trait LatexCompiler: Send + Sync {
    async fn compile(&self, latex: &str, base_name: &str) -> Result<CompiledPdf, CompileError>;

    /// Remove stray compiler byproducts; returns how many files were deleted.
    async fn sweep_artifacts(&self) -> usize;
}

pub struct ScriptCompiler {
    config: LatexConfig,
    permits: Arc<Semaphore>,
}

impl ScriptCompiler {
    pub fn new(config: LatexConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        ScriptCompiler { config, permits }
    }

    async fn run_in(&self, workdir: &Path, name: &str, latex: &str) -> Result<Vec<u8>, CompileError> {
        let tex_path = workdir.join(format!("{name}.tex"));
        fs::write(&tex_path, latex).await?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| CompileError::Configuration("compiler pool is closed".into()))?;

        let output = self.run_script(&tex_path, workdir).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("PDF compiler exited with {}: {}", output.status, stderr);
            return Err(CompileError::Compilation {
                code: output.status.code(),
                stderr,
            });
        }

        let pdf_path = parse_compiler_output(&String::from_utf8_lossy(&output.stdout))?;
        Ok(fs::read(&pdf_path).await?)
    }

    async fn run_script(&self, tex_path: &Path, out_dir: &Path) -> Result<Output, CompileError> {
        for interpreter in &self.config.interpreters {
            let mut command = Command::new(interpreter);
            command
                .arg(&self.config.script_path)
                .arg("--tex")
                .arg(tex_path)
                .arg("--out")
                .arg(out_dir)
                .arg("--cleanup")
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let child = match command.spawn() {
                Ok(child) => child,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!("Interpreter '{}' not found, trying next", interpreter);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            // dropping the future on timeout kills the child
            return match timeout(self.config.timeout, child.wait_with_output()).await {
                Ok(output) => Ok(output?),
                Err(_) => {
                    warn!(
                        "PDF compilation via '{}' exceeded {:?}",
                        interpreter, self.config.timeout
                    );
                    Err(CompileError::Timeout(self.config.timeout))
                }
            };
        }

        Err(CompileError::Configuration(format!(
            "no usable interpreter among [{}]",
            self.config.interpreters.join(", ")
        )))
    }
}

#[async_trait]
impl LatexCompiler for ScriptCompiler {
    async fn compile(&self, latex: &str, base_name: &str) -> Result<CompiledPdf, CompileError> {
        if latex.trim().is_empty() {
            return Err(CompileError::EmptyInput);
        }

        let name = sanitize_base_name(base_name);
        let workdir = std::env::temp_dir().join(format!("latex-{}", Uuid::new_v4()));
        fs::create_dir_all(&workdir).await?;

        match self.run_in(&workdir, &name, latex).await {
            Ok(bytes) => {
                info!("Compiled {}.pdf ({} bytes)", name, bytes.len());
                Ok(CompiledPdf::new(bytes, format!("{name}.pdf"), workdir))
            }
            Err(err) => {
                remove_workdir(&workdir).await;
                Err(err)
            }
        }
    }

    async fn sweep_artifacts(&self) -> usize {
        sweep_dir(&self.config.artifact_dir).await
    }
}

/// Lower-case, collapse runs of non-alphanumerics to `_`, trim `_`.
pub fn sanitize_base_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c);
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }

    let name = name.trim_matches('_');
    if name.is_empty() {
        format!("paper_{}", random_hex(6))
    } else {
        name.to_string()
    }
}

#[derive(Deserialize)]
struct CompilerReport {
    pdf: Option<String>,
}

/// Extract the PDF path from the last non-blank stdout line.
pub fn parse_compiler_output(stdout: &str) -> Result<PathBuf, CompileError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| CompileError::Parsing("compiler produced no output".into()))?;

    let report: CompilerReport = serde_json::from_str(line)
        .map_err(|e| CompileError::Parsing(format!("invalid JSON '{line}': {e}")))?;

    match report.pdf.filter(|p| !p.trim().is_empty()) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Err(CompileError::Parsing("no PDF path reported".into())),
    }
}

async fn remove_workdir(dir: &Path) {
    if let Err(err) = fs::remove_dir_all(dir).await {
        if err.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", dir.display(), err);
        }
    }
}

async fn sweep_dir(dir: &Path) -> usize {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return 0,
        Err(err) => {
            warn!("Cannot sweep {}: {}", dir.display(), err);
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!("Sweep of {} interrupted: {}", dir.display(), err);
                break;
            }
        };

        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        let lowered = name.to_lowercase();
        if !is_file || !ARTIFACT_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
            continue;
        }

        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(err) => warn!("Failed to remove artifact {}: {}", name, err),
        }
    }

    if removed > 0 {
        debug!("Swept {} artifacts from {}", removed, dir.display());
    }
    removed
}
