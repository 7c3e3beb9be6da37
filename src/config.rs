use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::mcp::MergeMode;

/// VS Code flavor directory used under `~/.config/<flavor>/User`
pub const DEFAULT_VSCODE_FLAVOR: &str = "Code";

/// Suffix appended to a target path for its pre-write copy
pub const BACKUP_SUFFIX: &str = ".backup";

/// Options of one sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source: PathBuf,
    /// Home directory the target registry is resolved against; `None` means `dirs::home_dir()`
    pub home: Option<PathBuf>,
    pub vscode_flavor: String,
    pub mode: MergeMode,
    pub dry_run: bool,
    /// Only touch targets whose config file already exists
    pub skip_missing: bool,
    /// Target ids to process; empty means all
    pub only: Vec<String>,
}

impl SyncOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            home: None,
            vscode_flavor: DEFAULT_VSCODE_FLAVOR.to_string(),
            mode: MergeMode::Preserve,
            dry_run: false,
            skip_missing: false,
            only: Vec::new(),
        }
    }

    pub fn resolve_home(&self) -> Result<PathBuf, AppError> {
        match &self.home {
            Some(home) => Ok(home.clone()),
            None => get_home_dir(),
        }
    }

    /// Source path with a leading `~` resolved against the same home as the targets
    pub fn source_path(&self) -> Result<PathBuf, AppError> {
        if !self.source.starts_with("~") {
            return Ok(self.source.clone());
        }
        Ok(expand_tilde(&self.source, &self.resolve_home()?))
    }
}

pub fn get_home_dir() -> Result<PathBuf, AppError> {
    dirs::home_dir().ok_or_else(|| AppError::Config("Unable to locate home directory".into()))
}

/// Expand a leading `~` to `home`
pub fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// `<path>.backup`, next to the original file
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Atomic write: write a temp file next to the target, then rename over it
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AppError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| AppError::Config(format!("Invalid path: {}", path.display())))?;
    fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::Config(format!("Invalid file name: {}", path.display())))?
        .to_string_lossy()
        .to_string();
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp = parent.join(format!("{file_name}.tmp.{ts}"));

    {
        let mut f = fs::File::create(&tmp).map_err(|e| AppError::io(&tmp, e))?;
        f.write_all(data).map_err(|e| AppError::io(&tmp, e))?;
        f.sync_all().map_err(|e| AppError::io(&tmp, e))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = fs::metadata(path) {
            let perm = meta.permissions().mode();
            let _ = fs::set_permissions(&tmp, fs::Permissions::from_mode(perm));
        }
    }

    #[cfg(windows)]
    {
        // rename onto an existing file fails on Windows
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(AppError::IoContext {
            context: format!("Atomic replace failed: {} -> {}", tmp.display(), path.display()),
            source: e,
        });
    }
    Ok(())
}
