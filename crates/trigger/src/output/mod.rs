//! Output-folder resolution with a cascading fallback chain.
//!
//! A job's generated content lands in `folder + "/" + base + ".*"`. The
//! requested folder is tried first, then (unless fallback is disabled) the
//! owner's setting, the system setting and the owner's home folder. Every
//! check runs against the schedule's owner, never the caller.

mod error;
mod resolver;


use std::fmt;

use schedkit_core::ScheduleRequest;
use serde::{Deserialize, Serialize};

pub use self::error::{CollaboratorError, OutputPathError};
pub use self::resolver::{OutputPathResolver, ResolvedOutput};

// ── Collaborators ───────────────────────────────────────────────────

/// The user a schedule's output belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Owner {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Owner {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

/// Repository view used to validate candidate folders.
///
/// Calls may block; an `Err` is a collaborator fault, not "unusable folder".
pub trait FileService: Send + Sync {
    fn exists(&self, owner: &Owner, path: &str) -> Result<bool, CollaboratorError>;

    fn has_access(
        &self,
        owner: &Owner,
        path: &str,
        permissions: &[Permission],
    ) -> Result<bool, CollaboratorError>;
}

/// User and system settings holding default output folders.
pub trait SettingsStore: Send + Sync {
    fn user_setting(&self, key: &str, owner: &Owner) -> Result<Option<String>, CollaboratorError>;

    fn system_setting(&self, key: &str) -> Result<Option<String>, CollaboratorError>;
}

// ── Context ─────────────────────────────────────────────────────────

/// Where a candidate folder came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    Requested,
    UserSetting,
    SystemSetting,
    HomeFolder,
}

impl OutputSource {
    /// Sources tried, in order, once the requested folder is rejected.
    pub const FALLBACKS: [OutputSource; 3] =
        [Self::UserSetting, Self::SystemSetting, Self::HomeFolder];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::UserSetting => "user_setting",
            Self::SystemSetting => "system_setting",
            Self::HomeFolder => "home_folder",
        }
    }
}

impl fmt::Display for OutputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resolution state, fixed for the life of one `resolve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputResolutionContext {
    owner: Owner,
    file_name_pattern: String,
    requested_folder: Option<String>,
}

impl OutputResolutionContext {
    pub fn from_request(request: &ScheduleRequest, owner: Owner) -> Result<Self, OutputPathError> {
        let base_name = base_name(request).ok_or(OutputPathError::MissingBaseName)?;
        let file_name_pattern = format!("/{base_name}.*");

        let requested_folder = request
            .output_file
            .as_deref()
            .and_then(|out| match out.strip_suffix(file_name_pattern.as_str()) {
                Some("") => Some("/".to_string()),
                Some(folder) => folder_path(folder),
                None => folder_path(out),
            });

        Ok(Self {
            owner,
            file_name_pattern,
            requested_folder,
        })
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// `"/" + base + ".*"`, appended to whichever folder wins.
    pub fn file_name_pattern(&self) -> &str {
        &self.file_name_pattern
    }

    pub fn requested_folder(&self) -> Option<&str> {
        self.requested_folder.as_deref()
    }
}

/// Trimmed folder without trailing slashes; the root stays `/`.
pub(super) fn folder_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.trim_end_matches('/') {
        "" => Some("/".to_string()),
        folder => Some(folder.to_string()),
    }
}

/// Job name, or the input file's name without directory or extension.
fn base_name(request: &ScheduleRequest) -> Option<String> {
    if let Some(name) = request.job_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    let input = request.input_file.as_deref()?;
    let file = input.rsplit('/').next().unwrap_or(input);
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    (!stem.is_empty()).then(|| stem.to_string())
}
