//! [`OutputPathResolver`]: first usable folder wins.

use schedkit_core::config::OutputConfig;
use schedkit_core::ScheduleRequest;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{
    folder_path, CollaboratorError, FileService, OutputPathError, OutputResolutionContext,
    OutputSource, Owner, Permission, SettingsStore,
};

const READ_WRITE: [Permission; 2] = [Permission::Read, Permission::Write];

/// The folder that passed validation and the pattern appended to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOutput {
    pub source: OutputSource,
    pub folder: String,
    pub file_name_pattern: String,
}

impl ResolvedOutput {
    /// `folder + file_name_pattern`, e.g. `/home/suzy/WeeklyReport.*`.
    pub fn path(&self) -> String {
        let folder = self.folder.trim_end_matches('/');
        format!("{folder}{}", self.file_name_pattern)
    }
}

pub struct OutputPathResolver<'a> {
    files: &'a dyn FileService,
    settings: &'a dyn SettingsStore,
    config: OutputConfig,
}

impl<'a> OutputPathResolver<'a> {
    pub fn new(
        files: &'a dyn FileService,
        settings: &'a dyn SettingsStore,
        config: OutputConfig,
    ) -> Self {
        Self {
            files,
            settings,
            config,
        }
    }

    /// Resolve the output location for `request` on behalf of `owner`.
    ///
    /// Candidates are looked up lazily; nothing after the first usable
    /// folder is consulted. Collaborator failures propagate.
    pub fn resolve(
        &self,
        request: &ScheduleRequest,
        owner: &Owner,
    ) -> Result<ResolvedOutput, OutputPathError> {
        let ctx = OutputResolutionContext::from_request(request, owner.clone())?;

        if let Some(found) = self.try_source(&ctx, OutputSource::Requested)? {
            debug!(owner = %owner, folder = %found.folder, "using requested output folder");
            return Ok(found);
        }

        if !self.config.fallback_enabled {
            let folder = ctx.requested_folder().unwrap_or_default().to_string();
            warn!(owner = %owner, folder = %folder, "output fallback disabled");
            return Err(OutputPathError::FallbackDisabled {
                owner: owner.to_string(),
                folder,
            });
        }

        for source in OutputSource::FALLBACKS {
            if let Some(found) = self.try_source(&ctx, source)? {
                info!(
                    owner = %owner,
                    source = %source,
                    folder = %found.folder,
                    "output redirected to fallback folder"
                );
                return Ok(found);
            }
        }

        error!(
            owner = %owner,
            pattern = ctx.file_name_pattern(),
            "no output folder is usable, including the home folder"
        );
        Err(OutputPathError::Unresolvable {
            owner: owner.to_string(),
        })
    }

    fn try_source(
        &self,
        ctx: &OutputResolutionContext,
        source: OutputSource,
    ) -> Result<Option<ResolvedOutput>, OutputPathError> {
        let Some(folder) = self.candidate(ctx, source)? else {
            warn!(owner = %ctx.owner(), source = %source, "no output folder configured");
            return Ok(None);
        };
        if !self.is_usable(ctx.owner(), source, &folder)? {
            return Ok(None);
        }
        Ok(Some(ResolvedOutput {
            source,
            folder,
            file_name_pattern: ctx.file_name_pattern().to_string(),
        }))
    }

    fn candidate(
        &self,
        ctx: &OutputResolutionContext,
        source: OutputSource,
    ) -> Result<Option<String>, CollaboratorError> {
        let folder = match source {
            OutputSource::Requested => ctx.requested_folder().map(str::to_string),
            OutputSource::UserSetting => self
                .settings
                .user_setting(&self.config.user_setting_key, ctx.owner())?,
            OutputSource::SystemSetting => {
                self.settings.system_setting(&self.config.system_setting_key)?
            }
            OutputSource::HomeFolder => Some(self.config.home_folder(ctx.owner().as_str())),
        };
        Ok(folder.as_deref().and_then(folder_path))
    }

    /// Exists and the owner can both read and write it.
    fn is_usable(
        &self,
        owner: &Owner,
        source: OutputSource,
        folder: &str,
    ) -> Result<bool, CollaboratorError> {
        if !self.files.exists(owner, folder)? {
            warn!(owner = %owner, source = %source, folder, "output folder does not exist");
            return Ok(false);
        }
        if !self.files.has_access(owner, folder, &READ_WRITE)? {
            warn!(
                owner = %owner,
                source = %source,
                folder,
                "owner lacks read/write access to output folder"
            );
            return Ok(false);
        }
        Ok(true)
    }
}
