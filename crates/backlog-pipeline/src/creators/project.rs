//! Project creation

use crate::error::PipelineError;
use backlog_model::{Completion, Feedback, NewProject, ProjectCreated, ProjectMetadata, UserId};
use backlog_store::{BacklogStore, StoreError};

/// Name used when the analyzer found none
pub const DEFAULT_PROJECT_NAME: &str = "Proyecto importado";

const DEFAULT_CODE: &str = "PRJ";
const MAX_SUFFIX: u32 = 99;

/// Base project code: the normalized hint, else the name's initials
///
/// Codes are upper-case ASCII alphanumerics of at most `max_len` characters.
#[must_use]
pub fn derive_project_code(metadata: &ProjectMetadata, max_len: usize) -> String {
    let hinted = metadata
        .code_hint
        .as_deref()
        .map(normalize)
        .filter(|code| !code.is_empty());

    let code = hinted.unwrap_or_else(|| {
        let initials: String = metadata
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().find(char::is_ascii_alphanumeric))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if initials.len() >= 2 {
            initials
        } else {
            normalize(&metadata.name).chars().take(3).collect()
        }
    });

    let code = if code.is_empty() {
        DEFAULT_CODE.to_string()
    } else {
        code
    };
    code.chars().take(max_len.max(1)).collect()
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Persists the project record
pub struct ProjectCreator<'a> {
    store: &'a dyn BacklogStore,
    code_max_len: usize,
}

impl<'a> ProjectCreator<'a> {
    /// Create creator
    #[must_use]
    pub fn new(store: &'a dyn BacklogStore, code_max_len: usize) -> Self {
        Self {
            store,
            code_max_len: code_max_len.max(2),
        }
    }

    /// Insert the project owned by `owner`
    pub async fn create(
        &self,
        metadata: &ProjectMetadata,
        owner: UserId,
        feedback: &mut Feedback,
    ) -> Result<ProjectCreated, PipelineError> {
        let name = match metadata.name.trim() {
            "" => {
                feedback.complete(Completion::new(
                    "proyecto",
                    "name",
                    DEFAULT_PROJECT_NAME,
                    "el análisis no devolvió un nombre de proyecto",
                ));
                DEFAULT_PROJECT_NAME.to_string()
            }
            name => name.to_string(),
        };

        let effective = ProjectMetadata {
            name: name.clone(),
            ..metadata.clone()
        };
        let base = derive_project_code(&effective, self.code_max_len);
        let hinted = metadata
            .code_hint
            .as_deref()
            .is_some_and(|hint| !normalize(hint).is_empty());
        let description = metadata
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        // a concurrent import may claim the code between lookup and insert
        let mut taken = Vec::new();
        let record = loop {
            let code = self.unique_code(&base, &taken).await?;
            let inserted = self
                .store
                .insert_project(NewProject {
                    name: name.clone(),
                    code: code.clone(),
                    description: description.clone(),
                    owner_id: owner,
                })
                .await;
            match inserted {
                Ok(record) => break record,
                Err(StoreError::DuplicateProjectCode(_)) => {
                    tracing::debug!(%code, "project code claimed concurrently, retrying");
                    taken.push(code);
                }
                Err(err) => return Err(err.into()),
            }
        };

        let code = record.project.code.as_str();
        if !hinted {
            feedback.complete(Completion::new(
                "proyecto",
                "code",
                code,
                "código derivado del nombre del proyecto",
            ));
        } else if code != base {
            feedback.suggestion(format!(
                "El código de proyecto {base} ya existe; se usó {code}"
            ));
        }

        tracing::info!(project_id = %record.id, code = %record.project.code, "project created");
        Ok(ProjectCreated {
            project_id: record.id,
            project_code: record.project.code,
            project_name: record.project.name,
        })
    }

    /// First free code among `base`, `base2`, `base3`, ... not in `taken`
    async fn unique_code(&self, base: &str, taken: &[String]) -> Result<String, PipelineError> {
        let suffixed = (2..=MAX_SUFFIX).map(|n| {
            let suffix = n.to_string();
            let keep = self.code_max_len.saturating_sub(suffix.len()).max(1);
            base.chars().take(keep).chain(suffix.chars()).collect::<String>()
        });
        for candidate in std::iter::once(base.to_string()).chain(suffixed) {
            if taken.contains(&candidate) {
                continue;
            }
            if !self.store.project_code_exists(&candidate).await? {
                if candidate != base {
                    tracing::debug!(base, code = %candidate, "project code taken, using suffix");
                }
                return Ok(candidate);
            }
        }
        Err(PipelineError::Validation(format!(
            "no hay un código de proyecto libre para '{base}'"
        )))
    }
}
