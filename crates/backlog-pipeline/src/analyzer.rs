//! Document analyzer boundary
//!
//! The natural-language extraction service sits behind [`DocumentAnalyzer`].
//! It is called twice per import: once for the project and its epics, once
//! for the stories and tasks. Keys it emits ("EP-01", "US-3") only need to
//! be stable within one import.

use crate::error::AnalyzerError;
use async_trait::async_trait;
use backlog_model::{DetailedContent, Feedback, ProjectAnalysis, UserId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Answer of one analyzer call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Errors, warnings and completions reported by the analyzer
    pub feedback: Feedback,
}

impl<T> AnalyzerResponse<T> {
    /// Successful response
    #[inline]
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            feedback: Feedback::default(),
        }
    }

    /// Unsuccessful response with a critical error
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        let mut feedback = Feedback::default();
        feedback.critical(message);
        Self {
            success: false,
            data: None,
            feedback,
        }
    }

    /// With feedback
    #[inline]
    #[must_use]
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Extraction of structured candidates from a specification document
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Project metadata and epics
    async fn analyze_project(
        &self,
        document: &str,
    ) -> Result<AnalyzerResponse<ProjectAnalysis>, AnalyzerError>;

    /// Stories and tasks, given the first pass
    async fn analyze_details(
        &self,
        document: &str,
        analysis: &ProjectAnalysis,
        assignee: UserId,
    ) -> Result<AnalyzerResponse<DetailedContent>, AnalyzerError>;
}

/// Canned analyzer output stored in a JSON or YAML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDocument {
    pub analysis: ProjectAnalysis,
    #[serde(default)]
    pub details: DetailedContent,
}

/// Analyzer that answers from a fixture instead of reading the document
#[derive(Debug, Clone, Default)]
pub struct FixtureAnalyzer {
    fixture: FixtureDocument,
}

impl FixtureAnalyzer {
    /// Create from an in-memory fixture
    #[inline]
    #[must_use]
    pub fn new(fixture: FixtureDocument) -> Self {
        Self { fixture }
    }

    /// Load a fixture file; `.yaml`/`.yml` are read as YAML, anything else as JSON
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let fixture = if is_yaml {
            serde_yaml::from_str(&raw).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&raw).map_err(|e| e.to_string())
        }
        .map_err(|message| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::debug!(path = %path.display(), "loaded analyzer fixture");
        Ok(Self::new(fixture))
    }

    /// Fixture served by this analyzer
    #[inline]
    #[must_use]
    pub fn fixture(&self) -> &FixtureDocument {
        &self.fixture
    }
}

#[async_trait]
impl DocumentAnalyzer for FixtureAnalyzer {
    async fn analyze_project(
        &self,
        _document: &str,
    ) -> Result<AnalyzerResponse<ProjectAnalysis>, AnalyzerError> {
        Ok(AnalyzerResponse::ok(self.fixture.analysis.clone()))
    }

    async fn analyze_details(
        &self,
        _document: &str,
        _analysis: &ProjectAnalysis,
        _assignee: UserId,
    ) -> Result<AnalyzerResponse<DetailedContent>, AnalyzerError> {
        Ok(AnalyzerResponse::ok(self.fixture.details.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JSON_FIXTURE: &str = r#"{
        "analysis": {
            "projectMetadata": { "name": "Portal de clientes", "code": "PDC" },
            "epics": [
                { "id": "EP-01", "title": "Autenticación", "estimatedWeeks": 2, "priority": "CRÍTICA" }
            ]
        },
        "details": {
            "stories": [
                { "id": "US-1", "epicId": "EP-01", "title": "Login", "description": "Como usuario quiero entrar", "storyPoints": 3 }
            ],
            "tasks": [
                { "id": "T-1", "storyId": "US-1", "title": "API de login", "type": "BE" }
            ]
        }
    }"#;

    const YAML_FIXTURE: &str = "
analysis:
  projectMetadata:
    name: Portal de clientes
  epics:
    - id: EP-01
      title: Autenticación
      estimatedWeeks: 2
      priority: ALTA
";

    #[test]
    fn parses_json_fixture() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON_FIXTURE.as_bytes()).unwrap();

        let analyzer = FixtureAnalyzer::from_path(file.path()).unwrap();
        let fixture = analyzer.fixture();
        assert_eq!(fixture.analysis.project_metadata.code_hint.as_deref(), Some("PDC"));
        assert_eq!(fixture.analysis.epics[0].estimated_weeks, 2);
        assert_eq!(fixture.details.stories[0].epic_id, "EP-01");
        assert_eq!(fixture.details.tasks[0].task_type, "BE");
    }

    #[test]
    fn parses_yaml_fixture_without_details() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML_FIXTURE.as_bytes()).unwrap();

        let analyzer = FixtureAnalyzer::from_path(file.path()).unwrap();
        assert_eq!(analyzer.fixture().analysis.epics.len(), 1);
        assert!(analyzer.fixture().details.is_empty());
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = FixtureAnalyzer::from_path(file.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { .. }));
    }

    #[tokio::test]
    async fn serves_fixture_regardless_of_document() {
        let fixture: FixtureDocument = serde_json::from_str(JSON_FIXTURE).unwrap();
        let analyzer = FixtureAnalyzer::new(fixture);

        let project = analyzer.analyze_project("cualquier texto").await.unwrap();
        assert!(project.success);
        let analysis = project.data.unwrap();

        let details = analyzer
            .analyze_details("cualquier texto", &analysis, UserId::new())
            .await
            .unwrap();
        assert_eq!(details.data.unwrap().tasks.len(), 1);
    }
}
