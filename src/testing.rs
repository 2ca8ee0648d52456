//! Test harness for [`ProviderService`] implementations.
//!
//! [`ProviderTester`] calls the provider directly, without a gRPC server, and
//! offers lifecycle helpers that chain plan, apply and refresh the way the
//! host does.
//!
//! # Example
//!
//! ```ignore
//! use pipes_provider::testing::ProviderTester;
//! use pipes_provider::PipesProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_workspace() {
//!     let tester = ProviderTester::new(PipesProvider::new());
//!     tester
//!         .configure(json!({"host": server.uri(), "token": "tpt_test", "organization": "acme"}))
//!         .await
//!         .unwrap();
//!
//!     let state = tester
//!         .lifecycle_create("pipes_workspace", json!({"handle": "dev"}))
//!         .await
//!         .unwrap();
//!     assert_eq!(state["workspace_id"], "w_123");
//! }
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Drives a provider the way the host would, minus the transport.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Fails if validation returns any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Fails if configuration returns any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// All diagnostics, warnings included, for use with the assertion helpers.
    pub async fn resource_config_diagnostics(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        self.provider
            .validate_resource_config(resource_type, config)
            .await
    }

    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read a resource; `None` means it no longer exists.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Read a resource that is expected to exist.
    pub async fn read_existing(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.read(resource_type, current_state).await?.ok_or_else(|| {
            ProviderError::NotFound(format!("{} no longer exists after refresh", resource_type))
        })
    }

    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Import by ID and return the state of the single imported resource.
    pub async fn import(&self, resource_type: &str, id: &str) -> Result<Value, ProviderError> {
        let mut imported = self.import_resource(resource_type, id).await?;
        match imported.len() {
            1 => Ok(imported.remove(0).state),
            n => Err(ProviderError::Internal(format!(
                "expected one imported resource, got {}",
                n
            ))),
        }
    }

    pub async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .upgrade_resource_state(resource_type, version, state)
            .await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// plan → create → read. Returns the refreshed state.
    pub async fn lifecycle_create(&self, resource_type: &str, config: Value) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read_existing(resource_type, created).await
    }

    /// plan → update → read. Returns the refreshed state.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read_existing(resource_type, updated).await
    }

    /// plan → delete.
    pub async fn lifecycle_delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone()).await?;
        self.delete(resource_type, current_state).await
    }

    /// create → update → delete. Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// Failure of a harness call that reports through diagnostics.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("{}", format_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("Operation failed with {} diagnostic(s):", diagnostics.len());
    for diag in diagnostics {
        out.push_str(&format!("\n  [{:?}] {}", diag.severity, diag.summary));
        if let Some(detail) = &diag.detail {
            out.push_str(&format!(": {}", detail));
        }
        if let Some(attr) = &diag.attribute {
            out.push_str(&format!(" (at {})", attr));
        }
    }
    out
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        plan.has_changes(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        !plan.has_changes(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        changed_paths(plan)
    );
}

/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not. Changed attributes: {:?}",
        changed_paths(plan)
    );
}

/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// # Panics
///
/// Panics if the plan does not change `path`.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        changed_paths(plan)
    );
}

/// # Panics
///
/// Panics if the plan changes `path`.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        !plan.changes.iter().any(|c| c.path == path),
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

fn changed_paths(plan: &PlanResult) -> Vec<&str> {
    plan.changes.iter().map(|c| c.path.as_str()).collect()
}

/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// # Panics
///
/// Panics if no error diagnostic has `substring` in its summary or detail.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let matches = diagnostics.iter().any(|d| {
        d.severity == DiagnosticSeverity::Error
            && (d.summary.contains(substring)
                || d.detail.as_deref().is_some_and(|detail| detail.contains(substring)))
    });
    assert!(
        matches,
        "Expected an error containing '{}'. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_change;
    use crate::schema::{Attribute, Schema};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Keeps notes in memory, keyed by handle.
    #[derive(Default)]
    struct NotesProvider {
        notes: Mutex<HashMap<String, Value>>,
    }

    fn note_schema() -> Schema {
        Schema::v0()
            .with_attribute("handle", Attribute::required_string().with_force_new())
            .with_attribute("body", Attribute::optional_string())
            .with_attribute("note_id", Attribute::computed_string())
    }

    #[async_trait::async_trait]
    impl ProviderService for NotesProvider {
        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new().with_resource("notes_note", note_schema())
        }

        async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            if config.get("token").is_none() {
                return Ok(vec![Diagnostic::error("token is required").with_attribute("token")]);
            }
            Ok(vec![])
        }

        async fn plan(
            &self,
            _resource_type: &str,
            prior_state: Option<Value>,
            proposed_state: Value,
            _config: Value,
        ) -> Result<PlanResult, ProviderError> {
            plan_change(&note_schema(), prior_state, proposed_state)
        }

        async fn create(&self, _resource_type: &str, mut planned: Value) -> Result<Value, ProviderError> {
            let handle = planned["handle"].as_str().unwrap_or_default().to_string();
            planned["note_id"] = json!(format!("n_{}", handle));
            self.notes.lock().unwrap().insert(handle, planned.clone());
            Ok(planned)
        }

        async fn read(&self, _resource_type: &str, current: Value) -> Result<Option<Value>, ProviderError> {
            let handle = current["handle"].as_str().unwrap_or_default();
            Ok(self.notes.lock().unwrap().get(handle).cloned())
        }

        async fn update(&self, _resource_type: &str, _prior: Value, planned: Value) -> Result<Value, ProviderError> {
            let handle = planned["handle"].as_str().unwrap_or_default().to_string();
            self.notes.lock().unwrap().insert(handle, planned.clone());
            Ok(planned)
        }

        async fn delete(&self, _resource_type: &str, current: Value) -> Result<(), ProviderError> {
            let handle = current["handle"].as_str().unwrap_or_default();
            self.notes.lock().unwrap().remove(handle);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_configure_reports_diagnostics() {
        let tester = ProviderTester::new(NotesProvider::default());
        assert!(tester.configure(json!({"token": "t"})).await.is_ok());

        let err = tester.configure(json!({})).await.unwrap_err();
        assert!(matches!(err, TestError::Diagnostics(ref d) if d.len() == 1));
        assert!(err.to_string().contains("token is required"));
    }

    #[tokio::test]
    async fn test_metadata() {
        let tester = ProviderTester::new(NotesProvider::default());
        assert_eq!(tester.resource_types(), vec!["notes_note".to_string()]);
        assert!(tester.data_source_types().is_empty());
    }

    #[tokio::test]
    async fn test_plan_helpers() {
        let tester = ProviderTester::new(NotesProvider::default());
        let plan = tester
            .plan_create("notes_note", json!({"handle": "todo"}))
            .await
            .unwrap();
        assert_plan_creates(&plan);

        let prior = json!({"handle": "todo", "body": "a", "note_id": "n_todo"});
        let plan = tester
            .plan_update("notes_note", prior.clone(), json!({"handle": "todo", "body": "b"}))
            .await
            .unwrap();
        assert_plan_changes_attribute(&plan, "body");
        assert_plan_does_not_change_attribute(&plan, "note_id");
        assert_plan_updates_in_place(&plan);

        let plan = tester
            .plan_update("notes_note", prior.clone(), json!({"handle": "done", "body": "a"}))
            .await
            .unwrap();
        assert_plan_replaces(&plan);

        let plan = tester.plan_update("notes_note", prior.clone(), prior).await.unwrap();
        assert_plan_no_changes(&plan);
    }

    #[tokio::test]
    async fn test_lifecycle_crud() {
        let tester = ProviderTester::new(NotesProvider::default());
        let updated = tester
            .lifecycle_crud(
                "notes_note",
                json!({"handle": "todo", "body": "draft"}),
                json!({"handle": "todo", "body": "final"}),
            )
            .await
            .unwrap();

        assert_eq!(updated["body"], "final");
        assert_eq!(updated["note_id"], "n_todo");
        assert!(tester
            .read("notes_note", json!({"handle": "todo"}))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_read_existing_fails_when_gone() {
        let tester = ProviderTester::new(NotesProvider::default());
        let err = tester
            .read_existing("notes_note", json!({"handle": "missing"}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_import_unsupported_by_default() {
        let tester = ProviderTester::new(NotesProvider::default());
        assert!(tester.import("notes_note", "todo").await.is_err());
    }

    #[test]
    fn test_diagnostic_assertions() {
        assert_no_errors(&[Diagnostic::warning("Just a warning")]);
        assert_error_contains(
            &[Diagnostic::error("Invalid role").with_detail("expected member or owner")],
            "member or owner",
        );
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("An error")]);
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("First error").with_attribute("handle"),
            Diagnostic::error("Second error").with_detail("More info"),
        ]);

        let display = err.to_string();
        assert!(display.contains("2 diagnostic(s)"));
        assert!(display.contains("(at handle)"));
        assert!(display.contains("Second error: More info"));
    }
}
