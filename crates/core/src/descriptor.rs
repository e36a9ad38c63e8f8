//! Service descriptors: static configuration for one target service variant.
//!
//! Every provider the engine can talk to is one [`ServiceDescriptor`]
//! instance — same type, different configuration. The descriptor owns the
//! payload construction for its provider; the dispatch layer never needs
//! provider-specific code paths.

use base64::Engine;

use crate::error::CoreError;
use crate::job::{Job, SourceRef};

/// Static definition of one target document service.
///
/// Immutable after construction; workers receive clones and never mutate
/// them. The completion protocol is selected by [`is_async`]: synchronous
/// services return the full result in the dispatch response, asynchronous
/// services deliver it later through the shared object store.
///
/// [`is_async`]: ServiceDescriptor::is_async
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Short service name, used in correlation ids and result file names.
    pub name: String,
    /// HTTP endpoint the dispatch POST is sent to.
    pub endpoint: String,
    /// `orgId` header value.
    pub org_id: String,
    /// `authKey` header value.
    pub auth_key: String,
    /// Base callback URL the provider reports async completion to. The
    /// per-job correlation id is appended as the `filename` parameter.
    pub webhook_url: String,
    /// Whether completion is asynchronous (poll the object store) or
    /// synchronous (result in the dispatch response body).
    pub is_async: bool,
    /// Optional provider-specific settings object merged into the payload.
    pub settings: Option<serde_json::Value>,
}

impl ServiceDescriptor {
    /// Create a descriptor with no provider-specific settings.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        org_id: impl Into<String>,
        auth_key: impl Into<String>,
        webhook_url: impl Into<String>,
        is_async: bool,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            org_id: org_id.into(),
            auth_key: auth_key.into(),
            webhook_url: webhook_url.into(),
            is_async,
            settings: None,
        }
    }

    /// Attach a provider-specific settings object.
    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Validate the static configuration.
    ///
    /// Rules:
    /// - `name` must not be empty.
    /// - `endpoint` must start with `http://` or `https://`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Service name must not be empty".to_string(),
            ));
        }
        let endpoint = self.endpoint.trim();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(CoreError::Validation(format!(
                "Service endpoint must start with http:// or https://, got: '{endpoint}'"
            )));
        }
        Ok(())
    }

    /// Callback URL for one job: the webhook base parameterized with the
    /// job's correlation id, so the provider's delivery writes a blob of
    /// exactly that name into the shared store.
    fn callback_url(&self, job: &Job) -> String {
        format!("{}?filename={}", self.webhook_url, job.correlation_id)
    }

    /// Build the provider-specific request body for one job.
    ///
    /// Pure with respect to the job: nothing on the job or the descriptor
    /// is mutated. Local sources are embedded base64; URL sources are
    /// passed through as `inputURL`. Fails with
    /// [`CoreError::InvalidJobState`] when the job has no source set.
    pub fn build_payload(&self, job: &Job) -> Result<serde_json::Value, CoreError> {
        if job.source.is_empty() {
            return Err(CoreError::InvalidJobState(
                "no source file or URL set".to_string(),
            ));
        }

        let callback = self.callback_url(job);
        let mut payload = serde_json::json!({
            "outputUrl": callback,
            "webhook": callback,
            "question": job.prompt.as_deref().unwrap_or(""),
        });

        if let Some(settings) = &self.settings {
            payload["settings"] = settings.clone();
        }

        match &job.source {
            SourceRef::Url(url) => {
                payload["inputURL"] = serde_json::Value::String(url.clone());
            }
            SourceRef::Path(path) => {
                let bytes = std::fs::read(path)?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                payload["base64"] = serde_json::Value::String(encoded);
            }
        }

        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    fn descriptor(is_async: bool) -> ServiceDescriptor {
        ServiceDescriptor::new(
            "Extract",
            "https://api.example.com/extract",
            "org-1",
            "key-1",
            "https://hooks.example.com/incoming",
            is_async,
        )
    }

    #[test]
    fn payload_embeds_correlation_id_in_callback() {
        let job = Job::new(SourceRef::parse("https://cdn.example.com/a.pdf"), "Extract", None);
        let payload = descriptor(true).build_payload(&job).unwrap();

        let expected = format!(
            "https://hooks.example.com/incoming?filename={}",
            job.correlation_id
        );
        assert_eq!(payload["outputUrl"], expected.as_str());
        assert_eq!(payload["webhook"], expected.as_str());
    }

    #[test]
    fn url_source_is_passed_through() {
        let job = Job::new(SourceRef::parse("https://cdn.example.com/a.pdf"), "Extract", None);
        let payload = descriptor(false).build_payload(&job).unwrap();

        assert_eq!(payload["inputURL"], "https://cdn.example.com/a.pdf");
        assert!(payload.get("base64").is_none());
    }

    #[test]
    fn local_source_is_embedded_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-fake").unwrap();

        let job = Job::new(SourceRef::Path(path), "Extract", None);
        let payload = descriptor(false).build_payload(&job).unwrap();

        let encoded = payload["base64"].as_str().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(decoded, b"%PDF-fake");
        assert!(payload.get("inputURL").is_none());
    }

    #[test]
    fn prompt_and_settings_are_merged() {
        let job = Job::new(
            SourceRef::parse("https://cdn.example.com/a.pdf"),
            "Extract",
            Some("What is the total?"),
        );
        let payload = descriptor(true)
            .with_settings(serde_json::json!({"returnConfidence": true}))
            .build_payload(&job)
            .unwrap();

        assert_eq!(payload["question"], "What is the total?");
        assert_eq!(payload["settings"]["returnConfidence"], true);
    }

    #[test]
    fn missing_prompt_becomes_empty_question() {
        let job = Job::new(SourceRef::parse("https://cdn.example.com/a.pdf"), "Extract", None);
        let payload = descriptor(true).build_payload(&job).unwrap();
        assert_eq!(payload["question"], "");
    }

    #[test]
    fn empty_source_is_invalid_job_state() {
        let job = Job::new(SourceRef::Path(PathBuf::new()), "Extract", None);
        let err = descriptor(false).build_payload(&job).unwrap_err();
        assert_matches!(err, CoreError::InvalidJobState(_));
    }

    #[test]
    fn missing_local_file_is_io_error() {
        let job = Job::new(SourceRef::parse("/definitely/not/here.pdf"), "Extract", None);
        let err = descriptor(false).build_payload(&job).unwrap_err();
        assert_matches!(err, CoreError::Io(_));
    }

    #[test]
    fn validate_rejects_bad_endpoint_and_empty_name() {
        let mut d = descriptor(false);
        d.endpoint = "ftp://api.example.com".to_string();
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));

        let mut d = descriptor(false);
        d.name = "  ".to_string();
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));

        assert!(descriptor(true).validate().is_ok());
    }
}
