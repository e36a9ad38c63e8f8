use docrelay_core::descriptor::ServiceDescriptor;
use docrelay_dispatch::PollConfig;

/// Worker configuration loaded from environment variables.
///
/// The service profile describes one target document service; the poll
/// settings bound asynchronous completion detection.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Input to process: a file, a directory, or a document URL.
    pub input: String,
    /// Optional instruction text sent with every job.
    pub prompt: Option<String>,
    /// Directory backing the local webhook mailbox.
    pub mailbox_dir: String,
    /// Target service profile.
    pub descriptor: ServiceDescriptor,
    /// Poll interval / timeout budget.
    pub poll: PollConfig,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default       |
    /// |-----------------------|---------------|
    /// | `INPUT_PATH`          | *(required)*  |
    /// | `PROMPT`              | *(none)*      |
    /// | `MAILBOX_DIR`         | `./mailbox`   |
    /// | `SERVICE_NAME`        | `Extract`     |
    /// | `SERVICE_ENDPOINT`    | *(required)*  |
    /// | `SERVICE_ORG_ID`      | *(required)*  |
    /// | `SERVICE_AUTH_KEY`    | *(required)*  |
    /// | `SERVICE_WEBHOOK_URL` | *(required)*  |
    /// | `SERVICE_ASYNC`       | `true`        |
    /// | `SERVICE_SETTINGS`    | *(none)*      |
    /// | `POLL_INTERVAL_SECS`  | `5`           |
    /// | `TIMEOUT_BUDGET_SECS` | `300`         |
    pub fn from_env() -> Self {
        let input = std::env::var("INPUT_PATH").expect("INPUT_PATH must be set");
        let prompt = std::env::var("PROMPT").ok().filter(|p| !p.is_empty());
        let mailbox_dir =
            std::env::var("MAILBOX_DIR").unwrap_or_else(|_| "./mailbox".into());

        let name = std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Extract".into());
        let endpoint =
            std::env::var("SERVICE_ENDPOINT").expect("SERVICE_ENDPOINT must be set");
        let org_id = std::env::var("SERVICE_ORG_ID").expect("SERVICE_ORG_ID must be set");
        let auth_key =
            std::env::var("SERVICE_AUTH_KEY").expect("SERVICE_AUTH_KEY must be set");
        let webhook_url =
            std::env::var("SERVICE_WEBHOOK_URL").expect("SERVICE_WEBHOOK_URL must be set");
        let is_async: bool = std::env::var("SERVICE_ASYNC")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SERVICE_ASYNC must be true or false");

        let mut descriptor =
            ServiceDescriptor::new(name, endpoint, org_id, auth_key, webhook_url, is_async);
        if let Ok(raw) = std::env::var("SERVICE_SETTINGS") {
            let settings: serde_json::Value =
                serde_json::from_str(&raw).expect("SERVICE_SETTINGS must be valid JSON");
            descriptor = descriptor.with_settings(settings);
        }
        descriptor
            .validate()
            .expect("service profile failed validation");

        Self {
            input,
            prompt,
            mailbox_dir,
            descriptor,
            poll: PollConfig::from_env(),
        }
    }
}
