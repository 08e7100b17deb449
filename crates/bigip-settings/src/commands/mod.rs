//! Command handlers and the session they share.

pub mod apply;
pub mod config_cmd;
pub mod delete;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Value, json};

use bigip_api::BasicCredential;
use bigip_config::Config;
use bigip_core::{HttpTaskReporter, InboundRequest, MemoryReporter, Orchestrator, TaskReporter};

use crate::cli::{GlobalOpts, ReportTarget};
use crate::error::CliError;

/// Load config and fold the global flag overrides in.
pub fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = bigip_config::load_config(global.config.as_deref())?;
    if let Some(ref url) = global.local_url {
        cfg.local_url.clone_from(url);
    }
    if let Some(ref user) = global.user {
        cfg.username = Some(user.clone());
    }
    if global.insecure {
        cfg.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(cfg)
}

/// Everything one request needs: the orchestrator, the caller's
/// credential and the report sink.
pub struct Session {
    pub orchestrator: Orchestrator,
    pub credential: Option<BasicCredential>,
    sink: ReportSink,
}

enum ReportSink {
    Device(HttpTaskReporter),
    Stdout(Arc<MemoryReporter>),
}

impl Session {
    pub fn open(cfg: &Config, target: ReportTarget) -> Result<Self, CliError> {
        let credential = bigip_config::resolve_credential(cfg)?;
        let orchestrator_config = bigip_config::to_orchestrator_config(cfg)?;
        let ctx = orchestrator_config.proxy_context()?;

        let sink = match target {
            ReportTarget::Device => ReportSink::Device(HttpTaskReporter::new(
                ctx.http().clone(),
                ctx.local_base_url().clone(),
                ctx.referrer().clone(),
            )),
            ReportTarget::Stdout => ReportSink::Stdout(Arc::default()),
        };
        let reporter: Arc<dyn TaskReporter> = match &sink {
            ReportSink::Device(reporter) => Arc::new(reporter.clone()),
            ReportSink::Stdout(reporter) => reporter.clone(),
        };

        Ok(Self {
            orchestrator: Orchestrator::from_parts(ctx, reporter, &orchestrator_config),
            credential,
            sink,
        })
    }

    /// Wrap a request body with this session's credential.
    pub fn request(&self, body: Value) -> InboundRequest {
        InboundRequest {
            body,
            credential: self.credential.clone(),
        }
    }

    /// Wait for report delivery, or print the collected reports.
    pub async fn finish(self) -> Result<(), CliError> {
        match self.sink {
            ReportSink::Device(reporter) => reporter.flush().await,
            ReportSink::Stdout(reporter) => {
                for (self_link, report) in reporter.reports() {
                    let line = json!({ "selfLink": self_link, "report": report });
                    println!("{}", serde_json::to_string(&line)?);
                }
            }
        }
        Ok(())
    }
}

/// Read a request body from `path`, or stdin for `-`.
///
/// An empty file stands for a missing body.
pub fn read_request(path: &Path) -> Result<Value, CliError> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::RequestFile {
            path: path.display().to_string(),
            source,
        })?
    };

    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&raw)?)
}
