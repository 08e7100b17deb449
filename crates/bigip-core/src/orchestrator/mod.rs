// ── Provisioning orchestrator ──
//
// Drives one request end to end: validate and accept, resolve the device
// proxy, reset or reconcile, license, and report the terminal state.
// Every accepted request runs as its own spawned workflow; nothing is
// shared between workflows beyond the read-only proxy context.

mod diff;
mod reconcile;
mod resolve;

use std::sync::Arc;

use bigip_api::ProxyContext;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::reporter::TaskReporter;
use crate::task::{BlockState, InboundRequest, InputProperties, Task};

pub use diff::{Change, CurrentSettings, plan};

/// Terminal result of one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub state: BlockState,
    /// Message reported with an ERROR state.
    pub error: Option<String>,
    /// Input properties as last reported.
    pub properties: Option<InputProperties>,
}

/// Handle to a request that passed validation and was accepted.
#[derive(Debug)]
pub struct Accepted {
    task_id: String,
    handle: JoinHandle<Outcome>,
}

impl Accepted {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Wait for the workflow to reach its terminal state.
    pub async fn completion(self) -> Result<Outcome, CoreError> {
        self.handle
            .await
            .map_err(|e| CoreError::Internal(format!("workflow task failed: {e}")))
    }
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<OrchestratorInner>`.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    ctx: ProxyContext,
    reporter: Arc<dyn TaskReporter>,
    default_device_name: String,
    include_error_detail: bool,
}

impl Orchestrator {
    /// Create an orchestrator with a fresh HTTP client built from `config`.
    pub fn new(
        config: &OrchestratorConfig,
        reporter: Arc<dyn TaskReporter>,
    ) -> Result<Self, CoreError> {
        Ok(Self::from_parts(config.proxy_context()?, reporter, config))
    }

    /// Create an orchestrator around an existing proxy context.
    pub fn from_parts(
        ctx: ProxyContext,
        reporter: Arc<dyn TaskReporter>,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(OrchestratorInner {
                ctx,
                reporter,
                default_device_name: config.default_device_name.clone(),
                include_error_detail: config.include_error_detail,
            }),
        }
    }

    pub fn context(&self) -> &ProxyContext {
        &self.inner.ctx
    }

    // ── Request entry points ─────────────────────────────────────────

    /// Validate a create request and start provisioning.
    ///
    /// Validation failures are returned here and nothing is started. On
    /// success the workflow is already running when this returns; its
    /// outcome is reported through the task reporter.
    pub fn handle_create(&self, request: InboundRequest) -> Result<Accepted, CoreError> {
        let task = Task::for_create(request, Arc::clone(&self.inner.reporter))?;
        let task_id = task.id().to_owned();
        let span = info_span!("provision", run_id = %Uuid::new_v4(), task_id = %task_id);
        info!(parent: &span, "request accepted");

        let this = self.clone();
        let handle = tokio::spawn(async move { this.provision(task).await }.instrument(span));
        Ok(Accepted { task_id, handle })
    }

    /// Validate a delete request and report UNBOUND.
    ///
    /// No device-side teardown is performed.
    pub fn handle_delete(&self, request: InboundRequest) -> Result<Accepted, CoreError> {
        let mut task = Task::for_delete(request, Arc::clone(&self.inner.reporter))?;
        let task_id = task.id().to_owned();
        let span = info_span!("release", run_id = %Uuid::new_v4(), task_id = %task_id);

        let handle = tokio::spawn(
            async move {
                task.report_unbound();
                info!("block released");
                Outcome {
                    state: BlockState::Unbound,
                    error: None,
                    properties: None,
                }
            }
            .instrument(span),
        );
        Ok(Accepted { task_id, handle })
    }

    // ── Workflow ─────────────────────────────────────────────────────

    /// Run the workflow for an accepted task and report its outcome.
    pub async fn provision(&self, mut task: Task) -> Outcome {
        let Some(mut props) = task.input().cloned() else {
            let error = CoreError::Internal("task carries no input properties".into());
            return self.fail(&mut task, &error);
        };

        match self.run(&task, props.clone()).await {
            Ok(finalized) => {
                task.report_bound(&finalized);
                info!("provisioning complete");
                Outcome {
                    state: BlockState::Bound,
                    error: None,
                    properties: Some(finalized),
                }
            }
            Err(CoreError::EulaRequired { eula_text }) => {
                let license = props.license.get_or_insert_with(Default::default);
                license.eula_text = Some(eula_text.clone());
                license.accept_eula = false;
                task.apply_properties(&props);
                self.fail(&mut task, &CoreError::EulaRequired { eula_text })
            }
            Err(error) => self.fail(&mut task, &error),
        }
    }

    async fn run(&self, task: &Task, props: InputProperties) -> Result<InputProperties, CoreError> {
        let proxy = resolve::resolve_proxy(
            &self.inner.ctx,
            &props.device_reference,
            task.credential().cloned(),
        )
        .await?;
        info!(device = %proxy.address(), reset = props.reset_to_defaults, "device resolved");

        if props.reset_to_defaults {
            proxy.load_default_configuration().await?;
            return reconcile::read_back(&proxy, props).await;
        }

        reconcile::apply_settings(&proxy, &props, &self.inner.default_device_name).await?;
        proxy.save_configuration().await?;

        if let Some(license) = props.license.as_ref().and_then(|l| l.activation_info()) {
            let license_text = proxy.activate_license(&license).await?;
            proxy.register_license(&license_text).await?;
            info!(device = %proxy.address(), "license registered");
        }

        Ok(props)
    }

    fn fail(&self, task: &mut Task, error: &CoreError) -> Outcome {
        warn!(error = %error, "provisioning failed");
        task.report_error(error, self.inner.include_error_detail);
        Outcome {
            state: BlockState::Error,
            error: Some(error.to_string()),
            properties: task.input().cloned(),
        }
    }
}
