// ── Task record ──
//
// Wraps one inbound request: validates its identity (self link and block
// id), extracts typed input properties, and reports state transitions to
// the block's self link through a `TaskReporter`.

pub mod block;
pub mod properties;

use std::fmt;
use std::sync::Arc;

use bigip_api::BasicCredential;
use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;
use crate::reporter::TaskReporter;

pub use block::{Block, BlockState, Property, ReportedBlock, TaskReport, TaskRequest};
pub use properties::{
    DeviceReference, DnsProperties, InputProperties, LicenseProperties, NtpProperties,
    SyslogProperties,
};

const MISSING_SELF_LINK: &str =
    "The request does not contain a body, or the body is missing a selfLink.";
const MISSING_BLOCK_ID: &str =
    "The request body does not contain a block, or the block is missing an id.";

/// An inbound create or delete call.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    /// Raw JSON body. `Value::Null` stands for a missing body.
    pub body: Value,
    /// Basic-auth credential the call arrived with, forwarded to local
    /// device calls.
    pub credential: Option<BasicCredential>,
}

impl InboundRequest {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            credential: None,
        }
    }

    #[must_use]
    pub fn with_credential(mut self, credential: BasicCredential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// One block being provisioned (or released).
#[derive(Clone)]
pub struct Task {
    id: String,
    self_link: String,
    block: Block,
    input: Option<InputProperties>,
    credential: Option<BasicCredential>,
    reporter: Arc<dyn TaskReporter>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("self_link", &self.self_link)
            .field("state", &self.block.state)
            .finish_non_exhaustive()
    }
}

impl Task {
    /// Build a task from a create request.
    ///
    /// Fails with [`CoreError::Validation`] when the self link, the block
    /// id, any required input property, or the device reference link is
    /// missing.
    pub fn for_create(
        request: InboundRequest,
        reporter: Arc<dyn TaskReporter>,
    ) -> Result<Self, CoreError> {
        let mut task = Self::identify(request, reporter)?;
        task.input = Some(InputProperties::from_properties(
            &task.block.input_properties,
        )?);
        Ok(task)
    }

    /// Build a task from a delete request. Only identity is validated.
    pub fn for_delete(
        request: InboundRequest,
        reporter: Arc<dyn TaskReporter>,
    ) -> Result<Self, CoreError> {
        Self::identify(request, reporter)
    }

    fn identify(request: InboundRequest, reporter: Arc<dyn TaskReporter>) -> Result<Self, CoreError> {
        if request.body.is_null() {
            return Err(CoreError::validation(MISSING_SELF_LINK));
        }
        let parsed: TaskRequest = serde_json::from_value(request.body)
            .map_err(|e| CoreError::validation(format!("Malformed request body: {e}")))?;

        let self_link = parsed
            .self_link
            .filter(|l| !l.is_empty())
            .ok_or_else(|| CoreError::validation(MISSING_SELF_LINK))?;
        let block = parsed
            .block
            .filter(|b| b.id.as_deref().is_some_and(|id| !id.is_empty()))
            .ok_or_else(|| CoreError::validation(MISSING_BLOCK_ID))?;

        Ok(Self {
            id: block.id.clone().unwrap_or_default(),
            self_link,
            block,
            input: None,
            credential: request.credential,
            reporter,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Typed input properties. Always present on tasks built for create.
    pub fn input(&self) -> Option<&InputProperties> {
        self.input.as_ref()
    }

    pub fn credential(&self) -> Option<&BasicCredential> {
        self.credential.as_ref()
    }

    /// Replace the block's input property values with `props`.
    pub fn apply_properties(&mut self, props: &InputProperties) {
        props.write_to(&mut self.block.input_properties);
        self.input = Some(props.clone());
    }

    // ── State reporting ──────────────────────────────────────────────

    /// Report BOUND with `props` as the finalized input properties.
    pub fn report_bound(&mut self, props: &InputProperties) {
        self.apply_properties(props);
        self.report(BlockState::Bound, None);
    }

    /// Report ERROR with the error's message, keeping the current
    /// properties. `include_detail` appends the error's debug form.
    pub fn report_error(&mut self, error: &CoreError, include_detail: bool) {
        let mut message = error.to_string();
        if include_detail {
            message.push_str(&format!("\n    Error detail:\n{error:?}"));
        }
        self.report(BlockState::Error, Some(message));
    }

    /// Report UNBOUND, whatever the current state.
    pub fn report_unbound(&mut self) {
        self.report(BlockState::Unbound, None);
    }

    fn report(&mut self, state: BlockState, error: Option<String>) {
        debug!(task_id = %self.id, %state, "reporting task state");
        self.block.state = Some(state.to_string());
        let report = TaskReport::new(state, error, &self.block);
        self.reporter.report(&self.self_link, report);
    }
}
