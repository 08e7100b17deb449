// bigip-core: Provisioning orchestrator between bigip-api and its front ends (CLI, worker host).

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reporter;
pub mod task;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{OrchestratorConfig, TlsVerification};
pub use error::{CoreError, EULA_REQUIRED_MESSAGE};
pub use orchestrator::{Accepted, Change, CurrentSettings, Orchestrator, Outcome, plan};
pub use reporter::{HttpTaskReporter, MemoryReporter, TaskReporter};
pub use task::{
    Block, BlockState, DeviceReference, DnsProperties, InboundRequest, InputProperties,
    LicenseProperties, NtpProperties, Property, SyslogProperties, Task, TaskReport, TaskRequest,
};
