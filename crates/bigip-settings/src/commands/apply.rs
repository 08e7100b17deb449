//! `apply`: provision the device a block request points at.

use tracing::debug;

use bigip_core::BlockState;

use super::{Session, effective_config, read_request};
use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(args: ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = effective_config(global)?;
    if args.error_detail {
        cfg.defaults.include_error_detail = true;
    }
    let body = read_request(&args.request.file)?;
    let session = Session::open(&cfg, args.request.report)?;

    let accepted = session.orchestrator.handle_create(session.request(body))?;
    let task_id = accepted.task_id().to_owned();
    eprintln!("Accepted task {task_id}");

    let outcome = accepted.completion().await?;
    debug!(task_id = %task_id, state = %outcome.state, "workflow finished");
    session.finish().await?;

    if outcome.state == BlockState::Error {
        return Err(CliError::ProvisioningFailed {
            task_id,
            state: outcome.state.to_string(),
            message: outcome.error.unwrap_or_default(),
        });
    }
    eprintln!("Task {task_id} {}", outcome.state);
    Ok(())
}
