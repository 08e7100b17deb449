//! `delete`: release a block.

use super::{Session, effective_config, read_request};
use crate::cli::{GlobalOpts, RequestArgs};
use crate::error::CliError;

pub async fn handle(args: RequestArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = effective_config(global)?;
    let body = read_request(&args.file)?;
    let session = Session::open(&cfg, args.report)?;

    let accepted = session.orchestrator.handle_delete(session.request(body))?;
    let task_id = accepted.task_id().to_owned();
    let outcome = accepted.completion().await?;
    session.finish().await?;

    eprintln!("Task {task_id} {}", outcome.state);
    Ok(())
}
