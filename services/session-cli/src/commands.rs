use anyhow::bail;
use tracing::info;
use vc_chain_client::WalletProvider;
use vc_session_core::{SessionController, SessionError};

use crate::Command;

/// Connect, then run one command. Any failure surfaces its user-facing
/// message so the process exits non-zero with something readable.
pub(crate) async fn run<P: WalletProvider>(
    controller: &SessionController<P>,
    command: &Command,
) -> anyhow::Result<()> {
    controller.connect().await.or_else(report)?;

    // connect already fetched the value; an initial read failure lands in last_error
    if let Some(err) = controller.snapshot().last_error {
        if matches!(command, Command::Status | Command::Read) {
            return report(err);
        }
    }

    match command {
        Command::Status => {}
        Command::Read => {
            if let Some(value) = controller.snapshot().current_value {
                info!("stored number is {value}");
            }
        }
        Command::Write { value } => {
            controller.set_input(value);
            let stored = controller.submit_input().await.or_else(report)?;
            info!("stored number set to {stored}");
        }
    }
    Ok(())
}

fn report<T>(err: SessionError) -> anyhow::Result<T> {
    bail!("{} ({err})", err.user_message())
}
