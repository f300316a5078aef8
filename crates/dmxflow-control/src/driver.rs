//! Single-threaded event loop
//!
//! Interleaves user commands with the scheduler's deadlines. Must run on a
//! current-thread runtime: frame mutation and transmission are never
//! concurrent because everything happens in this one task.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::session::{Command, Session};

/// Drive `session` until a [`Command::Shutdown`] arrives or the command
/// channel closes.
///
/// After every command the resulting status line is sent on `status`. The
/// session is shut down (activities stopped, link closed) and returned.
pub async fn run(
    mut session: Session,
    mut commands: mpsc::Receiver<Command>,
    status: mpsc::UnboundedSender<String>,
) -> Session {
    loop {
        let deadline = session.next_deadline();

        tokio::select! {
            cmd = commands.recv() => {
                match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => {
                        // The failure is already in the status line
                        if let Err(e) = session.execute(cmd) {
                            tracing::debug!("Command failed: {}", e);
                        }
                        // Receiver gone just means nobody is listening
                        let _ = status.send(session.status().to_string());
                    }
                }
            }
            _ = wait_for(deadline) => {
                session.tick(Instant::now());
            }
        }
    }

    session.shutdown();
    session
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
