//! `homedash watch` — run the scheduler and print updates as they land.

use std::future;

use chrono::Local;

use homedash_core::Engine;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::status;
use crate::error::CliError;
use crate::output;

pub async fn handle(engine: &Engine, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    engine.start().await.map_err(CliError::from)?;

    let mut changes = engine.subscribe_changes();
    // The engine bumps the version once per completed fetch; coalesced
    // wakeups are fine since we re-render the whole snapshot anyway.
    changes.mark_unchanged();

    let deadline = async {
        match args.duration {
            Some(d) => tokio::time::sleep(d).await,
            None => future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = &mut deadline => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if !global.quiet {
                    println!("-- {}", Local::now().format("%H:%M:%S"));
                }
                let out = status::render_summary(&engine.snapshot(), global);
                output::print_output(&out, global.quiet);
            }
        }
    }

    engine.stop().await.map_err(CliError::from)?;
    Ok(())
}
