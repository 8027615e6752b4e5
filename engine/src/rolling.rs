//! Rolling restart
//!
//! Sequential timed restart over an ordered target list: stop one
//! instance, wait for it to come back up, then move on. At most one
//! replica is ever down, which is the whole point — total duration is
//! deterministically N * (restart_time + delay).

use crate::error::{EngineError, EngineResult};
use crate::handle::RemoteProcessHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub const DEFAULT_RESTART_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_DELAY: Duration = Duration::from_secs(120);

/// Restart the given handles one at a time, in order
///
/// A transport failure on any step aborts the remaining sequence; a
/// command that merely exits non-zero is logged and the loop continues
/// to the next target.
pub async fn rolling_restart(
    handles: &[Arc<RemoteProcessHandle>],
    restart_time: Duration,
    delay: Duration,
) -> EngineResult<()> {
    if handles.is_empty() {
        return Err(EngineError::invalid_state(
            "rolling restart requires at least one target",
        ));
    }

    info!(
        targets = handles.len(),
        restart_time_secs = restart_time.as_secs(),
        delay_secs = delay.as_secs(),
        "rolling restart starting"
    );

    for handle in handles {
        info!(service = handle.service(), host = handle.host(), "rolling: stopping");
        if !handle.stop().await? {
            warn!(
                service = handle.service(),
                host = handle.host(),
                "rolling: stop exited non-zero"
            );
        }
        sleep(restart_time).await;

        info!(service = handle.service(), host = handle.host(), "rolling: starting");
        if !handle.start().await? {
            warn!(
                service = handle.service(),
                host = handle.host(),
                "rolling: start exited non-zero"
            );
        }
        sleep(delay).await;
    }

    info!(targets = handles.len(), "rolling restart finished");
    Ok(())
}
