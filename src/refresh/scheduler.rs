use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::DashError;
use crate::refresh::Refresher;

/// Refresca una vez al inicio y luego cada `every`.
///
/// Las conversiones corren en el pool bloqueante; si un tick encuentra un
/// refresco en curso, se omite.
pub fn spawn_scheduler(refresher: Arc<Refresher>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("scheduler started, interval {:?}", every);
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // el primer tick se completa de inmediato
            ticker.tick().await;
            let r = Arc::clone(&refresher);
            match tokio::task::spawn_blocking(move || r.refresh()).await {
                Ok(Ok(_)) => {}
                Ok(Err(DashError::RefreshInProgress)) => info!("scheduled refresh skipped: one is already running"),
                // el refresher ya lo registró
                Ok(Err(_)) => {}
                Err(e) => warn!("scheduled refresh task panicked: {}", e),
            }
        }
    })
}
