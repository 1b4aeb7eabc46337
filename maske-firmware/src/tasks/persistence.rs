// Persistenz Task - schreibt Snapshots in den Flash-Sektor
//
// Einziger Besitzer des Flash nach dem Start. Flash-Schreibzugriffe
// blockieren einige Millisekunden, deshalb laufen sie nicht im Render-Task.
use defmt::{error, info};
use maske_core::persistence;

use crate::hal::FlashKvStorage;
use crate::{CommitReceiver, SharedController, now_ms};

#[embassy_executor::task]
pub async fn persistence_task(
    mut storage: FlashKvStorage<'static>,
    controller: &'static SharedController,
    commit_receiver: CommitReceiver,
) {
    info!("Persist: Task started");

    loop {
        let job = commit_receiver.receive().await;

        let result = persistence::save(&mut storage, &job.strips);
        match result {
            Ok(()) => info!("Persist: Settings committed"),
            Err(e) => error!("Persist: Commit failed: {}, will retry", e),
        }

        let now = now_ms();
        controller.lock(|cell| cell.borrow_mut().scheduler.finish(job.ticket, result, now));
    }
}
