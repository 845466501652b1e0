//! Bounded fan-out of certificate fetches.
//!
//! One tokio task per URL, at most `threads` of them alive at once. Each task
//! owns a semaphore permit for its whole lifetime and sends its outcome down
//! a single channel. The channel closes once every task has finished, which
//! is how the result sink learns the run is over.

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::OwnedSemaphorePermit;
use tokio::task::JoinHandle;

use crate::app::clean_url;
use crate::config::OUTCOME_CHANNEL_CAPACITY;
use crate::error_handling::FetchError;
use crate::fetch::fetch_certificate;
use crate::initialization::init_semaphore;
use crate::models::FetchOutcome;
use crate::tls::CertTransport;

/// Creates the outcome channel shared by all fetch tasks and the sink.
pub fn outcome_channel() -> (Sender<FetchOutcome>, Receiver<FetchOutcome>) {
    mpsc::channel(OUTCOME_CHANNEL_CAPACITY)
}

/// Runs [`dispatch`] on its own task so the caller can drain the receiver
/// concurrently.
pub fn spawn_dispatcher<T>(
    urls: Vec<String>,
    threads: usize,
    transport: Arc<T>,
    sender: Sender<FetchOutcome>,
) -> JoinHandle<()>
where
    T: CertTransport,
{
    tokio::spawn(dispatch(urls, threads, transport, sender))
}

/// Launches one fetch task per URL, never more than `threads` at a time.
///
/// Blocks on the permit pool when it is saturated, then waits for every
/// launched task before returning. `sender` is dropped on return, so the
/// channel closes once the last task's clone goes away. A task that panics
/// is reported as a failed outcome for its URL.
///
/// A `threads` of zero is treated as one.
pub async fn dispatch<T>(
    urls: Vec<String>,
    threads: usize,
    transport: Arc<T>,
    sender: Sender<FetchOutcome>,
) where
    T: CertTransport,
{
    let semaphore = init_semaphore(threads.max(1));
    let mut tasks = FuturesUnordered::new();

    debug!("Dispatching {} URL(s) with {} permit(s)", urls.len(), threads.max(1));

    for raw in urls {
        let url = clean_url(&raw);

        // Acquire only fails on a closed pool, and this one is never closed
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            continue;
        };

        let handle = tokio::spawn(process_url_task(
            url.clone(),
            Arc::clone(&transport),
            sender.clone(),
            permit,
        ));
        tasks.push(async move { (url, handle.await) });
    }

    while let Some((url, task_result)) = tasks.next().await {
        if let Err(join_error) = task_result {
            warn!("Task for {url} panicked: {join_error}");
            let error = FetchError::TaskFailed(join_error.to_string());
            send_outcome(&sender, FetchOutcome::Failed { url, error }).await;
        }
    }

    debug!("All fetch tasks finished");
}

/// Fetches one URL and forwards the outcome. The permit drops on return.
async fn process_url_task<T>(
    url: String,
    transport: Arc<T>,
    sender: Sender<FetchOutcome>,
    _permit: OwnedSemaphorePermit,
) where
    T: CertTransport,
{
    let outcome = match fetch_certificate(&url, transport.as_ref()).await {
        Ok(Some(record)) => FetchOutcome::Record(record),
        Ok(None) => return,
        Err(error) => FetchOutcome::Failed { url, error },
    };
    send_outcome(&sender, outcome).await;
}

async fn send_outcome(sender: &Sender<FetchOutcome>, outcome: FetchOutcome) {
    if sender.send(outcome).await.is_err() {
        warn!("Result sink closed, dropping outcome");
    }
}
