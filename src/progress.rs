use crate::engine::format_rate;
use crate::types::Progress;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Print one stderr line per progress update until the engine is dropped.
pub fn spawn_progress_printer(mut progress_rx: watch::Receiver<Progress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let progress = progress_rx.borrow_and_update().clone();
            if let Some(line) = render(&progress) {
                eprintln!("{}", line);
            }
        }
    })
}

fn render(progress: &Progress) -> Option<String> {
    match progress {
        Progress::Idle | Progress::Finished => None,
        Progress::LoadBatch {
            second,
            total_seconds,
            sent,
            failed,
        } => Some(format!(
            "[LOAD] {:>3}/{}s  sent {:>6}  failed {:>6}",
            second, total_seconds, sent, failed
        )),
        Progress::StressWave {
            wave,
            concurrency,
            error_rate,
        } => Some(format!(
            "[STRESS] wave {:>3}  concurrency {:>5}  errors {:>8}",
            wave,
            concurrency,
            format_rate(*error_rate)
        )),
    }
}
