use super::*;
use crate::router::{RoundScheduler, SchedulerConfig, SchedulerPhase};
use tokio::sync::watch;
use tokio::time::Instant;

fn scheduler(
    respond_after: Duration,
    delay: Duration,
    max_rounds: Option<u64>,
) -> (Arc<RoundScheduler>, Arc<CollectingReporter>) {
    let only = endpoint("only");
    let transport =
        Arc::new(ScriptedTransport::new(vec![(only.clone(), Behavior::Respond(respond_after))]));
    let dispatcher = Arc::new(build_dispatcher(transport, &[only], 0.05, 1));
    let reporter = Arc::new(CollectingReporter::default());
    let sink: Arc<dyn SummaryReporter> = reporter.clone();
    let config = SchedulerConfig { round_size: 10, inter_round_delay: delay, max_rounds };
    (Arc::new(RoundScheduler::new(dispatcher, sink, config)), reporter)
}

#[tokio::test(start_paused = true)]
async fn test_round_cadence_and_limit() {
    let (scheduler, reporter) =
        scheduler(Duration::from_millis(1), Duration::from_secs(20), Some(3));
    let (_tx, rx) = watch::channel(false);
    let started = Instant::now();

    let completed = scheduler.run_forever(rx).await;

    assert_eq!(completed, 3);
    // two pauses: no delay after the last round
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(40), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(41), "elapsed {elapsed:?}");

    let summaries = reporter.summaries.lock();
    let rounds: Vec<u64> = summaries.iter().map(|s| s.round).collect();
    assert_eq!(rounds, vec![1, 2, 3]);
    assert!(summaries.iter().all(|s| s.total_requests() == 10));
    assert_eq!(scheduler.phase(), SchedulerPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_pause() {
    let (scheduler, reporter) =
        scheduler(Duration::from_millis(1), Duration::from_secs(3600), None);
    let (tx, rx) = watch::channel(false);
    let mut phase = scheduler.subscribe_phase();

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_forever(rx).await })
    };

    phase.wait_for(|p| *p == SchedulerPhase::Waiting).await.unwrap();
    let before = Instant::now();
    tx.send(true).unwrap();

    assert_eq!(handle.await.unwrap(), 1);
    assert!(before.elapsed() < Duration::from_secs(1));
    assert_eq!(reporter.summaries.lock().len(), 1);
    assert_eq!(scheduler.phase(), SchedulerPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_round_finishes_round() {
    let (scheduler, reporter) =
        scheduler(Duration::from_secs(5), Duration::from_secs(60), None);
    let (tx, rx) = watch::channel(false);
    let mut phase = scheduler.subscribe_phase();

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_forever(rx).await })
    };

    phase.wait_for(|p| *p == SchedulerPhase::Dispatching).await.unwrap();
    tx.send(true).unwrap();

    assert_eq!(handle.await.unwrap(), 1);
    let summaries = reporter.summaries.lock();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_requests(), 10);
    assert_eq!(summaries[0].succeeded, 10);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_start_runs_nothing() {
    let (scheduler, reporter) =
        scheduler(Duration::from_millis(1), Duration::from_secs(20), None);
    let (_tx, rx) = watch::channel(true);

    assert_eq!(scheduler.run_forever(rx).await, 0);
    assert!(reporter.summaries.lock().is_empty());
    assert_eq!(scheduler.phase(), SchedulerPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_shutdown_sender_keeps_running() {
    let (scheduler, reporter) =
        scheduler(Duration::from_millis(1), Duration::from_secs(20), Some(2));
    let (tx, rx) = watch::channel(false);
    drop(tx);

    assert_eq!(scheduler.run_forever(rx).await, 2);
    assert_eq!(reporter.summaries.lock().len(), 2);
}

#[test]
fn test_phase_display() {
    assert_eq!(SchedulerPhase::Waiting.to_string(), "waiting");
    assert_eq!(serde_json::to_string(&SchedulerPhase::Dispatching).unwrap(), "\"dispatching\"");
}
