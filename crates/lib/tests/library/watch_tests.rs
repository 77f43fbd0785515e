use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cordbuild_lib::watch::{BuildRunner, WatchCoordinator, WatchHandle, WatchOptions, WatchState};
use tokio::sync::Semaphore;

/// A build that finishes only when the test releases it.
struct ControlledBuild {
  started: AtomicUsize,
  in_flight: AtomicUsize,
  overlapped: AtomicUsize,
  release: Semaphore,
}

impl ControlledBuild {
  fn new() -> Arc<Self> {
    Arc::new(Self {
      started: AtomicUsize::new(0),
      in_flight: AtomicUsize::new(0),
      overlapped: AtomicUsize::new(0),
      release: Semaphore::new(0),
    })
  }

  fn started(&self) -> usize {
    self.started.load(Ordering::SeqCst)
  }

  fn finish_one(&self) {
    self.release.add_permits(1);
  }
}

#[async_trait]
impl BuildRunner for ControlledBuild {
  async fn run_build(&self) {
    self.started.fetch_add(1, Ordering::SeqCst);
    if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
      self.overlapped.fetch_add(1, Ordering::SeqCst);
    }
    if let Ok(permit) = self.release.acquire().await {
      permit.forget();
    }
    self.in_flight.fetch_sub(1, Ordering::SeqCst);
  }
}

async fn reach(handle: &WatchHandle, state: WatchState) {
  handle.subscribe().wait_for(|s| *s == state).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn three_changes_during_a_build_cause_one_more_build() {
  let build = ControlledBuild::new();
  let handle = WatchCoordinator::spawn(
    "x",
    build.clone(),
    WatchOptions {
      debounce: Duration::from_millis(50),
      skip_initial_build: false,
    },
  );
  reach(&handle, WatchState::Building).await;
  tokio::time::sleep(Duration::from_millis(1)).await;
  assert_eq!(build.started(), 1);

  handle.notify_change();
  tokio::time::sleep(Duration::from_millis(10)).await;
  handle.notify_change();
  tokio::time::sleep(Duration::from_millis(100)).await;
  handle.notify_change();
  reach(&handle, WatchState::BuildingWithPendingChange).await;
  assert_eq!(build.started(), 1);

  build.finish_one();
  reach(&handle, WatchState::Building).await;
  tokio::time::sleep(Duration::from_millis(1)).await;
  assert_eq!(build.started(), 2);

  build.finish_one();
  reach(&handle, WatchState::Idle).await;
  tokio::time::sleep(Duration::from_secs(1)).await;

  assert_eq!(build.started(), 2);
  assert_eq!(build.overlapped.load(Ordering::SeqCst), 0);
  assert_eq!(handle.state(), WatchState::Idle);
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_build_separately() {
  let build = ControlledBuild::new();
  let handle = WatchCoordinator::spawn(
    "x",
    build.clone(),
    WatchOptions {
      debounce: Duration::from_millis(50),
      skip_initial_build: true,
    },
  );

  handle.notify_change();
  reach(&handle, WatchState::Building).await;
  build.finish_one();
  reach(&handle, WatchState::Idle).await;

  handle.notify_change();
  handle.notify_change();
  reach(&handle, WatchState::Building).await;
  build.finish_one();
  reach(&handle, WatchState::Idle).await;

  assert_eq!(build.started(), 2);
}
