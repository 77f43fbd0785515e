//! Per-target watch actor.
//!
//! Each watched target gets one task owning its [`WatchState`]. File changes,
//! timer expiries and build completions all arrive on that task's queues and
//! are applied one at a time, so two builds of the same target can never
//! overlap. Builds themselves run on separate tasks and report back when done.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::watch::state::{WatchAction, WatchEvent, WatchState};

/// Runs one build of a watched target. Failures are the runner's business:
/// the watch loop continues either way.
#[async_trait]
pub trait BuildRunner: Send + Sync + 'static {
  async fn run_build(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
  /// Settle window between the first change of a burst and the build.
  pub debounce: Duration,
  /// Wait for the first change instead of building at startup.
  pub skip_initial_build: bool,
}

/// Cloneable sender of file-change notifications for one target.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
  tx: mpsc::UnboundedSender<()>,
}

impl ChangeNotifier {
  /// Report a change. Returns `false` once the coordinator has stopped.
  pub fn notify(&self) -> bool {
    self.tx.send(()).is_ok()
  }
}

/// Handle to a running coordinator.
pub struct WatchHandle {
  notifier: ChangeNotifier,
  state: watch::Receiver<WatchState>,
  task: JoinHandle<()>,
}

impl WatchHandle {
  pub fn notify_change(&self) -> bool {
    self.notifier.notify()
  }

  pub fn notifier(&self) -> ChangeNotifier {
    self.notifier.clone()
  }

  pub fn state(&self) -> WatchState {
    *self.state.borrow()
  }

  /// Receiver that observes every state the coordinator publishes.
  pub fn subscribe(&self) -> watch::Receiver<WatchState> {
    self.state.clone()
  }

  /// Wait for the coordinator task to end. It ends only after every notifier
  /// is dropped and the state machine is idle.
  pub async fn join(self) {
    let Self { notifier, task, .. } = self;
    drop(notifier);
    let _ = task.await;
  }
}

pub struct WatchCoordinator;

impl WatchCoordinator {
  /// Spawn the watch actor for one target.
  pub fn spawn(label: impl Into<String>, runner: Arc<dyn BuildRunner>, options: WatchOptions) -> WatchHandle {
    let label = label.into();
    let (change_tx, change_rx) = mpsc::unbounded_channel();
    let (initial, action) = WatchState::initial(options.skip_initial_build);
    let (state_tx, state_rx) = watch::channel(initial);

    let actor = Actor {
      label,
      runner,
      options,
      state: initial,
      state_tx,
    };
    let task = tokio::spawn(actor.run(change_rx, action));

    WatchHandle {
      notifier: ChangeNotifier { tx: change_tx },
      state: state_rx,
      task,
    }
  }
}

struct Actor {
  label: String,
  runner: Arc<dyn BuildRunner>,
  options: WatchOptions,
  state: WatchState,
  state_tx: watch::Sender<WatchState>,
}

impl Actor {
  async fn run(mut self, mut changes: mpsc::UnboundedReceiver<()>, initial: Option<WatchAction>) {
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel();
    let mut changes_open = true;

    if let Some(action) = initial {
      self.perform(action, &internal_tx);
    }

    loop {
      let event = tokio::select! {
        change = changes.recv(), if changes_open => match change {
          Some(()) => WatchEvent::FileChanged,
          None => {
            changes_open = false;
            if self.state == WatchState::Idle {
              break;
            }
            continue;
          }
        },
        Some(event) = internal_rx.recv() => event,
      };

      let (next, action) = self.state.on_event(event);
      trace!(target_name = %self.label, from = %self.state, to = %next, event = ?event, "watch transition");
      self.state = next;
      self.state_tx.send_replace(next);

      if let Some(action) = action {
        self.perform(action, &internal_tx);
      }

      if !changes_open && self.state == WatchState::Idle {
        break;
      }
    }

    debug!(target_name = %self.label, "watch loop stopped");
  }

  fn perform(&self, action: WatchAction, internal: &mpsc::UnboundedSender<WatchEvent>) {
    let internal = internal.clone();

    match action {
      WatchAction::ArmTimer => {
        let debounce = self.options.debounce;
        tokio::spawn(async move {
          tokio::time::sleep(debounce).await;
          let _ = internal.send(WatchEvent::SettleElapsed);
        });
      }
      WatchAction::StartBuild => {
        let runner = self.runner.clone();
        tokio::spawn(async move {
          runner.run_build().await;
          let _ = internal.send(WatchEvent::BuildFinished);
        });
      }
    }
  }
}
