//! Event loop plumbing around the session controller.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::registry::RegistryBuilder;
use super::session::{Effect, SessionController, SessionEvent, SessionState};
use crate::ports::{MetadataSource, ProcessTerminator, SocketProbe};

/// Runs [`Effect`]s on tokio tasks and feeds their results back as events.
///
/// All state changes go through [`SessionDriver::dispatch`], which callers
/// invoke from one loop. In-flight scans and kills are never cancelled;
/// their results simply arrive later as events.
pub struct SessionDriver<P: SocketProbe, M: MetadataSource, T: ProcessTerminator> {
    controller: SessionController,
    registry: Arc<RegistryBuilder<P, M>>,
    terminator: Arc<T>,
    tx: UnboundedSender<SessionEvent>,
    rx: UnboundedReceiver<SessionEvent>,
}

impl<P, M, T> SessionDriver<P, M, T>
where
    P: SocketProbe + 'static,
    M: MetadataSource + 'static,
    T: ProcessTerminator + 'static,
{
    pub fn new(controller: SessionController, registry: RegistryBuilder<P, M>, terminator: T) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            registry: Arc::new(registry),
            terminator: Arc::new(terminator),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    /// Sender for feeding events from outside, e.g. a terminal reader task.
    pub fn sender(&self) -> UnboundedSender<SessionEvent> {
        self.tx.clone()
    }

    /// Kick off the first scan.
    pub fn start(&mut self) {
        let effects = self.controller.start();
        self.execute(effects);
    }

    /// Apply one event. Returns `false` once the session wants to quit.
    pub fn dispatch(&mut self, event: SessionEvent) -> bool {
        let effects = self.controller.handle(event);
        self.execute(effects)
    }

    /// Wait for the next result or queued event.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    fn execute(&self, effects: Vec<Effect>) -> bool {
        let mut running = true;
        for effect in effects {
            debug!(effect = ?effect, "Executing effect");
            match effect {
                Effect::Refresh {
                    generation,
                    include_all,
                } => {
                    let registry = Arc::clone(&self.registry);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let records = registry.build(include_all).await;
                        let _ = tx.send(SessionEvent::RegistryLoaded {
                            generation,
                            records,
                        });
                    });
                }
                Effect::Kill { pids, batch } => {
                    let terminator = Arc::clone(&self.terminator);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        // strictly one at a time, in the order given
                        let mut outcomes = Vec::with_capacity(pids.len());
                        for pid in pids {
                            let killed = terminator.terminate(pid).await;
                            outcomes.push((pid, killed));
                        }
                        let _ = tx.send(SessionEvent::KillFinished { outcomes, batch });
                    });
                }
                Effect::Elevate { pid, label } => {
                    self.terminator.terminate_elevated(pid, &label);
                }
                Effect::VerifyExists { pid, label } => {
                    let terminator = Arc::clone(&self.terminator);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let exists = terminator.exists(pid).await;
                        let _ = tx.send(SessionEvent::ExistenceChecked { pid, label, exists });
                    });
                }
                Effect::Schedule { delay, timer } => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(SessionEvent::Timer(timer));
                    });
                }
                Effect::Quit => running = false,
            }
        }
        running
    }
}
