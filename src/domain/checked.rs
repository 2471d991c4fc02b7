//! Per-edit checked state with change notification.
//!
//! Every effective change emits exactly one [`CheckedChange`] to each live
//! subscription, however many edits it touched. Dropping a
//! [`CheckedSubscription`] unsubscribes it.

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use super::operation::EditId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedChange {
    pub edits: Vec<EditId>,
    pub checked: bool,
}

#[derive(Debug)]
pub struct CheckedSubscription {
    rx: mpsc::UnboundedReceiver<CheckedChange>,
}

impl CheckedSubscription {
    /// Next pending change, if any, without waiting.
    pub fn try_next(&mut self) -> Option<CheckedChange> {
        self.rx.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<CheckedChange> {
        self.rx.recv().await
    }
}

#[derive(Debug, Default)]
struct States {
    checked: Vec<bool>,
    checked_count: usize,
}

#[derive(Debug, Default)]
pub struct CheckedStates {
    states: RwLock<States>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CheckedChange>>>,
}

impl CheckedStates {
    pub fn new(initial: Vec<bool>) -> Self {
        let checked_count = initial.iter().filter(|checked| **checked).count();
        Self {
            states: RwLock::new(States {
                checked: initial,
                checked_count,
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.states.read().checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_checked(&self, id: EditId) -> bool {
        self.states.read().checked.get(id).copied().unwrap_or(false)
    }

    pub fn all_checked(&self, ids: impl IntoIterator<Item = EditId>) -> bool {
        let states = self.states.read();
        ids.into_iter()
            .all(|id| states.checked.get(id).copied().unwrap_or(false))
    }

    pub fn checked_count(&self) -> usize {
        self.states.read().checked_count
    }

    /// Sets every id to `value`. Returns whether anything changed; only then
    /// subscribers are notified, once.
    pub fn set_checked(&self, ids: impl IntoIterator<Item = EditId>, value: bool) -> bool {
        let mut changed = Vec::new();
        {
            let mut states = self.states.write();
            for id in ids {
                let Some(slot) = states.checked.get_mut(id) else {
                    continue;
                };
                if *slot != value {
                    *slot = value;
                    changed.push(id);
                }
            }
            if value {
                states.checked_count += changed.len();
            } else {
                states.checked_count -= changed.len();
            }
        }

        if changed.is_empty() {
            return false;
        }
        self.emit(CheckedChange {
            edits: changed,
            checked: value,
        });
        true
    }

    pub fn subscribe(&self) -> CheckedSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        CheckedSubscription { rx }
    }

    fn emit(&self, change: CheckedChange) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
