//! Single-step debugging.
//!
//! A debugged [`Vm`] waits for one step signal before every instruction and
//! reports the index of each instruction it has executed. Both channels hold
//! at most one message, so the VM never runs ahead of its controller.

use crossbeam::channel::{self, Receiver, Sender};

use crate::vm::Vm;
use crate::vm::runtime::DebugHooks;

/// The controlling side of a debugged [`Vm`].
///
/// Dropping the debugger makes a blocked VM fail its run with
/// [`RuntimeErrorKind::DebuggerDetached`](super::RuntimeErrorKind::DebuggerDetached).
pub struct Debugger {
    steps: Sender<()>,
    feeds: Receiver<Receiver<usize>>,
}

impl Debugger {
    /// Allows the VM to execute one instruction. Blocks while the previous
    /// step has not been taken; returns `false` once the VM is gone.
    pub fn step(&self) -> bool {
        self.steps.send(()).is_ok()
    }

    /// Indexes of executed instructions, in execution order. Each call
    /// follows one run, in the order the runs start; the iterator ends when
    /// that run finishes.
    pub fn position(&self) -> Positions<'_> {
        Positions {
            feeds: &self.feeds,
            feed: None,
        }
    }
}

/// Position feed of one run, see [`Debugger::position`].
pub struct Positions<'d> {
    feeds: &'d Receiver<Receiver<usize>>,
    feed: Option<Receiver<usize>>,
}

impl Iterator for Positions<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.feed.is_none() {
            // Waits for the VM to start its next run.
            self.feed = Some(self.feeds.recv().ok()?);
        }
        self.feed.as_ref()?.recv().ok()
    }
}

impl Vm {
    /// A VM in debug mode, paired with its controller.
    pub fn debug() -> (Vm, Debugger) {
        let (step_tx, step_rx) = channel::bounded(1);
        let (feed_tx, feed_rx) = channel::unbounded();
        let mut vm = Vm::new();
        vm.debug = Some(DebugHooks {
            steps: step_rx,
            feeds: feed_tx,
            positions: None,
        });
        (
            vm,
            Debugger {
                steps: step_tx,
                feeds: feed_rx,
            },
        )
    }
}
