#![allow(missing_docs, dead_code)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use bricks::{DynamicState, Next, Owned, Sink, Transitions};

/// A sink that keeps a copy of every offer and answers from a script. Once
/// the script runs out it accepts everything. Clones share their state.
#[derive(Clone, Default)]
pub struct RecordingSink {
    calls: Rc<RefCell<Vec<Vec<u8>>>>,
    answers: Rc<RefCell<VecDeque<usize>>>,
}

impl RecordingSink {
    pub fn accepting_all() -> Self {
        Self::default()
    }

    pub fn answering(answers: impl IntoIterator<Item = usize>) -> Self {
        let sink = Self::default();
        sink.answers.borrow_mut().extend(answers);
        sink
    }

    pub fn calls(&self) -> Vec<Vec<u8>> {
        self.calls.borrow().clone()
    }
}

impl Sink for RecordingSink {
    fn write(&mut self, data: &[u8]) -> usize {
        self.calls.borrow_mut().push(data.to_vec());
        self.answers.borrow_mut().pop_front().unwrap_or(data.len())
    }
}

pub type Log = Rc<RefCell<Vec<String>>>;
pub type Handle = Owned<u8, u8>;

pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

/// A state that writes each callback and its own drop to a shared log.
pub struct Tracer {
    name: &'static str,
    log: Log,
    plan: VecDeque<Next<Handle>>,
    requests: Vec<Handle>,
}

impl Tracer {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            plan: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    /// Queues what successive updates return. Updates past the plan stay.
    pub fn then(mut self, next: Next<Handle>) -> Self {
        self.plan.push_back(next);
        self
    }

    /// Asks for `target` from `on_enter`.
    pub fn requesting(mut self, target: Handle) -> Self {
        self.requests.push(target);
        self
    }

    pub fn owned(self) -> Handle {
        Owned::new(self)
    }

    fn record(&self, line: String) {
        self.log.borrow_mut().push(line);
    }
}

impl DynamicState<u8, u8, Handle> for Tracer {
    fn on_enter(&mut self, transitions: &mut Transitions<'_, Handle>) {
        self.record(format!("enter {}", self.name));
        for target in std::mem::take(&mut self.requests) {
            if let Err(err) = transitions.enter(target) {
                self.record(format!("{} request failed: {err}", self.name));
            }
        }
    }

    fn on_exit(&mut self, _transitions: &mut Transitions<'_, Handle>) {
        self.record(format!("exit {}", self.name));
    }

    fn update(&mut self, input: u8) -> (u8, Next<Handle>) {
        self.record(format!("update {} <- {input}", self.name));
        let next = self.plan.pop_front().unwrap_or(Next::Stay);
        (input.wrapping_add(1), next)
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        self.record(format!("drop {}", self.name));
    }
}
