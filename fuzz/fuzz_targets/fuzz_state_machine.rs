#![no_main]
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use arbitrary::Arbitrary;
use bricks::{
    DynamicState, MachineOptions, Next, Owned, OwningStateMachine, Status, Transitions,
};
use libfuzzer_sys::fuzz_target;

type Handle = Owned<u8, u8>;

#[derive(Debug, Arbitrary)]
struct Input {
    drain_deferred: bool,
    /// Consumed by states to decide what to request.
    script: Vec<u8>,
    inputs: Vec<u8>,
}

#[derive(Default)]
struct Shared {
    script: RefCell<VecDeque<u8>>,
    /// States entered and not yet exited or dropped.
    active: Cell<usize>,
    in_callback: Cell<bool>,
}

impl Shared {
    fn spawn(self: &Rc<Self>) -> Handle {
        Owned::new(Hop {
            shared: Rc::clone(self),
            entered: false,
        })
    }

    fn next_byte(&self) -> u8 {
        self.script.borrow_mut().pop_front().unwrap_or(0)
    }

    fn callback<T>(&self, f: impl FnOnce() -> T) -> T {
        assert!(!self.in_callback.replace(true), "state callbacks nested");
        let out = f();
        self.in_callback.set(false);
        out
    }
}

struct Hop {
    shared: Rc<Shared>,
    entered: bool,
}

impl DynamicState<u8, u8, Handle> for Hop {
    fn on_enter(&mut self, transitions: &mut Transitions<'_, Handle>) {
        assert!(!self.entered, "entered twice");
        self.entered = true;
        let shared = Rc::clone(&self.shared);
        shared.callback(|| {
            shared.active.set(shared.active.get() + 1);
            assert!(shared.active.get() <= 1, "two states active at once");
            for _ in 0..shared.next_byte() % 4 {
                let _ = if shared.next_byte() % 5 == 0 {
                    transitions.halt()
                } else {
                    transitions.enter(shared.spawn())
                };
            }
        });
    }

    fn on_exit(&mut self, _transitions: &mut Transitions<'_, Handle>) {
        assert!(self.entered, "exit without enter");
        self.entered = false;
        let shared = Rc::clone(&self.shared);
        shared.callback(|| shared.active.set(shared.active.get() - 1));
    }

    fn update(&mut self, input: u8) -> (u8, Next<Handle>) {
        assert!(self.entered, "update before enter");
        let shared = Rc::clone(&self.shared);
        shared.callback(|| {
            let next = match shared.next_byte() % 3 {
                0 => Next::Stay,
                1 => Next::Enter(shared.spawn()),
                _ => Next::Halt,
            };
            (input, next)
        })
    }
}

impl Drop for Hop {
    fn drop(&mut self) {
        // Only the state still current when the machine goes away is
        // dropped without an exit.
        if self.entered {
            self.shared.active.set(self.shared.active.get() - 1);
        }
    }
}

fuzz_target!(|input: Input| {
    let shared = Rc::new(Shared {
        script: RefCell::new(input.script.into()),
        ..Shared::default()
    });

    let mut machine = OwningStateMachine::with_options(MachineOptions {
        drain_deferred: input.drain_deferred,
        panic_on_overflow: false,
    });
    machine.enter_state(shared.spawn());

    for value in input.inputs {
        if machine.status() == Status::Halt {
            assert_eq!(shared.active.get(), 0);
            machine.enter_state(shared.spawn());
        }
        let running = machine.status() == Status::Running;
        assert_eq!(machine.run(value).is_some(), running);
        assert!(machine.pending() <= bricks::DEFERRED_CAPACITY);
    }

    drop(machine);
    assert_eq!(shared.active.get(), 0);
});
