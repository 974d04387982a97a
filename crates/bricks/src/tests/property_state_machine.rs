use alloc::{collections::BTreeMap, rc::Rc, vec::Vec};
use core::cell::{Cell, RefCell};

use quickcheck::QuickCheck;

use super::{arbitrary::Step, test_count};
use crate::{
    DynamicState, MachineOptions, Next, Owned, OwningStateMachine, Status, Transitions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Enter,
    Update,
    Exit,
    Drop,
}

/// Shared scripts and observations for every actor of one run.
#[derive(Default)]
struct World {
    steps: RefCell<Vec<Step>>,
    requests: RefCell<Vec<u8>>,
    events: RefCell<Vec<(usize, Event)>>,
    next_id: Cell<usize>,
    depth: Cell<usize>,
    max_depth: Cell<usize>,
}

impl World {
    fn spawn(self: &Rc<Self>) -> Owned<u8, u8> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Owned::new(Actor {
            id,
            world: Rc::clone(self),
        })
    }

    /// Runs `f` as a state callback, tracking how deeply callbacks nest.
    fn callback<T>(&self, id: usize, event: Event, f: impl FnOnce() -> T) -> T {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        self.max_depth.set(self.max_depth.get().max(depth));
        self.events.borrow_mut().push((id, event));
        let out = f();
        self.depth.set(depth - 1);
        out
    }
}

struct Actor {
    id: usize,
    world: Rc<World>,
}

impl DynamicState<u8, u8, Owned<u8, u8>> for Actor {
    fn on_enter(&mut self, transitions: &mut Transitions<'_, Owned<u8, u8>>) {
        let world = Rc::clone(&self.world);
        world.callback(self.id, Event::Enter, || {
            let count = world.requests.borrow_mut().pop().unwrap_or(0) % 3;
            for _ in 0..count {
                let halt = world.requests.borrow_mut().pop().unwrap_or(1) % 4 == 0;
                // Overflowing requests are dropped; the lifecycle still holds.
                let _ = if halt {
                    transitions.halt()
                } else {
                    transitions.enter(world.spawn())
                };
            }
        });
    }

    fn on_exit(&mut self, _transitions: &mut Transitions<'_, Owned<u8, u8>>) {
        self.world.callback(self.id, Event::Exit, || ());
    }

    fn update(&mut self, input: u8) -> (u8, Next<Owned<u8, u8>>) {
        let world = Rc::clone(&self.world);
        world.callback(self.id, Event::Update, || {
            let step = world.steps.borrow_mut().pop().unwrap_or(Step::Stay);
            let next = match step {
                Step::Stay => Next::Stay,
                Step::Enter => Next::Enter(world.spawn()),
                Step::Halt => Next::Halt,
            };
            (input, next)
        })
    }
}

impl Drop for Actor {
    fn drop(&mut self) {
        self.world.events.borrow_mut().push((self.id, Event::Drop));
    }
}

/// `drop` alone for a state that was never entered, otherwise
/// `enter update* exit? drop`. The exit is missing only for the state still
/// current when the machine goes away.
fn well_formed(events: &[Event]) -> bool {
    match events {
        [Event::Drop] => true,
        [Event::Enter, rest @ .., Event::Drop] => {
            let updates = match rest {
                [updates @ .., Event::Exit] => updates,
                _ => rest,
            };
            updates.iter().all(|event| *event == Event::Update)
        }
        _ => false,
    }
}

/// Every state follows the lifecycle and no two callbacks ever nest.
#[test]
fn lifecycle_is_paired_and_callbacks_never_nest() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(steps: Vec<Step>, requests: Vec<u8>, inputs: Vec<u8>, drain_deferred: bool) -> bool {
        let world = Rc::new(World {
            steps: RefCell::new(steps),
            requests: RefCell::new(requests),
            ..World::default()
        });

        {
            let mut machine = OwningStateMachine::with_options(MachineOptions {
                drain_deferred,
                ..MachineOptions::default()
            });
            machine.enter_state(world.spawn());
            for input in inputs {
                if machine.status() == Status::Halt {
                    machine.enter_state(world.spawn());
                }
                let running = machine.status() == Status::Running;
                if machine.run(input).is_some() != running {
                    return false;
                }
            }
        }

        let mut lifecycles: BTreeMap<usize, Vec<Event>> = BTreeMap::new();
        for (id, event) in world.events.borrow().iter() {
            lifecycles.entry(*id).or_default().push(*event);
        }

        world.max_depth.get() <= 1
            && lifecycles.len() == world.next_id.get()
            && lifecycles.values().all(|events| well_formed(events))
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<Step>, Vec<u8>, Vec<u8>, bool) -> bool);
}
