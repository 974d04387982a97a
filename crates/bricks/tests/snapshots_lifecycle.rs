#![expect(missing_docs)]

mod common;

use bricks::{MachineOptions, Next, OwningStateMachine};
use common::{Log, Tracer, take};

fn drive(options: MachineOptions, inputs: &[u8]) -> String {
    let log = Log::default();
    let work = Tracer::new("work", &log).then(Next::Halt).owned();
    let idle = Tracer::new("idle", &log).then(Next::Enter(work)).owned();
    let boot = Tracer::new("boot", &log).requesting(idle).owned();

    let mut machine = OwningStateMachine::with_options(options);
    let status = machine.enter_state(boot);
    log.borrow_mut()
        .push(format!("enter_state -> {status:?}, {} pending", machine.pending()));

    for &input in inputs {
        let result = machine.run(input);
        log.borrow_mut().push(format!("run({input}) -> {result:?}"));
    }
    take(&log).join("\n")
}

#[test]
fn snapshot_one_transition_per_cycle() {
    insta::assert_snapshot!(drive(MachineOptions::default(), &[1, 2, 3, 4]), @r"
    enter boot
    enter_state -> Running, 1 pending
    update boot <- 1
    exit boot
    drop boot
    enter idle
    run(1) -> Some(2)
    update idle <- 2
    exit idle
    drop idle
    enter work
    run(2) -> Some(3)
    update work <- 3
    exit work
    drop work
    run(3) -> Some(4)
    run(4) -> None
    ");
}

#[test]
fn snapshot_drained_transitions() {
    let options = MachineOptions {
        drain_deferred: true,
        ..MachineOptions::default()
    };
    insta::assert_snapshot!(drive(options, &[1, 2]), @r"
    enter boot
    exit boot
    drop boot
    enter idle
    enter_state -> Running, 0 pending
    update idle <- 1
    exit idle
    drop idle
    enter work
    run(1) -> Some(2)
    update work <- 2
    exit work
    drop work
    run(2) -> Some(3)
    ");
}
