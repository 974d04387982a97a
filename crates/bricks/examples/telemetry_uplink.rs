//! A toy telemetry uplink built from the crate's pieces.
//!
//! Sensor readings wait in a [`CircularBuffer`] until the link state machine
//! is online. Encoded frames are then coalesced by a [`CachedBuffer`] in
//! front of a lossy radio that sometimes accepts only part of a burst.
//! When the radio goes down the link backs off for a few ticks and reconnects.
//!
//! Run with
//!
//! ```bash
//! cargo run -p bricks --example telemetry_uplink
//! ```
#![allow(missing_docs)]

use bricks::{
    CachedBuffer, CircularBuffer, DynamicState, Next, Owned, OwningStateMachine, SinkError,
    Transitions, Version,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

type Link = Owned<Tick, Report>;

/// Input of one scheduler tick: whether the radio is reachable.
#[derive(Clone, Copy)]
struct Tick {
    radio_up: bool,
}

/// What the link did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    Connecting,
    Online,
    BackingOff(u8),
}

struct Connecting;

impl DynamicState<Tick, Report, Link> for Connecting {
    fn on_enter(&mut self, _transitions: &mut Transitions<'_, Link>) {
        info!("link connecting");
    }

    fn update(&mut self, tick: Tick) -> (Report, Next<Link>) {
        let next = if tick.radio_up {
            Next::Enter(Owned::new(Online))
        } else {
            Next::Stay
        };
        (Report::Connecting, next)
    }
}

struct Online;

impl DynamicState<Tick, Report, Link> for Online {
    fn on_enter(&mut self, _transitions: &mut Transitions<'_, Link>) {
        info!("link online");
    }

    fn on_exit(&mut self, _transitions: &mut Transitions<'_, Link>) {
        info!("link dropped");
    }

    fn update(&mut self, tick: Tick) -> (Report, Next<Link>) {
        let next = if tick.radio_up {
            Next::Stay
        } else {
            Next::Enter(Owned::new(Backoff { remaining: 3 }))
        };
        (Report::Online, next)
    }
}

struct Backoff {
    remaining: u8,
}

impl DynamicState<Tick, Report, Link> for Backoff {
    fn update(&mut self, _tick: Tick) -> (Report, Next<Link>) {
        self.remaining = self.remaining.saturating_sub(1);
        let next = if self.remaining == 0 {
            Next::Enter(Owned::new(Connecting))
        } else {
            Next::Stay
        };
        (Report::BackingOff(self.remaining), next)
    }
}

/// `[version: u32 BE][sequence: u16 BE][reading: i16 BE]`
fn encode(version: Version, sequence: u16, reading: i16) -> [u8; 8] {
    let mut frame = [0; 8];
    frame[..4].copy_from_slice(&version.bits().to_be_bytes());
    frame[4..6].copy_from_slice(&sequence.to_be_bytes());
    frame[6..].copy_from_slice(&reading.to_be_bytes());
    frame
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let version = Version::new(1, 4, 2)?;
    let mut rng = StdRng::seed_from_u64(7);
    let mut radio_rng = StdRng::seed_from_u64(11);
    let mut airtime = 0usize;

    let mut pending = CircularBuffer::<(u16, i16), 32>::new();
    let mut uplink = CachedBuffer::<_, 64>::with_sink(|burst: &[u8]| {
        // The radio takes the whole burst, a prefix of it, or nothing.
        let accepted = match radio_rng.random_range(0..10) {
            0 => 0,
            1..=2 => burst.len() / 2,
            _ => burst.len(),
        };
        airtime += accepted;
        accepted
    });

    let mut link = OwningStateMachine::new();
    link.enter_state(Owned::new(Connecting));

    for sequence in 0..64u16 {
        let reading = rng.random_range(-400..400);
        if pending.queue((sequence, reading)).is_err() {
            info!(sequence, "reading dropped, backlog full");
        }

        let tick = Tick {
            radio_up: rng.random_bool(0.85),
        };
        match link.run(tick) {
            Some(Report::Online) => {}
            Some(Report::BackingOff(left)) => {
                debug!(left, "backing off");
                continue;
            }
            Some(Report::Connecting) | None => continue,
        }

        while let Some(&(sequence, reading)) = pending.peek() {
            match uplink.store(&encode(version, sequence, reading)) {
                Ok(()) => {
                    pending.dequeue();
                }
                Err(SinkError::Stalled { pending: cached }) => {
                    info!(cached, "radio stalled, retrying next tick");
                    break;
                }
                Err(err) => {
                    info!(%err, "radio busy");
                    break;
                }
            }
        }
    }

    for _ in 0..16 {
        if uplink.is_empty() {
            break;
        }
        if let Err(err) = uplink.flush() {
            debug!(%err, "final flush");
        }
    }
    drop(uplink);

    info!(airtime, backlog = pending.len(), "uplink finished");
    Ok(())
}
