#![no_main]
use std::{cell::RefCell, rc::Rc};

use arbitrary::Arbitrary;
use bricks::{CachedBuffer, SinkError};
use libfuzzer_sys::fuzz_target;
use rand::{Rng, SeedableRng, rngs::SmallRng};

const N: usize = 16;

#[derive(Debug, Arbitrary)]
enum Op {
    Store(Vec<u8>),
    Flush,
    /// Unregisters the sink, or puts it back if it is already parked.
    ToggleSink,
}

#[derive(Debug, Arbitrary)]
struct Input {
    seed: u64,
    /// Chance, in percent, that the sink takes a random prefix instead of
    /// the whole offer.
    short_percent: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let delivered = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let delivered = Rc::clone(&delivered);
        let mut rng = SmallRng::seed_from_u64(input.seed);
        let short = u32::from(input.short_percent % 101);
        move |data: &[u8]| -> usize {
            let accepted = if rng.random_range(0..100) < short {
                rng.random_range(0..=data.len())
            } else {
                data.len()
            };
            delivered.borrow_mut().extend_from_slice(&data[..accepted]);
            accepted
        }
    };

    let mut cache = CachedBuffer::<_, N>::with_sink(sink);
    let mut parked = None;
    let mut accepted = Vec::new();

    for op in input.ops {
        let before = cache.as_slice().to_vec();
        let outcome = match op {
            Op::Flush => cache.flush().map(|_| ()),
            Op::ToggleSink => {
                match parked.take() {
                    Some(sink) => {
                        cache.register_sink(sink);
                    }
                    None => parked = cache.unregister_sink(),
                }
                Ok(())
            }
            Op::Store(data) => {
                let outcome = cache.store(&data);
                match outcome {
                    Ok(()) => accepted.extend_from_slice(&data),
                    Err(SinkError::ShortWrite { written, expected }) => {
                        assert_eq!(expected, data.len());
                        assert!(written < expected);
                        accepted.extend_from_slice(&data[..written]);
                    }
                    Err(_) => {}
                }
                outcome
            }
        };

        if let Err(SinkError::Stalled { pending }) = outcome {
            assert_eq!(pending, before.len());
            assert_eq!(cache.as_slice(), &before[..], "a stall must not touch the cache");
        }
        assert!(cache.len() <= N);

        let mut observed = delivered.borrow().clone();
        observed.extend_from_slice(cache.as_slice());
        assert_eq!(observed, accepted, "bytes lost or duplicated");
    }
});
