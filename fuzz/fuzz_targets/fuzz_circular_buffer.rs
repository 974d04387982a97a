#![no_main]
use std::collections::VecDeque;

use arbitrary::Arbitrary;
use bricks::CircularBuffer;
use libfuzzer_sys::fuzz_target;

const K: usize = 7;

#[derive(Debug, Arbitrary)]
enum Op {
    Queue(u32),
    Dequeue,
    Peek,
    PeekMut(u32),
    Clear,
    Clone,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut ring = CircularBuffer::<u32, K>::new();
    let mut model = VecDeque::with_capacity(K);

    for op in ops {
        match op {
            Op::Queue(value) => {
                let outcome = ring.queue(value);
                if model.len() == K {
                    assert_eq!(outcome, Err(value));
                } else {
                    assert_eq!(outcome, Ok(()));
                    model.push_back(value);
                }
            }
            Op::Dequeue => assert_eq!(ring.dequeue(), model.pop_front()),
            Op::Peek => assert_eq!(ring.peek(), model.front()),
            Op::PeekMut(value) => {
                if let Some(head) = ring.peek_mut() {
                    *head = value;
                }
                if let Some(head) = model.front_mut() {
                    *head = value;
                }
            }
            Op::Clear => {
                ring.clear();
                model.clear();
            }
            Op::Clone => {
                let copy = ring.clone();
                assert!(copy.sequence_eq(&ring));
                assert_eq!(copy, ring);
                ring = copy;
            }
        }

        assert_eq!(ring.len(), model.len());
        assert_eq!(ring.is_full(), model.len() == K);
        assert!(ring.iter().eq(model.iter()));
    }
});
