//! Priority arbitration over a shared value.
//!
//! Many producers may want the same output (this tick's click, the current aim target). Each
//! one submits a [`Request`] with a priority and a time-to-live measured in ticks; the consumer
//! only ever sees the highest-priority live request.
//!
//! * At most one request per producer: a new submission replaces the producer's previous one.
//! * Ordering is total: priority descending, then submission order (earlier wins). A
//!   resubmission counts as a new submission.
//! * Expiry is tick-counted, so replaying the same calls yields the same winners.
//!
//! Entries live in a `Vec` kept sorted on insert.

use crate::error::KernelError;
use crate::registry::ModuleId;

/// A pending request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<T, P = ModuleId> {
    remaining: u32,
    priority: u32,
    producer: P,
    value: T,
    seq: u64,
}

impl<T, P> Request<T, P> {
    /// Ticks left before the request expires.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    pub const fn priority(&self) -> u32 {
        self.priority
    }

    pub const fn producer(&self) -> &P {
        &self.producer
    }

    pub const fn value(&self) -> &T {
        &self.value
    }
}

/// Priority-ordered, self-expiring requests with one entry per producer.
#[derive(Debug, Clone)]
pub struct RequestHandler<T, P = ModuleId> {
    entries: Vec<Request<T, P>>,
    next_seq: u64,
}

impl<T, P> Default for RequestHandler<T, P> {
    fn default() -> Self {
        Self { entries: Vec::new(), next_seq: 0 }
    }
}

impl<T, P: PartialEq> RequestHandler<T, P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any request owned by `producer` with a new one.
    ///
    /// A `ttl` of zero keeps the request visible until the next [`Self::tick`].
    pub fn submit(&mut self, producer: P, priority: u32, ttl: u32, value: T) {
        self.withdraw(&producer);

        let seq = self.next_seq;
        self.next_seq += 1;

        // Newest sequence number: goes after every entry of equal or higher priority.
        let at = self.entries.partition_point(|e| e.priority >= priority);
        self.entries.insert(at, Request { remaining: ttl, priority, producer, value, seq });
    }

    /// Like [`Self::submit`], for callers holding untyped numbers.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidRequest`] when `priority` or `ttl` is negative or does not fit
    /// in `u32`. Values are never clamped.
    pub fn try_submit(
        &mut self,
        producer: P,
        priority: i64,
        ttl: i64,
        value: T,
    ) -> Result<(), KernelError> {
        let priority = checked("priority", priority)?;
        let ttl = checked("ttl", ttl)?;
        self.submit(producer, priority, ttl, value);
        Ok(())
    }

    /// Removes the request owned by `producer`, returning its value.
    pub fn withdraw(&mut self, producer: &P) -> Option<T> {
        let index = self.entries.iter().position(|e| e.producer == *producer)?;
        Some(self.entries.remove(index).value)
    }

    /// Ages every request by `delta` ticks and drops the expired ones.
    pub fn tick(&mut self, delta: u32) {
        for entry in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(delta);
        }
        self.entries.retain(|e| e.remaining > 0);
    }

    /// The winning value, if any.
    #[must_use]
    pub fn peek_winner(&self) -> Option<&T> {
        self.entries.first().map(|e| &e.value)
    }

    /// The producer owning the winning request.
    #[must_use]
    pub fn winner_producer(&self) -> Option<&P> {
        self.entries.first().map(|e| &e.producer)
    }

    /// Removes the winning request and returns its value.
    ///
    /// The producer has to resubmit to be granted again.
    pub fn pop_winner(&mut self) -> Option<T> {
        if self.entries.is_empty() { None } else { Some(self.entries.remove(0).value) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Requests in winning order.
    pub fn iter(&self) -> impl Iterator<Item = &Request<T, P>> {
        self.entries.iter()
    }
}

fn checked(field: &'static str, raw: i64) -> Result<u32, KernelError> {
    u32::try_from(raw).map_err(|_| KernelError::InvalidRequest {
        message: format!("{field} must be within 0..={}, got {raw}", u32::MAX).into(),
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Queue = RequestHandler<&'static str, u8>;

    #[test]
    fn resubmission_replaces_previous_entry() {
        let mut queue = Queue::new();
        queue.submit(1, 1, 5, "low");
        queue.submit(1, 9, 5, "high");

        assert_eq!(queue.len(), 1);
        let entry = queue.iter().next().expect("one entry");
        assert_eq!(entry.priority(), 9);
        assert_eq!(*entry.value(), "high");
    }

    #[test]
    fn expiry_hands_over_to_lower_priority() {
        let mut queue = Queue::new();
        queue.submit(1, 3, 2, "p1");
        queue.submit(2, 5, 1, "p2");

        assert_eq!(queue.peek_winner(), Some(&"p2"));
        queue.tick(1);
        assert_eq!(queue.peek_winner(), Some(&"p1"));
        queue.tick(1);
        assert_eq!(queue.peek_winner(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_removes_only_the_winner() {
        let mut queue = Queue::new();
        queue.submit(1, 1, 10, "a");
        queue.submit(2, 7, 10, "b");
        queue.submit(3, 4, 10, "c");

        assert_eq!(queue.pop_winner(), Some("b"));
        assert_eq!(queue.peek_winner(), Some(&"c"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn equal_priority_is_first_come_first_served() {
        let mut queue = Queue::new();
        queue.submit(1, 5, 10, "first");
        queue.submit(2, 5, 10, "second");
        assert_eq!(queue.winner_producer(), Some(&1));

        // Resubmitting moves the producer behind its peers.
        queue.submit(1, 5, 10, "again");
        assert_eq!(queue.winner_producer(), Some(&2));
    }

    #[test]
    fn zero_ttl_lives_until_next_tick() {
        let mut queue = Queue::new();
        queue.submit(1, 0, 0, "blink");
        assert_eq!(queue.peek_winner(), Some(&"blink"));
        queue.tick(1);
        assert!(queue.is_empty());
    }

    #[test]
    fn large_delta_saturates() {
        let mut queue = Queue::new();
        queue.submit(1, 0, 3, "x");
        queue.tick(u32::MAX);
        assert!(queue.is_empty());
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let mut queue = Queue::new();
        assert!(matches!(queue.try_submit(1, -1, 5, "x"), Err(KernelError::InvalidRequest { .. })));
        assert!(matches!(queue.try_submit(1, 1, -5, "x"), Err(KernelError::InvalidRequest { .. })));
        assert!(matches!(
            queue.try_submit(1, i64::from(u32::MAX) + 1, 5, "x"),
            Err(KernelError::InvalidRequest { .. })
        ));
        assert!(queue.is_empty(), "rejected requests must not be stored");

        queue.try_submit(1, 2, 3, "ok").expect("valid request");
        assert_eq!(queue.peek_winner(), Some(&"ok"));
    }

    #[test]
    fn withdraw_and_clear() {
        let mut queue = Queue::new();
        queue.submit(1, 1, 3, "a");
        queue.submit(2, 2, 3, "b");

        assert_eq!(queue.withdraw(&2), Some("b"));
        assert_eq!(queue.withdraw(&2), None);
        queue.clear();
        assert!(queue.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Submit { producer: u8, priority: u32, ttl: u32 },
        Tick(u32),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..6, 0u32..10, 0u32..8)
                .prop_map(|(producer, priority, ttl)| Op::Submit { producer, priority, ttl }),
            (0u32..4).prop_map(Op::Tick),
            Just(Op::Pop),
        ]
    }

    fn run(ops: &[Op]) -> Vec<Option<(u8, u32)>> {
        let mut queue = RequestHandler::<u32, u8>::new();
        let mut winners = Vec::new();
        for (i, op) in ops.iter().enumerate() {
            match *op {
                Op::Submit { producer, priority, ttl } => {
                    queue.submit(producer, priority, ttl, u32::try_from(i).unwrap_or(u32::MAX));
                },
                Op::Tick(delta) => queue.tick(delta),
                Op::Pop => {
                    queue.pop_winner();
                },
            }
            winners.push(queue.winner_producer().copied().zip(queue.peek_winner().copied()));
        }
        winners
    }

    proptest! {
        #[test]
        fn at_most_one_entry_per_producer(ops in prop::collection::vec(op(), 0..64)) {
            let mut queue = RequestHandler::<(), u8>::new();
            for op in &ops {
                match *op {
                    Op::Submit { producer, priority, ttl } => queue.submit(producer, priority, ttl, ()),
                    Op::Tick(delta) => queue.tick(delta),
                    Op::Pop => { queue.pop_winner(); },
                }
                let mut producers: Vec<u8> = queue.iter().map(|e| *e.producer()).collect();
                let total = producers.len();
                producers.sort_unstable();
                producers.dedup();
                prop_assert_eq!(producers.len(), total);
            }
        }

        #[test]
        fn winner_has_the_highest_priority(ops in prop::collection::vec(op(), 0..64)) {
            let mut queue = RequestHandler::<(), u8>::new();
            for op in &ops {
                match *op {
                    Op::Submit { producer, priority, ttl } => queue.submit(producer, priority, ttl, ()),
                    Op::Tick(delta) => queue.tick(delta),
                    Op::Pop => { queue.pop_winner(); },
                }
                let best = queue.iter().map(Request::priority).max();
                prop_assert_eq!(queue.iter().next().map(Request::priority), best);
            }
        }

        #[test]
        fn replay_is_deterministic(ops in prop::collection::vec(op(), 0..64)) {
            prop_assert_eq!(run(&ops), run(&ops));
        }
    }
}
