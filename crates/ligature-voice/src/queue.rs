//! Bounded event queue between the input decoder and the render thread.
//!
//! The queue is a lock-free single-producer/single-consumer ring buffer
//! ([`rtrb`]). The producer half ([`EventSender`]) can live on any thread; the
//! consumer half ([`EventReceiver`]) is drained by the engine at the start of
//! every block. Neither side blocks or allocates after construction.
//!
//! Pushing into a full queue drops the event and bumps a shared counter.
//! Overflow means the producer scheduled more events in one block than the
//! queue was sized for; it is reported, never waited on.
//!
//! ```rust
//! use ligature_core::Event;
//! use ligature_voice::event_queue;
//!
//! let (mut tx, mut rx) = event_queue(2);
//! assert!(tx.push(Event::note_on(0, 60, 1.0)));
//! assert!(tx.push(Event::note_off(32, 60)));
//! assert!(!tx.push(Event::note_on(40, 62, 1.0))); // full: dropped
//!
//! assert_eq!(rx.dropped(), 1);
//! assert_eq!(rx.pop().map(|e| e.time), Some(0));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ligature_core::Event;
use rtrb::{Consumer, Producer, RingBuffer};

/// Default queue capacity, sized for the busiest expected block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Create a connected sender/receiver pair holding up to `capacity` events.
///
/// A capacity of zero is raised to one.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let capacity = capacity.max(1);
    let (producer, consumer) = RingBuffer::new(capacity);
    let dropped = Arc::new(AtomicUsize::new(0));
    (
        EventSender {
            producer,
            dropped: Arc::clone(&dropped),
        },
        EventReceiver {
            consumer,
            capacity,
            dropped,
        },
    )
}

/// Producer half of the event queue.
pub struct EventSender {
    producer: Producer<Event>,
    dropped: Arc<AtomicUsize>,
}

impl EventSender {
    /// Enqueue `event`; returns `false` if the queue was full and the event
    /// was dropped.
    #[inline]
    pub fn push(&mut self, event: Event) -> bool {
        match self.producer.push(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of events that can be pushed before the queue is full.
    pub fn free_slots(&self) -> usize {
        self.producer.slots()
    }

    /// Check whether the receiving side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

impl core::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSender")
            .field("free_slots", &self.free_slots())
            .finish_non_exhaustive()
    }
}

/// Consumer half of the event queue.
pub struct EventReceiver {
    consumer: Consumer<Event>,
    capacity: usize,
    dropped: Arc<AtomicUsize>,
}

impl EventReceiver {
    /// Next event in enqueue order.
    #[inline]
    pub fn pop(&mut self) -> Option<Event> {
        self.consumer.pop().ok()
    }

    /// Discard every pending event; returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let mut count = 0;
        while self.consumer.pop().is_ok() {
            count += 1;
        }
        count
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.consumer.slots()
    }

    /// Check whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Maximum number of pending events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped on a full queue since construction.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl core::fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventReceiver")
            .field("pending", &self.len())
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}
