//! Samples — per-mask buffers of sentences awaiting a context.
//!
//! A buffer accumulates while its mask is unpromoted. `drain` hands the
//! backlog to the replay path and seals the slot, so any sentence that
//! arrives after the handoff is returned to the caller instead of being
//! stranded in an already-drained buffer. That seal is what makes the
//! promote-then-replay handoff race-free.

use std::collections::VecDeque;

use dashmap::DashMap;

use crate::mask::Sentence;

#[derive(Debug)]
enum SampleSlot {
    Buffering(VecDeque<Sentence>),
    Sealed,
}

/// Outcome of appending one sentence.
#[derive(Debug)]
pub enum Appended {
    /// Buffered; the new count plus any sample evicted by the cap.
    Buffered {
        count: usize,
        evicted: Option<Sentence>,
    },
    /// The mask was already promoted and drained; the sentence comes
    /// back so the caller forwards it on the known path.
    AlreadyKnown(Sentence),
}

#[derive(Debug)]
pub struct SampleStore {
    slots: DashMap<String, SampleSlot>,
    cap: usize,
}

impl SampleStore {
    /// `cap` bounds each mask's buffer; the oldest sample is evicted
    /// once a buffer is full.
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "sample cap must be non-zero");
        Self {
            slots: DashMap::new(),
            cap,
        }
    }

    /// Append one sentence under the mask's entry lock.
    pub fn append(&self, mask: &str, sentence: Sentence) -> Appended {
        let mut slot = self
            .slots
            .entry(mask.to_string())
            .or_insert_with(|| SampleSlot::Buffering(VecDeque::new()));

        match slot.value_mut() {
            SampleSlot::Sealed => Appended::AlreadyKnown(sentence),
            SampleSlot::Buffering(buffer) => {
                let evicted = if buffer.len() == self.cap {
                    buffer.pop_front()
                } else {
                    None
                };
                buffer.push_back(sentence);
                Appended::Buffered {
                    count: buffer.len(),
                    evicted,
                }
            }
        }
    }

    /// Clone the buffered lines for an oracle candidate.
    pub fn snapshot_lines(&self, mask: &str) -> Vec<String> {
        match self.slots.get(mask) {
            Some(slot) => match slot.value() {
                SampleSlot::Buffering(buffer) => {
                    buffer.iter().map(Sentence::line_string).collect()
                }
                SampleSlot::Sealed => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Atomically take every buffered sentence and seal the slot. Later
    /// appends for this mask return [`Appended::AlreadyKnown`].
    pub fn drain(&self, mask: &str) -> Vec<Sentence> {
        match self.slots.get_mut(mask) {
            Some(mut slot) => {
                match std::mem::replace(slot.value_mut(), SampleSlot::Sealed) {
                    SampleSlot::Buffering(buffer) => buffer.into_iter().collect(),
                    SampleSlot::Sealed => Vec::new(),
                }
            }
            None => {
                self.slots.insert(mask.to_string(), SampleSlot::Sealed);
                Vec::new()
            }
        }
    }

    /// Take every still-buffering slot. Shutdown cleanup for masks the
    /// oracle never labelled, so their line buffers can be returned.
    pub fn drain_all(&self) -> Vec<(String, Vec<Sentence>)> {
        let masks: Vec<String> = self.slots.iter().map(|e| e.key().clone()).collect();
        masks
            .into_iter()
            .filter_map(|mask| {
                let backlog = self.drain(&mask);
                (!backlog.is_empty()).then_some((mask, backlog))
            })
            .collect()
    }

    /// Buffered sentences for one mask; zero once sealed or absent.
    pub fn count(&self, mask: &str) -> usize {
        match self.slots.get(mask) {
            Some(slot) => match slot.value() {
                SampleSlot::Buffering(buffer) => buffer.len(),
                SampleSlot::Sealed => 0,
            },
            None => 0,
        }
    }

    /// Total sentences currently buffered across all masks.
    pub fn buffered(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot.value() {
                SampleSlot::Buffering(buffer) => buffer.len(),
                SampleSlot::Sealed => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(text: &str) -> Sentence {
        let line: Vec<char> = text.chars().collect();
        let masked = crate::mask::mask_line(&line);
        Sentence {
            line,
            tokens: masked.tokens,
            mask: masked.mask,
        }
    }

    fn count(appended: Appended) -> usize {
        match appended {
            Appended::Buffered { count, .. } => count,
            Appended::AlreadyKnown(_) => panic!("expected a buffered append"),
        }
    }

    #[test]
    fn test_append_counts_per_mask() {
        let store = SampleStore::new(8);
        assert_eq!(count(store.append("Y", sentence("a"))), 1);
        assert_eq!(count(store.append("Y", sentence("b"))), 2);
        assert_eq!(count(store.append("Y-Y", sentence("a-b"))), 1);
        assert_eq!(store.buffered(), 3);
    }

    #[test]
    fn test_drain_empties_and_returns_in_order() {
        let store = SampleStore::new(8);
        store.append("Y", sentence("a"));
        store.append("Y", sentence("b"));
        store.append("Y", sentence("c"));

        let drained = store.drain("Y");
        let lines: Vec<String> = drained.iter().map(Sentence::line_string).collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(store.buffered(), 0);
    }

    #[test]
    fn test_append_after_drain_is_rejected() {
        let store = SampleStore::new(8);
        store.append("Y", sentence("a"));
        store.drain("Y");

        match store.append("Y", sentence("late")) {
            Appended::AlreadyKnown(s) => assert_eq!(s.line_string(), "late"),
            Appended::Buffered { .. } => panic!("sealed slot accepted a sample"),
        }
        assert_eq!(store.count("Y"), 0);
    }

    #[test]
    fn test_count_tracks_buffer() {
        let store = SampleStore::new(8);
        assert_eq!(store.count("Y"), 0);
        store.append("Y", sentence("a"));
        store.append("Y", sentence("b"));
        assert_eq!(store.count("Y"), 2);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let store = SampleStore::new(2);
        store.append("Y", sentence("a"));
        store.append("Y", sentence("b"));

        match store.append("Y", sentence("c")) {
            Appended::Buffered { count, evicted } => {
                assert_eq!(count, 2);
                assert_eq!(evicted.expect("eviction expected").line_string(), "a");
            }
            Appended::AlreadyKnown(_) => panic!("unexpected seal"),
        }

        let lines: Vec<String> = store.drain("Y").iter().map(Sentence::line_string).collect();
        assert_eq!(lines, vec!["b", "c"]);
    }

    #[test]
    fn test_snapshot_does_not_consume() {
        let store = SampleStore::new(8);
        store.append("Y", sentence("a"));
        store.append("Y", sentence("b"));

        assert_eq!(store.snapshot_lines("Y"), vec!["a", "b"]);
        assert_eq!(store.buffered(), 2);
        assert_eq!(store.snapshot_lines("absent"), Vec::<String>::new());
    }

    #[test]
    fn test_drain_all_skips_sealed_slots() {
        let store = SampleStore::new(8);
        store.append("Y", sentence("a"));
        store.append("Y=Y", sentence("k=v"));
        store.drain("Y");

        let leftovers = store.drain_all();
        assert_eq!(leftovers.len(), 1);
        assert_eq!(leftovers[0].0, "Y=Y");
        assert_eq!(leftovers[0].1.len(), 1);
    }
}
