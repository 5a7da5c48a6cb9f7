//! Masks — concurrency-safe mask registry.

use dashmap::DashMap;

use crate::mask::Context;

/// Lifecycle of one mask. Transitions are monotone:
/// absent → Unknown → Known. Entries are never removed while the
/// pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskEntry {
    Unknown,
    Known(Context),
}

/// Shared mask → entry map. The per-key entry guard of the underlying
/// map makes `record_unknown` atomic against concurrent promotion.
#[derive(Debug, Default)]
pub struct MaskRegistry {
    entries: DashMap<String, MaskEntry>,
}

impl MaskRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record a first sighting. Returns true when the mask was absent;
    /// an existing entry (either state) is left untouched.
    pub fn record_unknown(&self, mask: &str) -> bool {
        let mut was_new = false;
        self.entries.entry(mask.to_string()).or_insert_with(|| {
            was_new = true;
            MaskEntry::Unknown
        });
        was_new
    }

    /// Publish the oracle's context for a mask. Last writer wins.
    pub fn promote(&self, mask: &str, context: Context) {
        self.entries
            .insert(mask.to_string(), MaskEntry::Known(context));
    }

    pub fn lookup(&self, mask: &str) -> Option<MaskEntry> {
        self.entries.get(mask).map(|entry| entry.value().clone())
    }

    /// Context for a promoted mask, if any.
    pub fn context(&self, mask: &str) -> Option<Context> {
        match self.lookup(mask) {
            Some(MaskEntry::Known(context)) => Some(context),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted snapshot of every recorded mask and whether it is known.
    /// Diagnostics surface for the shutdown report.
    pub fn masks(&self) -> Vec<(String, bool)> {
        let mut all: Vec<(String, bool)> = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    matches!(entry.value(), MaskEntry::Known(_)),
                )
            })
            .collect();
        all.sort();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(labels: &[&str]) -> Context {
        Context {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_record_unknown_first_sighting() {
        let registry = MaskRegistry::new();
        assert!(registry.record_unknown("Y-Y"));
        assert!(!registry.record_unknown("Y-Y"));
        assert_eq!(registry.lookup("Y-Y"), Some(MaskEntry::Unknown));
    }

    #[test]
    fn test_record_unknown_does_not_demote() {
        let registry = MaskRegistry::new();
        registry.promote("Y-Y", context(&["date"]));
        assert!(!registry.record_unknown("Y-Y"));
        assert_eq!(registry.context("Y-Y"), Some(context(&["date"])));
    }

    #[test]
    fn test_promote_last_writer_wins() {
        let registry = MaskRegistry::new();
        registry.record_unknown("Y:Y");
        registry.promote("Y:Y", context(&["hour", "minute"]));
        registry.promote("Y:Y", context(&["h", "m"]));
        assert_eq!(registry.context("Y:Y"), Some(context(&["h", "m"])));
    }

    #[test]
    fn test_lookup_absent() {
        let registry = MaskRegistry::new();
        assert_eq!(registry.lookup("nope"), None);
        assert_eq!(registry.context("nope"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_masks_snapshot_sorted_with_state() {
        let registry = MaskRegistry::new();
        registry.record_unknown("Y=Y");
        registry.record_unknown("Y-Y");
        registry.promote("Y-Y", context(&["a"]));

        assert_eq!(
            registry.masks(),
            vec![("Y-Y".to_string(), true), ("Y=Y".to_string(), false)]
        );
        assert_eq!(registry.len(), 2);
    }
}
