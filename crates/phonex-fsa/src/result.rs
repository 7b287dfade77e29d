// Match results.
// Origin: SimpleFSADebugContext.java (cached group starts and lengths)

use std::ops::Range;
use std::sync::Arc;

use phonex_core::PhoneticElement;

/// A successful match: the overall range plus capture group ranges.
///
/// Ranges are half-open offsets into the matched element sequence. Group 0 is
/// the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonexMatch {
    /// `groups[0]` is the whole match and is always set.
    groups: Vec<Option<Range<usize>>>,
    names: Arc<[Option<String>]>,
}

impl PhonexMatch {
    pub(crate) fn new(groups: Vec<Option<Range<usize>>>, names: Arc<[Option<String>]>) -> Self {
        debug_assert!(groups.first().is_some_and(Option::is_some));
        Self { groups, names }
    }

    pub fn range(&self) -> Range<usize> {
        self.groups[0].clone().unwrap_or_default()
    }

    pub fn start(&self) -> usize {
        self.range().start
    }

    pub fn end(&self) -> usize {
        self.range().end
    }

    pub fn len(&self) -> usize {
        self.range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// Number of capture groups, not counting group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len() - 1
    }

    /// Range captured by `group`, or `None` if the group did not
    /// participate (or does not exist).
    pub fn group(&self, group: usize) -> Option<Range<usize>> {
        self.groups.get(group).cloned().flatten()
    }

    /// Range captured by the group called `name`.
    pub fn named_group(&self, name: &str) -> Option<Range<usize>> {
        let idx = self.names.iter().position(|n| n.as_deref() == Some(name))?;
        self.group(idx + 1)
    }

    /// Every group, starting with group 0.
    pub fn groups(&self) -> impl Iterator<Item = Option<Range<usize>>> + '_ {
        self.groups.iter().cloned()
    }

    /// The elements `group` captured from `input`, which must be the
    /// sequence this match came from.
    pub fn elements<'i>(
        &self,
        input: &'i [PhoneticElement],
        group: usize,
    ) -> Option<&'i [PhoneticElement]> {
        self.group(group).and_then(|range| input.get(range))
    }
}
