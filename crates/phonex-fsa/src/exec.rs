// Backtracking execution over a frozen automaton.
// Origin: SimpleFSADebugContext.java:105-185 (step, backtrack, offsets)

use std::iter::FusedIterator;

use log::{debug, trace};
use phonex_core::PhoneticElement;

use crate::FsaError;
use crate::config::{ExecConfig, Frame, SearchStack};
use crate::frozen::{Choice, FrozenFsa};
use crate::result::PhonexMatch;
use crate::transition::{Guard, MatchOffset, TransitionKind};

/// Runs a [`FrozenFsa`] over one input sequence.
///
/// The executor owns the search stack and reuses it across attempts, so
/// scanning many start positions allocates only once.
///
/// The search is depth-first and reports the first accepting path in
/// priority order; transition kinds decide that order. At most one match is
/// reported per attempt.
///
/// An attempt at position `p` starts consuming input at `p`. Lookbehind and
/// lookahead context is consumed like any other element but trimmed from
/// the reported range, so a match found by an attempt at `p` can begin
/// after `p`.
#[derive(Debug)]
pub struct Executor<'f, 'i> {
    fsa: &'f FrozenFsa,
    input: &'i [PhoneticElement],
    config: ExecConfig,
    stack: SearchStack,
}

impl<'f, 'i> Executor<'f, 'i> {
    pub fn new(fsa: &'f FrozenFsa, input: &'i [PhoneticElement]) -> Self {
        Self {
            fsa,
            input,
            config: ExecConfig::default(),
            stack: SearchStack::new(),
        }
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn input(&self) -> &'i [PhoneticElement] {
        self.input
    }

    /// Anchored match: a single attempt at `start`.
    pub fn match_at(&mut self, start: usize) -> Result<Option<PhonexMatch>, FsaError> {
        self.run(start, false, 0)
    }

    /// Match the whole input.
    pub fn full_match(&mut self) -> Result<Option<PhonexMatch>, FsaError> {
        self.run(0, true, 0)
    }

    /// First match starting at or after `start`.
    pub fn find_from(&mut self, start: usize) -> Result<Option<PhonexMatch>, FsaError> {
        let first_attempt = if self.fsa.has_lookbehind() { 0 } else { start };
        Ok(self.scan(first_attempt, start)?.map(|(_, m)| m))
    }

    /// Iterate over non-overlapping matches, left to right.
    pub fn into_matches(self) -> Matches<'f, 'i> {
        Matches {
            exec: self,
            attempt: Some(0),
            floor: 0,
            error: None,
        }
    }

    /// Try attempts from `first_attempt` on and return the first match that
    /// begins at or after `floor`, with the attempt that found it.
    fn scan(
        &mut self,
        first_attempt: usize,
        floor: usize,
    ) -> Result<Option<(usize, PhonexMatch)>, FsaError> {
        for pos in first_attempt..=self.input.len() {
            if let Some(m) = self.run(pos, false, floor)? {
                return Ok(Some((pos, m)));
            }
        }
        Ok(None)
    }

    fn run(
        &mut self,
        start: usize,
        require_end: bool,
        floor: usize,
    ) -> Result<Option<PhonexMatch>, FsaError> {
        let fsa = self.fsa;
        let input = self.input;
        if start > input.len() {
            return Ok(None);
        }
        let stack = &mut self.stack;
        stack.reset(fsa.group_count(), fsa.initial_state(), start);

        loop {
            stack.steps += 1;
            if let Some(limit) = self.config.step_limit {
                if stack.steps > limit {
                    debug!("step limit {limit} exhausted matching at {start}");
                    return Err(FsaError::StepLimitExceeded { limit });
                }
            }

            let Some(top) = stack.frames.last_mut() else {
                return Ok(None);
            };
            let choices = fsa.choices(top.state);
            if let Some(&choice) = choices.get(top.next_choice) {
                top.next_choice += 1;
                let Frame {
                    state,
                    pos,
                    behind,
                    ahead,
                    ..
                } = *top;
                match choice {
                    Choice::Accept => {
                        let (from, to) = (start + behind, pos - ahead);
                        if (!require_end || pos == input.len()) && from >= floor {
                            trace!("accepted [{from}, {to}) in {state}");
                            return Ok(Some(build_match(fsa, stack, from, to)));
                        }
                    }
                    Choice::Take(idx) => {
                        let transition = &fsa.transitions()[idx];
                        let spans = &stack.group_spans;
                        let Some(len) = step_length(&transition.guard, input, pos, spans) else {
                            continue;
                        };
                        // Zero-width moves must not revisit a state at the
                        // same position.
                        if len == 0 && stack.on_path_at(transition.to, pos) {
                            continue;
                        }
                        let (behind, ahead) = match transition.offset {
                            MatchOffset::Match => (behind, ahead),
                            MatchOffset::LookBehind => (behind + len, ahead),
                            MatchOffset::LookAhead => (behind, ahead + len),
                        };
                        let undo_mark = stack.undo_mark();
                        stack.apply_groups(transition, pos, pos + len);
                        stack.frames.push(Frame {
                            state: transition.to,
                            pos: pos + len,
                            next_choice: 0,
                            via: Some(idx),
                            undo_mark,
                            behind,
                            ahead,
                            completed: fsa.is_commit_point(transition.to),
                        });
                    }
                }
                continue;
            }

            // Every choice at the top frame failed: backtrack.
            let Some(frame) = stack.frames.pop() else {
                return Ok(None);
            };
            stack.rollback(frame.undo_mark);
            if !frame.completed {
                // An unfinished iteration just fails; its source keeps its
                // remaining choices.
                continue;
            }
            let possessive = frame
                .via
                .is_some_and(|idx| fsa.transitions()[idx].kind == TransitionKind::Possessive);
            if let Some(parent) = stack.frames.last_mut() {
                parent.completed = true;
                if possessive {
                    // A completed possessive step is never given back.
                    parent.next_choice = usize::MAX;
                }
            }
        }
    }
}

/// Elements consumed by taking `guard` at `pos`, or `None` if it cannot be
/// taken there.
fn step_length(
    guard: &Guard,
    input: &[PhoneticElement],
    pos: usize,
    spans: &[Option<(usize, usize)>],
) -> Option<usize> {
    match guard {
        Guard::Epsilon => Some(0),
        Guard::Matcher { .. } => {
            let element = input.get(pos)?;
            guard.matches_element(element).then_some(1)
        }
        Guard::BackReference { group, secondary } => {
            let (start, end) = spans.get(*group).copied().flatten()?;
            let captured = &input[start..end];
            let candidate = input.get(pos..pos + captured.len())?;
            let same = captured == candidate
                && candidate
                    .iter()
                    .all(|e| secondary.iter().all(|m| m.matches(e)));
            same.then_some(captured.len())
        }
    }
}

fn build_match(fsa: &FrozenFsa, stack: &SearchStack, start: usize, end: usize) -> PhonexMatch {
    let mut groups: Vec<_> = stack
        .group_spans
        .iter()
        .map(|span| span.map(|(s, e)| s..e))
        .collect();
    groups[0] = Some(start..end);
    PhonexMatch::new(groups, fsa.group_name_table().clone())
}

/// Iterator over successive non-overlapping matches.
///
/// Each match begins at or after the end of the previous one; after an
/// empty match, one element further on. If a step limit is configured and
/// exhausted, iteration ends and the error is available from
/// [`error`](Self::error).
#[derive(Debug)]
pub struct Matches<'f, 'i> {
    exec: Executor<'f, 'i>,
    /// First attempt position of the next scan; `None` once exhausted.
    attempt: Option<usize>,
    /// Earliest position the next match may begin at.
    floor: usize,
    error: Option<FsaError>,
}

impl Matches<'_, '_> {
    /// The error that ended iteration early, if any.
    pub fn error(&self) -> Option<&FsaError> {
        self.error.as_ref()
    }
}

impl Iterator for Matches<'_, '_> {
    type Item = PhonexMatch;

    fn next(&mut self) -> Option<PhonexMatch> {
        let first_attempt = self.attempt?;
        match self.exec.scan(first_attempt, self.floor) {
            Ok(Some((attempt, m))) => {
                self.floor = if m.is_empty() { m.end() + 1 } else { m.end() };
                // Attempts before `attempt` found nothing at the old floor,
                // so they cannot succeed at a higher one.
                self.attempt = Some(if self.exec.fsa.has_lookbehind() {
                    attempt
                } else {
                    self.floor
                });
                Some(m)
            }
            Ok(None) => {
                self.attempt = None;
                None
            }
            Err(err) => {
                self.attempt = None;
                self.error = Some(err);
                None
            }
        }
    }
}

impl FusedIterator for Matches<'_, '_> {}

/// Convenience entry points. These run without a step limit; use
/// [`executor`](FrozenFsa::executor) with an [`ExecConfig`] to bound the
/// search.
impl FrozenFsa {
    pub fn executor<'f, 'i>(&'f self, input: &'i [PhoneticElement]) -> Executor<'f, 'i> {
        Executor::new(self, input)
    }

    /// Anchored match starting at `start`.
    pub fn match_at(&self, input: &[PhoneticElement], start: usize) -> Option<PhonexMatch> {
        self.executor(input).match_at(start).ok().flatten()
    }

    /// Non-overlapping matches over the whole input.
    pub fn match_all<'f, 'i>(&'f self, input: &'i [PhoneticElement]) -> Matches<'f, 'i> {
        self.executor(input).into_matches()
    }

    /// Match that spans the whole input.
    pub fn full_match(&self, input: &[PhoneticElement]) -> Option<PhonexMatch> {
        self.executor(input).full_match().ok().flatten()
    }

    /// Leftmost match anywhere in the input.
    pub fn find_first(&self, input: &[PhoneticElement]) -> Option<PhonexMatch> {
        self.executor(input).find_from(0).ok().flatten()
    }

    pub fn is_match(&self, input: &[PhoneticElement]) -> bool {
        self.find_first(input).is_some()
    }
}
