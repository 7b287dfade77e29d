// Execution configuration and the backtracking search stack.
// Origin: SimpleFSADebugContext.java (machine state, decision stack)

use crate::transition::{StateId, Transition};

/// Tunables for a match attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecConfig {
    /// Maximum number of search steps per match attempt. `None` means
    /// unbounded; exceeding the limit aborts the attempt with
    /// [`FsaError::StepLimitExceeded`](crate::FsaError::StepLimitExceeded).
    pub step_limit: Option<u64>,
}

impl ExecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration capped at [`DEFAULT_STEP_LIMIT`](crate::DEFAULT_STEP_LIMIT).
    pub fn bounded() -> Self {
        Self::with_step_limit(crate::DEFAULT_STEP_LIMIT)
    }

    pub fn with_step_limit(limit: u64) -> Self {
        Self {
            step_limit: Some(limit),
        }
    }
}

/// One level of the explicit depth-first search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub state: StateId,
    /// Input position reached at this state.
    pub pos: usize,
    /// Next entry of the state's choice plan to try.
    pub next_choice: usize,
    /// Transition taken to reach this frame; `None` for the root.
    pub via: Option<usize>,
    /// Undo log length before `via`'s group updates were applied.
    pub undo_mark: usize,
    /// Lookbehind elements consumed on the path so far.
    pub behind: usize,
    /// Lookahead elements consumed on the path so far.
    pub ahead: usize,
    /// Set once the search below this frame has passed a commit point.
    pub completed: bool,
}

impl Frame {
    pub fn root(state: StateId, pos: usize) -> Self {
        Self {
            state,
            pos,
            next_choice: 0,
            via: None,
            undo_mark: 0,
            behind: 0,
            ahead: 0,
            completed: false,
        }
    }
}

/// Mutable state of one match attempt.
///
/// Group spans are updated in place while descending; every update records
/// the previous span in an undo log so backtracking restores it exactly.
#[derive(Debug, Default)]
pub(crate) struct SearchStack {
    pub frames: Vec<Frame>,
    /// Span of each group indexed by group number; slot 0 is unused.
    pub group_spans: Vec<Option<(usize, usize)>>,
    undo: Vec<(usize, Option<(usize, usize)>)>,
    pub steps: u64,
}

impl SearchStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for an attempt starting at `start` in `initial`.
    pub fn reset(&mut self, group_count: usize, initial: StateId, start: usize) {
        self.frames.clear();
        self.undo.clear();
        self.group_spans.clear();
        self.group_spans.resize(group_count + 1, None);
        self.steps = 0;
        self.frames.push(Frame::root(initial, start));
    }

    #[inline]
    pub fn undo_mark(&self) -> usize {
        self.undo.len()
    }

    fn set_span(&mut self, group: usize, span: (usize, usize)) {
        if let Some(slot) = self.group_spans.get_mut(group) {
            self.undo.push((group, *slot));
            *slot = Some(span);
        }
    }

    /// Apply the group effects of taking `transition` over `[from, to)`.
    ///
    /// Init groups restart at `from`; continuation groups keep their start
    /// and move their end to `to`, starting at `from` if still unset.
    pub fn apply_groups(&mut self, transition: &Transition, from: usize, to: usize) {
        for &g in &transition.init_groups {
            self.set_span(g, (from, to));
        }
        for &g in &transition.continuation_groups {
            let start = self
                .group_spans
                .get(g)
                .copied()
                .flatten()
                .map_or(from, |(start, _)| start);
            self.set_span(g, (start, to));
        }
    }

    /// Undo every group update recorded after `mark`.
    pub fn rollback(&mut self, mark: usize) {
        while self.undo.len() > mark {
            if let Some((group, previous)) = self.undo.pop() {
                self.group_spans[group] = previous;
            }
        }
    }

    /// Returns `true` if `state` is already on the current path at `pos`.
    ///
    /// Positions never decrease along the path, so only the trailing frames
    /// at `pos` need checking.
    pub fn on_path_at(&self, state: StateId, pos: usize) -> bool {
        self.frames
            .iter()
            .rev()
            .take_while(|f| f.pos == pos)
            .any(|f| f.state == state)
    }
}
