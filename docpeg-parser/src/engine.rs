//! Backtracking PEG combinator interpreter.
//!
//! A [`Machine`] threads two pieces of state through every match attempt:
//! a cursor into the source chars and a value stack holding AST nodes
//! under construction interleaved with bookkeeping offsets. Combinators
//! either advance the cursor and/or mutate the stack, or fail having
//! restored both to their pre-attempt snapshot. That rollback guarantee
//! is what every grammar rule relies on.
//!
//! Rollback restores the stack by truncating to the snapshot depth, which
//! is sound under the discipline every rule here follows: a failing
//! attempt may only pop values it pushed itself. Mutating a parent that
//! was pushed before the attempt (via [`Machine::add_as_child`]) is only
//! done in positions where the attempt can no longer fail, or where the
//! parent itself is discarded by the same rollback.
//!
//! Outcomes travel on two channels. `Ok(bool)` is ordinary rule-local
//! match/mismatch, endlessly produced and absorbed by ordered choice.
//! [`Halt`] aborts the whole parse: a timeout or a stack-discipline
//! violation propagates through every enclosing combinator via `?` and is
//! never retried.

use std::time::{Duration, Instant};

use crate::model::Node;

/// Abnormal termination of an entire parse, distinct from rule mismatch
/// so that ordered choice can never absorb it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Halt {
    /// The wall-clock budget was exceeded.
    Timeout,
    /// The value stack no longer matches what the grammar promised
    /// (a grammar bug, surfaced to the caller as an internal error).
    Corrupted(&'static str),
}

/// Result of one match attempt: `Ok(true)` matched, `Ok(false)` did not.
pub(crate) type Step = Result<bool, Halt>;

/// A value on the shared parse stack.
#[derive(Debug)]
pub(crate) enum Value {
    /// An AST node under construction.
    Node(Node),
    /// A saved cursor offset (span bookkeeping for `node_seq`).
    Marker(usize),
}

/// Cursor + stack snapshot taken before an attempt.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    pos: usize,
    depth: usize,
}

/// The state of one in-flight parse. Owned exclusively by that parse;
/// create a fresh machine per concurrent parse.
pub(crate) struct Machine<'src> {
    src: &'src [char],
    pos: usize,
    stack: Vec<Value>,
    started: Instant,
    budget: Duration,
}

impl<'src> Machine<'src> {
    pub(crate) fn new(src: &'src [char], budget: Duration) -> Self {
        Self {
            src,
            pos: 0,
            stack: Vec::new(),
            started: Instant::now(),
            budget,
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn into_stack(self) -> Vec<Value> {
        self.stack
    }

    /// The source chars matched since `from`, as a string.
    pub(crate) fn matched_text(&self, from: usize) -> String {
        self.src
            .get(from..self.pos)
            .map_or_else(String::new, |chars| chars.iter().collect())
    }

    /// Up to `max` chars of upcoming input, for error context.
    pub(crate) fn context_snippet(&self, max: usize) -> String {
        self.src.iter().skip(self.pos).take(max).collect()
    }

    /// Raises [`Halt::Timeout`] once the budget is spent. Called before
    /// every atomic inline unit.
    pub(crate) fn check_deadline(&self) -> Result<(), Halt> {
        if self.started.elapsed() > self.budget {
            return Err(Halt::Timeout);
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            depth: self.stack.len(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) -> Result<(), Halt> {
        if self.stack.len() < snapshot.depth {
            return Err(Halt::Corrupted("attempt popped values it did not push"));
        }
        self.stack.truncate(snapshot.depth);
        self.pos = snapshot.pos;
        Ok(())
    }

    fn peek_char(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }
}

/// Atomic matchers. These cannot halt on their own but return [`Step`]
/// so they compose with the combinators above.
#[allow(clippy::unnecessary_wraps)]
impl Machine<'_> {
    /// Consume one char, any char.
    pub(crate) fn any_char(&mut self) -> Step {
        if self.peek_char().is_some() {
            self.pos += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume `expected` if it matches exactly. Atomic: consumes all of
    /// it or nothing.
    pub(crate) fn literal(&mut self, expected: &str) -> Step {
        let len = expected.chars().count();
        let Some(window) = self.src.get(self.pos..self.pos + len) else {
            return Ok(false);
        };
        if window.iter().copied().eq(expected.chars()) {
            self.pos += len;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume one specific char.
    pub(crate) fn eat(&mut self, expected: char) -> Step {
        if self.peek_char() == Some(expected) {
            self.pos += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume one char drawn from `set`.
    pub(crate) fn any_of(&mut self, set: &str) -> Step {
        match self.peek_char() {
            Some(c) if set.contains(c) => {
                self.pos += 1;
                Ok(true)
            }
            Some(_) | None => Ok(false),
        }
    }

    /// Consume a run of at least `n` repeats of `c`, then as many more as
    /// are present. Atomic: a shorter run consumes nothing.
    pub(crate) fn n_or_more(&mut self, c: char, n: usize) -> Step {
        let run = self
            .src
            .get(self.pos..)
            .map_or(0, |rest| rest.iter().take_while(|&&x| x == c).count());
        if run < n {
            return Ok(false);
        }
        self.pos += run;
        Ok(true)
    }
}

// ----- combinators and stack operations ---------------------------------

impl Machine<'_> {
    /// Run `rule`; on mismatch restore cursor and stack to the snapshot.
    /// A [`Halt`] propagates untouched; it is not subject to rollback.
    pub(crate) fn attempt(&mut self, rule: impl FnOnce(&mut Self) -> Step) -> Step {
        let snapshot = self.snapshot();
        if rule(self)? {
            return Ok(true);
        }
        self.restore(snapshot)?;
        Ok(false)
    }

    /// Greedily repeat `rule` until it fails; the failing attempt is
    /// rolled back. Always succeeds.
    pub(crate) fn zero_or_more(&mut self, mut rule: impl FnMut(&mut Self) -> Step) -> Step {
        loop {
            let before = self.snapshot();
            if !self.attempt(&mut rule)? {
                return Ok(true);
            }
            if self.pos == before.pos && self.stack.len() == before.depth {
                return Err(Halt::Corrupted("repetition matched without progress"));
            }
        }
    }

    /// Like [`Machine::zero_or_more`] but requires at least one match.
    pub(crate) fn one_or_more(&mut self, mut rule: impl FnMut(&mut Self) -> Step) -> Step {
        if !self.attempt(&mut rule)? {
            return Ok(false);
        }
        self.zero_or_more(rule)
    }

    /// One attempt at `rule`; always succeeds, keeping side effects only
    /// if the rule matched.
    pub(crate) fn optional(&mut self, rule: impl FnOnce(&mut Self) -> Step) -> Step {
        self.attempt(rule)?;
        Ok(true)
    }

    /// Positive lookahead: report whether `rule` matches here, restoring
    /// cursor and stack regardless of the outcome.
    pub(crate) fn test(&mut self, rule: impl FnOnce(&mut Self) -> Step) -> Step {
        let snapshot = self.snapshot();
        let matched = rule(self)?;
        self.restore(snapshot)?;
        Ok(matched)
    }

    /// Negative lookahead: succeeds iff `rule` does not match here.
    /// Never consumes input or mutates the tree.
    pub(crate) fn test_not(&mut self, rule: impl FnOnce(&mut Self) -> Step) -> Step {
        Ok(!self.test(rule)?)
    }

    // ----- value stack --------------------------------------------------

    pub(crate) fn push_node(&mut self, node: Node) {
        self.stack.push(Value::Node(node));
    }

    pub(crate) fn push_marker(&mut self, offset: usize) {
        self.stack.push(Value::Marker(offset));
    }

    pub(crate) fn pop_node(&mut self) -> Result<Node, Halt> {
        match self.stack.pop() {
            Some(Value::Node(node)) => Ok(node),
            Some(Value::Marker(_)) => Err(Halt::Corrupted("expected a node on top, found a marker")),
            None => Err(Halt::Corrupted("expected a node on an empty stack")),
        }
    }

    pub(crate) fn pop_marker(&mut self) -> Result<usize, Halt> {
        match self.stack.pop() {
            Some(Value::Marker(offset)) => Ok(offset),
            Some(Value::Node(_)) => Err(Halt::Corrupted("expected a marker on top, found a node")),
            None => Err(Halt::Corrupted("expected a marker on an empty stack")),
        }
    }

    /// Discard the top value (used to drop a trailing endline node).
    pub(crate) fn drop_top(&mut self) -> Result<(), Halt> {
        if self.stack.pop().is_none() {
            return Err(Halt::Corrupted("drop on an empty stack"));
        }
        Ok(())
    }

    /// Replace the top node in place.
    pub(crate) fn poke(&mut self, node: Node) -> Result<(), Halt> {
        match self.stack.last_mut() {
            Some(Value::Node(slot)) => {
                *slot = node;
                Ok(())
            }
            Some(Value::Marker(_)) => Err(Halt::Corrupted("poke over a marker")),
            None => Err(Halt::Corrupted("poke on an empty stack")),
        }
    }

    /// Open/inner/close span bookkeeping: push the current offset, run
    /// `inner` (which must leave exactly one node on top), then pop the
    /// offset back off and stamp the node's span as `[offset, cursor)`.
    pub(crate) fn node_seq(&mut self, inner: impl FnOnce(&mut Self) -> Step) -> Step {
        self.attempt(|m| {
            let open = m.pos;
            m.push_marker(open);
            if !inner(m)? {
                return Ok(false);
            }
            let close = m.pos;
            let mut node = m.pop_node()?;
            let start = m.pop_marker()?;
            let location = node.location_mut();
            location.start = start;
            location.end = close;
            m.push_node(node);
            Ok(true)
        })
    }

    /// Pop the top node and attach it to the node beneath. Adjacent text
    /// leaves merge instead of sitting side by side: if both the child
    /// and the parent's current last child are [`Text`], the buffers are
    /// concatenated and the child discarded.
    pub(crate) fn add_as_child(&mut self) -> Result<(), Halt> {
        let child = self.pop_node()?;
        let parent = match self.stack.last_mut() {
            Some(Value::Node(node)) => node,
            Some(Value::Marker(_)) => {
                return Err(Halt::Corrupted("add_as_child: parent slot holds a marker"));
            }
            None => return Err(Halt::Corrupted("add_as_child: no parent on the stack")),
        };
        let Some(children) = parent.children_mut() else {
            return Err(Halt::Corrupted("add_as_child: parent cannot hold children"));
        };
        if let (Node::Text(incoming), Some(Node::Text(last))) = (&child, children.last_mut()) {
            last.append(incoming);
            return Ok(());
        }
        children.push(child);
        Ok(())
    }
}
