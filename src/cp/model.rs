//! Constraint model handed to the exact solver.
//!
//! The vocabulary is the one of interval-based scheduling: integer start
//! variables, boolean presence literals, optional fixed-size intervals tied to
//! both, and constraints over them.

use super::StartDomain;

/// Integer variable handle.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IntVar(pub(super) usize);

/// Boolean variable handle.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BoolVar(pub(super) usize);

/// Optional interval handle.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IntervalVar(pub(super) usize);

impl IntVar {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl BoolVar {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl IntervalVar {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An interval `[start, start + size)` that only exists while `presence` is true.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionalInterval {
    pub name: String,
    pub start: IntVar,
    pub size: u64,
    pub presence: BoolVar,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// Exactly one literal is true.
    ExactlyOne(Vec<BoolVar>),
    /// Present intervals are pairwise disjoint.
    NoOverlap(Vec<IntervalVar>),
    /// `before + delay <= after`.
    Precedence {
        before: IntVar,
        after: IntVar,
        delay: u64,
    },
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Goal {
    /// Nothing to minimize, any assignment is optimal.
    #[default]
    Satisfy,
    /// Minimize the sum of the variables.
    MinimizeSum(Vec<IntVar>),
    /// Minimize the largest `var + offset`.
    MinimizeMaxEnd(Vec<(IntVar, u64)>),
}

/// A constraint optimization model over start times and machine presence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Model {
    name: String,
    int_vars: Vec<(String, StartDomain)>,
    bool_vars: Vec<String>,
    intervals: Vec<OptionalInterval>,
    constraints: Vec<Constraint>,
    goal: Goal,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn new_int_var(&mut self, name: impl Into<String>, domain: StartDomain) -> IntVar {
        self.int_vars.push((name.into(), domain));
        IntVar(self.int_vars.len() - 1)
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.bool_vars.push(name.into());
        BoolVar(self.bool_vars.len() - 1)
    }

    pub fn new_optional_interval(
        &mut self,
        name: impl Into<String>,
        start: IntVar,
        size: u64,
        presence: BoolVar,
    ) -> IntervalVar {
        self.intervals.push(OptionalInterval {
            name: name.into(),
            start,
            size,
            presence,
        });
        IntervalVar(self.intervals.len() - 1)
    }

    pub fn add_exactly_one(&mut self, literals: Vec<BoolVar>) {
        self.constraints.push(Constraint::ExactlyOne(literals));
    }

    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalVar>) {
        self.constraints.push(Constraint::NoOverlap(intervals));
    }

    pub fn add_precedence(&mut self, before: IntVar, after: IntVar, delay: u64) {
        self.constraints.push(Constraint::Precedence {
            before,
            after,
            delay,
        });
    }

    pub fn minimize(&mut self, goal: Goal) {
        self.goal = goal;
    }

    #[must_use]
    pub fn int_var_name(&self, var: IntVar) -> &str {
        &self.int_vars[var.0].0
    }

    #[must_use]
    pub fn domain(&self, var: IntVar) -> StartDomain {
        self.int_vars[var.0].1
    }

    #[must_use]
    pub fn interval(&self, var: IntervalVar) -> &OptionalInterval {
        &self.intervals[var.0]
    }

    pub fn intervals(&self) -> impl ExactSizeIterator<Item = (IntervalVar, &OptionalInterval)> {
        self.intervals.iter().enumerate().map(|(i, interval)| (IntervalVar(i), interval))
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub const fn goal(&self) -> &Goal {
        &self.goal
    }

    #[must_use]
    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    #[must_use]
    pub fn bool_var_count(&self) -> usize {
        self.bool_vars.len()
    }

    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }
}
