//! Typed configuration tree of a module.
//!
//! A module owns one root [`ValueGroup`]. Nodes are addressed by `/`-separated, case-insensitive
//! paths (`"Left/CPS"`). Enabling or disabling the module walks the tree and restarts or stops
//! the active member of every [`ChoiceGroup`] it reaches.

use crate::error::KernelError;
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

const PATH_SEPARATOR: char = '/';
const ENABLED_KEY: &str = "enabled";
const VALUES_KEY: &str = "values";

#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Boolean(bool),
    Range(RangeValue),
    Choice(ChoiceGroup),
    Group(ValueGroup),
}

/// An integer interval constrained to fixed bounds (e.g. clicks per second).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeValue {
    low: i32,
    high: i32,
    bounds: RangeInclusive<i32>,
}

impl RangeValue {
    /// # Panics
    /// Panics if the default does not lie within `bounds`; defaults are compile-time constants.
    #[must_use]
    pub fn new(default: RangeInclusive<i32>, bounds: RangeInclusive<i32>) -> Self {
        assert!(
            bounds.contains(default.start()) && bounds.contains(default.end()),
            "default range must lie within bounds"
        );
        Self { low: *default.start(), high: *default.end(), bounds }
    }

    pub const fn low(&self) -> i32 {
        self.low
    }

    pub const fn high(&self) -> i32 {
        self.high
    }

    pub const fn get(&self) -> RangeInclusive<i32> {
        self.low..=self.high
    }

    /// # Errors
    /// Returns [`KernelError::InvalidValue`] for an inverted or out-of-bounds interval.
    pub fn set(&mut self, low: i32, high: i32) -> Result<(), KernelError> {
        if low > high || !self.bounds.contains(&low) || !self.bounds.contains(&high) {
            return Err(KernelError::InvalidValue {
                message: format!(
                    "{low}..={high} is not within {}..={}",
                    self.bounds.start(),
                    self.bounds.end()
                )
                .into(),
                context: None,
            });
        }
        self.low = low;
        self.high = high;
        Ok(())
    }
}

/// A member of a [`ChoiceGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    name: String,
    running: bool,
}

impl Choice {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this member is currently started.
    pub const fn is_running(&self) -> bool {
        self.running
    }
}

/// Mutually exclusive sub-behaviours; exactly one is active, and it runs while the parent runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceGroup {
    choices: Vec<Choice>,
    active: usize,
    running: bool,
}

impl ChoiceGroup {
    /// # Panics
    /// Panics if `names` is empty or `default` is not one of them.
    #[must_use]
    pub fn new(names: &[&str], default: &str) -> Self {
        let active = names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(default))
            .unwrap_or_else(|| panic!("default choice '{default}' is not one of {names:?}"));
        let choices =
            names.iter().map(|n| Choice { name: (*n).to_owned(), running: false }).collect();
        Self { choices, active, running: false }
    }

    pub fn active(&self) -> &Choice {
        &self.choices[self.active]
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Starts or stops the active member, following the parent's state.
    pub fn new_state(&mut self, state: bool) {
        self.running = state;
        for (i, choice) in self.choices.iter_mut().enumerate() {
            choice.running = state && i == self.active;
        }
    }

    /// Switches the active member. A running group stops the old member and starts the new one.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidValue`] if no member is called `name`.
    pub fn select(&mut self, name: &str) -> Result<(), KernelError> {
        let index = self
            .choices
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| KernelError::InvalidValue {
                message: format!("no choice named '{name}'").into(),
                context: None,
            })?;
        self.active = index;
        let running = self.running;
        self.new_state(running);
        Ok(())
    }
}

/// Named, ordered children. A toggleable group carries its own enabled flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueGroup {
    enabled: Option<bool>,
    entries: Vec<(String, ValueNode)>,
}

impl ValueGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn toggleable(enabled: bool) -> Self {
        Self { enabled: Some(enabled), entries: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, node: ValueNode) -> Self {
        self.entries.push((name.into(), node));
        self
    }

    /// `true` for non-toggleable groups.
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub const fn is_toggleable(&self) -> bool {
        self.enabled.is_some()
    }

    /// Flips a toggleable group; choices below it follow `parent_running && enabled`.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidValue`] if the group is not toggleable.
    pub fn set_enabled(&mut self, enabled: bool, parent_running: bool) -> Result<(), KernelError> {
        let Some(flag) = self.enabled.as_mut() else {
            return Err(KernelError::InvalidValue {
                message: "group is not toggleable".into(),
                context: None,
            });
        };
        *flag = enabled;
        self.new_state(parent_running);
        Ok(())
    }

    /// Propagates the owner's running state to every nested choice group.
    pub fn new_state(&mut self, state: bool) {
        let state = state && self.enabled();
        for (_, node) in &mut self.entries {
            match node {
                ValueNode::Choice(choices) => choices.new_state(state),
                ValueNode::Group(group) => group.new_state(state),
                ValueNode::Boolean(_) | ValueNode::Range(_) => {},
            }
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ValueNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, path: &str) -> Option<&ValueNode> {
        let (head, rest) = split(path);
        let node = self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(head)).map(|(_, v)| v)?;
        match (rest, node) {
            (None, node) => Some(node),
            (Some(rest), ValueNode::Group(group)) => group.get(rest),
            (Some(_), _) => None,
        }
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut ValueNode> {
        let (head, rest) = split(path);
        let node = self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(head))
            .map(|(_, v)| v)?;
        match (rest, node) {
            (None, node) => Some(node),
            (Some(rest), ValueNode::Group(group)) => group.get_mut(rest),
            (Some(_), _) => None,
        }
    }

    pub fn boolean(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            ValueNode::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn range(&self, path: &str) -> Option<&RangeValue> {
        match self.get(path)? {
            ValueNode::Range(range) => Some(range),
            _ => None,
        }
    }

    pub fn choice(&self, path: &str) -> Option<&ChoiceGroup> {
        match self.get(path)? {
            ValueNode::Choice(choice) => Some(choice),
            _ => None,
        }
    }

    pub fn group(&self, path: &str) -> Option<&Self> {
        match self.get(path)? {
            ValueNode::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn group_mut(&mut self, path: &str) -> Option<&mut Self> {
        match self.get_mut(path)? {
            ValueNode::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Persisted form: `{"enabled": bool?, "values": {name: node}}`.
    ///
    /// Booleans map to JSON booleans, ranges to `[low, high]`, choices to the active name.
    pub fn to_json(&self) -> Value {
        let values: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, node)| {
                let value = match node {
                    ValueNode::Boolean(b) => Value::Bool(*b),
                    ValueNode::Range(r) => Value::from(vec![r.low, r.high]),
                    ValueNode::Choice(c) => Value::String(c.active().name.clone()),
                    ValueNode::Group(g) => g.to_json(),
                };
                (name.clone(), value)
            })
            .collect();

        let mut out = Map::new();
        if let Some(enabled) = self.enabled {
            out.insert(ENABLED_KEY.to_owned(), Value::Bool(enabled));
        }
        out.insert(VALUES_KEY.to_owned(), Value::Object(values));
        Value::Object(out)
    }

    /// Applies a persisted tree. Unknown names are ignored; mismatched types are errors.
    ///
    /// `running` is the owner's current state, so restored choices start or stop accordingly.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidValue`] when a stored value does not fit its node.
    pub fn restore(&mut self, json: &Value, running: bool) -> Result<(), KernelError> {
        let Value::Object(object) = json else {
            return Err(mismatch("<group>", "an object"));
        };

        if let (Some(flag), Some(stored)) = (self.enabled.as_mut(), object.get(ENABLED_KEY)) {
            *flag = stored.as_bool().ok_or_else(|| mismatch(ENABLED_KEY, "a boolean"))?;
        }
        let running = running && self.enabled();

        let Some(Value::Object(values)) = object.get(VALUES_KEY) else {
            return Ok(());
        };
        for (name, node) in &mut self.entries {
            let Some(stored) = values.get(name.as_str()) else { continue };
            match node {
                ValueNode::Boolean(b) => {
                    *b = stored.as_bool().ok_or_else(|| mismatch(name, "a boolean"))?;
                },
                ValueNode::Range(range) => {
                    let pair = stored
                        .as_array()
                        .filter(|a| a.len() == 2)
                        .and_then(|a| Some((a[0].as_i64()?, a[1].as_i64()?)))
                        .ok_or_else(|| mismatch(name, "a [low, high] pair"))?;
                    let low = i32::try_from(pair.0).map_err(|_| mismatch(name, "an i32"))?;
                    let high = i32::try_from(pair.1).map_err(|_| mismatch(name, "an i32"))?;
                    range.set(low, high)?;
                },
                ValueNode::Choice(choice) => {
                    let selected = stored.as_str().ok_or_else(|| mismatch(name, "a string"))?;
                    choice.running = running;
                    choice.select(selected)?;
                },
                ValueNode::Group(group) => group.restore(stored, running)?,
            }
        }
        Ok(())
    }
}

fn split(path: &str) -> (&str, Option<&str>) {
    match path.split_once(PATH_SEPARATOR) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

fn mismatch(name: &str, expected: &str) -> KernelError {
    KernelError::InvalidValue { message: format!("'{name}' must be {expected}").into(), context: None }
}
