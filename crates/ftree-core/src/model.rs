//! Fault-tree vertices and edges as supplied by the editor snapshot.
//!
//! # Node kinds
//!
//! The editor encodes node behaviour in a `type` string:
//!
//! | `type`          | Meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `gate-and`      | AND gate                                  |
//! | `gate-or`       | OR gate                                   |
//! | `gate-*`        | any other gate, analysed as OR            |
//! | `event-circle`  | basic event, uses `probability`           |
//! | `event-oval`    | conditional event, uses `conditionProbability` |
//! | anything else   | intermediate event, may carry `logicGate` |
//!
//! The string is parsed into [`NodeKind`] and the effective gate into
//! [`Gate`] exactly once, when the node is deserialized or constructed.
//! Traversal never re-inspects strings.

#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};

const GATE_PREFIX: &str = "gate-";
const GATE_AND: &str = "gate-and";
const GATE_OR: &str = "gate-or";
const EVENT_CIRCLE: &str = "event-circle";
const EVENT_OVAL: &str = "event-oval";

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Logic used to combine the cut sets of a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gate {
    /// All children must fail together.
    And,
    /// Any single child failing is sufficient.
    Or,
}

impl Gate {
    /// Resolve the effective gate for a node.
    ///
    /// Gate-typed nodes decide by their type alone, so a `gate-xor` node
    /// is an OR gate even when it carries `logicGate: "AND"`. Other nodes
    /// fall back to `logicGate`, and finally to OR.
    #[must_use]
    pub fn resolve(kind: &NodeKind, logic_gate: Option<&str>) -> Self {
        match kind {
            NodeKind::GateAnd => Self::And,
            NodeKind::GateOr | NodeKind::OtherGate(_) => Self::Or,
            _ => match logic_gate {
                Some("AND" | GATE_AND) => Self::And,
                _ => Self::Or,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Parsed form of a node's `type` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    GateAnd,
    GateOr,
    /// A `gate-*` type other than AND/OR. The type string is kept.
    OtherGate(String),
    /// `event-circle`: a basic (bottom) event.
    BasicEvent,
    /// `event-oval`: a conditional event.
    ConditionalEvent,
    /// Intermediate or unrecognised node. `None` when `type` was absent.
    Intermediate(Option<String>),
}

impl NodeKind {
    /// Parse the editor's `type` field.
    #[must_use]
    pub fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some(GATE_AND) => Self::GateAnd,
            Some(GATE_OR) => Self::GateOr,
            Some(EVENT_CIRCLE) => Self::BasicEvent,
            Some(EVENT_OVAL) => Self::ConditionalEvent,
            Some(other) if other.starts_with(GATE_PREFIX) => Self::OtherGate(other.to_string()),
            Some(other) => Self::Intermediate(Some(other.to_string())),
            None => Self::Intermediate(None),
        }
    }

    /// The `type` string this kind was parsed from.
    #[must_use]
    pub fn as_type(&self) -> Option<&str> {
        match self {
            Self::GateAnd => Some(GATE_AND),
            Self::GateOr => Some(GATE_OR),
            Self::BasicEvent => Some(EVENT_CIRCLE),
            Self::ConditionalEvent => Some(EVENT_OVAL),
            Self::OtherGate(s) => Some(s),
            Self::Intermediate(s) => s.as_deref(),
        }
    }

    /// Basic and conditional events terminate cut-set expansion.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self, Self::BasicEvent | Self::ConditionalEvent)
    }
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Classification of leaf events in analysis output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// `event-circle`.
    Basic,
    /// `event-oval`.
    Conditional,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Conditional => "conditional",
        }
    }
}

// ---------------------------------------------------------------------------
// ProbabilityValue
// ---------------------------------------------------------------------------

/// A probability exactly as the editor stored it.
///
/// Form inputs are frequently persisted as text, so both JSON numbers and
/// numeric strings are accepted. Any other JSON value is kept verbatim and
/// reads as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbabilityValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl ProbabilityValue {
    /// Numeric reading of the stored value.
    ///
    /// Text is read by its longest leading decimal prefix (`"0.2 per h"`
    /// reads as `0.2`). Returns `None` when nothing numeric can be read.
    #[must_use]
    pub fn parse(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_nan() => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_leading_float(s),
            Self::Other(_) => None,
        }
    }
}

impl From<f64> for ProbabilityValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ProbabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parse the longest leading decimal literal of `s`, after leading
/// whitespace. Accepts an optional sign, digits with an optional fraction,
/// an optional exponent, and the literal `Infinity`.
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A vertex in the fault tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct Node {
    /// Stable identifier, unique within a snapshot.
    pub id: String,
    pub kind: NodeKind,
    /// Display name, conventionally `X<n>` for basic events.
    pub label: Option<String>,
    /// Active for every kind except conditional events.
    pub probability: Option<ProbabilityValue>,
    /// Active for conditional events.
    pub condition_probability: Option<ProbabilityValue>,
    /// Raw `logicGate` field, retained for round-tripping.
    pub logic_gate: Option<String>,
    /// Effective gate, resolved once from `kind` and `logic_gate`.
    pub gate: Gate,
}

impl Node {
    /// Build a node from its editor fields.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        let gate = Gate::resolve(&kind, None);
        Self {
            id: id.into(),
            kind,
            label: None,
            probability: None,
            condition_probability: None,
            logic_gate: None,
            gate,
        }
    }

    /// An `event-circle` node with a numeric probability.
    #[must_use]
    pub fn basic_event(id: impl Into<String>, label: impl Into<String>, probability: f64) -> Self {
        Self::new(id, NodeKind::BasicEvent)
            .with_label(label)
            .with_probability(probability)
    }

    /// An `event-oval` node with a numeric condition probability.
    #[must_use]
    pub fn conditional_event(
        id: impl Into<String>,
        label: impl Into<String>,
        condition_probability: f64,
    ) -> Self {
        let mut node = Self::new(id, NodeKind::ConditionalEvent).with_label(label);
        node.condition_probability = Some(ProbabilityValue::Number(condition_probability));
        node
    }

    /// A `gate-and` or `gate-or` node.
    #[must_use]
    pub fn gate(id: impl Into<String>, gate: Gate) -> Self {
        let kind = match gate {
            Gate::And => NodeKind::GateAnd,
            Gate::Or => NodeKind::GateOr,
        };
        Self::new(id, kind)
    }

    /// An intermediate event whose logic comes from `logicGate`.
    #[must_use]
    pub fn intermediate(id: impl Into<String>, kind: &str, logic_gate: Option<&str>) -> Self {
        let mut node = Self::new(id, NodeKind::from_type(Some(kind)));
        node.logic_gate = logic_gate.map(str::to_string);
        node.gate = Gate::resolve(&node.kind, node.logic_gate.as_deref());
        node
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_probability(mut self, probability: impl Into<ProbabilityValue>) -> Self {
        self.probability = Some(probability.into());
        self
    }

    /// Whether this node is a basic or conditional event.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        self.kind.is_event()
    }

    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(self.kind, NodeKind::ConditionalEvent)
    }

    /// Event classification, `None` for gates and intermediate nodes.
    #[must_use]
    pub const fn event_kind(&self) -> Option<EventKind> {
        match self.kind {
            NodeKind::BasicEvent => Some(EventKind::Basic),
            NodeKind::ConditionalEvent => Some(EventKind::Conditional),
            _ => None,
        }
    }

    /// The probability field selected by this node's kind.
    #[must_use]
    pub const fn probability_field(&self) -> Option<&ProbabilityValue> {
        if self.is_conditional() {
            self.condition_probability.as_ref()
        } else {
            self.probability.as_ref()
        }
    }

    /// Numeric reading of the active probability field, unfiltered.
    /// Missing or unparsable values read as `0.0`.
    #[must_use]
    pub fn raw_probability(&self) -> f64 {
        self.probability_field()
            .and_then(ProbabilityValue::parse)
            .unwrap_or(0.0)
    }

    /// The active probability when it can take part in a product:
    /// present, numeric and strictly positive.
    #[must_use]
    pub fn effective_probability(&self) -> Option<f64> {
        self.probability_field()
            .and_then(ProbabilityValue::parse)
            .filter(|p| *p > 0.0)
    }

    /// Label, or the id when the label is missing or empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.id)
    }

    /// Numeric ordinal of an `X<n>` label, `0` when absent or non-numeric.
    ///
    /// The first `X` is removed and the leading integer of the remainder is
    /// read, so `X12b` sorts as 12 and `Pump` as 0.
    #[must_use]
    pub fn label_ordinal(&self) -> i64 {
        self.label.as_deref().map_or(0, label_ordinal)
    }
}

fn label_ordinal(label: &str) -> i64 {
    let stripped = label.replacen('X', "", 1);
    let s = stripped.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative { -value } else { value }
}

/// Wire shape of a node, with camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    probability: Option<ProbabilityValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition_probability: Option<ProbabilityValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logic_gate: Option<String>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let kind = NodeKind::from_type(raw.kind.as_deref());
        let gate = Gate::resolve(&kind, raw.logic_gate.as_deref());
        Self {
            id: raw.id,
            kind,
            label: raw.label,
            probability: raw.probability,
            condition_probability: raw.condition_probability,
            logic_gate: raw.logic_gate,
            gate,
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        Self {
            kind: node.kind.as_type().map(str::to_string),
            id: node.id,
            label: node.label,
            probability: node.probability,
            condition_probability: node.condition_probability,
            logic_gate: node.logic_gate,
        }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A drawn edge between two node ids.
///
/// Usually `from` feeds into `to`. Conditional events are drawn pointing at
/// the gate they condition, so an edge whose `from` is an `event-oval`
/// is read in reverse (see [`crate::index`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

impl Connection {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}
