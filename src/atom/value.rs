/// A typed payload attached to an atom under a key.
///
/// The set of variants is closed; each one has a fixed textual tag in the
/// wire format (see `codec`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `(FloatValue d1 d2 ...)`
    Float(Vec<f64>),
    /// `(LinkValue (child1)(child2)...)`, children may nest.
    Link(Vec<Value>),
    /// `(StringValue "s1" "s2" ...)`
    String(Vec<String>),
    /// `(stv strength confidence)`
    SimpleTruth { strength: f64, confidence: f64 },
    /// `(CountTruthValue strength confidence count)`
    CountTruth {
        strength: f64,
        confidence: f64,
        count: f64,
    },
}

impl Value {
    pub fn stv(strength: f64, confidence: f64) -> Self {
        Self::SimpleTruth {
            strength,
            confidence,
        }
    }

    pub fn ctv(strength: f64, confidence: f64, count: f64) -> Self {
        Self::CountTruth {
            strength,
            confidence,
            count,
        }
    }

    pub fn strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::String(items.into_iter().map(Into::into).collect())
    }

    /// The tag this variant is written with.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "FloatValue",
            Value::Link(_) => "LinkValue",
            Value::String(_) => "StringValue",
            Value::SimpleTruth { .. } => "SimpleTruthValue",
            Value::CountTruth { .. } => "CountTruthValue",
        }
    }
}
