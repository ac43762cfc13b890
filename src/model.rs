use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A percentage weight that distinguishes "unset" from an explicit 0.
/// The persisted convention (inherited from the original data files) is a
/// JSON number when set and the empty string when unset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Weight(pub Option<f64>);

impl Weight {
    pub fn set(v: f64) -> Self {
        Weight(Some(v))
    }

    pub fn unset() -> Self {
        Weight(None)
    }

    /// Computation view: unset weights count as 0.
    pub fn or_zero(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Weight(None)),
            serde_json::Value::Number(n) => Ok(Weight(n.as_f64())),
            serde_json::Value::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    Ok(Weight(None))
                } else {
                    // Legacy files occasionally hold numeric strings.
                    Ok(Weight(t.parse::<f64>().ok()))
                }
            }
            other => Err(de::Error::custom(format!(
                "weight must be a number or empty string, got {}",
                other
            ))),
        }
    }
}

/// One grade cell as persisted: a number, or whatever text was typed.
/// An explicit empty string means "cleared"; a missing map key means the
/// sub-item was never graded. Both coerce to 0 for computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreEntry {
    Number(f64),
    Text(String),
}

impl ScoreEntry {
    pub fn empty() -> Self {
        ScoreEntry::Text(String::new())
    }
}

/// Total coercion helper: never fails, never yields NaN. Missing entries,
/// empty cells and unparseable text all degrade silently to 0.
pub fn parse_score_or_zero(entry: Option<&ScoreEntry>) -> f64 {
    match entry {
        None => 0.0,
        Some(ScoreEntry::Number(v)) => {
            if v.is_finite() {
                *v
            } else {
                0.0
            }
        }
        Some(ScoreEntry::Text(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weight: Weight,
    // Legacy exports call these "subsections".
    #[serde(default, alias = "subsections")]
    pub sub_items: Vec<SubItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weight: Weight,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grades: HashMap<String, ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub students: Vec<Student>,
    /// Legacy two-level shape only: sections hung directly off the course.
    /// Cleared by the migrator; current-schema records never carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl SubItem {
    pub fn new(name: impl Into<String>) -> Self {
        SubItem {
            id: new_id(),
            name: name.into(),
        }
    }
}

impl Section {
    pub fn new(name: impl Into<String>, weight: Weight) -> Self {
        Section {
            id: new_id(),
            name: name.into(),
            weight,
            sub_items: Vec::new(),
        }
    }
}

impl Evaluation {
    pub fn new(name: impl Into<String>, weight: Weight) -> Self {
        Evaluation {
            id: new_id(),
            name: name.into(),
            weight,
            sections: Vec::new(),
        }
    }
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Student {
            id: new_id(),
            name: name.into(),
            grades: HashMap::new(),
        }
    }
}

impl Course {
    /// The scheme a freshly created course starts with: three evaluations
    /// weighted 33/33/34, the first seeded with an exams section.
    pub fn with_default_scheme(name: impl Into<String>) -> Self {
        let mut first = Evaluation::new("1ª Evaluación", Weight::set(33.0));
        let mut exams = Section::new("Exámenes", Weight::set(60.0));
        exams.sub_items.push(SubItem::new("Parcial 1"));
        first.sections.push(exams);

        Course {
            id: new_id(),
            name: name.into(),
            evaluations: vec![
                first,
                Evaluation::new("2ª Evaluación", Weight::set(33.0)),
                Evaluation::new("3ª Evaluación", Weight::set(34.0)),
            ],
            students: Vec::new(),
            sections: None,
        }
    }
}
