use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Question kinds understood by the scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Likert,
    Boolean,
    Choice,
    Text,
    Textarea,
    Display,
    Group,
    Section,
    #[serde(other)]
    Other,
}

impl ItemType {
    /// Structural items carry no weight and never contribute points.
    pub const fn is_scorable(self) -> bool {
        !matches!(self, Self::Display | Self::Group | Self::Section)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Likert => "Likert",
            Self::Boolean => "Yes / No",
            Self::Choice => "Choice",
            Self::Text => "Text",
            Self::Textarea => "Long Text",
            Self::Display => "Display",
            Self::Group => "Group",
            Self::Section => "Section",
            Self::Other => "Other",
        }
    }
}

/// One question of a questionnaire as supplied by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub link_id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "weight_percent")]
    pub explicit_weight: Option<f64>,
    #[serde(default)]
    pub section_id: Option<i64>,
}

impl QuestionItem {
    pub fn new(id: i64, link_id: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id,
            link_id: link_id.into(),
            item_type,
            text: String::new(),
            explicit_weight: None,
            section_id: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.explicit_weight = Some(weight);
        self
    }

    pub fn in_section(mut self, section_id: i64) -> Self {
        self.section_id = Some(section_id);
        self
    }

    pub fn is_scorable(&self) -> bool {
        self.item_type.is_scorable()
    }

    /// Stable identity used as the weight map key: the link id when present,
    /// then the numeric id, then a hash of the item content.
    pub fn weight_key(&self) -> String {
        let link_id = self.link_id.trim();
        if !link_id.is_empty() {
            return link_id.to_string();
        }

        if self.id != 0 {
            return format!("id:{}", self.id);
        }

        let mut hasher = DefaultHasher::new();
        self.text.hash(&mut hasher);
        self.item_type.hash(&mut hasher);
        self.section_id.hash(&mut hasher);
        format!("hash:{:016x}", hasher.finish())
    }
}

/// Questionnaire section as declared by the questionnaire editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    pub id: i64,
    pub title: String,
}

/// Code/display pair for coded answers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
}

impl Coding {
    pub fn has_content(&self) -> bool {
        non_blank(self.code.as_deref()) || non_blank(self.display.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single typed answer entry. Serialized with the `value[x]` keys used by
/// stored questionnaire responses, e.g. `{"valueInteger": 4}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueInteger")]
    Integer(i64),
    #[serde(rename = "valueDecimal")]
    Decimal(f64),
    #[serde(rename = "valueString")]
    Text(String),
    #[serde(rename = "valueCoding")]
    Coding(Coding),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
    #[serde(rename = "valueAttachment")]
    Attachment(Attachment),
}

impl AnswerValue {
    pub fn coding(code: &str, display: &str) -> Self {
        Self::Coding(Coding {
            code: Some(code.to_string()),
            display: Some(display.to_string()),
        })
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Ordered answer entries recorded for one `(response, link id)` pair.
pub type AnswerSet = Vec<AnswerValue>;

/// All answers of one response keyed by question link id.
pub type AnswersByLinkId = HashMap<String, AnswerSet>;

pub(crate) fn non_blank(value: Option<&str>) -> bool {
    value.map(|text| !text.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_types_are_not_scorable() {
        assert!(!ItemType::Display.is_scorable());
        assert!(!ItemType::Group.is_scorable());
        assert!(!ItemType::Section.is_scorable());
        assert!(ItemType::Likert.is_scorable());
        assert!(ItemType::Other.is_scorable());
    }

    #[test]
    fn weight_key_prefers_link_id_then_numeric_id() {
        let linked = QuestionItem::new(7, "q-7", ItemType::Likert);
        assert_eq!(linked.weight_key(), "q-7");

        let unlinked = QuestionItem::new(7, "  ", ItemType::Likert);
        assert_eq!(unlinked.weight_key(), "id:7");

        let mut anonymous = QuestionItem::new(0, "", ItemType::Likert);
        anonymous.text = "How satisfied are you?".to_string();
        let key = anonymous.weight_key();
        assert!(key.starts_with("hash:"));
        assert_eq!(key, anonymous.clone().weight_key());
    }

    #[test]
    fn answers_deserialize_from_value_keys() {
        let raw = r#"[
            {"valueInteger": 4},
            {"valueCoding": {"code": "3", "display": "Neutral"}},
            {"valueBoolean": true}
        ]"#;
        let answers: AnswerSet = serde_json::from_str(raw).expect("answers parse");
        assert_eq!(answers[0], AnswerValue::Integer(4));
        assert_eq!(answers[1], AnswerValue::coding("3", "Neutral"));
        assert_eq!(answers[2], AnswerValue::Boolean(true));
    }

    #[test]
    fn unknown_item_types_deserialize_as_other() {
        let item: QuestionItem =
            serde_json::from_str(r#"{"id": 1, "link_id": "a", "type": "slider", "weight_percent": 5}"#)
                .expect("item parses");
        assert_eq!(item.item_type, ItemType::Other);
        assert_eq!(item.explicit_weight, Some(5.0));
    }
}
