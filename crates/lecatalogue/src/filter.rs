// Typed part filters and their SQL rendering

use crate::parts::PartRecord;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Escape character used in every rendered `LIKE` clause
const LIKE_ESCAPE: char = '\\';

/// Column of the `parts` table a predicate can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartField {
    /// Part number (text identifier)
    PartNum,
    /// Primary name
    Name,
    /// Alternate display name
    BaName,
    /// Cached comma-separated related part numbers
    AltPartIds,
    /// Curated category reference
    BaCategory,
}

impl PartField {
    /// Qualified column name in the part queries
    pub fn column(&self) -> &'static str {
        match self {
            PartField::PartNum => "p.part_num",
            PartField::Name => "p.name",
            PartField::BaName => "p.ba_name",
            PartField::AltPartIds => "p.alt_part_ids",
            PartField::BaCategory => "p.ba_cat_id",
        }
    }

    fn nullable(&self) -> bool {
        !matches!(self, PartField::PartNum | PartField::Name)
    }

    /// Column expression with NULL folded to the empty string
    fn expr(&self) -> String {
        if self.nullable() {
            format!("COALESCE({}, '')", self.column())
        } else {
            self.column().to_string()
        }
    }

    fn value_of<'a>(&self, part: &'a PartRecord) -> &'a str {
        match self {
            PartField::PartNum => &part.part_num,
            PartField::Name => &part.name,
            PartField::BaName => part.ba_name.as_deref().unwrap_or(""),
            PartField::AltPartIds => part.alt_part_ids.as_deref().unwrap_or(""),
            PartField::BaCategory => part.ba_cat_id.as_deref().unwrap_or(""),
        }
    }
}

/// Boolean filter over catalog parts
///
/// Built by the planner, rendered to SQL by [`Predicate::to_sql`] and
/// evaluable in memory by [`Predicate::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Field equals the value exactly (text comparison)
    Equals(PartField, String),
    /// Field differs from the value
    NotEquals(PartField, String),
    /// Field contains the value (ASCII case-insensitive)
    Contains(PartField, String),
    /// Field starts with the value (ASCII case-insensitive)
    StartsWith(PartField, String),
    /// Field is one of the values
    In(PartField, Vec<String>),
    /// Every child holds (empty is true)
    And(Vec<Predicate>),
    /// At least one child holds (empty is false)
    Or(Vec<Predicate>),
    /// Child does not hold
    Not(Box<Predicate>),
}

/// Rendered `WHERE` fragment with positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    /// SQL boolean expression using `?` placeholders
    pub clause: String,
    /// Parameters in placeholder order
    pub params: Vec<Value>,
}

impl Predicate {
    /// Conjunction, flattening nested conjunctions
    pub fn all(children: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Predicate::And(flat)
    }

    /// Disjunction, flattening nested disjunctions
    pub fn any(children: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Predicate::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Predicate::Or(flat)
    }

    /// Negation
    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Render as a parameterized SQL expression
    pub fn to_sql(&self) -> SqlFilter {
        let mut params = Vec::new();
        let clause = self.render(&mut params);
        SqlFilter { clause, params }
    }

    fn render(&self, params: &mut Vec<Value>) -> String {
        match self {
            Predicate::Equals(field, value) => {
                params.push(Value::Text(value.clone()));
                format!("{} = ?", field.expr())
            }
            Predicate::NotEquals(field, value) => {
                params.push(Value::Text(value.clone()));
                format!("{} != ?", field.expr())
            }
            Predicate::Contains(field, value) => {
                params.push(Value::Text(format!("%{}%", escape_like(value))));
                format!("{} LIKE ? ESCAPE '{}'", field.expr(), LIKE_ESCAPE)
            }
            Predicate::StartsWith(field, value) => {
                params.push(Value::Text(format!("{}%", escape_like(value))));
                format!("{} LIKE ? ESCAPE '{}'", field.expr(), LIKE_ESCAPE)
            }
            Predicate::In(_, values) if values.is_empty() => "0 = 1".to_string(),
            Predicate::In(field, values) => {
                params.extend(values.iter().cloned().map(Value::Text));
                let placeholders = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", field.expr(), placeholders)
            }
            Predicate::And(children) if children.is_empty() => "1 = 1".to_string(),
            Predicate::And(children) => join(children, " AND ", params),
            Predicate::Or(children) if children.is_empty() => "0 = 1".to_string(),
            Predicate::Or(children) => join(children, " OR ", params),
            Predicate::Not(inner) => format!("NOT ({})", inner.render(params)),
        }
    }

    /// Evaluate against a part using the same semantics as the SQL rendering
    pub fn matches(&self, part: &PartRecord) -> bool {
        match self {
            Predicate::Equals(field, value) => field.value_of(part) == value,
            Predicate::NotEquals(field, value) => field.value_of(part) != value,
            Predicate::Contains(field, value) => {
                ascii_lower(field.value_of(part)).contains(&ascii_lower(value))
            }
            Predicate::StartsWith(field, value) => {
                ascii_lower(field.value_of(part)).starts_with(&ascii_lower(value))
            }
            Predicate::In(field, values) => {
                let actual = field.value_of(part);
                values.iter().any(|v| v == actual)
            }
            Predicate::And(children) => children.iter().all(|c| c.matches(part)),
            Predicate::Or(children) => children.iter().any(|c| c.matches(part)),
            Predicate::Not(inner) => !inner.matches(part),
        }
    }
}

fn join(children: &[Predicate], separator: &str, params: &mut Vec<Value>) -> String {
    let parts: Vec<String> = children
        .iter()
        .map(|child| format!("({})", child.render(params)))
        .collect();
    parts.join(separator)
}

/// Escape `LIKE` wildcards so user text matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

// SQLite's LIKE folds ASCII letters only
fn ascii_lower(value: &str) -> String {
    value.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn part(part_num: &str, name: &str) -> PartRecord {
        PartRecord::new(part_num, name)
    }

    #[rstest]
    #[case("50%_off", "50\\%\\_off")]
    #[case("a\\b", "a\\\\b")]
    #[case("3001", "3001")]
    fn test_escape_like(#[case] raw: &str, #[case] escaped: &str) {
        assert_eq!(escape_like(raw), escaped);
    }

    #[rstest]
    #[case("Brick 2 x 4", "BRICK", true)]
    #[case("Brick 2 x 4", "2 X 4", true)]
    #[case("Brick 2 x 4", "2x4", false)]
    #[case("Tile 1 × 2", "1 × 2", true)]
    fn test_contains_is_ascii_case_insensitive(
        #[case] name: &str,
        #[case] needle: &str,
        #[case] expected: bool,
    ) {
        let predicate = Predicate::Contains(PartField::Name, needle.to_string());
        assert_eq!(predicate.matches(&part("3001", name)), expected);
    }

    #[test]
    fn test_render_contains_binds_pattern() {
        let sql = Predicate::Contains(PartField::Name, "brick".to_string()).to_sql();
        assert_eq!(sql.clause, "p.name LIKE ? ESCAPE '\\'");
        assert_eq!(sql.params, vec![Value::Text("%brick%".to_string())]);
    }

    #[test]
    fn test_render_nullable_field_is_coalesced() {
        let sql = Predicate::StartsWith(PartField::BaName, "Plate".to_string()).to_sql();
        assert!(sql.clause.starts_with("COALESCE(p.ba_name, '')"));
        assert_eq!(sql.params, vec![Value::Text("Plate%".to_string())]);
    }

    #[test]
    fn test_render_nested_keeps_param_order() {
        let predicate = Predicate::all([
            Predicate::any([
                Predicate::Contains(PartField::Name, "2x4".to_string()),
                Predicate::Contains(PartField::BaName, "2x4".to_string()),
            ]),
            Predicate::negate(Predicate::StartsWith(PartField::PartNum, "red".to_string())),
            Predicate::In(PartField::BaCategory, vec!["14".to_string(), "14a".to_string()]),
        ]);
        let sql = predicate.to_sql();

        assert_eq!(
            sql.clause,
            "((p.name LIKE ? ESCAPE '\\') OR (COALESCE(p.ba_name, '') LIKE ? ESCAPE '\\')) \
             AND (NOT (p.part_num LIKE ? ESCAPE '\\')) \
             AND (COALESCE(p.ba_cat_id, '') IN (?, ?))"
        );
        assert_eq!(sql.params.len(), 5);
        assert_eq!(sql.params[2], Value::Text("red%".to_string()));
        assert_eq!(sql.params[4], Value::Text("14a".to_string()));
    }

    #[test]
    fn test_empty_composites() {
        assert_eq!(Predicate::And(vec![]).to_sql().clause, "1 = 1");
        assert_eq!(Predicate::Or(vec![]).to_sql().clause, "0 = 1");
        assert_eq!(Predicate::In(PartField::BaCategory, vec![]).to_sql().clause, "0 = 1");
    }

    #[test]
    fn test_all_flattens_and_unwraps_single() {
        let single = Predicate::all([Predicate::Equals(PartField::PartNum, "1".to_string())]);
        assert!(matches!(single, Predicate::Equals(..)));

        let nested = Predicate::all([
            Predicate::And(vec![
                Predicate::Equals(PartField::PartNum, "1".to_string()),
                Predicate::Equals(PartField::Name, "x".to_string()),
            ]),
            Predicate::Equals(PartField::BaName, "y".to_string()),
        ]);
        match nested {
            Predicate::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected conjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_matches_is_ascii_case_insensitive() {
        let brick = part("3001", "Brick 2 x 4");
        assert!(Predicate::Contains(PartField::Name, "BRICK".to_string()).matches(&brick));
        assert!(Predicate::StartsWith(PartField::PartNum, "30".to_string()).matches(&brick));
        assert!(!Predicate::StartsWith(PartField::PartNum, "01".to_string()).matches(&brick));
    }

    #[test]
    fn test_matches_treats_null_as_empty() {
        let brick = part("3001", "Brick 2 x 4");
        assert!(!Predicate::Contains(PartField::AltPartIds, "3002".to_string()).matches(&brick));
        assert!(
            Predicate::negate(Predicate::Contains(PartField::BaName, "plate".to_string()))
                .matches(&brick)
        );
    }

    #[test]
    fn test_matches_identifier_as_text() {
        let padded = part("0901", "Baseplate 16 x 30");
        assert!(Predicate::Equals(PartField::PartNum, "0901".to_string()).matches(&padded));
        assert!(!Predicate::Equals(PartField::PartNum, "901".to_string()).matches(&padded));
    }
}
