//! Boolean filter expressions over projected entry fields.
//!
//! Parsed from the JSON object form used in configuration files:
//! `{"and": [...]}`, `{"or": [...]}`, `{"not": ...}`, and comparisons such
//! as `{"==": ["payee", "Grocer"]}` or `{">=": ["date", "2023-01-01"]}`.
//! `date` and `payee` project the entry itself; `account` and `amount`
//! project its splits, where a comparison holds if any split satisfies it
//! (`!=` holds only when no split matches).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::entry::Entry;
use crate::errors::ExportError;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Compare {
        op: CompareOp,
        field: Field,
        operand: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Payee,
    Account,
    Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    List(Vec<Operand>),
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Filter {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Filter {
        Filter::Or(filters)
    }

    pub fn not(filter: Filter) -> Filter {
        Filter::Not(Box::new(filter))
    }

    pub fn compare(op: CompareOp, field: Field, operand: Operand) -> Filter {
        Filter::Compare { op, field, operand }
    }

    /// Parses the JSON object form; malformed syntax is a fatal
    /// configuration error.
    pub fn parse(value: &Value) -> Result<Filter, ExportError> {
        let Value::Object(map) = value else {
            return Err(malformed("expected an object with one operator key"));
        };
        let mut fields = map.iter();
        let (Some((operator, args)), None) = (fields.next(), fields.next()) else {
            return Err(malformed("expected exactly one operator key"));
        };

        match operator.as_str() {
            "and" => Ok(Filter::And(parse_list(args)?)),
            "or" => Ok(Filter::Or(parse_list(args)?)),
            "not" | "!" => Ok(Filter::not(Filter::parse(args)?)),
            op => {
                let op = match op {
                    "==" | "=" => CompareOp::Eq,
                    "!=" => CompareOp::Ne,
                    ">" => CompareOp::Gt,
                    ">=" => CompareOp::Ge,
                    "<" => CompareOp::Lt,
                    "<=" => CompareOp::Le,
                    "in" => CompareOp::In,
                    other => return Err(malformed(&format!("unknown operator `{other}`"))),
                };
                let Value::Array(pair) = args else {
                    return Err(malformed("comparison expects [field, value]"));
                };
                let [field, operand] = pair.as_slice() else {
                    return Err(malformed("comparison expects [field, value]"));
                };
                let field = parse_field(field)?;
                let operand = parse_operand(field, operand)?;
                Ok(Filter::compare(op, field, operand))
            }
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(entry)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(entry)),
            Filter::Not(filter) => !filter.matches(entry),
            Filter::Compare { op, field, operand } => compare(entry, *op, *field, operand),
        }
    }
}

fn malformed(reason: &str) -> ExportError {
    ExportError::Filter(reason.to_string())
}

fn parse_list(value: &Value) -> Result<Vec<Filter>, ExportError> {
    let Value::Array(items) = value else {
        return Err(malformed("and/or expects an array of expressions"));
    };
    items.iter().map(Filter::parse).collect()
}

fn parse_field(value: &Value) -> Result<Field, ExportError> {
    match value.as_str() {
        Some("date") => Ok(Field::Date),
        Some("payee") => Ok(Field::Payee),
        Some("account") => Ok(Field::Account),
        Some("amount") => Ok(Field::Amount),
        _ => Err(malformed("field must be one of date, payee, account, amount")),
    }
}

fn parse_operand(field: Field, value: &Value) -> Result<Operand, ExportError> {
    match value {
        Value::Array(items) => Ok(Operand::List(
            items
                .iter()
                .map(|v| parse_operand(field, v))
                .collect::<Result<_, _>>()?,
        )),
        Value::String(s) if field == Field::Date => {
            let date: NaiveDate = s
                .parse()
                .map_err(|_| malformed(&format!("`{s}` is not an ISO date")))?;
            Ok(Operand::Date(date))
        }
        Value::String(s) => Ok(Operand::Text(s.clone())),
        Value::Number(n) => {
            let text = n.to_string();
            text.parse::<Decimal>()
                .map(Operand::Number)
                .map_err(|_| malformed(&format!("`{text}` is not a valid amount")))
        }
        _ => Err(malformed("literal must be a string, number, or array")),
    }
}

fn compare(entry: &Entry, op: CompareOp, field: Field, operand: &Operand) -> bool {
    match field {
        Field::Date => compare_ord(op, &entry.record_date, operand, |o| match o {
            Operand::Date(d) => Some(*d),
            _ => None,
        }),
        Field::Payee => compare_text(op, entry.payee.as_deref(), operand),
        Field::Account => {
            let holds = |o: &Operand| {
                entry
                    .splits
                    .iter()
                    .any(|s| compare_text(CompareOp::Eq, Some(&s.name()), o))
            };
            match (op, operand) {
                (CompareOp::Eq, o) => holds(o),
                (CompareOp::Ne, o) => !holds(o),
                (CompareOp::In, Operand::List(items)) => items.iter().any(holds),
                _ => false,
            }
        }
        Field::Amount => {
            let holds = |o: &Operand| {
                entry.splits.iter().any(|s| {
                    s.amount
                        .map(|a| compare_ord(op, &a, o, |o| match o {
                            Operand::Number(n) => Some(*n),
                            _ => None,
                        }))
                        .unwrap_or(false)
                })
            };
            match op {
                CompareOp::Ne => !entry.splits.iter().any(|s| {
                    s.amount
                        .map(|a| compare_ord(CompareOp::Eq, &a, operand, |o| match o {
                            Operand::Number(n) => Some(*n),
                            _ => None,
                        }))
                        .unwrap_or(false)
                }),
                _ => holds(operand),
            }
        }
    }
}

fn compare_text(op: CompareOp, actual: Option<&str>, operand: &Operand) -> bool {
    match (op, operand) {
        (CompareOp::Eq, Operand::Text(expected)) => actual == Some(expected.as_str()),
        (CompareOp::Ne, Operand::Text(expected)) => actual != Some(expected.as_str()),
        (CompareOp::In, Operand::List(items)) => items
            .iter()
            .any(|item| compare_text(CompareOp::Eq, actual, item)),
        _ => false,
    }
}

fn compare_ord<T, F>(op: CompareOp, actual: &T, operand: &Operand, extract: F) -> bool
where
    T: PartialOrd,
    F: Fn(&Operand) -> Option<T> + Copy,
{
    if let (CompareOp::In, Operand::List(items)) = (op, operand) {
        return items
            .iter()
            .any(|item| compare_ord(CompareOp::Eq, actual, item, extract));
    }
    let Some(expected) = extract(operand) else {
        return false;
    };
    match op {
        CompareOp::Eq => *actual == expected,
        CompareOp::Ne => *actual != expected,
        CompareOp::Gt => *actual > expected,
        CompareOp::Ge => *actual >= expected,
        CompareOp::Lt => *actual < expected,
        CompareOp::Le => *actual <= expected,
        CompareOp::In => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, Split, SplitGroup};
    use crate::utils::stable_id;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn entry() -> Entry {
        Entry {
            kind: EntryKind::Transaction,
            id: stable_id("filter"),
            record_date: "2023-05-15".parse().unwrap(),
            payee: Some("Grocer".into()),
            memo: None,
            currency: "USD".into(),
            cleared: true,
            splits: vec![
                Split::new(SplitGroup::Assets, "Checking:Main", dec!(-20.00)),
                Split::new(SplitGroup::Expenses, "Food:Groceries", dec!(20.00)),
            ],
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn parses_and_evaluates_boolean_logic() {
        let filter = Filter::parse(&json!({
            "and": [
                {"==": ["payee", "Grocer"]},
                {">=": ["date", "2023-01-01"]}
            ]
        }))
        .unwrap();
        assert!(filter.matches(&entry()));

        let filter = Filter::parse(&json!({"not": {"==": ["payee", "Grocer"]}})).unwrap();
        assert!(!filter.matches(&entry()));
    }

    #[test]
    fn account_comparison_projects_over_splits() {
        let filter =
            Filter::parse(&json!({"==": ["account", "Expenses:Food:Groceries"]})).unwrap();
        assert!(filter.matches(&entry()));

        let filter = Filter::parse(&json!({"!=": ["account", "Expenses:Food:Groceries"]})).unwrap();
        assert!(!filter.matches(&entry()));
    }

    #[test]
    fn amount_comparison_matches_any_split() {
        let filter = Filter::parse(&json!({">": ["amount", 10]})).unwrap();
        assert!(filter.matches(&entry()));
        let filter = Filter::parse(&json!({">": ["amount", 50]})).unwrap();
        assert!(!filter.matches(&entry()));
    }

    #[test]
    fn in_operator_checks_membership() {
        let filter = Filter::parse(&json!({"in": ["payee", ["Other", "Grocer"]]})).unwrap();
        assert!(filter.matches(&entry()));
    }

    #[test]
    fn malformed_expressions_are_fatal() {
        assert!(Filter::parse(&json!(["not", "an", "object"])).is_err());
        assert!(Filter::parse(&json!({"??": ["payee", "x"]})).is_err());
        assert!(Filter::parse(&json!({"==": ["payee"]})).is_err());
        assert!(Filter::parse(&json!({"==": ["color", "red"]})).is_err());
        assert!(Filter::parse(&json!({">=": ["date", "not-a-date"]})).is_err());
    }
}
