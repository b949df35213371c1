//! Compiles filter conditions into a parameterized `WHERE` fragment.

use serde_json::Value;

use crate::storage::SqlValue;

use super::{Column, Filter, QueryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    NotIn,
}

impl Exp {
    fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "=" | "eq" => Ok(Exp::Eq),
            "!=" | "<>" | "neq" => Ok(Exp::Neq),
            ">" | "gt" => Ok(Exp::Gt),
            ">=" | "gte" => Ok(Exp::Gte),
            "<" | "lt" => Ok(Exp::Lt),
            "<=" | "lte" => Ok(Exp::Lte),
            "like" => Ok(Exp::Like),
            "in" => Ok(Exp::In),
            "notin" | "not in" => Ok(Exp::NotIn),
            _ => Err(QueryError::UnsupportedExpression(raw.to_string())),
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Exp::Eq => "=",
            Exp::Neq => "<>",
            Exp::Gt => ">",
            Exp::Gte => ">=",
            Exp::Lt => "<",
            Exp::Lte => "<=",
            Exp::Like => "LIKE",
            Exp::In => "IN",
            Exp::NotIn => "NOT IN",
        }
    }
}

fn parse_logic(raw: &str) -> Result<&'static str, QueryError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "and" | "&" | "&&" => Ok("AND"),
        "or" | "|" | "||" => Ok("OR"),
        _ => Err(QueryError::UnsupportedLogic(raw.to_string())),
    }
}

/// Builds a filter from request conditions.
///
/// Every column name must appear in `whitelist`. Each condition's `logic`
/// joins it to the following condition; the last one's is ignored.
///
/// # Examples
///
/// ```
/// use helmsman_core::query::{build_query, Column};
///
/// let columns = vec![Column {
///     name: "symbol".to_string(),
///     value: serde_json::json!("ES"),
///     ..Default::default()
/// }];
/// let filter = build_query(&columns, &["id", "symbol"]).unwrap();
/// assert_eq!(filter.clause, "symbol = ?");
/// ```
pub fn build_query(columns: &[Column], whitelist: &[&str]) -> Result<Filter, QueryError> {
    let mut filter = Filter::all();
    let mut pending_logic: Option<&'static str> = None;

    for column in columns {
        let name = column.name.trim();
        if !whitelist.contains(&name) {
            return Err(QueryError::UnknownColumn(column.name.clone()));
        }

        let exp = Exp::parse(&column.exp)?;
        let fragment = match exp {
            Exp::In | Exp::NotIn => {
                let values = list_values(name, &column.value)?;
                let marks = vec!["?"; values.len()].join(", ");
                filter.args.extend(values);
                format!("{name} {} ({marks})", exp.operator())
            }
            Exp::Like => {
                let value = match scalar_value(name, &column.value)? {
                    SqlValue::Text(text) if !text.contains('%') => {
                        SqlValue::Text(format!("%{text}%"))
                    }
                    other => other,
                };
                filter.args.push(value);
                format!("{name} LIKE ?")
            }
            _ => {
                filter.args.push(scalar_value(name, &column.value)?);
                format!("{name} {} ?", exp.operator())
            }
        };

        if let Some(logic) = pending_logic {
            filter.clause.push_str(&format!(" {logic} "));
        }
        filter.clause.push_str(&fragment);
        pending_logic = Some(parse_logic(&column.logic)?);
    }

    Ok(filter)
}

fn scalar_value(column: &str, value: &Value) -> Result<SqlValue, QueryError> {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => Ok(SqlValue::Int(int)),
            None => number.as_f64().map(SqlValue::Real).ok_or_else(|| {
                invalid(column, "number out of range")
            }),
        },
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Bool(flag) => Ok(SqlValue::Int(i64::from(*flag))),
        Value::Null => Err(invalid(column, "missing value")),
        Value::Array(_) | Value::Object(_) => Err(invalid(column, "expected a scalar")),
    }
}

fn list_values(column: &str, value: &Value) -> Result<Vec<SqlValue>, QueryError> {
    let values = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_value(column, item))
            .collect::<Result<Vec<_>, _>>()?,
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(parse_list_item)
            .collect(),
        other => vec![scalar_value(column, other)?],
    };

    if values.is_empty() {
        return Err(invalid(column, "empty list"));
    }
    Ok(values)
}

fn parse_list_item(item: &str) -> SqlValue {
    if let Ok(int) = item.parse::<i64>() {
        SqlValue::Int(int)
    } else if let Ok(real) = item.parse::<f64>() {
        SqlValue::Real(real)
    } else {
        SqlValue::Text(item.to_string())
    }
}

fn invalid(column: &str, reason: &str) -> QueryError {
    QueryError::InvalidValue {
        column: column.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WHITELIST: &[&str] = &["id", "symbol", "pnl", "status"];

    fn column(name: &str, exp: &str, value: Value, logic: &str) -> Column {
        Column {
            name: name.to_string(),
            exp: exp.to_string(),
            value,
            logic: logic.to_string(),
        }
    }

    #[test]
    fn test_empty_conditions_match_everything() {
        let filter = build_query(&[], WHITELIST).unwrap();
        assert!(filter.is_empty());
        assert!(filter.args.is_empty());
    }

    #[test]
    fn test_conditions_joined_by_logic() {
        let columns = vec![
            column("symbol", "=", json!("ES"), "or"),
            column("pnl", "gt", json!(100.5), ""),
            column("status", "neq", json!("open"), ""),
        ];
        let filter = build_query(&columns, WHITELIST).unwrap();

        assert_eq!(filter.clause, "symbol = ? OR pnl > ? AND status <> ?");
        assert_eq!(
            filter.args,
            vec![
                SqlValue::Text("ES".to_string()),
                SqlValue::Real(100.5),
                SqlValue::Text("open".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let columns = vec![column("password_hash", "", json!("x"), "")];
        assert_eq!(
            build_query(&columns, WHITELIST),
            Err(QueryError::UnknownColumn("password_hash".to_string()))
        );
    }

    #[test]
    fn test_injection_attempt_rejected() {
        let columns = vec![column("id; DROP TABLE trades", "", json!(1), "")];
        assert!(matches!(
            build_query(&columns, WHITELIST),
            Err(QueryError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_like_wraps_value() {
        let columns = vec![column("symbol", "like", json!("US"), "")];
        let filter = build_query(&columns, WHITELIST).unwrap();

        assert_eq!(filter.clause, "symbol LIKE ?");
        assert_eq!(filter.args, vec![SqlValue::Text("%US%".to_string())]);
    }

    #[test]
    fn test_like_keeps_explicit_wildcards() {
        let columns = vec![column("symbol", "like", json!("EUR%"), "")];
        let filter = build_query(&columns, WHITELIST).unwrap();
        assert_eq!(filter.args, vec![SqlValue::Text("EUR%".to_string())]);
    }

    #[test]
    fn test_in_with_array_and_string() {
        let from_array = build_query(&[column("id", "in", json!([1, 2, 3]), "")], WHITELIST).unwrap();
        assert_eq!(from_array.clause, "id IN (?, ?, ?)");
        assert_eq!(from_array.args.len(), 3);

        let from_string = build_query(&[column("id", "notin", json!("4, 5"), "")], WHITELIST).unwrap();
        assert_eq!(from_string.clause, "id NOT IN (?, ?)");
        assert_eq!(from_string.args, vec![SqlValue::Int(4), SqlValue::Int(5)]);
    }

    #[test]
    fn test_empty_in_list_rejected() {
        let result = build_query(&[column("id", "in", json!([]), "")], WHITELIST);
        assert!(matches!(result, Err(QueryError::InvalidValue { .. })));
    }

    #[test]
    fn test_unsupported_expression_rejected() {
        let result = build_query(&[column("id", "between", json!(1), "")], WHITELIST);
        assert_eq!(
            result,
            Err(QueryError::UnsupportedExpression("between".to_string()))
        );
    }

    #[test]
    fn test_unsupported_logic_rejected() {
        let result = build_query(&[column("id", "=", json!(1), "xor")], WHITELIST);
        assert_eq!(result, Err(QueryError::UnsupportedLogic("xor".to_string())));
    }

    #[test]
    fn test_null_value_rejected() {
        let result = build_query(&[column("status", "=", Value::Null, "")], WHITELIST);
        assert!(matches!(result, Err(QueryError::InvalidValue { .. })));
    }
}
