//! Product criteria and the query builder.
//!
//! A [`ProductCriteria`] is bound from `<field>.<operator>=<value>` query
//! parameters and rendered two ways with the same semantics:
//!
//! - [`ProductCriteria::predicate`] for the in-memory store
//! - [`ProductCriteria::condition`] for SeaORM queries
//!
//! Every operator present is AND-ed; a criteria without operators matches
//! every product.

use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, Condition, Value};
use std::fmt::Debug;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::entity::Column;
use crate::error::{ProductError, ProductResult};
use crate::models::Product;

/// Filter operators as spelled in query parameters, e.g. `price.greaterThan`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Specified,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    DoesNotContain,
}

/// Values a [`RangeFilter`] can hold
pub trait FilterValue: Clone + Debug + PartialOrd + Into<Value> + Send + Sync + 'static {
    fn parse_filter_value(raw: &str) -> Result<Self, String>;
}

impl FilterValue for i64 {
    fn parse_filter_value(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|_| format!("'{}' is not an integer", raw))
    }
}

impl FilterValue for f64 {
    fn parse_filter_value(raw: &str) -> Result<Self, String> {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(format!("'{}' is not a finite number", raw)),
        }
    }
}

/// Operator on an ordered field
#[derive(Debug, Clone, PartialEq)]
pub enum RangeFilter<T> {
    Equals(T),
    NotEquals(T),
    In(Vec<T>),
    NotIn(Vec<T>),
    Specified(bool),
    GreaterThan(T),
    GreaterThanOrEqual(T),
    LessThan(T),
    LessThanOrEqual(T),
}

impl<T: FilterValue> RangeFilter<T> {
    /// Whether a field holding `value` passes this operator.
    ///
    /// An absent value only satisfies `specified=false`, as with SQL `NULL`.
    pub fn matches(&self, value: Option<&T>) -> bool {
        let value = match (self, value) {
            (RangeFilter::Specified(specified), value) => return value.is_some() == *specified,
            (_, None) => return false,
            (_, Some(value)) => value,
        };

        match self {
            RangeFilter::Equals(x) => value == x,
            RangeFilter::NotEquals(x) => value != x,
            RangeFilter::In(xs) => xs.iter().any(|x| x == value),
            RangeFilter::NotIn(xs) => !xs.iter().any(|x| x == value),
            RangeFilter::GreaterThan(x) => value > x,
            RangeFilter::GreaterThanOrEqual(x) => value >= x,
            RangeFilter::LessThan(x) => value < x,
            RangeFilter::LessThanOrEqual(x) => value <= x,
            RangeFilter::Specified(_) => true,
        }
    }

    fn add_to(&self, column: Column, condition: Condition) -> Condition {
        condition.add(match self {
            RangeFilter::Equals(x) => column.eq(x.clone()),
            RangeFilter::NotEquals(x) => column.ne(x.clone()),
            RangeFilter::In(xs) => column.is_in(xs.iter().cloned()),
            RangeFilter::NotIn(xs) => column.is_not_in(xs.iter().cloned()),
            RangeFilter::Specified(true) => column.is_not_null(),
            RangeFilter::Specified(false) => column.is_null(),
            RangeFilter::GreaterThan(x) => column.gt(x.clone()),
            RangeFilter::GreaterThanOrEqual(x) => column.gte(x.clone()),
            RangeFilter::LessThan(x) => column.lt(x.clone()),
            RangeFilter::LessThanOrEqual(x) => column.lte(x.clone()),
        })
    }

    fn parse(operator: Operator, values: &[String]) -> Result<Vec<Self>, String> {
        let parse_one = |raw: &String| T::parse_filter_value(raw);
        let filters = match operator {
            Operator::In => vec![RangeFilter::In(parse_list(values, T::parse_filter_value)?)],
            Operator::NotIn => vec![RangeFilter::NotIn(parse_list(values, T::parse_filter_value)?)],
            Operator::Specified => values
                .iter()
                .map(|v| parse_bool(v).map(Self::Specified))
                .collect::<Result<Vec<_>, _>>()?,
            Operator::Equals => map_each(values, parse_one, RangeFilter::Equals)?,
            Operator::NotEquals => map_each(values, parse_one, RangeFilter::NotEquals)?,
            Operator::GreaterThan => map_each(values, parse_one, RangeFilter::GreaterThan)?,
            Operator::GreaterThanOrEqual => {
                map_each(values, parse_one, RangeFilter::GreaterThanOrEqual)?
            }
            Operator::LessThan => map_each(values, parse_one, RangeFilter::LessThan)?,
            Operator::LessThanOrEqual => map_each(values, parse_one, RangeFilter::LessThanOrEqual)?,
            Operator::Contains | Operator::DoesNotContain => {
                return Err(format!("operator '{}' only applies to text fields", operator));
            }
        };
        Ok(filters)
    }
}

/// Operator on a text field
#[derive(Debug, Clone, PartialEq)]
pub enum StringFilter {
    Equals(String),
    NotEquals(String),
    In(Vec<String>),
    NotIn(Vec<String>),
    Specified(bool),
    /// Case-sensitive substring
    Contains(String),
    DoesNotContain(String),
}

impl StringFilter {
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = match (self, value) {
            (StringFilter::Specified(specified), value) => return value.is_some() == *specified,
            (_, None) => return false,
            (_, Some(value)) => value,
        };

        match self {
            StringFilter::Equals(x) => value == x,
            StringFilter::NotEquals(x) => value != x,
            StringFilter::In(xs) => xs.iter().any(|x| x == value),
            StringFilter::NotIn(xs) => !xs.iter().any(|x| x == value),
            StringFilter::Contains(x) => value.contains(x.as_str()),
            StringFilter::DoesNotContain(x) => !value.contains(x.as_str()),
            StringFilter::Specified(_) => true,
        }
    }

    fn add_to(&self, column: Column, condition: Condition) -> Condition {
        condition.add(match self {
            StringFilter::Equals(x) => column.eq(x.clone()),
            StringFilter::NotEquals(x) => column.ne(x.clone()),
            StringFilter::In(xs) => column.is_in(xs.iter().cloned()),
            StringFilter::NotIn(xs) => column.is_not_in(xs.iter().cloned()),
            StringFilter::Specified(true) => column.is_not_null(),
            StringFilter::Specified(false) => column.is_null(),
            StringFilter::Contains(x) => column.like(substring_pattern(x)),
            StringFilter::DoesNotContain(x) => column.not_like(substring_pattern(x)),
        })
    }

    fn parse(operator: Operator, values: &[String]) -> Result<Vec<Self>, String> {
        let text = |raw: &String| Ok::<_, String>(raw.clone());
        let filters = match operator {
            Operator::In => vec![StringFilter::In(parse_list(values, |v| Ok(v.to_string()))?)],
            Operator::NotIn => vec![StringFilter::NotIn(parse_list(values, |v| Ok(v.to_string()))?)],
            Operator::Specified => values
                .iter()
                .map(|v| parse_bool(v).map(Self::Specified))
                .collect::<Result<Vec<_>, _>>()?,
            Operator::Equals => map_each(values, text, StringFilter::Equals)?,
            Operator::NotEquals => map_each(values, text, StringFilter::NotEquals)?,
            Operator::Contains => map_each(values, text, StringFilter::Contains)?,
            Operator::DoesNotContain => map_each(values, text, StringFilter::DoesNotContain)?,
            Operator::GreaterThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThan
            | Operator::LessThanOrEqual => {
                return Err(format!("operator '{}' does not apply to text fields", operator));
            }
        };
        Ok(filters)
    }
}

/// `%needle%` matching `needle` literally.
fn substring_pattern(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\')
}

/// Backslash-escape the LIKE wildcards and the escape character itself.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_each<T, F>(
    values: &[String],
    parse: impl Fn(&String) -> Result<T, String>,
    wrap: impl Fn(T) -> F,
) -> Result<Vec<F>, String> {
    values.iter().map(|v| parse(v).map(&wrap)).collect()
}

/// Values of every occurrence of an `in`/`notIn` key, each split on commas.
fn parse_list<T>(values: &[String], parse: impl Fn(&str) -> Result<T, String>) -> Result<Vec<T>, String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .filter(|v| !v.is_empty())
        .map(parse)
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", raw)),
    }
}

/// Boxed row predicate produced by [`ProductCriteria::predicate`]
pub type ProductPredicate = Box<dyn Fn(&Product) -> bool + Send + Sync>;

/// Filters over the queryable product fields.
///
/// Each field holds a list of operators that must all pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCriteria {
    pub id: Vec<RangeFilter<i64>>,
    pub name: Vec<StringFilter>,
    pub price: Vec<RangeFilter<f64>>,
    pub distinct: Option<bool>,
}

impl ProductCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, filter: RangeFilter<i64>) -> Self {
        self.id.push(filter);
        self
    }

    pub fn with_name(mut self, filter: StringFilter) -> Self {
        self.name.push(filter);
        self
    }

    pub fn with_price(mut self, filter: RangeFilter<f64>) -> Self {
        self.price.push(filter);
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    /// No operator on any field.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && self.price.is_empty()
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct.unwrap_or(false)
    }

    /// Bind `<field>.<operator>=<value>` pairs and `distinct`.
    ///
    /// Keys naming another field (`page`, `sort`, ...) are ignored. Unknown
    /// operators on a product field and malformed values are rejected.
    pub fn from_query_pairs(pairs: &[(String, String)]) -> ProductResult<Self> {
        let mut criteria = Self::default();

        for (key, values) in group_by_key(pairs) {
            if key == "distinct" {
                let raw = values.last().map(String::as_str).unwrap_or_default();
                criteria.distinct = Some(parse_bool(raw).map_err(|e| invalid("distinct", e))?);
                continue;
            }

            let Some((field, operator)) = key.split_once('.') else {
                continue;
            };
            if !matches!(field, "id" | "name" | "price") {
                continue;
            }

            let operator = Operator::from_str(operator).map_err(|_| {
                ProductError::InvalidFilter(format!(
                    "unknown operator '{}' for field '{}'",
                    operator, field
                ))
            })?;

            match field {
                "id" => criteria
                    .id
                    .extend(RangeFilter::<i64>::parse(operator, &values).map_err(|e| invalid(&key, e))?),
                "name" => criteria
                    .name
                    .extend(StringFilter::parse(operator, &values).map_err(|e| invalid(&key, e))?),
                _ => criteria
                    .price
                    .extend(RangeFilter::<f64>::parse(operator, &values).map_err(|e| invalid(&key, e))?),
            }
        }

        Ok(criteria)
    }

    /// In-memory rendering: one closure per operator, folded with AND.
    pub fn predicate(&self) -> ProductPredicate {
        let mut clauses: Vec<ProductPredicate> = Vec::new();

        for filter in self.id.iter().cloned() {
            clauses.push(Box::new(move |p: &Product| filter.matches(Some(&p.id))));
        }
        for filter in self.name.iter().cloned() {
            clauses.push(Box::new(move |p: &Product| filter.matches(Some(p.name.as_str()))));
        }
        for filter in self.price.iter().cloned() {
            clauses.push(Box::new(move |p: &Product| filter.matches(Some(&p.price))));
        }

        Box::new(move |product| clauses.iter().all(|clause| clause(product)))
    }

    /// SQL rendering as a SeaORM `Condition::all()`.
    pub fn condition(&self) -> Condition {
        let condition = self
            .id
            .iter()
            .fold(Condition::all(), |acc, f| f.add_to(Column::Id, acc));
        let condition = self
            .name
            .iter()
            .fold(condition, |acc, f| f.add_to(Column::Name, acc));
        self.price
            .iter()
            .fold(condition, |acc, f| f.add_to(Column::Price, acc))
    }
}

fn invalid(key: &str, reason: String) -> ProductError {
    ProductError::InvalidFilter(format!("{}: {}", key, reason))
}

/// Values per key, keys in order of first appearance.
fn group_by_key(pairs: &[(String, String)]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in pairs {
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.clone()),
            None => grouped.push((key.clone(), vec![value.clone()])),
        }
    }
    grouped
}
