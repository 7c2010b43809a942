use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, Utc};

/// A scalar value bound into a query template.
///
/// Floats compare and hash by bit pattern, so two keys are equal only when
/// every parameter is the exact same value.
#[derive(Debug, Clone)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Text(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::Timestamp(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

/// Identity of a cached query result: the template id plus the ordered
/// parameter values it was bound with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    template: String,
    params: Vec<ParamValue>,
}

impl CacheKey {
    pub fn new(template: impl Into<String>, params: impl IntoIterator<Item = ParamValue>) -> Self {
        Self {
            template: template.into(),
            params: params.into_iter().collect(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[ParamValue] {
        &self.params
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.template)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hash_of(key: &CacheKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn identical_inputs_produce_equal_keys() {
        let a = CacheKey::new(
            "daily_credits",
            [ParamValue::from(date(2024, 1, 1)), date(2024, 1, 31).into()],
        );
        let b = CacheKey::new(
            "daily_credits",
            [ParamValue::from(date(2024, 1, 1)), date(2024, 1, 31).into()],
        );
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn any_differing_param_changes_key() {
        let base = CacheKey::new("slow_queries", [ParamValue::Int(60), "WH".into()]);
        let other_threshold = CacheKey::new("slow_queries", [ParamValue::Int(61), "WH".into()]);
        let other_name = CacheKey::new("slow_queries", [ParamValue::Int(60), "WH2".into()]);
        let other_template = CacheKey::new("expensive_queries", [ParamValue::Int(60), "WH".into()]);

        let keys: HashSet<_> = [base, other_threshold, other_name, other_template]
            .into_iter()
            .collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn param_order_matters() {
        let a = CacheKey::new("t", [ParamValue::from(date(2024, 1, 1)), date(2024, 2, 1).into()]);
        let b = CacheKey::new("t", [ParamValue::from(date(2024, 2, 1)), date(2024, 1, 1).into()]);
        assert_ne!(a, b);
    }

    #[test]
    fn variant_is_part_of_identity() {
        let int = CacheKey::new("t", [ParamValue::Int(1)]);
        let float = CacheKey::new("t", [ParamValue::Float(1.0)]);
        let text = CacheKey::new("t", [ParamValue::from("1")]);
        assert_ne!(int, float);
        assert_ne!(int, text);
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(ParamValue::Float(f64::NAN), ParamValue::Float(f64::NAN));
        assert_ne!(ParamValue::Float(0.0), ParamValue::Float(-0.0));
    }

    #[test]
    fn display_lists_template_and_params() {
        let key = CacheKey::new(
            "warehouse_daily_credits",
            [
                ParamValue::from(date(2024, 1, 1)),
                date(2024, 1, 8).into(),
                "COMPUTE_WH".into(),
            ],
        );
        assert_eq!(
            key.to_string(),
            "warehouse_daily_credits(2024-01-01, 2024-01-08, 'COMPUTE_WH')"
        );
    }

    #[test]
    fn empty_params_display() {
        let key = CacheKey::new("storage_by_type", Vec::<ParamValue>::new());
        assert_eq!(key.to_string(), "storage_by_type()");
        assert!(key.params().is_empty());
    }
}
