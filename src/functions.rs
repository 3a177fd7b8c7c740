//! Cast functions usable on the right-hand side of a condition.
//!
//! Public casts are the closed set in [`CastFunction`]. The internal `nop`
//! marker, used for plain values, only exists on [`TermFunction`]; calling
//! it (or the legacy `user` cast) as a function reports
//! [`GqlError::NotImplemented`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::{
    error::{GqlError, GqlResult},
    key::Key,
    value::{GeoPt, Value},
};

/// A named cast, or the list produced by `IN (...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CastFunction {
    /// `IN (a, b, ...)`: one equality leaf per element, ORed together
    List,
    /// `KEY('Kind', id, ...)`
    Key,
    /// `DATE('YYYY-MM-DD')` or `DATE(year, month, day)`
    Date,
    /// `DATETIME('YYYY-MM-DD HH:MM:SS')` or six integers
    DateTime,
    /// `TIME('HH:MM:SS')` or one to three integers
    Time,
    /// `GEOPT(lat, lon)`
    GeoPt,
    /// Legacy identity cast, parsed but never resolved
    User,
}

/// What a cast evaluates to.
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutput {
    Value(Value),
    /// Expand into one leaf per element
    List(Vec<Value>),
}

impl CastFunction {
    /// Looks up a function-call name, ignoring case.
    ///
    /// `list` is not callable by name; lists only come from `IN (...)`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "key" => Some(CastFunction::Key),
            "date" => Some(CastFunction::Date),
            "datetime" => Some(CastFunction::DateTime),
            "time" => Some(CastFunction::Time),
            "geopt" => Some(CastFunction::GeoPt),
            "user" => Some(CastFunction::User),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CastFunction::List => "list",
            CastFunction::Key => "key",
            CastFunction::Date => "date",
            CastFunction::DateTime => "datetime",
            CastFunction::Time => "time",
            CastFunction::GeoPt => "geopt",
            CastFunction::User => "user",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, CastFunction::List)
    }

    /// Validates `values` and builds the cast result.
    ///
    /// `namespace` is given to keys built by `KEY(...)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gql_lang::{CastFunction, CastOutput, Value};
    ///
    /// let by_parts = CastFunction::Date
    ///     .apply(&[Value::Integer(2020), Value::Integer(3), Value::Integer(26)], None)
    ///     .unwrap();
    /// let by_text = CastFunction::Date
    ///     .apply(&[Value::String("2020-03-26".into())], None)
    ///     .unwrap();
    /// assert_eq!(by_parts, by_text);
    /// assert!(matches!(by_parts, CastOutput::Value(Value::Timestamp(_))));
    /// ```
    pub fn apply(&self, values: &[Value], namespace: Option<&str>) -> GqlResult<CastOutput> {
        let value = match self {
            CastFunction::List => {
                if values.is_empty() {
                    return Err(GqlError::bad_query("Function list requires at least one argument"));
                }
                return Ok(CastOutput::List(values.to_vec()));
            }
            CastFunction::Key => Value::Key(Key::from_flat(values, namespace).map_err(GqlError::BadQuery)?),
            CastFunction::Date => Value::Timestamp(date(values)?),
            CastFunction::DateTime => Value::Timestamp(datetime(values)?),
            CastFunction::Time => Value::Timestamp(time(values)?),
            CastFunction::GeoPt => Value::GeoPt(geopt(values)?),
            CastFunction::User => return Err(GqlError::NotImplemented("user")),
        };
        Ok(CastOutput::Value(value))
    }
}

impl fmt::Display for CastFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function slot of a filter term: the `nop` marker or a real cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermFunction {
    Nop,
    Cast(CastFunction),
}

impl TermFunction {
    pub fn name(&self) -> &'static str {
        match self {
            TermFunction::Nop => "nop",
            TermFunction::Cast(cast) => cast.name(),
        }
    }

    /// Invokes the function directly.
    ///
    /// `nop` is resolved by lowering itself and never callable, so it
    /// reports `NotImplemented`, as does `user`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gql_lang::{GqlError, TermFunction, Value};
    ///
    /// let err = TermFunction::Nop
    ///     .call(&[Value::String("any arg".into())], None)
    ///     .unwrap_err();
    /// assert_eq!(err, GqlError::NotImplemented("nop"));
    /// ```
    pub fn call(&self, values: &[Value], namespace: Option<&str>) -> GqlResult<CastOutput> {
        match self {
            TermFunction::Nop => Err(GqlError::NotImplemented("nop")),
            TermFunction::Cast(cast) => cast.apply(values, namespace),
        }
    }
}

impl fmt::Display for TermFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn integers(function: &str, values: &[Value]) -> GqlResult<Vec<i64>> {
    values
        .iter()
        .map(|v| {
            v.as_int().ok_or_else(|| {
                GqlError::bad_query(format!(
                    "Function {} requires integer arguments; received {} {}",
                    function,
                    v.type_name(),
                    v
                ))
            })
        })
        .collect()
}

fn component<T: TryFrom<i64>>(function: &str, n: i64) -> GqlResult<T> {
    T::try_from(n).map_err(|_| {
        GqlError::bad_query(format!("Value {} is out of range for function {}", n, function))
    })
}

fn calendar_date(function: &str, year: i64, month: i64, day: i64) -> GqlResult<NaiveDate> {
    NaiveDate::from_ymd_opt(
        component(function, year)?,
        component(function, month)?,
        component(function, day)?,
    )
    .ok_or_else(|| {
        GqlError::bad_query(format!(
            "Invalid date {}-{}-{} for function {}",
            year, month, day, function
        ))
    })
}

fn clock_time(function: &str, hour: i64, minute: i64, second: i64) -> GqlResult<NaiveTime> {
    NaiveTime::from_hms_opt(
        component(function, hour)?,
        component(function, minute)?,
        component(function, second)?,
    )
    .ok_or_else(|| {
        GqlError::bad_query(format!(
            "Invalid time {}:{}:{} for function {}",
            hour, minute, second, function
        ))
    })
}

fn midnight(date: NaiveDate) -> GqlResult<NaiveDateTime> {
    Ok(date.and_time(clock_time("date", 0, 0, 0)?))
}

/// Times are represented as timestamps on 1970-01-01.
fn on_epoch_day(time: NaiveTime) -> GqlResult<NaiveDateTime> {
    Ok(calendar_date("time", 1970, 1, 1)?.and_time(time))
}

pub(crate) fn parse_date(text: &str) -> GqlResult<NaiveDateTime> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| GqlError::bad_query(format!("Parameter '{}' is not a valid date", text)))
        .and_then(midnight)
}

pub(crate) fn parse_datetime(text: &str) -> GqlResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| GqlError::bad_query(format!("Parameter '{}' is not a valid datetime", text)))
}

pub(crate) fn parse_time(text: &str) -> GqlResult<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(text, "%H:%M:%S")
        .map_err(|_| GqlError::bad_query(format!("Parameter '{}' is not a valid time", text)))?;
    on_epoch_day(time)
}

fn date(values: &[Value]) -> GqlResult<NaiveDateTime> {
    match values {
        [Value::String(text)] => parse_date(text),
        [other] => Err(GqlError::bad_query(format!(
            "Invalid argument for date function: {}",
            other
        ))),
        [_, _, _] => {
            let parts = integers("date", values)?;
            midnight(calendar_date("date", parts[0], parts[1], parts[2])?)
        }
        _ => Err(GqlError::bad_query(format!(
            "Function date requires 1 or 3 arguments; received {}",
            values.len()
        ))),
    }
}

fn datetime(values: &[Value]) -> GqlResult<NaiveDateTime> {
    match values {
        [Value::String(text)] => parse_datetime(text),
        [other] => Err(GqlError::bad_query(format!(
            "Invalid argument for datetime function: {}",
            other
        ))),
        [_, _, _, _, _, _] => {
            let p = integers("datetime", values)?;
            let date = calendar_date("datetime", p[0], p[1], p[2])?;
            Ok(date.and_time(clock_time("datetime", p[3], p[4], p[5])?))
        }
        _ => Err(GqlError::bad_query(format!(
            "Function datetime requires 1 or 6 arguments; received {}",
            values.len()
        ))),
    }
}

fn time(values: &[Value]) -> GqlResult<NaiveDateTime> {
    match values {
        [Value::String(text)] => parse_time(text),
        [_] | [_, _] | [_, _, _] => {
            let p = integers("time", values)?;
            let minute = p.get(1).copied().unwrap_or(0);
            let second = p.get(2).copied().unwrap_or(0);
            on_epoch_day(clock_time("time", p[0], minute, second)?)
        }
        _ => Err(GqlError::bad_query(format!(
            "Function time requires 1 to 3 arguments; received {}",
            values.len()
        ))),
    }
}

fn geopt(values: &[Value]) -> GqlResult<GeoPt> {
    match values {
        [lat, lon] => {
            let (Some(lat), Some(lon)) = (lat.as_float(), lon.as_float()) else {
                return Err(GqlError::bad_query(format!(
                    "Function geopt requires numeric arguments; received {}, {}",
                    lat, lon
                )));
            };
            GeoPt::new(lat, lon).map_err(GqlError::BadQuery)
        }
        _ => Err(GqlError::bad_query(format!(
            "Function geopt requires 2 arguments; received {}",
            values.len()
        ))),
    }
}
