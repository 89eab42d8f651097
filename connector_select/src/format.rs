//! Rendering values as SQL literals.

use std::fmt;

use itertools::Itertools;

use crate::errors::FormatListError;

/// Oracle rejects `IN` lists longer than this.
pub const MAX_LIST_ITEMS: usize = 1000;

/// A scalar that can be written into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlLiteral {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlLiteral::Integer(v) => write!(f, "{v}"),
            SqlLiteral::Float(v) => write_float(f, *v),
            SqlLiteral::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

/// Whole numbers keep a `.0` and large magnitudes use a signed exponent,
/// so a float never reads back as an integer.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v.abs() >= 1e16 {
        let text = format!("{v:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
            _ => f.write_str(&text),
        }
    } else if v.fract() == 0.0 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

macro_rules! impl_literal_from {
    ($($native: ty => $variant: ident,)+) => {
        $(
            impl From<$native> for SqlLiteral {
                fn from(v: $native) -> Self {
                    SqlLiteral::$variant(v.into())
                }
            }
        )+
    };
}

impl_literal_from!(
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    &String => Text,
);

/// Format items into a list for an SQL `IN` clause.
///
/// Text is quoted, numbers are not. With `parenthesis`, the list is wrapped in `(` and `)`.
///
/// ```
/// use connector_select::{format_list, SqlLiteral};
///
/// assert_eq!(format_list(["a", "b", "c"], true).unwrap(), "('a', 'b', 'c')");
///
/// let mixed: Vec<SqlLiteral> = vec![1.into(), 2.into(), "3".into()];
/// assert_eq!(format_list(mixed, false).unwrap(), "1, 2, '3'");
/// ```
pub fn format_list<I, T>(items: I, parenthesis: bool) -> Result<String, FormatListError>
where
    I: IntoIterator<Item = T>,
    T: Into<SqlLiteral>,
{
    let items: Vec<SqlLiteral> = items.into_iter().map(Into::into).collect();
    if items.len() > MAX_LIST_ITEMS {
        return Err(FormatListError::TooManyItems {
            count: items.len(),
            limit: MAX_LIST_ITEMS,
        });
    }

    let list = items.iter().join(", ");
    Ok(if parenthesis { format!("({list})") } else { list })
}
