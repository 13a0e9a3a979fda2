//! Entity metadata and column-to-field conversion.
//!
//! A type is an entity when its name is its table name and each of its fields is
//! a column of the same name. The [`entity!`](crate::entity!) macro declares such a
//! struct and implements [`Entity`] for it:
//!
//! ```rust
//! use sql_entity_access::entity;
//!
//! entity! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Customer {
//!         pub id: i64,
//!         pub name: String,
//!         pub email: Option<String>,
//!     }
//! }
//!
//! use sql_entity_access::entity::Entity;
//! assert_eq!(Customer::TABLE, "Customer");
//! assert_eq!(Customer::COLUMNS, &["id", "name", "email"]);
//! ```

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::EntityAccessError;
use crate::types::RowValues;

/// Capability implemented by every type that can be written from a row.
///
/// Instances start from `Default` so fields without a matching column keep
/// their zero value.
pub trait Entity: Default + Send + 'static {
    /// Table name; the type's simple name.
    const TABLE: &'static str;
    /// Column names, one per field, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Assign `value` to the field named `column`.
    ///
    /// Returns `Ok(false)` when no field has that name.
    ///
    /// # Errors
    /// Returns `EntityAccessError::Mapping` if the value does not convert into the
    /// field's type.
    fn assign(&mut self, column: &str, value: &RowValues) -> Result<bool, EntityAccessError>;

    #[must_use]
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            table: Self::TABLE,
            columns: Self::COLUMNS,
        }
    }
}

/// Static table metadata for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl EntityDescriptor {
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }
}

/// Conversion from a column value into a field type.
///
/// `from_row_value` returns `None` on a type mismatch. `NULL` converts into the
/// type's zero value unless the field is an `Option`.
pub trait FromRowValue: Sized {
    fn from_row_value(value: &RowValues) -> Option<Self>;
}

impl FromRowValue for i64 {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Int(i) => Some(*i),
            RowValues::Bool(b) => Some(i64::from(*b)),
            RowValues::Null => Some(0),
            _ => None,
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromRowValue for $ty {
                fn from_row_value(value: &RowValues) -> Option<Self> {
                    i64::from_row_value(value).and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

narrow_int!(i32, i16, u32, u64, usize);

impl FromRowValue for f64 {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Null => Some(0.0),
            other => other.as_float(),
        }
    }
}

impl FromRowValue for bool {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Null => Some(false),
            other => other.as_bool().copied(),
        }
    }
}

impl FromRowValue for String {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Null => Some(String::new()),
            _ => None,
        }
    }
}

impl FromRowValue for NaiveDateTime {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Null => Some(NaiveDateTime::default()),
            other => other.as_timestamp(),
        }
    }
}

impl FromRowValue for Vec<u8> {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        if value.is_null() {
            return Some(Vec::new());
        }
        value.as_blob().map(<[u8]>::to_vec)
    }
}

impl FromRowValue for JsonValue {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::JSON(v) => Some(v.clone()),
            RowValues::Text(s) => serde_json::from_str(s).ok(),
            RowValues::Null => Some(JsonValue::Null),
            _ => None,
        }
    }
}

impl FromRowValue for RowValues {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    fn from_row_value(value: &RowValues) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_row_value(value).map(Some)
        }
    }
}

/// Convert one column value for the field of the same name.
///
/// # Errors
/// Returns `EntityAccessError::Mapping` naming the table, column, expected type
/// and the value found.
pub fn convert_column<T: FromRowValue>(
    table: &'static str,
    column: &str,
    value: &RowValues,
) -> Result<T, EntityAccessError> {
    T::from_row_value(value).ok_or_else(|| EntityAccessError::Mapping {
        table,
        column: column.to_owned(),
        expected: std::any::type_name::<T>(),
        found: format!("{value:?}"),
    })
}

/// Declare an entity struct and implement [`Entity`] for it.
///
/// The table name is the struct name and every field is a column. `Default` is
/// derived by the macro, so do not list it in the struct's own derives.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::entity::Entity for $name {
            const TABLE: &'static str = stringify!($name);
            const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),*];

            fn assign(
                &mut self,
                column: &str,
                value: &$crate::types::RowValues,
            ) -> ::std::result::Result<bool, $crate::error::EntityAccessError> {
                match column {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::entity::convert_column::<$ty>(
                                <Self as $crate::entity::Entity>::TABLE,
                                column,
                                value,
                            )?;
                            Ok(true)
                        }
                    )*
                    _ => Ok(false),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::entity! {
        #[derive(Debug, PartialEq)]
        pub struct Gadget {
            pub id: i64,
            pub label: String,
            pub weight: f64,
            pub active: bool,
            pub note: Option<String>,
        }
    }

    #[test]
    fn descriptor_uses_type_and_field_names() {
        let desc = Gadget::descriptor();
        assert_eq!(desc.table, "Gadget");
        assert_eq!(desc.columns, &["id", "label", "weight", "active", "note"]);
        assert!(desc.has_column("label"));
        assert!(!desc.has_column("Label"));
    }

    #[test]
    fn assign_converts_and_ignores_unknown_columns() {
        let mut g = Gadget::default();
        assert!(g.assign("id", &RowValues::Int(3)).unwrap());
        assert!(g.assign("weight", &RowValues::Int(2)).unwrap());
        assert!(g.assign("active", &RowValues::Int(1)).unwrap());
        assert!(g.assign("note", &RowValues::Null).unwrap());
        assert!(!g.assign("colour", &RowValues::Text("red".into())).unwrap());
        assert_eq!(
            g,
            Gadget {
                id: 3,
                label: String::new(),
                weight: 2.0,
                active: true,
                note: None,
            }
        );
    }

    #[test]
    fn mismatched_value_reports_column_and_type() {
        let mut g = Gadget::default();
        let err = g
            .assign("id", &RowValues::Text("three".into()))
            .unwrap_err();
        match err {
            EntityAccessError::Mapping {
                table,
                column,
                expected,
                ..
            } => {
                assert_eq!(table, "Gadget");
                assert_eq!(column, "id");
                assert_eq!(expected, "i64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn narrowing_checks_range() {
        assert_eq!(i32::from_row_value(&RowValues::Int(7)), Some(7));
        assert_eq!(i32::from_row_value(&RowValues::Int(i64::MAX)), None);
        assert_eq!(u32::from_row_value(&RowValues::Int(-1)), None);
    }

    #[test]
    fn timestamps_parse_from_text() {
        let parsed = NaiveDateTime::from_row_value(&RowValues::Text("2024-01-02 03:04:05".into()));
        assert_eq!(
            parsed.map(|t| t.to_string()),
            Some("2024-01-02 03:04:05".to_owned())
        );
    }

    #[test]
    fn blob_columns_copy_bytes() {
        let bytes = RowValues::Blob(vec![0xde, 0xad]);
        assert_eq!(Vec::<u8>::from_row_value(&bytes), Some(vec![0xde, 0xad]));
        assert_eq!(Vec::<u8>::from_row_value(&RowValues::Null), Some(Vec::new()));
        assert_eq!(Vec::<u8>::from_row_value(&RowValues::Text("x".into())), None);
    }
}
