//! First-column decoding for catalog queries.

use oxide_dbal_core::{DriverError, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::{Column, ColumnIndex, Decode, Row, Type, TypeInfo};

/// Decodes column 0 as `T`, or `None` when the column type does not match.
fn decode<'r, R, T>(row: &'r R, convert: impl FnOnce(T) -> Value) -> Option<Value>
where
    R: Row,
    usize: ColumnIndex<R>,
    T: Decode<'r, R::Database> + Type<R::Database>,
{
    row.try_get::<Option<T>, usize>(0)
        .ok()
        .map(|value| value.map_or(Value::Null, convert))
}

fn bytes_to_text(bytes: Vec<u8>) -> Value {
    Value::Text(String::from_utf8_lossy(&bytes).into_owned())
}

fn undecodable<R: Row>(row: &R) -> DriverError {
    let type_name = row
        .columns()
        .first()
        .map_or("<no column>", |column| column.type_info().name());
    DriverError::message(format!("Cannot decode catalog column of type {type_name}"))
}

pub(crate) fn pg_value(row: &PgRow) -> Result<Value, DriverError> {
    decode(row, Value::Text)
        .or_else(|| decode(row, Value::Integer))
        .or_else(|| decode(row, |v: i32| Value::Integer(v.into())))
        .or_else(|| decode(row, |v: i16| Value::Integer(v.into())))
        .or_else(|| decode(row, Value::Boolean))
        .or_else(|| decode(row, Value::Float))
        .or_else(|| decode(row, bytes_to_text))
        .ok_or_else(|| undecodable(row))
}

pub(crate) fn mysql_value(row: &MySqlRow) -> Result<Value, DriverError> {
    decode(row, Value::Text)
        .or_else(|| decode(row, Value::Integer))
        .or_else(|| decode(row, |v: i32| Value::Integer(v.into())))
        .or_else(|| decode(row, |v: i16| Value::Integer(v.into())))
        .or_else(|| {
            decode(row, |v: u64| {
                i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Integer)
            })
        })
        .or_else(|| decode(row, |v: u32| Value::Integer(v.into())))
        .or_else(|| decode(row, Value::Boolean))
        .or_else(|| decode(row, Value::Float))
        .or_else(|| decode(row, bytes_to_text))
        .ok_or_else(|| undecodable(row))
}
