use crate::model::{Property, ValueType};

/// Maps logical value types to physical column types.
pub trait TypeMapper: Send + Sync {
    /// Store type for a value type. `is_key` is true for key and foreign key columns.
    fn store_type(&self, value_type: ValueType, max_length: Option<u32>, is_key: bool) -> String;

    /// Explicit column type overrides the mapping.
    fn column_type(&self, property: &Property, is_key: bool) -> String {
        match &property.column_type {
            Some(column_type) => column_type.clone(),
            None => self.store_type(property.value_type, property.max_length, is_key),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiTypeMapper;

const KEY_STRING_LENGTH: u32 = 128;

impl TypeMapper for AnsiTypeMapper {
    fn store_type(&self, value_type: ValueType, max_length: Option<u32>, is_key: bool) -> String {
        match value_type {
            ValueType::Bool => "boolean".to_string(),
            ValueType::I16 => "smallint".to_string(),
            ValueType::I32 => "integer".to_string(),
            ValueType::I64 => "bigint".to_string(),
            ValueType::F32 => "real".to_string(),
            ValueType::F64 => "double precision".to_string(),
            ValueType::Decimal => "decimal(18, 2)".to_string(),
            ValueType::String => match (max_length, is_key) {
                (Some(length), _) => format!("varchar({})", length),
                (None, true) => format!("varchar({})", KEY_STRING_LENGTH),
                (None, false) => "text".to_string(),
            },
            ValueType::Bytes => match (max_length, is_key) {
                (Some(length), _) => format!("varbinary({})", length),
                (None, true) => format!("varbinary({})", KEY_STRING_LENGTH),
                (None, false) => "blob".to_string(),
            },
            ValueType::Date => "date".to_string(),
            ValueType::Time => "time".to_string(),
            ValueType::DateTime => "timestamp".to_string(),
            ValueType::DateTimeOffset => "timestamp with time zone".to_string(),
            ValueType::Uuid => "uuid".to_string(),
        }
    }
}
