//! Internal macros.

/// Expands to the `from_value` and `from_value_mut` members of a
/// `CloudValue` impl for the `Value` variant `$variant`.
macro_rules! value_accessors {
    ($variant:ident) => {
        fn from_value(value: &$crate::Value) -> Option<&Self> {
            match value {
                $crate::Value::$variant(v) => Some(v),
                _ => None,
            }
        }

        fn from_value_mut(value: &mut $crate::Value) -> Option<&mut Self> {
            match value {
                $crate::Value::$variant(v) => Some(v),
                _ => None,
            }
        }
    };
}

/// Implements `From<$ty> for Value`.
macro_rules! into_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for $crate::Value {
            fn from(v: $ty) -> Self {
                $crate::Value::$variant(v)
            }
        }
    };
}
