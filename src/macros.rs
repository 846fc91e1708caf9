/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Anything that is not `null`, `true`, `false`, an array or an object is
/// treated as an expression and converted with `Value::from`. Wrap
/// multi-token expressions (such as negative numbers) in parentheses inside
/// arrays and objects.
///
/// ```rust
/// use json_logger::{value, Value};
///
/// let v = value!({"name": "alice", "tags": ["a", "b"], "score": (-1.5), "seen": null});
/// assert_eq!(v.as_object().unwrap().len(), 4);
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::FieldMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::FieldMap::new();
        $(
            object.insert($key, $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

/// Builds a [`FieldMap`](crate::FieldMap) for a log call.
///
/// ```rust
/// use json_logger::{fields, Value};
///
/// let amount = 42;
/// let map = fields!("amount": amount, "currency": "USD", "retry": amount > 40);
///
/// assert_eq!(map.get("amount"), Some(&Value::from(42)));
/// assert_eq!(map.get("retry"), Some(&Value::from(true)));
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::FieldMap::new()
    };

    ($($key:literal : $value:expr),+ $(,)?) => {{
        let mut fields = $crate::FieldMap::new();
        $(
            fields.insert($key, $crate::Value::from($value));
        )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use crate::{FieldMap, Number, Value};

    #[test]
    fn test_value_macro_primitives() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(42), Value::Number(Number::Int(42)));
        assert_eq!(value!(3.5), Value::Number(Number::Float64(3.5)));
        assert_eq!(value!("hello"), Value::String("hello".to_string()));
        assert_eq!(value!(7u8), Value::Number(Number::Uint(7)));
    }

    #[test]
    fn test_value_macro_nesting() {
        let v = value!({"list": [1, {"k": null}], "empty": {}});
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get("empty"), Some(&Value::Object(FieldMap::new())));
        let list = obj.get("list").and_then(Value::as_array).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[1].as_object().unwrap().get("k").unwrap().is_null());
    }

    #[test]
    fn test_fields_macro() {
        assert!(fields!().is_empty());
        let map = fields!("a": 1, "b": "two",);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
