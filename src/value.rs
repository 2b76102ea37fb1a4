use bytes::Bytes;

use crate::utils::encode_bytes_to_string;

/// A decoded bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),

    /// Raw byte string, not assumed to be utf8.
    Bytes(Bytes),

    List(Vec<Value>),

    /// Key/value pairs in the order they appear in the data.
    Dict(Vec<(Bytes, Value)>),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|x| std::str::from_utf8(x).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Bytes, Value)]> {
        match self {
            Value::Dict(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Look up `key` in a dictionary, first occurrence wins.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| &k[..] == key)
            .map(|(_, v)| v)
    }

    /// Render as json.
    ///
    /// Byte strings that are not valid utf8 are rendered as hex.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(v) => serde_json::Value::from(*v),
            Value::Bytes(v) => serde_json::Value::String(bytes_to_json_string(v)),
            Value::List(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
            Value::Dict(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(String::from_utf8_lossy(k).into_owned(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

fn bytes_to_json_string(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) => s.to_owned(),
        Err(_) => encode_bytes_to_string(data),
    }
}
