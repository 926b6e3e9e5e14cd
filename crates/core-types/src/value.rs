//! Runtime value model walked by the excavator.
//!
//! Composite values are shared handles so that a graph may reference the same
//! allocation from several places, including itself. Every handle exposes an
//! allocation identity that stays stable for the lifetime of the allocation and
//! is never derived from content.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(String),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(FunctionRef),
    /// Host value with no structural representation (native handles, proxies, ...).
    Opaque(OpaqueRef),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(ArrayRef::new(items.into_iter().collect()))
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = ObjectRef::new();
        for (key, value) in entries {
            object.insert(key, value);
        }
        Value::Object(object)
    }

    pub fn function(name: impl Into<String>, arity: usize) -> Self {
        Value::Function(FunctionRef::new(name, arity, None))
    }

    pub fn opaque(type_tag: impl Into<String>) -> Self {
        Value::Opaque(OpaqueRef::new(type_tag, None))
    }

    /// Type tag as a host runtime would report it.
    pub fn type_tag(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Undefined => "undefined".into(),
            Value::Bool(_) => "boolean".into(),
            Value::Number(_) => "number".into(),
            Value::BigInt(_) => "bigint".into(),
            Value::String(_) => "string".into(),
            Value::Symbol(_) => "symbol".into(),
            Value::Array(_) => "array".into(),
            Value::Object(object) => object
                .class_name()
                .map(|name| name.to_ascii_lowercase())
                .unwrap_or_else(|| "object".into()),
            Value::Function(_) => "function".into(),
            Value::Opaque(opaque) => opaque.type_tag().to_string(),
        }
    }

    /// Allocation identity of composite values; scalars have none.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(array) => Some(array.identity()),
            Value::Object(object) => Some(object.identity()),
            Value::Function(function) => Some(function.identity()),
            Value::Opaque(opaque) => Some(opaque.identity()),
            _ => None,
        }
    }

    /// Converts decoded JSON into a fresh, acyclic runtime value.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(*flag),
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Value::Number(int as f64)
                } else if let Some(uint) = number.as_u64() {
                    Value::Number(uint as f64)
                } else {
                    Value::Number(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(text) => Value::String(text.clone()),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from_json)),
            serde_json::Value::Object(map) => {
                Value::object(map.iter().map(|(key, value)| (key.clone(), Value::from_json(value))))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Value::from_json(value)
    }
}

fn address_of<T: ?Sized>(ptr: *const T) -> usize {
    ptr as *const () as usize
}

#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Clones out the first `limit` elements so no guard is held while they are walked.
    pub fn sample(&self, limit: usize) -> Vec<Value> {
        self.0.read().iter().take(limit).cloned().collect()
    }

    pub fn identity(&self) -> usize {
        address_of(Arc::as_ptr(&self.0))
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array@{:#x}(len={})", self.identity(), self.len())
    }
}

#[derive(Default)]
pub struct ObjectData {
    pub class_name: Option<String>,
    pub entries: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<ObjectData>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(ObjectData {
            class_name: Some(class_name.into()),
            entries: Vec::new(),
        })))
    }

    /// Inserts or replaces an own key, keeping first-insertion order.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let mut data = self.0.write();
        if let Some(slot) = data.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            data.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .read()
            .entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Snapshot of own entries in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0.read().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.0.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().entries.is_empty()
    }

    pub fn class_name(&self) -> Option<String> {
        self.0.read().class_name.clone()
    }

    pub fn identity(&self) -> usize {
        address_of(Arc::as_ptr(&self.0))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object@{:#x}(keys={:?})", self.identity(), self.keys())
    }
}

#[derive(Debug)]
pub struct FunctionData {
    pub name: String,
    pub arity: usize,
    pub source: Option<String>,
}

#[derive(Clone)]
pub struct FunctionRef(Arc<FunctionData>);

impl FunctionRef {
    pub fn new(name: impl Into<String>, arity: usize, source: Option<String>) -> Self {
        Self(Arc::new(FunctionData {
            name: name.into(),
            arity,
            source,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn arity(&self) -> usize {
        self.0.arity
    }

    pub fn source(&self) -> Option<&str> {
        self.0.source.as_deref()
    }

    pub fn identity(&self) -> usize {
        address_of(Arc::as_ptr(&self.0))
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function@{:#x}({}/{})", self.identity(), self.name(), self.arity())
    }
}

#[derive(Debug)]
pub struct OpaqueData {
    pub type_tag: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct OpaqueRef(Arc<OpaqueData>);

impl OpaqueRef {
    pub fn new(type_tag: impl Into<String>, description: Option<String>) -> Self {
        Self(Arc::new(OpaqueData {
            type_tag: type_tag.into(),
            description,
        }))
    }

    pub fn type_tag(&self) -> &str {
        &self.0.type_tag
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub fn identity(&self) -> usize {
        address_of(Arc::as_ptr(&self.0))
    }
}

impl fmt::Debug for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque@{:#x}({})", self.identity(), self.type_tag())
    }
}
