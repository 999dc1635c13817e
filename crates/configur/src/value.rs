//! In-memory model of a parsed config file
//!
//! The nesting limit of INI files is encoded in the types: a top-level
//! [`Value`] is a scalar, a list of scalars or a [`Section`]; a section
//! holds scalars or one level of [`SubArray`]. Nothing deeper can be
//! represented. Untyped input (JSON) is checked on conversion and fails
//! with [`Error::DepthExceeded`] when it nests further.

use std::fmt;

use serde_json::Value as Json;

use crate::error::{Error, Result};

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view, accepting numeric text that is a whole number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) if is_numeric(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether the string form of this value parses entirely as a number.
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Integer(_) => true,
            Self::Float(f) => f.is_finite(),
            Self::Bool(_) => false,
            Self::Text(s) => is_numeric(s),
        }
    }

    fn from_json(json: Json) -> Option<Self> {
        match json {
            Json::Null => Some(Self::Text(String::new())),
            Json::Bool(b) => Some(Self::Bool(b)),
            Json::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Json::String(s) => Some(Self::Text(s)),
            Json::Array(_) | Json::Object(_) => None,
        }
    }

    fn to_json(&self) -> Json {
        match self {
            Self::Integer(n) => Json::from(*n),
            Self::Float(f) => Json::from(*f),
            Self::Bool(b) => Json::Bool(*b),
            Self::Text(s) => Json::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Numeric test applied when rendering values: optional surrounding
/// whitespace, an optional sign, digits with an optional fraction and an
/// optional exponent. `inf` and `NaN` are not numeric.
pub fn is_numeric(s: &str) -> bool {
    let trimmed = s.trim();
    let unsigned = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

/// Key of a sub-array element: `key[]` rows get an index, `key[name]`
/// rows keep their name. Numeric names are stored as indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Index(usize),
    Name(String),
}

impl ArrayKey {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(idx) if idx.to_string() == raw => Self::Index(idx),
            _ => Self::Name(raw.to_string()),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "{idx}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Ordered scalars under a `key[...]` family of rows, the third and last
/// nesting level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubArray {
    items: Vec<(ArrayKey, Scalar)>,
}

impl SubArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append under the next free index (one past the highest index used).
    pub fn push(&mut self, value: impl Into<Scalar>) {
        let next = self
            .items
            .iter()
            .filter_map(|(key, _)| match key {
                ArrayKey::Index(idx) => Some(idx + 1),
                ArrayKey::Name(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.items.push((ArrayKey::Index(next), value.into()));
    }

    /// Insert or replace the element stored under `key`.
    pub fn insert(&mut self, key: ArrayKey, value: impl Into<Scalar>) {
        upsert(&mut self.items, key, value.into());
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Scalar> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Scalar)> {
        self.items.iter().map(|(k, v)| (k, v))
    }

    /// Element values in order, ignoring keys.
    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.items.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn to_json(&self) -> Json {
        if self.items.iter().all(|(k, _)| matches!(k, ArrayKey::Index(_))) {
            Json::Array(self.values().map(Scalar::to_json).collect())
        } else {
            Json::Object(
                self.items
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            )
        }
    }
}

impl<S: Into<Scalar>> FromIterator<S> for SubArray {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut array = Self::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

/// A member of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Scalar(Scalar),
    Array(SubArray),
}

impl Entry {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&SubArray> {
        match self {
            Self::Array(a) => Some(a),
            Self::Scalar(_) => None,
        }
    }
}

impl From<SubArray> for Entry {
    fn from(array: SubArray) -> Self {
        Self::Array(array)
    }
}

/// Keys grouped under a `[name]` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    entries: Vec<(String, Entry)>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) {
        upsert(&mut self.entries, key.into(), entry.into());
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, e)| e)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_json(&self) -> Json {
        Json::Object(
            self.entries
                .iter()
                .map(|(k, e)| {
                    let value = match e {
                        Entry::Scalar(s) => s.to_json(),
                        Entry::Array(a) => a.to_json(),
                    };
                    (k.clone(), value)
                })
                .collect(),
        )
    }
}

/// A top-level value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Section(Section),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Scalar::as_bool)
    }

    /// Convert untyped JSON into a value stored under `key`.
    ///
    /// Arrays of scalars become lists; other arrays and objects become
    /// sections. Anything nested below a section member fails with
    /// [`Error::DepthExceeded`].
    pub fn try_from_json(key: &str, json: Json) -> Result<Self> {
        match json {
            Json::Array(items) if items.iter().all(is_json_scalar) => Ok(Self::List(
                items.into_iter().filter_map(Scalar::from_json).collect(),
            )),
            Json::Array(items) => {
                let members = items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| (idx.to_string(), item));
                section_from_json(key, members).map(Self::Section)
            }
            Json::Object(map) => section_from_json(key, map).map(Self::Section),
            scalar => Scalar::from_json(scalar)
                .map(Self::Scalar)
                .ok_or_else(|| Error::DepthExceeded {
                    key: key.to_string(),
                }),
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Self::Scalar(s) => s.to_json(),
            Self::List(items) => Json::Array(items.iter().map(Scalar::to_json).collect()),
            Self::Section(section) => section.to_json(),
        }
    }
}

/// `From` impls lifting every scalar source into [`Entry`] and [`Value`].
macro_rules! impl_from_scalar {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Entry {
                fn from(value: $source) -> Self {
                    Self::Scalar(value.into())
                }
            }

            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

impl_from_scalar!(Scalar, i64, i32, u32, f64, bool, &str, String);

impl From<Vec<Scalar>> for Value {
    fn from(items: Vec<Scalar>) -> Self {
        Self::List(items)
    }
}

impl From<Section> for Value {
    fn from(section: Section) -> Self {
        Self::Section(section)
    }
}

fn is_json_scalar(json: &Json) -> bool {
    !matches!(json, Json::Array(_) | Json::Object(_))
}

fn section_from_json(
    key: &str,
    members: impl IntoIterator<Item = (String, Json)>,
) -> Result<Section> {
    let mut section = Section::new();
    for (name, member) in members {
        let entry = match member {
            Json::Array(items) => {
                let path = format!("{key}.{name}");
                let mut array = SubArray::new();
                for (idx, item) in items.into_iter().enumerate() {
                    array.insert(ArrayKey::Index(idx), leaf(&path, item)?);
                }
                Entry::Array(array)
            }
            Json::Object(map) => {
                let path = format!("{key}.{name}");
                let mut array = SubArray::new();
                for (sub, item) in map {
                    array.insert(ArrayKey::parse(&sub), leaf(&path, item)?);
                }
                Entry::Array(array)
            }
            scalar => Entry::Scalar(leaf(key, scalar)?),
        };
        section.insert(name, entry);
    }
    Ok(section)
}

fn leaf(path: &str, json: Json) -> Result<Scalar> {
    Scalar::from_json(json).ok_or_else(|| Error::DepthExceeded {
        key: path.to_string(),
    })
}

/// The whole content of one config file: an ordered map from top-level
/// key to [`Value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigData {
    entries: Vec<(String, Value)>,
}

impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace `key`; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        upsert(&mut self.entries, key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn section(&self, key: &str) -> Option<&Section> {
        self.get(key).and_then(Value::as_section)
    }

    /// Mutable access to section `key`, replacing any non-section value
    /// stored under that key with an empty section.
    pub fn section_mut(&mut self, key: &str) -> &mut Section {
        if !matches!(self.get(key), Some(Value::Section(_))) {
            self.insert(key, Section::new());
        }
        match self.get_mut(key) {
            Some(Value::Section(section)) => section,
            _ => unreachable!("section `{key}` was inserted above"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert a JSON object into config data, enforcing the nesting limit.
    pub fn try_from_json(json: Json) -> Result<Self> {
        let Json::Object(map) = json else {
            return Err(Error::NotAMapping);
        };
        let mut data = Self::new();
        for (key, value) in map {
            let value = Value::try_from_json(&key, value)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    pub fn to_json(&self) -> Json {
        Json::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

fn upsert<K: PartialEq, V>(entries: &mut Vec<(K, V)>, key: K, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
}
