//! Runtime values passed to and returned from builder methods.
//!
//! Values are deliberately small: scalars, symbols, lists, option maps, and
//! handles to instances and collection containers. Handles compare by identity,
//! everything else compares structurally.

use std::fmt;

use indexmap::IndexMap;

use crate::err_ctx;
use crate::runtime::{Collection, Instance};
use crate::MzlError;

/// Canonical runtime value for builder-method arguments and results.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value; default for unset slots.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// String value.
    Str(String),
    /// Bare symbolic flag, e.g. `:opaque`.
    Symbol(String),
    List(Vec<Value>),
    /// Option map (keyword-style arguments).
    Map(Options),
    /// Handle to a constructed instance.
    Object(Instance),
    /// Handle to a child container.
    Collection(Collection),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Builds a symbol value.
    pub fn sym(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Returns the type name of the value (for diagnostics).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Object(_) => "Object",
            Value::Collection(_) => "Collection",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Nil and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<&Options> {
        match self {
            Value::Map(options) => Some(options),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Short human-readable rendering used in error messages.
    pub fn describe(&self) -> String {
        format!("{self}:{}", self.type_name())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(options) => write!(f, "{options}"),
            Value::Object(instance) => write!(f, "{}", instance.describe()),
            Value::Collection(collection) => write!(f, "{collection:?}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Options> for Value {
    fn from(options: Options) -> Self {
        Value::Map(options)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Value::Collection(collection)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Symbol(s) => Value::Symbol(s),
            Key::Str(s) => Value::Str(s),
            Key::Int(n) => Value::Int(n),
        }
    }
}

// ============================================================================
// KEYS - hashable subset of values used by keyed-map collections
// ============================================================================

/// Key of a keyed-map collection. `:one` and `"one"` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Symbol(String),
    Str(String),
    Int(i64),
}

impl Key {
    pub fn sym(name: impl Into<String>) -> Self {
        Key::Symbol(name.into())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Symbol(s) => write!(f, ":{s}"),
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl TryFrom<Value> for Key {
    type Error = MzlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Symbol(s) => Ok(Key::Symbol(s)),
            Value::Str(s) => Ok(Key::Str(s)),
            Value::Int(n) => Ok(Key::Int(n)),
            other => Err(crate::err_msg!(
                TypeError,
                "collection key must be a Symbol, String or Int, got {}",
                other.describe()
            )),
        }
    }
}

// ============================================================================
// OPTIONS - insertion-ordered option maps
// ============================================================================

/// Insertion-ordered option map (`persist: true`, `big: false`, ...).
///
/// Equality ignores order.
#[derive(Clone, Default, PartialEq)]
pub struct Options(IndexMap<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an option map where every flag is set to `true`.
    pub fn flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::new();
        for flag in flags {
            options.insert(flag, true);
        }
        options
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Truthiness of `key`; missing keys are `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(Value::is_truthy)
    }

    /// Copies every entry of `other` whose key is not already present.
    pub fn merge_missing(&mut self, other: &Options) {
        for (key, value) in other.iter() {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Returns `defaults` overridden by the entries of `self`.
    pub fn over(&self, defaults: &Options) -> Options {
        let mut merged = defaults.clone();
        for (key, value) in self.iter() {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Options::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}

/// Builds an [`Options`] map: `opts! { "persist" => true, "plural" => "kids" }`.
#[macro_export]
macro_rules! opts {
    () => { $crate::Options::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut options = $crate::Options::new();
        $( options.insert($key, $value); )+
        options
    }};
}

// ============================================================================
// ARGS - positional arguments of a builder-method call
// ============================================================================

/// Positional arguments of a call. A trailing [`Value::Map`] plays the role
/// of keyword options; trailing symbols can be folded into it with
/// [`Args::optify`].
#[derive(Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Args(values)
    }

    pub fn none() -> Self {
        Args(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.0.pop()
    }

    /// Removes and returns the leading argument.
    pub fn shift(&mut self) -> Option<Value> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.remove(0))
        }
    }

    /// Re-inserts a leading argument.
    pub fn unshift(&mut self, value: Value) {
        self.0.insert(0, value);
    }

    /// Folds trailing keyword options and bare symbolic flags into one map.
    ///
    /// A trailing [`Value::Map`] is taken first; then trailing symbols are
    /// popped and become `true` unless the map already holds that key. The
    /// first `keep` positionals are never treated as flags.
    pub fn optify(&mut self, keep: usize) -> Options {
        let mut options = match self.0.last() {
            Some(Value::Map(_)) => match self.0.pop() {
                Some(Value::Map(options)) => options,
                _ => Options::new(),
            },
            _ => Options::new(),
        };

        let mut split = self.0.len();
        while split > keep && matches!(self.0[split - 1], Value::Symbol(_)) {
            split -= 1;
        }
        for flag in self.0.drain(split..) {
            if let Value::Symbol(name) = flag {
                if !options.contains_key(&name) {
                    options.insert(name, true);
                }
            }
        }
        options
    }

    /// Fails with `Arity` unless exactly `n` arguments were given.
    pub fn expect_exactly(&self, n: usize, call: &str) -> Result<(), MzlError> {
        if self.0.len() != n {
            return Err(err_ctx!(
                Arity,
                call,
                "arguments",
                "'{}' expects {} argument(s), got {}",
                call,
                n,
                self.0.len()
            ));
        }
        Ok(())
    }

    /// Fails with `Arity` when more than `n` arguments were given.
    pub fn expect_at_most(&self, n: usize, call: &str) -> Result<(), MzlError> {
        if self.0.len() > n {
            return Err(err_ctx!(
                Arity,
                call,
                "arguments",
                "'{}' expects at most {} argument(s), got {}",
                call,
                n,
                self.0.len()
            ));
        }
        Ok(())
    }

    /// Numeric argument at `index`, as `f64`.
    pub fn number(&self, index: usize, call: &str) -> Result<f64, MzlError> {
        let value = self.0.get(index).ok_or_else(|| {
            err_ctx!(Arity, call, "arguments", "'{}' is missing argument {}", call, index + 1)
        })?;
        value.as_f64().ok_or_else(|| {
            err_ctx!(
                TypeError,
                call,
                "arguments",
                "'{}' expects a number at position {}, got {}",
                call,
                index + 1,
                value.describe()
            )
        })
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::List(self.0.clone()))
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args(values)
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds [`Args`] from anything convertible into [`Value`]: `args![2, 2]`.
#[macro_export]
macro_rules! args {
    () => { $crate::Args::none() };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::new(vec![$($crate::Value::from($value)),+])
    };
}
