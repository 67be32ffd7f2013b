use std::collections::BTreeMap;

use gpu::StreamHandle;

/// How batched vectors share one flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BatchLayout {
    /// Batches are concatenated blocks: batch `k`, position `i` lives at
    /// `k * per_batch + i`.
    #[default]
    Contiguous,
    /// Batches are the columns of a `per_batch x batch_size` row-major
    /// matrix: batch `k`, position `i` lives at `i * batch_size + k`.
    Columns,
}

/// A typed value in a [`ConfigExtension`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl ExtensionValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ExtensionValue::UInt(v) => Some(*v),
            ExtensionValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ExtensionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtensionValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ExtensionValue {
    fn from(v: bool) -> Self {
        ExtensionValue::Bool(v)
    }
}

impl From<i64> for ExtensionValue {
    fn from(v: i64) -> Self {
        ExtensionValue::Int(v)
    }
}

impl From<u64> for ExtensionValue {
    fn from(v: u64) -> Self {
        ExtensionValue::UInt(v)
    }
}

impl From<usize> for ExtensionValue {
    fn from(v: usize) -> Self {
        ExtensionValue::UInt(v as u64)
    }
}

impl From<f64> for ExtensionValue {
    fn from(v: f64) -> Self {
        ExtensionValue::Float(v)
    }
}

impl From<&str> for ExtensionValue {
    fn from(v: &str) -> Self {
        ExtensionValue::Str(v.to_string())
    }
}

impl From<String> for ExtensionValue {
    fn from(v: String) -> Self {
        ExtensionValue::Str(v)
    }
}

/// Backend-specific parameters, forwarded untouched by the dispatcher.
///
/// Keys are conventionally namespaced by backend (`host.*`, `device.*`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigExtension {
    entries: BTreeMap<String, ExtensionValue>,
}

impl ConfigExtension {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ExtensionValue>,
    ) -> Option<ExtensionValue> {
        self.entries.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&ExtensionValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ExtensionValue> {
        self.entries.remove(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-call configuration shared by every operation family.
///
/// Nothing is validated at construction: a config may be reused across calls
/// with different views, so the dispatcher checks it against each call.
#[derive(Debug, Clone, PartialEq)]
pub struct VecOpsConfig {
    /// Stream to run device work on; `None` selects the device's default
    /// stream. Ignored for host-resident calls.
    pub stream: Option<StreamHandle>,
    pub is_a_on_device: bool,
    pub is_b_on_device: bool,
    pub is_result_on_device: bool,
    /// Return once device work is enqueued instead of waiting for it.
    pub is_async: bool,
    pub batch_size: usize,
    /// Ignored when `batch_size == 1`.
    pub batch_layout: BatchLayout,
    pub ext: ConfigExtension,
}

impl Default for VecOpsConfig {
    fn default() -> Self {
        Self {
            stream: None,
            is_a_on_device: false,
            is_b_on_device: false,
            is_result_on_device: false,
            is_async: false,
            batch_size: 1,
            batch_layout: BatchLayout::Contiguous,
            ext: ConfigExtension::default(),
        }
    }
}

impl VecOpsConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(mut self, batch_size: usize, batch_layout: BatchLayout) -> Self {
        self.batch_size = batch_size;
        self.batch_layout = batch_layout;
        self
    }

    /// Mark all operands and the result as device resident.
    pub fn on_device(mut self) -> Self {
        self.is_a_on_device = true;
        self.is_b_on_device = true;
        self.is_result_on_device = true;
        self
    }

    pub fn with_stream(mut self, stream: StreamHandle, is_async: bool) -> Self {
        self.stream = Some(stream);
        self.is_async = is_async;
        self
    }
}
