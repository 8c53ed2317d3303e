//! Python bindings for the registry store using PyO3.
//!
//! Exposes a single `RegistryStore` class so a Python web layer can keep one
//! store per process and call into it from its request handlers. PyO3's
//! borrow checking on the class instance serializes mutations.

use pyo3::exceptions::{PyKeyError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

use crate::{ErrorKind, KeyTree, RegistryError, SearchHit, ValueEntry};
use crate::{RegistryStore as RustRegistryStore, Value, ValueData, ValueType};

/// Convert Rust RegistryError to Python exception
fn registry_error_to_py(err: RegistryError) -> PyErr {
    match err.kind() {
        ErrorKind::NotFound => PyKeyError::new_err(err.to_string()),
        ErrorKind::Conflict | ErrorKind::Rejected | ErrorKind::InvalidInput => {
            PyValueError::new_err(err.to_string())
        }
    }
}

fn data_to_py(py: Python<'_>, data: &ValueData) -> PyObject {
    match data {
        ValueData::Integer(n) => n.to_object(py),
        ValueData::Text(s) => s.to_object(py),
        ValueData::List(items) => items.to_object(py),
        #[cfg(feature = "json")]
        ValueData::Raw(raw) => raw.to_string().to_object(py),
    }
}

fn data_from_py(obj: &PyAny) -> PyResult<ValueData> {
    if let Ok(n) = obj.extract::<i64>() {
        return Ok(ValueData::Integer(n));
    }
    if let Ok(s) = obj.extract::<String>() {
        return Ok(ValueData::Text(s));
    }
    if let Ok(items) = obj.extract::<Vec<String>>() {
        return Ok(ValueData::List(items));
    }
    Err(PyTypeError::new_err(
        "value data must be an int, a str, or a list of str",
    ))
}

fn tree_to_py(py: Python<'_>, tree: &KeyTree) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    for (name, subtree) in &tree.children {
        dict.set_item(name, tree_to_py(py, subtree)?)?;
    }
    Ok(dict.into())
}

fn entry_to_py(py: Python<'_>, entry: &ValueEntry) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("name", &entry.name)?;
    dict.set_item("type", entry.value_type.name())?;
    dict.set_item("data", data_to_py(py, &entry.data))?;
    Ok(dict.into())
}

fn hit_to_py(py: Python<'_>, hit: &SearchHit) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("location", &hit.location)?;
    dict.set_item("name", &hit.name)?;
    dict.set_item("type", hit.value_type.name())?;
    dict.set_item("data", data_to_py(py, &hit.data))?;
    Ok(dict.into())
}

/// Python wrapper for RegistryStore
#[pyclass(name = "RegistryStore")]
pub struct PyRegistryStore {
    inner: RustRegistryStore,
}

#[pymethods]
impl PyRegistryStore {
    /// Create a store; seeded with the default hives unless `empty` is set
    #[new]
    #[pyo3(signature = (empty = false))]
    fn new(empty: bool) -> Self {
        let inner = if empty {
            RustRegistryStore::empty()
        } else {
            RustRegistryStore::new()
        };
        Self { inner }
    }

    /// Check whether a key path resolves
    fn key_exists(&self, path: &str) -> bool {
        self.inner.key_exists(path)
    }

    /// Get the key-name hierarchy as nested dicts
    fn tree(&self, py: Python) -> PyResult<PyObject> {
        tree_to_py(py, &self.inner.snapshot_tree())
    }

    /// List the values of a key as dicts with name, type and data
    fn list_values(&self, path: &str, py: Python) -> PyResult<Vec<PyObject>> {
        let entries = self.inner.list_values(path).map_err(registry_error_to_py)?;
        entries.iter().map(|e| entry_to_py(py, e)).collect()
    }

    /// Create a subkey
    fn create_key(&mut self, path: &str, name: &str) -> PyResult<()> {
        self.inner.create_key(path, name).map_err(registry_error_to_py)
    }

    /// Delete a key and everything below it
    fn delete_key(&mut self, path: &str) -> PyResult<()> {
        self.inner.delete_key(path).map_err(registry_error_to_py)
    }

    /// Rename a key, returning its new path
    fn rename_key(&mut self, path: &str, new_name: &str) -> PyResult<String> {
        self.inner
            .rename_key(path, new_name)
            .map_err(registry_error_to_py)
    }

    /// Create or update a value; returns True if an existing value was replaced
    fn set_value(&mut self, path: &str, name: &str, value_type: &str, data: &PyAny) -> PyResult<bool> {
        let value_type = ValueType::from_name(value_type).map_err(registry_error_to_py)?;
        let value = Value::new(value_type, data_from_py(data)?);
        let previous = self
            .inner
            .set_value(path, name, value)
            .map_err(registry_error_to_py)?;
        Ok(previous.is_some())
    }

    /// Delete a value
    fn delete_value(&mut self, path: &str, name: &str) -> PyResult<()> {
        self.inner
            .delete_value(path, name)
            .map(|_| ())
            .map_err(registry_error_to_py)
    }

    /// Rename a value
    fn rename_value(&mut self, path: &str, old_name: &str, new_name: &str) -> PyResult<()> {
        self.inner
            .rename_value(path, old_name, new_name)
            .map_err(registry_error_to_py)
    }

    /// Decode a REG_BINARY value's hex text into bytes
    fn binary_value<'py>(&self, path: &str, name: &str, py: Python<'py>) -> PyResult<&'py PyBytes> {
        let value = self.inner.get_value(path, name).map_err(registry_error_to_py)?;
        let bytes = value.binary_bytes().map_err(registry_error_to_py)?;
        Ok(PyBytes::new(py, &bytes))
    }

    /// Search value names and string data; an empty query finds nothing
    #[pyo3(signature = (path, query, recursive = false))]
    fn search(&self, path: &str, query: &str, recursive: bool, py: Python) -> PyResult<Vec<PyObject>> {
        self.inner
            .search(path, query, recursive)
            .iter()
            .map(|hit| hit_to_py(py, hit))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!("RegistryStore(keys={})", self.inner.root().descendant_count())
    }
}

/// Python module definition
#[pymodule]
fn regedit_store(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyRegistryStore>()?;

    // Add version constant
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("SEPARATOR", crate::SEPARATOR.to_string())?;

    Ok(())
}
