use crate::types::DatabaseError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, DatabaseError> {
    bincode::serialize(value).map_err(|e| DatabaseError::BinarySerialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, DatabaseError> {
    bincode::deserialize(data).map_err(|e| DatabaseError::BinarySerialization(e.to_string()))
}

/// Persists `value` at `path` in binary format, replacing any existing file.
pub fn save<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<(), DatabaseError> {
    let path = path.as_ref();
    let encoded = encode(value)?;
    fs::write(path, &encoded)?;

    debug!(path = %path.display(), bytes = encoded.len(), "saved blob");
    Ok(())
}

/// Reads back a value stored by [`save`].
pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, DatabaseError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let value = decode(&data)?;

    debug!(path = %path.display(), bytes = data.len(), "loaded blob");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("values.odb");

        let values = vec![Value::Null, Value::Integer(3), Value::from("x"), Value::Blob(vec![0, 1])];
        save(&path, &values).unwrap();

        let loaded: Vec<Value> = load(&path).unwrap();
        assert_eq!(loaded, values);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result: Result<Vec<Value>, _> = load(temp_dir.path().join("missing.odb"));
        assert!(matches!(result, Err(DatabaseError::Io(_))));
    }

    #[test]
    fn test_load_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("garbage.odb");
        fs::write(&path, [0xff; 3]).unwrap();

        let result: Result<Vec<String>, _> = load(&path);
        assert!(matches!(result, Err(DatabaseError::BinarySerialization(_))));
    }
}
