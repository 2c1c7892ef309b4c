//! Checkpoint loading and saving in SafeTensors format.
//!
//! On-disk layout:
//! ```text
//! [8-byte header: u64 metadata length (little-endian)]
//! [JSON metadata: tensor names, dtypes, shapes, data_offsets]
//! [Raw tensor data: F32 values in little-endian]
//! ```
//!
//! One checkpoint per node, at `{prefix}/{category}/node_{id}.safetensors`.
//! Unloadable nodes are skipped with a diagnostic; the run only fails later
//! if fewer than two usable models remain.

use super::{ModelCategory, StateDict, Tensor};
use crate::error::{DistarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata for a single tensor in SafeTensors format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TensorMetadata {
    /// Data type of the tensor (only "F32" is supported).
    dtype: String,
    /// Shape of the tensor.
    shape: Vec<usize>,
    /// Data offsets `[start, end]` in the raw data section.
    data_offsets: [usize; 2],
}

/// Resolves the checkpoint path for one node of a category.
#[must_use]
pub fn checkpoint_path(prefix: &Path, category: ModelCategory, node_id: usize) -> PathBuf {
    prefix
        .join(category.as_str())
        .join(format!("node_{node_id}.safetensors"))
}

fn validate_and_read_header(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < 8 {
        return Err(DistarError::format_error(format!(
            "file is {} bytes, need at least 8 bytes for header",
            bytes.len()
        )));
    }

    let header_bytes: [u8; 8] = bytes[0..8]
        .try_into()
        .map_err(|_| DistarError::format_error("failed to read header bytes"))?;
    let metadata_len = u64::from_le_bytes(header_bytes) as usize;

    if metadata_len == 0 {
        return Err(DistarError::format_error("metadata length is 0"));
    }

    // metadata_len comes straight from the file; guard the addition
    // against overflow as well as against running past the end.
    if metadata_len > bytes.len().saturating_sub(8) {
        return Err(DistarError::format_error(format!(
            "metadata length {metadata_len} exceeds file size"
        )));
    }

    Ok(metadata_len)
}

fn parse_metadata(bytes: &[u8], metadata_len: usize) -> Result<BTreeMap<String, TensorMetadata>> {
    let metadata_json = &bytes[8..8 + metadata_len];
    let metadata_str = std::str::from_utf8(metadata_json)
        .map_err(|e| DistarError::format_error(format!("metadata is not valid UTF-8: {e}")))?;

    let raw_metadata: serde_json::Value = serde_json::from_str(metadata_str)
        .map_err(|e| DistarError::Serialization(format!("JSON parsing failed: {e}")))?;

    let serde_json::Value::Object(map) = raw_metadata else {
        return Err(DistarError::format_error("metadata is not a JSON object"));
    };

    let mut metadata = BTreeMap::new();
    for (key, value) in map {
        // SafeTensors reserves "__"-prefixed keys for user metadata.
        if key.starts_with("__") {
            continue;
        }
        let tensor_meta: TensorMetadata = serde_json::from_value(value).map_err(|e| {
            DistarError::format_error(format!("invalid metadata for tensor '{key}': {e}"))
        })?;
        metadata.insert(key, tensor_meta);
    }

    Ok(metadata)
}

fn extract_tensor(raw_data: &[u8], name: &str, meta: &TensorMetadata) -> Result<Tensor> {
    if meta.dtype != "F32" {
        return Err(DistarError::format_error(format!(
            "tensor '{name}' has unsupported dtype {}, only F32 checkpoints are supported",
            meta.dtype
        )));
    }

    let [start, end] = meta.data_offsets;
    if end > raw_data.len() || start > end {
        return Err(DistarError::format_error(format!(
            "tensor '{name}' has invalid data offsets [{start}, {end}] for data size {}",
            raw_data.len()
        )));
    }

    let tensor_bytes = &raw_data[start..end];
    if tensor_bytes.len() % 4 != 0 {
        return Err(DistarError::format_error(format!(
            "tensor '{name}' data size {} is not a multiple of 4",
            tensor_bytes.len()
        )));
    }

    let values: Vec<f32> = tensor_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Tensor::new(meta.shape.clone(), values)
}

/// Loads a checkpoint file into a [`StateDict`].
///
/// # Errors
///
/// Returns `Io` if the file can't be read, `FormatError` for a truncated
/// header, bad offsets, or non-F32 tensors, and `Serialization` for
/// malformed metadata JSON.
pub fn load_state_dict(path: &Path) -> Result<StateDict> {
    let bytes = fs::read(path)?;
    let metadata_len = validate_and_read_header(&bytes)?;
    let metadata = parse_metadata(&bytes, metadata_len)?;

    if metadata.is_empty() {
        return Err(DistarError::format_error(format!(
            "checkpoint {} contains no tensors",
            path.display()
        )));
    }

    let raw_data = &bytes[8 + metadata_len..];
    let mut state_dict = StateDict::new();
    for (name, meta) in &metadata {
        let tensor = extract_tensor(raw_data, name, meta)?;
        state_dict.insert(name.clone(), tensor);
    }

    Ok(state_dict)
}

/// Saves a [`StateDict`] as a SafeTensors file.
///
/// Tensors are laid out in sorted-name order, giving byte-identical output
/// for equal state dicts.
///
/// # Errors
///
/// Returns `Io` on write failures and `Serialization` if the metadata
/// can't be encoded.
pub fn save_state_dict(path: &Path, state_dict: &StateDict) -> Result<()> {
    let mut metadata = BTreeMap::new();
    let mut payload: Vec<u8> = Vec::with_capacity(state_dict.numel() * 4);

    for (name, tensor) in state_dict.iter() {
        let start = payload.len();
        for value in &tensor.data {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        metadata.insert(
            name.to_string(),
            TensorMetadata {
                dtype: "F32".to_string(),
                shape: tensor.shape.clone(),
                data_offsets: [start, payload.len()],
            },
        );
    }

    let metadata_json = serde_json::to_string(&metadata)
        .map_err(|e| DistarError::Serialization(e.to_string()))?;

    let mut bytes = Vec::with_capacity(8 + metadata_json.len() + payload.len());
    bytes.extend_from_slice(&(metadata_json.len() as u64).to_le_bytes());
    bytes.extend_from_slice(metadata_json.as_bytes());
    bytes.extend_from_slice(&payload);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Loads the checkpoints for a set of nodes.
///
/// Nodes whose checkpoint is missing or unreadable are skipped with a
/// diagnostic on stderr; the returned list pairs each surviving node id
/// with its state dict, in the order given.
#[must_use]
pub fn load_models(
    node_ids: &[usize],
    category: ModelCategory,
    prefix: &Path,
) -> Vec<(usize, StateDict)> {
    let mut models = Vec::with_capacity(node_ids.len());
    for &node_id in node_ids {
        let path = checkpoint_path(prefix, category, node_id);
        match load_state_dict(&path) {
            Ok(state_dict) => models.push((node_id, state_dict)),
            Err(e) => {
                eprintln!("Skipping node {node_id}: failed to load {}: {e}", path.display());
            }
        }
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state_dict() -> StateDict {
        let mut sd = StateDict::new();
        sd.insert(
            "conv.weight",
            Tensor::new(vec![2, 2], vec![1.0, -2.0, 3.0, -4.0]).unwrap(),
        );
        sd.insert("conv.bias", Tensor::new(vec![2], vec![0.5, -0.5]).unwrap());
        sd
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node_0.safetensors");
        let sd = sample_state_dict();

        save_state_dict(&path, &sd).unwrap();
        let loaded = load_state_dict(&path).unwrap();

        assert_eq!(loaded, sd);
        assert_eq!(loaded.flatten().unwrap(), sd.flatten().unwrap());
    }

    #[test]
    fn test_load_rejects_truncated_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.safetensors");
        fs::write(&path, [0u8; 4]).unwrap();

        let err = load_state_dict(&path).unwrap_err();
        assert!(matches!(err, DistarError::FormatError { .. }));
    }

    #[test]
    fn test_load_rejects_oversized_metadata_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.safetensors");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.extend_from_slice(b"{}");
        fs::write(&path, bytes).unwrap();

        let err = load_state_dict(&path).unwrap_err();
        assert!(matches!(err, DistarError::FormatError { .. }));
    }

    #[test]
    fn test_load_rejects_metadata_longer_than_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.safetensors");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100u64.to_le_bytes());
        bytes.extend_from_slice(b"{}");
        fs::write(&path, bytes).unwrap();

        let err = load_state_dict(&path).unwrap_err();
        assert!(err.to_string().contains("exceeds file size"));
    }

    #[test]
    fn test_load_rejects_non_f32_dtype() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f16.safetensors");
        let metadata = r#"{"w":{"dtype":"F16","shape":[1],"data_offsets":[0,2]}}"#;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(metadata.len() as u64).to_le_bytes());
        bytes.extend_from_slice(metadata.as_bytes());
        bytes.extend_from_slice(&[0u8, 0u8]);
        fs::write(&path, bytes).unwrap();

        let err = load_state_dict(&path).unwrap_err();
        assert!(err.to_string().contains("F16"));
    }

    #[test]
    fn test_load_rejects_empty_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.safetensors");
        let metadata = "{}";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(metadata.len() as u64).to_le_bytes());
        bytes.extend_from_slice(metadata.as_bytes());
        fs::write(&path, bytes).unwrap();

        let err = load_state_dict(&path).unwrap_err();
        assert!(err.to_string().contains("no tensors"));
    }

    #[test]
    fn test_load_models_skips_missing_nodes() {
        let dir = TempDir::new().unwrap();
        let sd = sample_state_dict();
        save_state_dict(
            &checkpoint_path(dir.path(), ModelCategory::Cnn, 0),
            &sd,
        )
        .unwrap();
        save_state_dict(
            &checkpoint_path(dir.path(), ModelCategory::Cnn, 2),
            &sd,
        )
        .unwrap();

        let models = load_models(&[0, 1, 2], ModelCategory::Cnn, dir.path());
        let ids: Vec<usize> = models.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_checkpoint_path_layout() {
        let path = checkpoint_path(Path::new("./models"), ModelCategory::Vgg, 7);
        assert!(path.ends_with("vgg/node_7.safetensors"));
    }
}
