//! Deep merge of boot-configuration trees.
//!
//! Merging lets a user-supplied override document layer on top of the
//! synthesized default without losing it: mappings merge recursively,
//! sequences concatenate, and everything else is overwritten by the source
//! side. Inputs are never mutated.

use serde_yaml::Value;

/// Deep-merge `src` on top of `dest`, returning a new tree.
///
/// - mapping + mapping: merge recursively
/// - sequence + sequence: `dest` entries first, then `src` entries
///   (order preserved, duplicates permitted)
/// - anything else (scalar, or mismatched types): `src` wins
///
/// Keys present in only one tree pass through unchanged. The merge recurses
/// to any depth; configuration trees are acyclic data so no cycle guard is
/// needed.
pub fn merge_values(dest: &Value, src: &Value) -> Value {
    match (dest, src) {
        (Value::Mapping(dest_map), Value::Mapping(src_map)) => {
            let mut merged = dest_map.clone();
            for (key, src_value) in src_map {
                let value = match dest_map.get(key) {
                    Some(dest_value) => merge_values(dest_value, src_value),
                    None => src_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Mapping(merged)
        }
        (Value::Sequence(dest_seq), Value::Sequence(src_seq)) => {
            let mut merged = dest_seq.clone();
            merged.extend(src_seq.iter().cloned());
            Value::Sequence(merged)
        }
        _ => src.clone(),
    }
}
