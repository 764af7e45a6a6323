#![cfg(feature = "serde")]

//! Integration tests for serde support in radix-vector.
//!
//! Vectors serialize as plain sequences and configurations as structs, so
//! both round-trip through any self-describing format.

use radix_vector::{PersistentVector, VectorConfig, VectorError};
use rstest::rstest;

// =============================================================================
// PersistentVector Integration Tests
// =============================================================================

#[rstest]
fn test_vector_json_roundtrip() {
    let vector: PersistentVector<i32> = (1..=100).collect();
    let json = serde_json::to_string(&vector).unwrap();
    let restored: PersistentVector<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(vector, restored);
    restored.check_invariants();
}

#[rstest]
fn test_vector_serializes_as_sequence() {
    let vector = PersistentVector::from_elements([1, 2, 3], 1).unwrap();
    assert_eq!(serde_json::to_string(&vector).unwrap(), "[1,2,3]");
}

#[rstest]
fn test_empty_vector_json_roundtrip() {
    let vector: PersistentVector<String> = PersistentVector::new();
    let json = serde_json::to_string(&vector).unwrap();
    assert_eq!(json, "[]");
    let restored: PersistentVector<String> = serde_json::from_str(&json).unwrap();
    assert!(restored.is_empty());
}

#[rstest]
fn test_deserialized_vector_uses_default_width() {
    let narrow = PersistentVector::from_elements(0..50, 1).unwrap();
    let json = serde_json::to_string(&narrow).unwrap();
    let restored: PersistentVector<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.width(), 32);
    assert_eq!(restored, narrow);
}

#[rstest]
fn test_nested_vector_json_roundtrip() {
    let inner1: PersistentVector<i32> = (1..=3).collect();
    let inner2: PersistentVector<i32> = (4..=6).collect();
    let outer: PersistentVector<PersistentVector<i32>> = vec![inner1, inner2].into_iter().collect();
    let json = serde_json::to_string(&outer).unwrap();
    assert_eq!(json, "[[1,2,3],[4,5,6]]");
    let restored: PersistentVector<PersistentVector<i32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(outer, restored);
}

#[rstest]
fn test_vector_rejects_non_sequence() {
    let result: Result<PersistentVector<i32>, _> = serde_json::from_str("{\"a\":1}");
    assert!(result.is_err());
}

// =============================================================================
// VectorConfig Integration Tests
// =============================================================================

#[rstest]
fn test_config_json_roundtrip() {
    let config = VectorConfig::new(3).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, "{\"branching_power\":3}");
    let restored: VectorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);
}

#[rstest]
fn test_deserialized_config_is_validated_on_use() {
    let config: VectorConfig = serde_json::from_str("{\"branching_power\":12}").unwrap();
    let result: Result<PersistentVector<i32>, _> = PersistentVector::with_config(config);
    assert_eq!(
        result.map(|vector| vector.len()),
        Err(VectorError::InvalidBranchingPower { power: 12 })
    );
}
