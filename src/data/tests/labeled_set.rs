//! LabeledSet 校验测试

use ndarray::{Array1, Array2, array};

use crate::data::{DataError, LabeledSet};

#[test]
fn test_labeled_set_basic() {
    let features = Array2::<f32>::zeros((4, 3));
    let labels = array![0, 2, 1];
    let set = LabeledSet::new(features, labels, 4, 3).unwrap();

    assert_eq!(set.len(), 3);
    assert!(!set.is_empty());
    assert_eq!(set.features().dim(), (4, 3));
    assert_eq!(set.labels()[1], 2);
}

#[test]
fn test_labeled_set_wrong_feature_rows() {
    let features = Array2::<f32>::zeros((5, 2));
    let result = LabeledSet::new(features, array![0, 1], 784, 10);
    assert!(matches!(result, Err(DataError::ShapeMismatch { .. })));
}

#[test]
fn test_labeled_set_label_count_mismatch() {
    let features = Array2::<f32>::zeros((4, 3));
    let result = LabeledSet::new(features, array![0, 1], 4, 10);
    assert!(matches!(result, Err(DataError::ShapeMismatch { .. })));
}

#[test]
fn test_labeled_set_label_out_of_range() {
    let features = Array2::<f32>::zeros((4, 2));
    let result = LabeledSet::new(features, array![3, 10], 4, 10);
    match result {
        Err(DataError::LabelOutOfRange {
            index,
            label,
            num_classes,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(label, 10);
            assert_eq!(num_classes, 10);
        }
        other => panic!("期望 LabelOutOfRange，实际 {other:?}"),
    }
}

#[test]
fn test_labeled_set_empty() {
    let features = Array2::<f32>::zeros((4, 0));
    let result = LabeledSet::new(features, Array1::from_vec(vec![]), 4, 10);
    assert!(matches!(result, Err(DataError::EmptyDataset)));
}
