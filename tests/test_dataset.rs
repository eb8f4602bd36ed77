use std::collections::HashSet;
use std::io::Write;

use aipes::data::dataset::{load_images, GroupedDataset, KFoldDataset};
use aipes::AipesError;

use crate::common::create_relaxed_image;

mod common;

fn labelled(n: usize) -> Vec<aipes::core::domain::Image> {
    (0..n)
        .map(|i| create_relaxed_image(&format!("img{}", i), 2, -(i as f64)))
        .collect()
}

#[test]
fn test_groups_partition_images() {
    let dataset = KFoldDataset::new(labelled(10), 3, 42).unwrap();

    assert_eq!(dataset.ngroup(), 3);
    assert_eq!(dataset.len(), 10);

    let sizes: Vec<usize> = dataset.groups().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 3, 3]);

    let mut seen = HashSet::new();
    for group in dataset.groups() {
        for image in group {
            assert!(seen.insert(image.label.clone()));
        }
    }
    assert_eq!(seen.len(), 10);
}

#[test]
fn test_select_holds_out_one_group() {
    let dataset = KFoldDataset::new(labelled(7), 3, 5).unwrap();

    for index in 0..dataset.ngroup() {
        let (train, validation) = dataset.select(index).unwrap();
        assert_eq!(train.len() + validation.len(), 7);
        assert_eq!(validation, dataset.groups()[index]);

        let held: HashSet<_> = validation.iter().map(|i| &i.label).collect();
        assert!(train.iter().all(|i| !held.contains(&i.label)));
    }
}

#[test]
fn test_seed_controls_assignment() {
    let a = KFoldDataset::new(labelled(12), 4, 9).unwrap();
    let b = KFoldDataset::new(labelled(12), 4, 9).unwrap();
    assert_eq!(a.groups(), b.groups());
}

#[test]
fn test_invalid_group_counts() {
    assert_eq!(
        KFoldDataset::new(labelled(3), 0, 0).unwrap_err(),
        AipesError::InvalidGroupCount { ngroup: 0, images: 3 }
    );
    assert_eq!(
        KFoldDataset::new(labelled(3), 4, 0).unwrap_err(),
        AipesError::InvalidGroupCount { ngroup: 4, images: 3 }
    );
}

#[test]
fn test_select_out_of_range() {
    let dataset = KFoldDataset::new(labelled(4), 2, 0).unwrap();
    let err = dataset.select(2).unwrap_err();
    assert_eq!(
        err.downcast_ref::<AipesError>(),
        Some(&AipesError::GroupOutOfRange { index: 2, ngroup: 2 })
    );
}

#[test]
fn test_from_groups_keeps_layout() {
    let images = labelled(3);
    let dataset = KFoldDataset::from_groups(vec![vec![images[0].clone()], images[1..].to_vec()]);

    let (train, validation) = dataset.select(1).unwrap();
    assert_eq!(train, vec![images[0].clone()]);
    assert_eq!(validation, images[1..].to_vec());
}

#[test]
fn test_load_images_from_json() {
    let json = r#"[
        {
            "label": "h2",
            "atoms": [
                { "element_id": 0, "position": [0.0, 0.0, 0.0] },
                { "element_id": 0, "position": [0.74, 0.0, 0.0], "is_fixed": true }
            ],
            "energy": -31.7,
            "forces": [[0.1, 0.0, 0.0], [-0.1, 0.0, 0.0]]
        },
        {
            "atoms": [ { "element_id": 1, "position": [0.0, 0.0, 0.0] } ]
        }
    ]"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let images = load_images(file.path()).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].label, "h2");
    assert!(images[0].atoms[1].is_fixed);
    assert_eq!(images[0].reference_energy().unwrap(), -31.7);
    assert_eq!(images[0].reference_forces().unwrap().len(), 2);
    assert!(images[1].energy.is_none());
    assert!(images[1].lattice.is_none());
}

#[test]
fn test_load_images_reports_bad_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    assert!(load_images(file.path()).is_err());
}
