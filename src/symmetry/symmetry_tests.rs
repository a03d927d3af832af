use std::str::FromStr;

use crate::symmetry::PointGroup;

#[test]
fn test_symmetry_irrep_counts() {
    let counts = PointGroup::all()
        .iter()
        .map(|group| group.n_irreps())
        .collect::<Vec<_>>();
    assert_eq!(counts, vec![1, 2, 2, 2, 4, 4, 4, 8]);
}

#[test]
fn test_symmetry_cotton_order() {
    assert_eq!(PointGroup::C2v.irrep_labels(), &["A1", "A2", "B1", "B2"]);
    assert_eq!(PointGroup::D2h.irrep_label(3), "B3g");
    assert_eq!(PointGroup::D2h.irrep_label(7), "B3u");
    assert_eq!(PointGroup::C2h.irrep_label(8), "?");
}

#[test]
fn test_symmetry_parse() {
    assert_eq!(PointGroup::from_str("d2h").unwrap(), PointGroup::D2h);
    assert_eq!(PointGroup::from_str(" C2V ").unwrap(), PointGroup::C2v);
    assert_eq!(PointGroup::from_str("cs").unwrap(), PointGroup::Cs);
    assert!(PointGroup::from_str("D6h").is_err());
    for group in PointGroup::all() {
        assert_eq!(PointGroup::from_str(&group.to_string()).unwrap(), group);
    }
}

#[test]
fn test_symmetry_serde() {
    let group: PointGroup = serde_yaml::from_str("D2h").unwrap();
    assert_eq!(group, PointGroup::D2h);
    assert_eq!(serde_yaml::to_string(&PointGroup::C2v).unwrap().trim(), "C2v");
}
