use super::*;
use proptest::prelude::*;

const EULER_ORDERS: [(&str, [usize; 3]); 6] = [
    ("xformOp:rotateXYZ", [0, 1, 2]),
    ("xformOp:rotateXZY", [0, 2, 1]),
    ("xformOp:rotateYXZ", [1, 0, 2]),
    ("xformOp:rotateYZX", [1, 2, 0]),
    ("xformOp:rotateZXY", [2, 0, 1]),
    ("xformOp:rotateZYX", [2, 1, 0]),
];

fn assert_same_rotation(a: DMat3, b: DMat3) {
    for c in 0..3 {
        let d = a.col(c) - b.col(c);
        assert!(d.abs().max_element() < 1e-9, "{a:?} != {b:?}");
    }
}

fn angles() -> impl Strategy<Value = DVec3> {
    (-360.0f64..=360.0, -360.0f64..=360.0, -360.0f64..=360.0)
        .prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

#[test]
fn table_has_ten_entries_and_one_unsupported() {
    assert_eq!(conversions().count(), 10);
    let unsupported: Vec<_> = conversions().filter(|c| !c.is_supported()).collect();
    assert_eq!(unsupported.len(), 1);
    assert_eq!(unsupported[0].op_name(), "xformOp:orient");
}

#[test]
fn orient_resolves_but_fails_when_invoked() {
    let cvt = conversion_for("xformOp:orient").unwrap();
    let err = cvt.to_attr(DVec3::ZERO).unwrap_err();
    assert!(matches!(err, StackError::UnsupportedConversion(_)));
    let err = cvt
        .from_value(OpValue::Vec3f(glam::Vec3::ZERO))
        .unwrap_err();
    assert!(matches!(err, StackError::UnsupportedConversion(_)));
}

#[test]
fn non_rotate_names_are_lookup_errors() {
    assert!(conversion_for("xformOp:scale").unwrap_err().is_lookup());
}

#[test]
fn single_axis_keeps_only_its_component() {
    let v = DVec3::new(10.0, 20.0, 30.0);
    let x = conversion_for("xformOp:rotateX").unwrap();
    let y = conversion_for("xformOp:rotateY").unwrap();
    let z = conversion_for("xformOp:rotateZ").unwrap();
    assert_eq!(x.to_attr(v).unwrap(), RotationAttr::Scalar(10.0));
    assert_eq!(y.to_attr(v).unwrap(), RotationAttr::Scalar(20.0));
    assert_eq!(z.to_attr(v).unwrap(), RotationAttr::Scalar(30.0));
    assert_eq!(
        y.from_attr(RotationAttr::Scalar(20.0)).unwrap(),
        DVec3::new(0.0, 20.0, 0.0)
    );
}

#[test]
fn shape_mismatch_is_an_invariant_violation() {
    let x = conversion_for("xformOp:rotateX").unwrap();
    assert!(matches!(
        x.from_attr(RotationAttr::Vector(DVec3::ONE)),
        Err(StackError::InvariantViolation(_))
    ));
    let xyz = conversion_for("xformOp:rotateXYZ").unwrap();
    assert!(matches!(
        xyz.from_attr(RotationAttr::Scalar(1.0)),
        Err(StackError::InvariantViolation(_))
    ));
}

#[test]
fn to_value_applies_precision() {
    let xyz = default_conversion();
    assert_eq!(xyz.op_name(), default_rotate_op_name());
    assert_eq!(
        xyz.to_value(DVec3::new(1.0, 2.0, 3.0), Precision::Float)
            .unwrap(),
        OpValue::Vec3f(glam::Vec3::new(1.0, 2.0, 3.0))
    );
    let x = conversion_for("xformOp:rotateX").unwrap();
    assert_eq!(
        x.to_value(DVec3::new(5.0, 0.0, 0.0), Precision::Double)
            .unwrap(),
        OpValue::Double(5.0)
    );
}

#[test]
fn reorder_small_angles_roundtrip_exactly() {
    let v = DVec3::new(10.0, 20.0, 30.0);
    for (name, _) in EULER_ORDERS {
        let cvt = conversion_for(name).unwrap();
        let back = cvt.from_attr(cvt.to_attr(v).unwrap()).unwrap();
        assert!((back - v).abs().max_element() < 1e-9, "{name}: {back:?}");
    }
}

#[test]
fn gimbal_lock_still_rebuilds_the_rotation() {
    for (_, order) in EULER_ORDERS {
        let mut v = DVec3::new(25.0, 40.0, -15.0);
        v[order[1]] = 90.0;
        let m = compose(v, order);
        assert_same_rotation(compose(decompose(m, order), order), m);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn to_attr_preserves_the_rotation(v in angles()) {
        for (name, order) in EULER_ORDERS {
            let cvt = conversion_for(name).unwrap();
            let RotationAttr::Vector(stored) = cvt.to_attr(v).unwrap() else {
                panic!("{name} stored a scalar");
            };
            assert_same_rotation(compose(stored, order), compose(v, XYZ));
        }
    }

    #[test]
    fn from_attr_preserves_the_rotation(a in angles()) {
        for (name, order) in EULER_ORDERS {
            let cvt = conversion_for(name).unwrap();
            let xyz = cvt.from_attr(RotationAttr::Vector(a)).unwrap();
            assert_same_rotation(compose(xyz, XYZ), compose(a, order));
        }
    }

    #[test]
    fn stored_roundtrip_is_stable(v in angles()) {
        for (name, order) in EULER_ORDERS {
            let cvt = conversion_for(name).unwrap();
            let stored = cvt.to_attr(v).unwrap();
            let again = cvt.to_attr(cvt.from_attr(stored).unwrap()).unwrap();
            let (RotationAttr::Vector(s), RotationAttr::Vector(t)) = (stored, again) else {
                panic!("{name} stored a scalar");
            };
            assert_same_rotation(compose(s, order), compose(t, order));
        }
    }

    #[test]
    fn xyz_and_single_axis_roundtrip_values(v in angles()) {
        let xyz = conversion_for("xformOp:rotateXYZ").unwrap();
        prop_assert_eq!(xyz.from_attr(xyz.to_attr(v).unwrap()).unwrap(), v);
        let x = conversion_for("xformOp:rotateX").unwrap();
        prop_assert_eq!(
            x.from_attr(x.to_attr(v).unwrap()).unwrap(),
            DVec3::new(v.x, 0.0, 0.0)
        );
    }
}
