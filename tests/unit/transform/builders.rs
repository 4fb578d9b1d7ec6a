use super::*;
use crate::foundation::config::StackOptions;
use crate::foundation::core::{DVec3, NodePath, OpValue, TimeCode, Vec3};
use crate::scene::diagnostics::CollectingDiagnostics;
use crate::scene::memory::InMemoryStage;
use crate::transform::command::UndoableCommand;
use std::rc::Rc;

fn setup() -> (InMemoryStage, TransformStack, Rc<CollectingDiagnostics>) {
    let mut stage = InMemoryStage::new();
    let node = stage.define_node("/Xf");
    let diagnostics = Rc::new(CollectingDiagnostics::default());
    let xf = TransformStack::new(node, StackOptions::default(), diagnostics.clone());
    (stage, xf, diagnostics)
}

fn names(stage: &InMemoryStage, node: &NodePath) -> Vec<String> {
    stage.op_order(node).unwrap().names.clone()
}

#[test]
fn translate_is_double_and_the_rest_float() {
    let (mut stage, xf, _) = setup();
    let mut translate = xf.translate_cmd(&stage, 1.0, 0.0, 0.0).unwrap().unwrap();
    let mut scale = xf.scale_cmd(&stage, 2.0, 2.0, 2.0).unwrap().unwrap();
    let mut rpt = xf
        .rotate_pivot_translate_cmd(&stage, 0.0, 1.0, 0.0)
        .unwrap()
        .unwrap();
    translate.execute(&mut stage).unwrap();
    scale.execute(&mut stage).unwrap();
    rpt.execute(&mut stage).unwrap();

    assert_eq!(
        stage.attribute_value(xf.node(), "xformOp:translate", TimeCode::Default),
        Some(OpValue::Vec3d(DVec3::X))
    );
    assert_eq!(
        stage.attribute_value(xf.node(), "xformOp:scale", TimeCode::Default),
        Some(OpValue::Vec3f(Vec3::splat(2.0)))
    );
    assert_eq!(
        stage.attribute_value(
            xf.node(),
            "xformOp:translate:rotatePivotTranslate",
            TimeCode::Default
        ),
        Some(OpValue::Vec3f(Vec3::Y))
    );
    assert_eq!(
        names(&stage, xf.node()),
        vec![
            "xformOp:translate",
            "xformOp:translate:rotatePivotTranslate",
            "xformOp:scale",
        ]
    );
}

#[test]
fn rotate_defaults_to_xyz() {
    let (mut stage, xf, _) = setup();
    let mut cmd = xf.rotate_cmd(&stage, 10.0, 20.0, 30.0).unwrap().unwrap();
    assert_eq!(cmd.target().name(), "xformOp:rotateXYZ");
    cmd.execute(&mut stage).unwrap();
    assert_eq!(
        stage.attribute_value(xf.node(), "xformOp:rotateXYZ", TimeCode::Default),
        Some(OpValue::Vec3f(Vec3::new(10.0, 20.0, 30.0)))
    );
}

#[test]
fn rotate_reuses_the_existing_convention() {
    let (mut stage, xf, _) = setup();
    stage
        .author_op(xf.node(), "xformOp:rotateZYX", Precision::Double, None)
        .unwrap();
    let mut cmd = xf.rotate_cmd(&stage, 0.0, 0.0, 0.0).unwrap().unwrap();
    assert_eq!(cmd.target().name(), "xformOp:rotateZYX");

    cmd.set_value(&mut stage, 15.0, -40.0, 70.0).unwrap();
    assert!(!cmd.created_op());
    let read = xf.rotation(&stage).unwrap();
    assert!((read - DVec3::new(15.0, -40.0, 70.0)).abs().max_element() < 1e-9);
}

#[test]
fn orient_builds_but_refuses_values() {
    let (mut stage, xf, _) = setup();
    stage
        .author_op(xf.node(), "xformOp:orient", Precision::Float, None)
        .unwrap();
    let mut cmd = xf.rotate_cmd(&stage, 0.0, 0.0, 0.0).unwrap().unwrap();
    assert!(matches!(
        cmd.set_value(&mut stage, 0.0, 0.0, 0.0).unwrap_err(),
        StackError::UnsupportedConversion(_)
    ));
}

#[test]
fn pivot_commands_create_both_halves() {
    for (kind, forward) in [
        (PivotKind::Rotate, "xformOp:translate:rotatePivot"),
        (PivotKind::Scale, "xformOp:translate:scalePivot"),
        (PivotKind::Common, "xformOp:translate:pivot"),
    ] {
        let (mut stage, xf, _) = setup();
        let mut cmd = xf.pivot_cmd(&stage, kind, 0.0, 0.0, 0.0).unwrap().unwrap();
        assert!(cmd.target().is_pivot_pair());
        cmd.set_value(&mut stage, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(
            names(&stage, xf.node()),
            vec![forward.to_string(), format!("!invert!{forward}")]
        );
        cmd.undo(&mut stage).unwrap();
        assert!(names(&stage, xf.node()).is_empty());
    }
}

#[test]
fn pivot_shorthands_pick_their_pair() {
    let (stage, xf, _) = setup();
    assert_eq!(
        xf.rotate_pivot_cmd(&stage, 0.0, 0.0, 0.0).unwrap().unwrap().target().name(),
        "xformOp:translate:rotatePivot"
    );
    assert_eq!(
        xf.scale_pivot_cmd(&stage, 0.0, 0.0, 0.0).unwrap().unwrap().target().name(),
        "xformOp:translate:scalePivot"
    );
    assert_eq!(
        xf.scale_pivot_translate_cmd(&stage, 0.0, 0.0, 0.0)
            .unwrap()
            .unwrap()
            .target()
            .name(),
        "xformOp:translate:scalePivotTranslate"
    );
}

#[test]
fn locked_attribute_yields_no_command_and_one_diagnostic() {
    let (mut stage, xf, diagnostics) = setup();
    stage
        .author_op(xf.node(), "xformOp:scale", Precision::Float, None)
        .unwrap();
    stage
        .lock_attribute(xf.node(), "xformOp:scale", "scale is locked by a stronger layer")
        .unwrap();

    assert!(xf.scale_cmd(&stage, 0.0, 0.0, 0.0).unwrap().is_none());
    assert_eq!(
        diagnostics.messages(),
        vec!["scale is locked by a stronger layer".to_string()]
    );
    // Other ops are unaffected.
    assert!(xf.translate_cmd(&stage, 0.0, 0.0, 0.0).unwrap().is_some());
    assert_eq!(diagnostics.messages().len(), 1);
}

#[test]
fn missing_attribute_checks_the_op_order() {
    let (mut stage, xf, diagnostics) = setup();
    stage.lock_op_order(xf.node(), "op order is locked").unwrap();

    assert!(xf.translate_cmd(&stage, 0.0, 0.0, 0.0).unwrap().is_none());
    assert_eq!(diagnostics.messages(), vec!["op order is locked".to_string()]);
}

#[test]
fn non_canonical_rotate_setup_is_an_error() {
    let (mut stage, xf, _) = setup();
    stage
        .author_op(xf.node(), "xformOp:rotateX", Precision::Float, None)
        .unwrap();
    stage
        .author_op(xf.node(), "xformOp:rotateY", Precision::Float, None)
        .unwrap();
    assert!(matches!(
        xf.rotate_cmd(&stage, 0.0, 0.0, 0.0).unwrap_err(),
        StackError::InvariantViolation(_)
    ));
}

#[test]
fn built_command_carries_its_value() {
    let (mut stage, xf, _) = setup();
    let mut cmd = xf.scale_cmd(&stage, 3.0, 3.0, 3.0).unwrap().unwrap();
    assert_eq!(cmd.value(), DVec3::splat(3.0));
    assert!(!cmd.is_bound());

    cmd.execute(&mut stage).unwrap();
    assert_eq!(xf.scale(&stage).unwrap(), DVec3::splat(3.0));

    cmd.undo(&mut stage).unwrap();
    assert_eq!(xf.scale(&stage).unwrap(), DVec3::ONE);
    cmd.redo(&mut stage).unwrap();
    assert_eq!(xf.scale(&stage).unwrap(), DVec3::splat(3.0));
}
