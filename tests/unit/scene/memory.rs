use super::*;
use crate::foundation::core::{DVec3, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

fn stage_with_node() -> (InMemoryStage, NodePath) {
    let mut stage = InMemoryStage::new();
    let node = stage.define_node("/World/Cube");
    (stage, node)
}

fn recorder(stage: &mut InMemoryStage) -> Rc<RefCell<Vec<Notification>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    stage.subscribe(move |n| sink.borrow_mut().push(n.clone()));
    seen
}

#[test]
fn create_operation_appends_to_order() {
    let (mut stage, node) = stage_with_node();
    stage
        .author_op(&node, "xformOp:scale", Precision::Float, None)
        .unwrap();
    let op = stage
        .create_operation(&node, OpKind::Translate, Precision::Double, None, false)
        .unwrap();
    assert_eq!(op.name(), "xformOp:translate");
    assert_eq!(
        stage.op_order(&node).unwrap().names,
        vec!["xformOp:scale", "xformOp:translate"]
    );
}

#[test]
fn inverse_op_shares_the_forward_attribute() {
    let (mut stage, node) = stage_with_node();
    stage
        .create_operation(
            &node,
            OpKind::Translate,
            Precision::Float,
            Some("pivot"),
            false,
        )
        .unwrap();
    let inv = stage
        .create_operation(
            &node,
            OpKind::Translate,
            Precision::Float,
            Some("pivot"),
            true,
        )
        .unwrap();
    assert!(inv.is_inverse());
    assert_eq!(inv.attr_name(), "xformOp:translate:pivot");
    assert_eq!(stage.attribute_names(&node), vec!["xformOp:translate:pivot"]);
}

#[test]
fn duplicate_op_is_rejected() {
    let (mut stage, node) = stage_with_node();
    stage
        .create_operation(&node, OpKind::Scale, Precision::Float, None, false)
        .unwrap();
    let err = stage
        .create_operation(&node, OpKind::Scale, Precision::Float, None, false)
        .unwrap_err();
    assert!(matches!(err, StackError::InvariantViolation(_)));
}

#[test]
fn time_samples_interpolate_and_clamp() {
    let (mut stage, node) = stage_with_node();
    stage
        .author_op(
            &node,
            "xformOp:translate",
            Precision::Double,
            Some(OpValue::Vec3d(DVec3::splat(-1.0))),
        )
        .unwrap();
    stage
        .author_sample(
            &node,
            "xformOp:translate",
            0.0,
            OpValue::Vec3d(DVec3::ZERO),
        )
        .unwrap();
    stage
        .author_sample(
            &node,
            "xformOp:translate",
            10.0,
            OpValue::Vec3d(DVec3::new(10.0, 0.0, 0.0)),
        )
        .unwrap();

    let at = |t| stage.attribute_value(&node, "xformOp:translate", t);
    assert_eq!(
        at(TimeCode::At(5.0)),
        Some(OpValue::Vec3d(DVec3::new(5.0, 0.0, 0.0)))
    );
    assert_eq!(
        at(TimeCode::At(-3.0)),
        Some(OpValue::Vec3d(DVec3::ZERO))
    );
    assert_eq!(
        at(TimeCode::At(30.0)),
        Some(OpValue::Vec3d(DVec3::new(10.0, 0.0, 0.0)))
    );
    assert_eq!(
        at(TimeCode::Default),
        Some(OpValue::Vec3d(DVec3::splat(-1.0)))
    );
}

#[test]
fn precision_mismatch_on_write_is_an_invariant_violation() {
    let (mut stage, node) = stage_with_node();
    stage
        .author_op(&node, "xformOp:scale", Precision::Float, None)
        .unwrap();
    let err = stage
        .set_attribute_value(
            &node,
            "xformOp:scale",
            OpValue::Vec3d(DVec3::ONE),
            TimeCode::Default,
        )
        .unwrap_err();
    assert!(matches!(err, StackError::InvariantViolation(_)));
}

#[test]
fn locked_attribute_refuses_writes() {
    let (mut stage, node) = stage_with_node();
    stage
        .author_op(&node, "xformOp:scale", Precision::Float, None)
        .unwrap();
    stage
        .lock_attribute(&node, "xformOp:scale", "scale is locked")
        .unwrap();
    assert_eq!(
        stage.edit_permission(&node, EditTarget::Attribute("xformOp:scale")),
        Permission::Denied("scale is locked".to_string())
    );
    let err = stage
        .set_attribute_value(
            &node,
            "xformOp:scale",
            OpValue::Vec3f(Vec3::ONE),
            TimeCode::Default,
        )
        .unwrap_err();
    assert!(matches!(err, StackError::Permission(_)));
}

#[test]
fn edit_target_lock_denies_everything() {
    let (mut stage, node) = stage_with_node();
    stage.lock_edit_target("layer is read-only");
    assert!(!stage.edit_target_permission().is_allowed());
    assert!(!stage.edit_permission(&node, EditTarget::OpOrder).is_allowed());
}

#[test]
fn captured_edits_replay_in_both_directions() {
    let (mut stage, node) = stage_with_node();
    stage.begin_undo_capture();
    stage
        .create_operation(&node, OpKind::Scale, Precision::Float, None, false)
        .unwrap();
    stage
        .set_attribute_value(
            &node,
            "xformOp:scale",
            OpValue::Vec3f(Vec3::splat(2.0)),
            TimeCode::Default,
        )
        .unwrap();
    let edits = stage.end_undo_capture();
    assert_eq!(edits.len(), 3);

    for edit in edits.iter().rev() {
        stage.apply_edit(&edit.inverse()).unwrap();
    }
    assert!(stage.op_order(&node).unwrap().names.is_empty());
    assert!(!stage.has_attribute(&node, "xformOp:scale"));

    for edit in &edits {
        stage.apply_edit(edit).unwrap();
    }
    assert_eq!(
        stage.attribute_value(&node, "xformOp:scale", TimeCode::Default),
        Some(OpValue::Vec3f(Vec3::splat(2.0)))
    );
}

#[test]
fn nested_capture_is_collected_by_the_outermost() {
    let (mut stage, node) = stage_with_node();
    stage.begin_undo_capture();
    stage.begin_undo_capture();
    stage
        .create_operation(&node, OpKind::Scale, Precision::Float, None, false)
        .unwrap();
    assert!(stage.end_undo_capture().is_empty());
    assert_eq!(stage.end_undo_capture().len(), 2);
}

#[test]
fn suppressed_node_emits_one_stack_change() {
    let (mut stage, node) = stage_with_node();
    let seen = recorder(&mut stage);

    stage.suppress_notifications(&node);
    stage
        .create_operation(
            &node,
            OpKind::Translate,
            Precision::Float,
            Some("pivot"),
            false,
        )
        .unwrap();
    stage
        .create_operation(
            &node,
            OpKind::Translate,
            Precision::Float,
            Some("pivot"),
            true,
        )
        .unwrap();
    assert!(seen.borrow().is_empty());
    stage.resume_notifications(&node);

    assert_eq!(
        *seen.borrow(),
        vec![Notification::StackChanged {
            node: node.clone(),
            ops: vec![
                "xformOp:translate:pivot".to_string(),
                "!invert!xformOp:translate:pivot".to_string(),
            ],
        }]
    );
}

#[test]
fn unsuppressed_edits_notify_each_step() {
    let (mut stage, node) = stage_with_node();
    let seen = recorder(&mut stage);
    stage
        .create_operation(&node, OpKind::Scale, Precision::Float, None, false)
        .unwrap();
    stage
        .set_attribute_value(
            &node,
            "xformOp:scale",
            OpValue::Vec3f(Vec3::ONE),
            TimeCode::Default,
        )
        .unwrap();
    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert_eq!(
        seen[2],
        Notification::ValueChanged {
            node: node.clone(),
            attr: "xformOp:scale".to_string(),
        }
    );
}

#[test]
fn ordered_operations_carry_precision_and_reset_flag() {
    let (mut stage, node) = stage_with_node();
    stage
        .author_op(&node, "xformOp:translate", Precision::Double, None)
        .unwrap();
    stage.set_resets_xform_stack(&node, true).unwrap();
    let (ops, resets) = stage.ordered_operations(&node).unwrap();
    assert!(resets);
    assert_eq!(ops, vec![Operation::new("xformOp:translate", Precision::Double)]);
}

#[test]
fn missing_node_is_an_invariant_violation() {
    let stage = InMemoryStage::new();
    let err = stage
        .ordered_operations(&NodePath::new("/Nope"))
        .unwrap_err();
    assert!(matches!(err, StackError::InvariantViolation(_)));
    assert!(!stage.is_transformable(&NodePath::new("/Nope")));
}
