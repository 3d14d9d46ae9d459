use serde_json::json;

use chainform_spec::{
    BarrierState, CascadeController, ClearKind, Effect, EffectLog, FieldSet,
};

fn chain_fixture() -> FieldSet {
    FieldSet::from_json_str(
        &json!([
            {
                "id": 1,
                "name": "Has company",
                "field_type": "dropdown",
                "has_custom_validation": true,
                "options": ["", "yes", "no"],
                "show_values": ["yes"],
                "target_user_field_ids": [2]
            },
            {
                "id": 2,
                "name": "Company size",
                "field_type": "dropdown",
                "required": true,
                "has_custom_validation": true,
                "options": ["small", "large"],
                "conditional_fields": [
                    { "show_values": ["large"], "target_user_field_ids": [3] }
                ]
            },
            {
                "id": 3,
                "name": "Procurement contact",
                "field_type": "text",
                "required": true,
                "has_custom_validation": true,
                "show_values": ["x"],
                "target_user_field_ids": [4]
            },
            {
                "id": 4,
                "name": "Great grandchild",
                "field_type": "confirm",
                "required": true
            }
        ])
        .to_string(),
    )
    .expect("fixture should load")
}

fn ready_controller() -> CascadeController {
    let mut controller = CascadeController::new(chain_fixture());
    for id in [1, 2, 3] {
        controller.register(id).unwrap();
    }
    assert_eq!(controller.state(), BarrierState::Ready);
    controller
}

#[test]
fn hiding_a_parent_clears_children_and_grandchildren() {
    let mut controller = ready_controller();
    let mut log = EffectLog::default();

    controller.change_value(1, Some("yes".into())).unwrap();
    controller.change_value(2, Some("large".into())).unwrap();
    controller.settle(&mut log);
    assert!(!controller.is_hidden(2));
    assert!(!controller.is_hidden(3));
    log.take();

    controller.change_value(1, Some("no".into())).unwrap();
    let outcomes = controller.settle(&mut log);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].hidden_direct, vec![2]);
    assert_eq!(outcomes[0].hidden_nested, vec![3]);
    assert_eq!(
        log.effects(),
        &[
            Effect::Clear {
                field_id: 2,
                kind: ClearKind::FirstOption
            },
            Effect::Hide { field_id: 2 },
            Effect::Clear {
                field_id: 3,
                kind: ClearKind::Empty
            },
            Effect::Hide { field_id: 3 },
        ]
    );

    let child = controller.field(2).unwrap();
    assert_eq!(child.current_value.as_deref(), Some("small"));
    assert!(!child.required);
    let grandchild = controller.field(3).unwrap();
    assert_eq!(grandchild.current_value.as_deref(), Some(""));
    assert!(!grandchild.required);
}

#[test]
fn cascade_stops_after_one_extra_hop() {
    let mut controller = ready_controller();
    let mut log = EffectLog::default();

    controller.change_value(1, Some("no".into())).unwrap();
    controller.settle(&mut log);

    assert!(controller.is_hidden(2));
    assert!(controller.is_hidden(3));
    assert!(!controller.is_hidden(4));
    assert!(
        !log.effects()
            .iter()
            .any(|effect| matches!(effect, Effect::Hide { field_id: 4 }))
    );
}

#[test]
fn evaluation_waits_for_every_registration() {
    let mut controller = CascadeController::new(chain_fixture());
    let mut log = EffectLog::default();
    assert_eq!(controller.expected_count(), 3);

    assert_eq!(
        controller.change_value(1, Some("no".into())),
        Ok(BarrierState::Registering)
    );
    assert!(controller.settle(&mut log).is_empty());
    assert!(log.effects().is_empty());

    assert_eq!(controller.register(2), Ok(BarrierState::Registering));
    assert!(controller.settle(&mut log).is_empty());
    assert!(log.effects().is_empty());

    assert_eq!(controller.register(3), Ok(BarrierState::Ready));
    let outcomes = controller.settle(&mut log);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].parent_id, 1);
    assert!(log.effects().contains(&Effect::Hide { field_id: 2 }));
}

#[test]
fn reshowing_restores_original_required_flag() {
    let mut controller = ready_controller();
    let mut log = EffectLog::default();

    controller.change_value(1, Some("no".into())).unwrap();
    controller.settle(&mut log);
    assert!(!controller.field(2).unwrap().required);

    controller.change_value(1, Some("yes".into())).unwrap();
    controller.settle(&mut log);
    let child = controller.field(2).unwrap();
    assert!(child.required);
    assert_eq!(child.originally_required, Some(true));
}

#[test]
fn reshowing_an_optional_field_keeps_it_optional() {
    let fields = FieldSet::from_json_str(
        &json!([
            {
                "id": 1,
                "name": "Parent",
                "has_custom_validation": true,
                "show_values": ["show"],
                "target_user_field_ids": [2]
            },
            { "id": 2, "name": "Optional", "required": false }
        ])
        .to_string(),
    )
    .unwrap();
    let mut controller = CascadeController::new(fields);
    let mut log = EffectLog::default();

    controller.change_value(1, Some("hide".into())).unwrap();
    controller.settle(&mut log);
    controller.change_value(1, Some("show".into())).unwrap();
    controller.settle(&mut log);

    let field = controller.field(2).unwrap();
    assert!(!field.required);
    assert_eq!(field.originally_required, Some(false));
}

#[test]
fn unknown_targets_are_skipped() {
    let fields = FieldSet::from_json_str(
        &json!([
            {
                "id": 1,
                "name": "Parent",
                "has_custom_validation": true,
                "show_values": ["show"],
                "target_user_field_ids": [2, 404]
            },
            { "id": 2, "name": "Known" }
        ])
        .to_string(),
    )
    .unwrap();
    let mut controller = CascadeController::new(fields);
    let mut log = EffectLog::default();

    controller.change_value(1, Some("hide".into())).unwrap();
    let outcomes = controller.settle(&mut log);

    assert_eq!(outcomes[0].decisions.get(&404), Some(&false));
    assert_eq!(outcomes[0].hidden_direct, vec![2]);
    assert!(!controller.is_hidden(404));
}

#[test]
fn changes_to_plain_fields_do_not_queue_evaluations() {
    let mut controller = ready_controller();
    controller.change_value(4, Some("true".into())).unwrap();
    assert_eq!(controller.pending_count(), 0);
    assert_eq!(
        controller.field(4).unwrap().current_value.as_deref(),
        Some("true")
    );
}

#[test]
fn latest_change_decides_a_shared_target() {
    let fields = FieldSet::from_json_str(
        &json!([
            {
                "id": 1,
                "name": "First parent",
                "has_custom_validation": true,
                "show_values": ["show"],
                "target_user_field_ids": [3]
            },
            {
                "id": 2,
                "name": "Second parent",
                "has_custom_validation": true,
                "show_values": ["show"],
                "target_user_field_ids": [3]
            },
            { "id": 3, "name": "Shared", "required": true }
        ])
        .to_string(),
    )
    .expect("fixture should load");
    let mut controller = CascadeController::new(fields);
    let mut log = EffectLog::default();

    controller.change_value(1, Some("hide".into())).unwrap();
    controller.change_value(2, Some("hide".into())).unwrap();
    controller.change_value(1, Some("show".into())).unwrap();
    assert_eq!(controller.pending_count(), 2);

    let outcomes = controller.settle(&mut log);
    let order = outcomes
        .iter()
        .map(|outcome| outcome.parent_id)
        .collect::<Vec<_>>();
    assert_eq!(order, vec![2, 1]);
    assert_eq!(outcomes[1].value.as_deref(), Some("show"));
    assert!(!controller.is_hidden(3));
    assert!(controller.field(3).unwrap().required);
    assert_eq!(log.effects().last(), Some(&Effect::Show { field_id: 3 }));
}
