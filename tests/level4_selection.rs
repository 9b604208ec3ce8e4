//! Level 4: Selection & Marquee
//!
//! Click selection, shift toggling, marquee rules and the group/ungroup
//! affordance offered after a marquee.

mod common;

use common::harness::EditorHarness;
use pipeline_node_editor::geometry::{Camera, Rect, Vec2};
use pipeline_node_editor::interaction::{GroupAffordance, Modifiers};
use pipeline_node_editor::{EdgeId, GestureKind, NodeId, NodeKind};
use pretty_assertions::assert_eq;

/// Two images side by side and a model below.
fn layout(harness: &mut EditorHarness) -> (NodeId, NodeId, NodeId) {
    let a = harness.add(NodeKind::Image, 100.0, 100.0);
    let b = harness.add(NodeKind::Image, 400.0, 100.0);
    let m = harness.add(NodeKind::Model, 100.0, 500.0);
    (a, b, m)
}

/// An image feeding a model on the same row; the edge runs from (300,200)
/// to (600,206.7) and passes (450,203.3) at its midpoint.
fn wired(harness: &mut EditorHarness) -> (NodeId, NodeId, EdgeId) {
    let a = harness.add(NodeKind::Image, 100.0, 100.0);
    let m = harness.add(NodeKind::Model, 600.0, 100.0);
    let e = harness.store_mut().add_edge(&a, "image", &m, "image").unwrap();
    (a, m, e)
}

fn selected(harness: &EditorHarness) -> Vec<NodeId> {
    harness.store().selected_node_ids().to_vec()
}

// ============================================================================
// Clicks
// ============================================================================

#[test]
fn test_click_selects_and_replaces() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);

    harness.click((150.0, 150.0));
    assert_eq!(selected(&harness), vec![a]);
    harness.click((450.0, 150.0));
    assert_eq!(selected(&harness), vec![b]);
}

#[test]
fn test_shift_click_toggles() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);

    harness.click((150.0, 150.0));
    harness.shift_click((450.0, 150.0));
    assert_eq!(selected(&harness), vec![a.clone(), b.clone()]);
    harness.shift_click((150.0, 150.0));
    assert_eq!(selected(&harness), vec![b]);
}

#[test]
fn test_click_on_selected_keeps_multi_selection() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);
    harness.click((150.0, 150.0));
    harness.shift_click((450.0, 150.0));

    harness.click((150.0, 150.0));
    assert_eq!(selected(&harness), vec![a, b]);
    // a click is not a move
    assert_eq!(harness.store().undo_stack_size(), 3);
}

#[test]
fn test_drag_moves_every_selected_node() {
    let mut harness = EditorHarness::new();
    let (a, b, m) = layout(&mut harness);
    harness.click((150.0, 150.0));
    harness.shift_click((450.0, 150.0));

    harness.drag((150.0, 150.0), (180.0, 170.0));
    assert_eq!(harness.position(&a), (130.0, 120.0));
    assert_eq!(harness.position(&b), (430.0, 120.0));
    assert_eq!(harness.position(&m), (100.0, 500.0));
}

#[test]
fn test_click_empty_canvas_deselects() {
    let mut harness = EditorHarness::new();
    layout(&mut harness);
    harness.click((150.0, 150.0));

    harness.click((1000.0, 700.0));
    assert!(selected(&harness).is_empty());
    assert_eq!(harness.gesture(), GestureKind::Idle);
}

#[test]
fn test_shift_click_empty_canvas_keeps_selection() {
    let mut harness = EditorHarness::new();
    let (a, _, _) = layout(&mut harness);
    harness.click((150.0, 150.0));

    harness.shift_click((1000.0, 700.0));
    assert_eq!(selected(&harness), vec![a]);
}

#[test]
fn test_click_edge_selects_it_alone() {
    let mut harness = EditorHarness::new();
    let (a, _, e) = wired(&mut harness);
    harness.click((150.0, 150.0));
    assert_eq!(selected(&harness), vec![a]);

    harness.click((450.0, 203.0));
    assert!(selected(&harness).is_empty());
    assert_eq!(harness.store().selected_edge_ids().to_vec(), vec![e.clone()]);

    harness.shift_click((450.0, 203.0));
    assert!(!harness.store().is_edge_selected(&e));
}

// ============================================================================
// Marquee
// ============================================================================

#[test]
fn test_small_movement_does_not_commit_marquee() {
    let mut harness = EditorHarness::new();
    layout(&mut harness);
    harness.press((1000.0, 700.0));
    harness.move_to((1002.0, 701.0));
    assert!(harness.editor.view().marquee.is_none());
    harness.release((1002.0, 701.0));
    assert!(harness.editor.interaction().affordance().is_none());
}

#[test]
fn test_marquee_selects_overlapping_nodes() {
    let mut harness = EditorHarness::new();
    let (a, _, _) = layout(&mut harness);

    harness.press((50.0, 50.0));
    harness.move_steps((50.0, 50.0), (350.0, 350.0));
    assert_eq!(harness.gesture(), GestureKind::Marquee);
    assert_eq!(harness.editor.view().marquee, Some(Rect::new(50.0, 50.0, 300.0, 300.0)));
    // live selection while dragging
    assert_eq!(selected(&harness), vec![a.clone()]);
    harness.release((350.0, 350.0));

    assert_eq!(selected(&harness), vec![a]);
    assert!(harness.editor.view().marquee.is_none());
}

#[test]
fn test_marquee_partial_overlap_counts() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);

    // starts below the nodes, reaches into both
    harness.drag((250.0, 320.0), (450.0, 260.0));
    assert_eq!(selected(&harness), vec![a, b]);
}

#[test]
fn test_marquee_shrinking_deselects() {
    let mut harness = EditorHarness::new();
    let (a, _, _) = layout(&mut harness);

    harness.press((50.0, 50.0));
    harness.move_steps((50.0, 50.0), (700.0, 350.0));
    assert_eq!(selected(&harness).len(), 2);
    harness.move_steps((700.0, 350.0), (200.0, 350.0));
    harness.release((200.0, 350.0));
    assert_eq!(selected(&harness), vec![a]);
}

#[test]
fn test_additive_marquee_unions_with_previous_selection() {
    let mut harness = EditorHarness::new();
    let (a, _, m) = layout(&mut harness);
    harness.click((150.0, 600.0));
    assert_eq!(selected(&harness), vec![m.clone()]);

    harness.drag_with((50.0, 50.0), (200.0, 200.0), Modifiers::shift());
    assert_eq!(selected(&harness), vec![m, a]);
}

#[test]
fn test_marquee_edge_needs_an_endpoint_inside() {
    let mut harness = EditorHarness::new();
    let (_, m, e) = wired(&mut harness);

    // spans the middle of the curve only
    harness.drag((420.0, 150.0), (480.0, 260.0));
    assert!(harness.store().selected_edge_ids().is_empty());
    assert!(selected(&harness).is_empty());

    // covers the target terminal
    harness.drag((560.0, 150.0), (640.0, 260.0));
    assert_eq!(harness.store().selected_edge_ids().to_vec(), vec![e]);
    assert_eq!(selected(&harness), vec![m]);
}

#[test]
fn test_marquee_respects_camera() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);
    harness
        .store_mut()
        .set_camera(Camera::new(-300.0, 0.0, 2.0).into());

    // screen (180,180)-(260,260) is world (390,90)-(430,130)
    harness.drag((180.0, 180.0), (260.0, 260.0));
    assert_eq!(selected(&harness), vec![b]);
    assert!(!harness.store().is_node_selected(&a));
}

// ============================================================================
// Group affordance
// ============================================================================

#[test]
fn test_marquee_over_two_images_offers_group() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);

    harness.drag((50.0, 50.0), (700.0, 350.0));
    match harness.editor.interaction().affordance() {
        Some(GroupAffordance::Group { node_ids, bounds }) => {
            assert_eq!(node_ids, &vec![a.clone(), b.clone()]);
            assert_eq!(*bounds, Rect::new(100.0, 100.0, 500.0, 200.0));
        }
        other => panic!("expected group affordance, got {other:?}"),
    }

    let (engine, store) = harness.editor.parts_mut();
    assert!(engine.apply_group_affordance(store));
    let group = harness.store().groups().values().next().unwrap();
    assert_eq!(group.members.iter().cloned().collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(group.name, "Group 1");
    assert!(group.rect.contains(Vec2::new(100.0, 100.0)));
    assert_eq!(harness.editor.interaction().active_group(), Some(&group.id));
}

#[test]
fn test_non_image_selection_offers_nothing() {
    let mut harness = EditorHarness::new();
    layout(&mut harness);

    // one image and the model
    harness.drag((50.0, 250.0), (250.0, 600.0));
    assert_eq!(selected(&harness).len(), 2);
    assert!(harness.editor.interaction().affordance().is_none());
}

#[test]
fn test_marquee_touching_group_offers_ungroup() {
    let mut harness = EditorHarness::new();
    let (a, b, _) = layout(&mut harness);
    let group = harness
        .store_mut()
        .add_group(None, Rect::new(80.0, 40.0, 540.0, 280.0), [a.clone(), b.clone()]);

    // catches the group frame's bottom margin, no node
    harness.drag((700.0, 330.0), (300.0, 310.0));
    assert!(selected(&harness).is_empty());
    let affordance = harness.editor.interaction().affordance().cloned();
    assert_eq!(
        affordance,
        Some(GroupAffordance::Ungroup { group_id: group.clone(), bounds: Rect::new(80.0, 40.0, 540.0, 280.0) })
    );

    let (engine, store) = harness.editor.parts_mut();
    engine.apply_group_affordance(store);
    assert!(harness.store().groups().is_empty());
    assert_eq!(harness.store().nodes().len(), 3);
    harness.store_mut().undo();
    assert!(harness.store().group(&group).is_some());
}
