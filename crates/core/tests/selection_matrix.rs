use spellgrid_core::{
    apply_drop, AllLoaded, BoardKind, CardCatalog, CardRecord, CardType, DeckRegions, EventBus,
    GroupId, LayoutConfig, LayoutEvent, Modifiers, PlacementRef, PlacementStore, Point,
    SelectionController, SelectionPhase,
};
use std::collections::{BTreeSet, HashSet};

/// Three portrait cards in a row and one site below them.
fn table() -> (CardCatalog, PlacementStore) {
    let catalog = CardCatalog::from_records([
        CardRecord::new("A", CardType::Minion),
        CardRecord::new("B", CardType::Minion),
        CardRecord::new("C", CardType::Magic),
        CardRecord::new("S", CardType::Site),
    ]);
    let mut store = PlacementStore::new();
    store.add_placement("A", &GroupId::Catalog, Point::new(100.0, 100.0));
    store.add_placement("B", &GroupId::Catalog, Point::new(210.0, 100.0));
    store.add_placement("C", &GroupId::Catalog, Point::new(320.0, 100.0));
    store.add_placement("S", &GroupId::Catalog, Point::new(100.0, 400.0));
    (catalog, store)
}

fn at(card: &str) -> PlacementRef {
    PlacementRef::new(card, GroupId::Catalog, 0)
}

fn point_in(card: &str) -> Point {
    match card {
        "A" => Point::new(150.0, 150.0),
        "B" => Point::new(260.0, 150.0),
        "C" => Point::new(370.0, 150.0),
        "S" => Point::new(150.0, 450.0),
        _ => Point::new(-1000.0, -1000.0),
    }
}

fn click(
    controller: &mut SelectionController,
    store: &mut PlacementStore,
    catalog: &CardCatalog,
    card: &str,
    modifiers: Modifiers,
) {
    let mut events = EventBus::default();
    let pointer = point_in(card);
    controller.pointer_down(pointer, modifiers, store, catalog, &AllLoaded, &mut events);
    controller.pointer_up(pointer, store, catalog, &AllLoaded, &mut events);
}

fn selected(controller: &SelectionController) -> Vec<String> {
    controller
        .selection()
        .iter()
        .map(|placement| placement.card.clone())
        .collect()
}

macro_rules! click_case {
    ($name:ident, [$(($card:expr, $mods:expr)),* $(,)?], [$($expected:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            let (catalog, mut store) = table();
            let mut controller = SelectionController::new(LayoutConfig::default());
            $(click(&mut controller, &mut store, &catalog, $card, $mods);)*
            let expected: Vec<String> = vec![$($expected.to_string()),*];
            assert_eq!(selected(&controller), expected);
        }
    };
}

click_case!(plain_click_selects_one, [("A", Modifiers::NONE)], ["A"]);
click_case!(
    plain_click_replaces_selection,
    [("A", Modifiers::NONE), ("B", Modifiers::NONE)],
    ["B"]
);
click_case!(
    shift_click_adds,
    [("A", Modifiers::NONE), ("B", Modifiers::SHIFT)],
    ["A", "B"]
);
click_case!(
    alt_click_removes,
    [
        ("A", Modifiers::NONE),
        ("B", Modifiers::SHIFT),
        ("A", Modifiers::ALT)
    ],
    ["B"]
);
click_case!(
    alt_click_on_unselected_is_a_no_op,
    [("A", Modifiers::NONE), ("C", Modifiers::ALT)],
    ["A"]
);
click_case!(
    plain_click_on_selected_keeps_selection,
    [
        ("A", Modifiers::NONE),
        ("B", Modifiers::SHIFT),
        ("A", Modifiers::NONE)
    ],
    ["A", "B"]
);
click_case!(
    empty_click_clears,
    [("A", Modifiers::NONE), ("nowhere", Modifiers::NONE)],
    []
);
click_case!(
    shift_empty_click_keeps,
    [("A", Modifiers::NONE), ("nowhere", Modifiers::SHIFT)],
    ["A"]
);

#[test]
fn phases_follow_the_gesture() {
    let (catalog, mut store) = table();
    let mut controller = SelectionController::new(LayoutConfig::default());
    let mut events = EventBus::default();
    assert_eq!(controller.phase(), SelectionPhase::Idle);

    controller.pointer_down(
        point_in("A"),
        Modifiers::NONE,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    assert_eq!(controller.phase(), SelectionPhase::Dragging);
    assert_eq!(controller.anchor(), Some(&at("A")));
    controller.pointer_up(point_in("A"), &mut store, &catalog, &AllLoaded, &mut events);
    assert_eq!(controller.phase(), SelectionPhase::SingleSelected);

    click(&mut controller, &mut store, &catalog, "B", Modifiers::SHIFT);
    assert_eq!(controller.phase(), SelectionPhase::MultiSelected);

    controller.pointer_down(
        Point::new(0.0, 0.0),
        Modifiers::NONE,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    assert_eq!(controller.phase(), SelectionPhase::BoxSelecting);
    controller.pointer_up(Point::new(0.0, 0.0), &mut store, &catalog, &AllLoaded, &mut events);
    assert_eq!(controller.phase(), SelectionPhase::Idle);
}

#[test]
fn two_card_drag_moves_rigidly_then_snaps_per_card() {
    let (catalog, mut store) = table();
    let mut controller = SelectionController::new(LayoutConfig::default());
    let mut events = EventBus::default();
    click(&mut controller, &mut store, &catalog, "A", Modifiers::NONE);
    click(&mut controller, &mut store, &catalog, "B", Modifiers::SHIFT);
    // Selecting by click snapped both; put them back on the unsnapped originals.
    store.set_position(&at("A"), Point::new(100.0, 100.0)).expect("A");
    store.set_position(&at("B"), Point::new(210.0, 100.0)).expect("B");

    let start = Point::new(120.0, 130.0);
    controller.pointer_down(start, Modifiers::NONE, &store, &catalog, &AllLoaded, &mut events);
    for step in 1..=20 {
        let t = step as f32 / 20.0;
        let pointer = start + Point::new(40.0, -10.0).scale(t);
        controller.pointer_move(pointer, &mut store, &catalog, &AllLoaded, &mut events);
    }
    assert_eq!(store.position(&at("A")), Some(Point::new(140.0, 90.0)));
    assert_eq!(store.position(&at("B")), Some(Point::new(250.0, 90.0)));

    let summary = controller
        .pointer_up(start + Point::new(40.0, -10.0), &mut store, &catalog, &AllLoaded, &mut events)
        .expect("drag summary");
    assert_eq!(store.position(&at("A")), Some(Point::new(165.0, 110.0)));
    assert_eq!(store.position(&at("B")), Some(Point::new(275.0, 110.0)));
    assert_eq!(summary.moved, vec![at("A"), at("B")]);
    assert_eq!(summary.originals[&at("A")], Point::new(100.0, 100.0));
    assert_eq!(controller.phase(), SelectionPhase::MultiSelected);
    assert!(events.is_empty());
}

#[test]
fn relative_offsets_survive_a_long_drag() {
    let (catalog, mut store) = table();
    let mut controller = SelectionController::new(LayoutConfig::default());
    let mut events = EventBus::default();
    click(&mut controller, &mut store, &catalog, "A", Modifiers::NONE);
    click(&mut controller, &mut store, &catalog, "C", Modifiers::SHIFT);
    let before = store.position(&at("C")).expect("C") - store.position(&at("A")).expect("A");

    controller.pointer_down(
        point_in("C"),
        Modifiers::NONE,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    let mut pointer = point_in("C");
    for step in 0..500 {
        pointer = pointer + Point::new(0.37 * (step % 7) as f32, -0.11 * (step % 5) as f32);
        controller.pointer_move(pointer, &mut store, &catalog, &AllLoaded, &mut events);
    }
    let during = store.position(&at("C")).expect("C") - store.position(&at("A")).expect("A");
    assert!((during.x - before.x).abs() < 1e-3);
    assert!((during.y - before.y).abs() < 1e-3);
}

#[test]
fn site_snaps_on_its_own_grid() {
    let (catalog, mut store) = table();
    let mut controller = SelectionController::new(LayoutConfig::default());
    let mut events = EventBus::default();
    controller.pointer_down(
        point_in("S"),
        Modifiers::NONE,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    let pointer = point_in("S") + Point::new(-10.0, 30.0);
    controller.pointer_move(pointer, &mut store, &catalog, &AllLoaded, &mut events);
    controller.pointer_up(pointer, &mut store, &catalog, &AllLoaded, &mut events);
    // (90, 430) lands on the 82.5 x 55 site grid.
    assert_eq!(store.position(&at("S")), Some(Point::new(82.5, 440.0)));
}

#[test]
fn box_selection_combines_with_modifiers() {
    let (catalog, mut store) = table();
    let mut controller = SelectionController::new(LayoutConfig::default());
    let mut events = EventBus::default();

    controller.pointer_down(
        Point::new(50.0, 50.0),
        Modifiers::NONE,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    controller.pointer_move(
        Point::new(260.0, 120.0),
        &mut store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    assert!(controller.selection_box().is_some());
    controller.pointer_up(Point::new(260.0, 120.0), &mut store, &catalog, &AllLoaded, &mut events);
    assert_eq!(selected(&controller), vec!["A", "B"]);

    controller.pointer_down(
        Point::new(50.0, 380.0),
        Modifiers::SHIFT,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    controller.pointer_move(
        Point::new(120.0, 420.0),
        &mut store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    controller.pointer_up(Point::new(120.0, 420.0), &mut store, &catalog, &AllLoaded, &mut events);
    assert_eq!(selected(&controller), vec!["A", "B", "S"]);

    controller.pointer_down(
        Point::new(215.0, 50.0),
        Modifiers::ALT,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    controller.pointer_move(
        Point::new(230.0, 120.0),
        &mut store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    controller.pointer_up(Point::new(230.0, 120.0), &mut store, &catalog, &AllLoaded, &mut events);
    assert_eq!(selected(&controller), vec!["A", "S"]);
}

#[test]
fn unloaded_art_is_not_hittable() {
    let (catalog, store) = table();
    let controller = SelectionController::new(LayoutConfig::default());
    let loaded: HashSet<String> = ["B".to_string()].into_iter().collect();
    assert_eq!(controller.hit_test(&store, &catalog, &loaded, point_in("A")), None);
    assert_eq!(controller.hit_test(&store, &catalog, &loaded, point_in("B")), Some(at("B")));
}

#[test]
fn board_copy_is_hit_above_the_catalog_card() {
    let (catalog, mut store) = table();
    let board = GroupId::board("deck", BoardKind::Sideboard);
    store.add_placement("C", &board, Point::new(120.0, 120.0));
    let controller = SelectionController::new(LayoutConfig::default());
    assert_eq!(
        controller.hit_test(&store, &catalog, &AllLoaded, Point::new(150.0, 150.0)),
        Some(PlacementRef::new("C", board, 0))
    );
}

#[test]
fn stale_references_are_pruned_after_a_drop() {
    let (catalog, mut store) = table();
    let config = LayoutConfig::default();
    let regions = DeckRegions::at("deck", Point::new(0.0, 2035.0), &config);
    let main = regions.group(BoardKind::Mainboard);
    store.add_placement("A", &main, Point::new(220.0, 2145.0));

    let mut controller = SelectionController::new(config);
    let mut events = EventBus::default();
    let grab = Point::new(250.0, 2200.0);
    controller.pointer_down(grab, Modifiers::NONE, &store, &catalog, &AllLoaded, &mut events);
    let outside = Point::new(250.0, -900.0);
    controller.pointer_move(outside, &mut store, &catalog, &AllLoaded, &mut events);
    let summary = controller
        .pointer_up(outside, &mut store, &catalog, &AllLoaded, &mut events)
        .expect("summary");

    let outcome = apply_drop(&mut store, &mut [], &summary, &[regions], &mut events);
    assert_eq!(outcome.removed, 1);
    assert_eq!(controller.prune_stale(&store, &mut events), 1);
    assert!(controller.selection().is_empty());
    assert_eq!(controller.anchor(), None);
    assert!(events
        .events()
        .iter()
        .any(|event| matches!(event, LayoutEvent::StaleSelectionReference { .. })));
    let dragged: BTreeSet<PlacementRef> = controller.dragged();
    assert!(dragged.is_empty());
}

#[test]
fn removed_copy_does_not_leave_its_sibling_selected() {
    let (catalog, mut store) = table();
    let config = LayoutConfig::default();
    let regions = DeckRegions::at("deck", Point::new(0.0, 2035.0), &config);
    let main = regions.group(BoardKind::Mainboard);
    store.add_placement("A", &main, Point::new(220.0, 2145.0));
    store.add_placement("A", &main, Point::new(330.0, 2145.0));

    let mut controller = SelectionController::new(config);
    let mut events = EventBus::default();
    let grab = Point::new(250.0, 2200.0);
    controller.pointer_down(grab, Modifiers::NONE, &store, &catalog, &AllLoaded, &mut events);
    assert_eq!(controller.anchor(), Some(&PlacementRef::new("A", main.clone(), 0)));
    let outside = Point::new(250.0, -900.0);
    controller.pointer_move(outside, &mut store, &catalog, &AllLoaded, &mut events);
    let summary = controller
        .pointer_up(outside, &mut store, &catalog, &AllLoaded, &mut events)
        .expect("summary");

    let outcome = apply_drop(&mut store, &mut [], &summary, &[regions], &mut events);
    assert_eq!(outcome.removed, 1);
    // Slot 0 now holds the copy that was never dragged.
    assert_eq!(
        store.slots("A", &main),
        Some(&[Point::new(330.0, 2145.0)][..])
    );
    assert_eq!(controller.retarget(&outcome), 1);
    assert!(controller.selection().is_empty());
    assert_eq!(controller.anchor(), None);
}

#[test]
fn moved_copy_stays_selected_on_its_new_board() {
    let (catalog, mut store) = table();
    let config = LayoutConfig::default();
    let regions = DeckRegions::at("deck", Point::new(0.0, 2035.0), &config);
    let main = regions.group(BoardKind::Mainboard);
    let side = regions.group(BoardKind::Sideboard);
    store.add_placement("A", &main, Point::new(220.0, 2145.0));
    store.add_placement("A", &main, Point::new(330.0, 2145.0));

    let mut controller = SelectionController::new(config);
    let mut events = EventBus::default();
    let grab = Point::new(250.0, 2200.0);
    controller.pointer_down(grab, Modifiers::NONE, &store, &catalog, &AllLoaded, &mut events);
    let below = Point::new(250.0, 4150.0);
    controller.pointer_move(below, &mut store, &catalog, &AllLoaded, &mut events);
    let summary = controller
        .pointer_up(below, &mut store, &catalog, &AllLoaded, &mut events)
        .expect("summary");

    let outcome = apply_drop(&mut store, &mut [], &summary, &[regions], &mut events);
    assert_eq!(outcome.moved, 1);
    assert_eq!(controller.retarget(&outcome), 0);
    let moved = PlacementRef::new("A", side, 0);
    assert_eq!(selected(&controller), vec!["A".to_string()]);
    assert!(controller.selection().contains(&moved));
    assert_eq!(controller.anchor(), Some(&moved));
    assert!(store.contains(&moved));
}

#[test]
fn stale_selection_is_dropped_when_a_drag_starts() {
    let (catalog, mut store) = table();
    let mut controller = SelectionController::new(LayoutConfig::default());
    click(&mut controller, &mut store, &catalog, "A", Modifiers::NONE);
    click(&mut controller, &mut store, &catalog, "B", Modifiers::SHIFT);
    assert_eq!(controller.phase(), SelectionPhase::MultiSelected);
    store
        .remove_placement("B", &GroupId::Catalog, 0)
        .expect("remove");

    let mut events = EventBus::default();
    controller.pointer_down(
        point_in("A"),
        Modifiers::NONE,
        &store,
        &catalog,
        &AllLoaded,
        &mut events,
    );
    assert_eq!(controller.phase(), SelectionPhase::Dragging);
    assert_eq!(controller.dragged(), BTreeSet::from([at("A")]));
    assert_eq!(selected(&controller), vec!["A".to_string()]);
    assert!(events.events().iter().any(|event| matches!(
        event,
        LayoutEvent::StaleSelectionReference { placement } if *placement == at("B")
    )));
}
