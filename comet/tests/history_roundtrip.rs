use comet::machine::{Button, Mode};
use comet::model::PointKind;
use comet::{Session, SessionEvent};

fn click(s: &mut Session, x: f32, y: f32) {
    s.pointer_down(x, y, Button::Primary, false);
    s.pointer_up(x, y);
}

fn comet_events(events: &[SessionEvent]) -> (usize, usize) {
    let built = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::CometBuilt(_)))
        .count();
    let retracted = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::CometRetracted))
        .count();
    (built, retracted)
}

#[test]
fn add_point_undo_redo_reuses_id() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 100.0, 100.0);
    let (ids, _, _) = s.point_arrays();
    assert_eq!(ids.len(), 1);
    let first = ids[0];
    assert_eq!(s.undo_label(), Some("add point"));

    assert!(s.undo());
    assert_eq!(s.point_count(), 0);
    assert!(s.can_redo());
    assert_eq!(s.redo_label(), Some("add point"));

    assert!(s.redo());
    let (ids, pos, _) = s.point_arrays();
    assert_eq!(ids, vec![first]);
    assert_eq!(pos, vec![100.0, 100.0]);
}

#[test]
fn close_tail_contour_and_roundtrip() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 0.0, 0.0);
    click(&mut s, 50.0, 0.0);
    click(&mut s, 25.0, 40.0);
    // Click back onto the first point closes the ring
    click(&mut s, 1.0, 1.0);

    let (cids, _, closed) = s.contour_arrays();
    assert_eq!(cids.len(), 1);
    assert_eq!(closed, vec![1]);
    assert_eq!(s.undo_label(), Some("close contour"));
    let edges_closed = s.edge_arrays().1.len();
    assert_eq!(edges_closed, 6);

    assert!(s.undo());
    let (_, _, closed) = s.contour_arrays();
    assert_eq!(closed, vec![0]);
    assert_eq!(s.edge_arrays().1.len(), 4);

    assert!(s.redo());
    let (_, _, closed) = s.contour_arrays();
    assert_eq!(closed, vec![1]);
    assert_eq!(s.edge_arrays().1.len(), 6);
}

#[test]
fn new_command_clears_redo_stack() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 0.0, 0.0);
    click(&mut s, 50.0, 0.0);
    assert!(s.undo());
    assert!(s.can_redo());
    click(&mut s, 100.0, 100.0);
    assert!(!s.can_redo());
    assert!(s.can_undo());
}

#[test]
fn undo_replays_at_current_view_ratio() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 100.0, 100.0);

    assert!(s.set_view_ratio(2.0));
    let (_, pos, _) = s.point_arrays();
    assert_eq!(pos, vec![200.0, 200.0]);

    assert!(s.undo());
    assert_eq!(s.point_count(), 0);
    assert!(s.redo());
    // Payload captured at ratio 1 replays scaled to the current ratio 2
    let (_, pos, _) = s.point_arrays();
    assert_eq!(pos, vec![200.0, 200.0]);

    assert!(s.undo());
    assert!(s.set_view_ratio(1.0));
    assert!(s.redo());
    let (_, pos, _) = s.point_arrays();
    assert_eq!(pos, vec![100.0, 100.0]);
}

#[test]
fn invalid_view_ratio_rejected() {
    let mut s = Session::new();
    assert!(!s.set_view_ratio(0.0));
    assert!(!s.set_view_ratio(-1.0));
    assert!(!s.set_view_ratio(f32::NAN));
    assert_eq!(s.view_ratio(), 1.0);
}

#[test]
fn complete_comet_consumes_and_undo_restores() {
    let mut s = Session::new();
    // Closed tail triangle
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 0.0, 0.0);
    click(&mut s, 200.0, 0.0);
    click(&mut s, 100.0, 160.0);
    click(&mut s, 1.0, 1.0);
    // Head ring inside it
    s.set_mode(Mode::Building(PointKind::Head));
    let _ = s.drain_events();
    click(&mut s, 80.0, 60.0);
    click(&mut s, 120.0, 60.0);
    click(&mut s, 100.0, 90.0);
    click(&mut s, 81.0, 61.0);

    let events = s.drain_events();
    let built: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::CometBuilt(c) => Some(c.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].head.len(), 3);
    assert_eq!(built[0].tail.len(), 3);
    // Both contours were consumed wholesale
    assert_eq!(s.point_count(), 0);
    assert_eq!(s.contour_count(), 0);
    assert_eq!(s.undo_label(), Some("complete comet"));

    assert!(s.undo());
    let events = s.drain_events();
    assert_eq!(comet_events(&events), (0, 1));
    assert_eq!(s.contour_count(), 2);
    assert_eq!(s.point_count(), 6);
    let (_, kinds, closed) = s.contour_arrays();
    // The tail ring is still closed; the head chain is back as it stood
    // before the closing click
    for (k, c) in kinds.iter().zip(closed.iter()) {
        match k {
            0 => assert_eq!(*c, 1),
            _ => assert_eq!(*c, 0),
        }
    }

    assert!(s.redo());
    let events = s.drain_events();
    assert_eq!(comet_events(&events), (1, 0));
    assert_eq!(s.point_count(), 0);
}

#[test]
fn head_without_enclosing_tail_builds_headless_tail_comet() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Head));
    click(&mut s, 0.0, 0.0);
    click(&mut s, 40.0, 0.0);
    click(&mut s, 20.0, 30.0);
    let _ = s.drain_events();
    click(&mut s, 1.0, 1.0);

    let events = s.drain_events();
    let built: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::CometBuilt(c) => Some(c.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].head.len(), 3);
    assert!(built[0].tail.is_empty());
    assert_eq!(s.contour_count(), 0);
}

#[test]
fn comet_clears_external_roommate_backref_and_undo_restores_it() {
    let mut s = Session::new();
    // A lone tail point the head chain will start from
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 300.0, 300.0);
    // Clicking the tail anchor in head mode creates a co-located paired head
    s.set_mode(Mode::Building(PointKind::Head));
    click(&mut s, 301.0, 301.0);
    let tail_rm = s.graph().point(PointKind::Tail, 1).unwrap().roommate;
    assert!(tail_rm.is_some());

    click(&mut s, 340.0, 300.0);
    click(&mut s, 320.0, 330.0);
    click(&mut s, 301.0, 299.0);

    // Head consumed; its partner outside the comet loses the pairing
    assert_eq!(s.contour_count(), 1);
    let tail_point = s.graph().point(PointKind::Tail, 1).unwrap();
    assert!(tail_point.roommate.is_none());

    assert!(s.undo());
    let restored = s.graph().point(PointKind::Tail, 1).unwrap().roommate;
    assert_eq!(restored, tail_rm);
}

#[test]
fn history_events_report_labels() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    let _ = s.drain_events();
    click(&mut s, 10.0, 10.0);
    let events = s.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::HistoryChanged {
            can_undo: true,
            can_redo: false,
            undo_label: Some("add point"),
            redo_label: None,
        }
    )));
}

#[test]
fn undo_drops_building_root_when_its_point_vanishes() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 0.0, 0.0);
    click(&mut s, 50.0, 0.0);
    assert!(s.undo());
    // The chain root was the undone point; a fresh click starts a new chain
    click(&mut s, 200.0, 200.0);
    assert_eq!(s.point_count(), 2);
    assert_eq!(s.contour_count(), 2);
}

#[test]
fn connect_two_chains_and_undo_splits_them_back() {
    let mut s = Session::new();
    s.set_mode(Mode::Building(PointKind::Tail));
    click(&mut s, 0.0, 0.0);
    click(&mut s, 50.0, 0.0);
    // Abort and start a second chain far away
    s.pointer_down(0.0, 0.0, Button::Secondary, false);
    click(&mut s, 200.0, 0.0);
    click(&mut s, 250.0, 0.0);
    assert_eq!(s.contour_count(), 2);

    // Bridge the chains: click onto a point of the first one
    click(&mut s, 50.0, 1.0);
    assert_eq!(s.contour_count(), 1);
    assert_eq!(s.undo_label(), Some("connect points"));

    assert!(s.undo());
    assert_eq!(s.contour_count(), 2);
    assert!(s.redo());
    assert_eq!(s.contour_count(), 1);
}
