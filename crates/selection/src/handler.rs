use runtime::{Event, Frame, NextFrame};
use tracing::{debug, trace};

use crate::config::{AllowedEvents, SelectionConfig};
use crate::event::{
    ImageryEvent, ImageryPick, PickedFeature, PointEvent, Rectangle, RectangleEvent,
    SelectionAction, SelectionEvent, resolve_action,
};
use crate::host::{HostEvent, HostEventKind, MouseEvent, RectEndEvent, RectMoveEvent};
use crate::host::{SelectionHost, SubscriptionId};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Deferred {
    ClearImageryFound,
}

/// Translates raw host input into [`SelectionEvent`]s.
///
/// Two channels are published:
/// - `indeterminate`: rectangle drags in progress (marquee rendering).
/// - `change`: committed point, rectangle and imagery selections.
///
/// Disabling never unsubscribes from the host; it only short-circuits the
/// next incoming notification. A drag already in flight keeps its state.
///
/// An imagery pick suppresses rectangle handling until the next animation
/// frame so one gesture cannot commit twice. Hosts must call
/// [`ScreenSpaceSelectionHandler::on_animation_frame`] once per frame.
pub struct ScreenSpaceSelectionHandler<H: SelectionHost> {
    host: H,
    pub indeterminate: Event<SelectionEvent>,
    pub change: Event<SelectionEvent>,

    disabled: bool,
    allow_click_when_disabled: bool,
    allowed_events: AllowedEvents,
    imagery_formats: Vec<String>,

    moving: bool,
    imagery_found: bool,
    next_frame: NextFrame<Deferred>,
    subscriptions: Vec<SubscriptionId>,
}

impl<H: SelectionHost> ScreenSpaceSelectionHandler<H> {
    pub fn new(mut host: H, config: SelectionConfig) -> Self {
        let subscriptions = HostEventKind::ALL
            .iter()
            .filter_map(|kind| host.on(*kind))
            .collect::<Vec<_>>();
        debug!(
            subscribed = subscriptions.len(),
            "screen-space selection handler attached"
        );

        Self {
            host,
            indeterminate: Event::new(),
            change: Event::new(),
            disabled: config.disabled,
            allow_click_when_disabled: config.allow_click_when_disabled,
            allowed_events: config.allowed_events,
            imagery_formats: config.imagery_formats,
            moving: false,
            imagery_found: false,
            next_frame: NextFrame::new(),
            subscriptions,
        }
    }

    /// Releases every host subscription taken in [`Self::new`].
    pub fn destroy(&mut self) {
        for sub in self.subscriptions.drain(..) {
            self.host.off(sub);
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, value: bool) {
        self.disabled = value;
    }

    pub fn allow_click_when_disabled(&self) -> bool {
        self.allow_click_when_disabled
    }

    pub fn set_allow_click_when_disabled(&mut self, value: bool) {
        self.allow_click_when_disabled = value;
    }

    pub fn allowed_events(&self) -> AllowedEvents {
        self.allowed_events
    }

    pub fn set_allowed_events(&mut self, value: AllowedEvents) {
        self.allowed_events = value;
    }

    /// True while a rectangle drag is in progress.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn handle_event(&mut self, event: &HostEvent) {
        trace!(kind = event.kind().as_str(), "host event");
        match event {
            HostEvent::Select { layer_id } => self.handle_select(layer_id.as_deref()),
            HostEvent::Click(e) => self.handle_click_on_mobile(e),
            HostEvent::LayerSelectWithRectMove(e) => self.handle_rect_move(e),
            HostEvent::LayerSelectWithRectEnd(e) => self.handle_rect_end(e),
        }
    }

    pub fn on_animation_frame(&mut self, frame: Frame) {
        for task in self.next_frame.take_due(frame) {
            match task {
                Deferred::ClearImageryFound => {
                    trace!(frame = frame.index, "imagery suppression cleared");
                    self.imagery_found = false;
                }
            }
        }
    }

    fn click_blocked(&self) -> bool {
        self.disabled && !self.allow_click_when_disabled
    }

    fn handle_click_on_mobile(&mut self, event: &MouseEvent) {
        if self.click_blocked() {
            return;
        }
        let position = [event.x.unwrap_or(0.0), event.y.unwrap_or(0.0)];
        self.handle_click(position, None, None);
    }

    /// `picked` carries features the host already resolved for this click;
    /// when absent the viewport is picked at `position`.
    fn handle_click(
        &mut self,
        position: [f64; 2],
        key_name: Option<&str>,
        picked: Option<&[PickedFeature]>,
    ) {
        if self.click_blocked() || !self.allowed_events.point || self.moving {
            trace!("point selection dropped");
            return;
        }

        let feature = match picked {
            Some(features) => features.first().cloned(),
            None => self
                .host
                .pick_many_from_viewport(position, 1.0, 1.0)
                .and_then(|features| features.into_iter().next()),
        };

        let event = SelectionEvent::Point(PointEvent {
            action: resolve_action(key_name),
            x: position[0],
            y: position[1],
            feature,
        });
        self.change.dispatch(&event);
    }

    fn handle_select(&mut self, layer_id: Option<&str>) {
        if self.click_blocked() || !self.allowed_events.imagery {
            return;
        }
        let Some(layer_id) = layer_id.filter(|id| !id.is_empty()) else {
            return;
        };

        let Some(layer) = self.host.find_layer(layer_id) else {
            return;
        };
        let Some(data_type) = layer.simple_data_type() else {
            return;
        };
        if !self.imagery_formats.iter().any(|f| f == data_type) {
            trace!(layer_id, data_type, "select ignored: not an imagery layer");
            return;
        }

        self.imagery_found = true;
        let event = SelectionEvent::Imagery(ImageryEvent {
            action: SelectionAction::Replace,
            object: ImageryPick {
                layer_id: layer_id.to_string(),
                feature: self.host.selected_feature(),
            },
        });
        self.change.dispatch(&event);
        self.next_frame.request(Deferred::ClearImageryFound);
    }

    fn handle_rect_move(&mut self, event: &RectMoveEvent) {
        if self.imagery_found || self.disabled || !self.allowed_events.rectangle {
            return;
        }
        self.moving = true;
        let ev = SelectionEvent::Rectangle(rectangle_event(event, Vec::new()));
        self.indeterminate.dispatch(&ev);
    }

    fn handle_rect_end(&mut self, event: &RectEndEvent) {
        if self.imagery_found {
            trace!("rectangle end suppressed by imagery pick");
            self.moving = false;
            return;
        }

        if event.is_click {
            // A click ends no drag; clear a stale flag left by a zero-size move.
            self.moving = false;
            self.handle_click(
                event.drag.position(),
                event.drag.pressed_key.as_deref(),
                event.features.as_deref(),
            );
            return;
        }

        if self.disabled || !self.allowed_events.rectangle {
            self.moving = false;
            return;
        }

        let last = SelectionEvent::Rectangle(rectangle_event(&event.drag, Vec::new()));
        self.indeterminate.dispatch(&last);

        let features = event.features.clone().unwrap_or_default();
        let committed = SelectionEvent::Rectangle(rectangle_event(&event.drag, features));
        self.change.dispatch(&committed);
        self.moving = false;
    }
}

fn rectangle_event(event: &RectMoveEvent, features: Vec<PickedFeature>) -> RectangleEvent {
    let start = event.start_position();
    let end = event.position();
    RectangleEvent {
        action: resolve_action(event.pressed_key.as_deref()),
        start_position: start,
        end_position: end,
        rectangle: Rectangle::from_corners(start, end),
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::ScreenSpaceSelectionHandler;
    use crate::config::{AllowedEvents, SelectionConfig};
    use crate::event::{PickedFeature, SelectionAction, SelectionEvent, SelectionEventKind};
    use crate::host::{
        HostEvent, HostEventKind, HostLayer, MouseEvent, NullHost, RectEndEvent, RectMoveEvent,
        SelectionHost, SubscriptionId,
    };
    use pretty_assertions::assert_eq;
    use runtime::Frame;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeHost {
        next_sub: u64,
        active: Vec<(SubscriptionId, HostEventKind)>,
        picks: Vec<PickedFeature>,
        pick_calls: Cell<usize>,
        layers: HashMap<String, HostLayer>,
        selected: Option<PickedFeature>,
    }

    impl SelectionHost for FakeHost {
        fn on(&mut self, kind: HostEventKind) -> Option<SubscriptionId> {
            let id = SubscriptionId(self.next_sub);
            self.next_sub += 1;
            self.active.push((id, kind));
            Some(id)
        }

        fn off(&mut self, subscription: SubscriptionId) {
            self.active.retain(|(id, _)| *id != subscription);
        }

        fn pick_many_from_viewport(
            &self,
            _position: [f64; 2],
            width: f64,
            height: f64,
        ) -> Option<Vec<PickedFeature>> {
            assert_eq!((width, height), (1.0, 1.0));
            self.pick_calls.set(self.pick_calls.get() + 1);
            Some(self.picks.clone())
        }

        fn find_layer(&self, layer_id: &str) -> Option<HostLayer> {
            self.layers.get(layer_id).cloned()
        }

        fn selected_feature(&self) -> Option<PickedFeature> {
            self.selected.clone()
        }
    }

    type Log = Rc<RefCell<Vec<SelectionEvent>>>;

    fn attach(host: FakeHost) -> (ScreenSpaceSelectionHandler<FakeHost>, Log, Log) {
        let mut handler = ScreenSpaceSelectionHandler::new(host, SelectionConfig::default());
        let indeterminate: Log = Rc::default();
        let change: Log = Rc::default();
        let log = Rc::clone(&indeterminate);
        handler
            .indeterminate
            .subscribe(move |e| log.borrow_mut().push(e.clone()));
        let log = Rc::clone(&change);
        handler
            .change
            .subscribe(move |e| log.borrow_mut().push(e.clone()));
        (handler, indeterminate, change)
    }

    fn host_with_imagery() -> FakeHost {
        let mut host = FakeHost::default();
        host.layers
            .insert("mvt-layer".into(), HostLayer::simple("mvt-layer", "mvt"));
        host.layers
            .insert("geojson-layer".into(), HostLayer::simple("geojson-layer", "geojson"));
        host.selected = Some(PickedFeature::new("mvt-layer", "tile-feature"));
        host
    }

    fn drag(start: [f64; 2], end: [f64; 2], key: Option<&str>) -> RectMoveEvent {
        RectMoveEvent {
            start_x: Some(start[0]),
            start_y: Some(start[1]),
            x: Some(end[0]),
            y: Some(end[1]),
            pressed_key: key.map(str::to_string),
        }
    }

    fn click_end(
        at: [f64; 2],
        key: Option<&str>,
        features: Option<Vec<PickedFeature>>,
    ) -> HostEvent {
        HostEvent::LayerSelectWithRectEnd(RectEndEvent {
            drag: drag(at, at, key),
            is_click: true,
            features,
        })
    }

    fn drag_end(start: [f64; 2], end: [f64; 2], features: &[&str]) -> HostEvent {
        HostEvent::LayerSelectWithRectEnd(RectEndEvent {
            drag: drag(start, end, None),
            is_click: false,
            features: Some(
                features
                    .iter()
                    .map(|id| PickedFeature::new("l", *id))
                    .collect(),
            ),
        })
    }

    #[test]
    fn subscribes_on_construction_and_releases_on_destroy() {
        let (mut handler, _, _) = attach(FakeHost::default());
        assert_eq!(handler.host().active.len(), 4);

        let routed = [
            HostEvent::Select { layer_id: None },
            HostEvent::Click(MouseEvent::default()),
            HostEvent::LayerSelectWithRectMove(drag([0.0, 0.0], [1.0, 1.0], None)),
            drag_end([0.0, 0.0], [1.0, 1.0], &[]),
        ];
        for event in &routed {
            let kind = event.kind();
            assert!(
                handler.host().active.iter().any(|(_, k)| *k == kind),
                "{} is not subscribed",
                kind.as_str()
            );
        }
        handler.destroy();
        assert!(handler.host().active.is_empty());
    }

    #[test]
    fn missing_host_never_fails() {
        let mut handler = ScreenSpaceSelectionHandler::new(NullHost, SelectionConfig::default());
        let change: Log = Rc::default();
        let log = Rc::clone(&change);
        handler
            .change
            .subscribe(move |e| log.borrow_mut().push(e.clone()));

        assert!(handler.host_mut().on(HostEventKind::Select).is_none());
        handler.handle_event(&HostEvent::Select {
            layer_id: Some("x".into()),
        });
        handler.handle_event(&HostEvent::Click(MouseEvent {
            x: Some(1.0),
            y: Some(1.0),
        }));
        handler.destroy();

        let events = change.borrow();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SelectionEvent::Point(p) => assert!(p.feature.is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn mobile_click_picks_first_feature() {
        let mut host = FakeHost::default();
        host.picks = vec![PickedFeature::new("l", "a"), PickedFeature::new("l", "b")];
        let (mut handler, _, change) = attach(host);

        handler.handle_event(&HostEvent::Click(MouseEvent {
            x: Some(10.0),
            y: Some(20.0),
        }));

        let events = change.borrow();
        assert_eq!(events.len(), 1);
        let SelectionEvent::Point(p) = &events[0] else {
            panic!("expected point event");
        };
        assert_eq!(p.action, SelectionAction::Replace);
        assert_eq!((p.x, p.y), (10.0, 20.0));
        assert_eq!(p.feature, Some(PickedFeature::new("l", "a")));
    }

    #[test]
    fn desktop_click_uses_host_features_and_modifier() {
        let (mut handler, indeterminate, change) = attach(FakeHost::default());
        handler.handle_event(&click_end(
            [3.0, 4.0],
            Some("shift"),
            Some(vec![PickedFeature::new("l", "hit")]),
        ));

        assert!(indeterminate.borrow().is_empty());
        let events = change.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action(), SelectionAction::Add);
        assert_eq!(events[0].objects().len(), 1);
        assert_eq!(handler.host().pick_calls.get(), 0);
    }

    #[test]
    fn click_is_dropped_mid_drag() {
        let (mut handler, _, change) = attach(FakeHost::default());
        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [0.0, 0.0],
            [5.0, 5.0],
            None,
        )));
        assert!(handler.is_moving());

        handler.handle_event(&HostEvent::Click(MouseEvent::default()));
        assert!(change.borrow().is_empty());
    }

    #[test]
    fn disabled_drops_clicks_unless_allowed() {
        let (mut handler, _, change) = attach(FakeHost::default());
        handler.set_disabled(true);
        handler.handle_event(&HostEvent::Click(MouseEvent::default()));
        handler.handle_event(&click_end([0.0, 0.0], None, None));
        assert!(change.borrow().is_empty());

        handler.set_allow_click_when_disabled(true);
        handler.handle_event(&HostEvent::Click(MouseEvent::default()));
        assert_eq!(change.borrow().len(), 1);
    }

    #[test]
    fn point_events_can_be_disallowed() {
        let (mut handler, _, change) = attach(FakeHost::default());
        handler.set_allowed_events(AllowedEvents {
            point: false,
            ..AllowedEvents::default()
        });
        handler.handle_event(&click_end([0.0, 0.0], None, None));
        assert!(change.borrow().is_empty());
    }

    #[test]
    fn rectangle_events_can_be_disallowed() {
        let (mut handler, indeterminate, change) = attach(FakeHost::default());
        handler.set_allowed_events(AllowedEvents {
            rectangle: false,
            ..AllowedEvents::default()
        });
        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [0.0, 0.0],
            [5.0, 5.0],
            None,
        )));
        assert!(!handler.is_moving());
        handler.handle_event(&drag_end([0.0, 0.0], [5.0, 5.0], &["a"]));

        assert!(indeterminate.borrow().is_empty());
        assert!(change.borrow().is_empty());
        assert!(!handler.is_moving());
    }

    #[test]
    fn disabling_mid_drag_drops_the_rest_of_it() {
        let (mut handler, indeterminate, change) = attach(FakeHost::default());
        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [0.0, 0.0],
            [5.0, 5.0],
            None,
        )));
        assert!(handler.is_moving());
        assert_eq!(indeterminate.borrow().len(), 1);

        handler.set_disabled(true);
        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [0.0, 0.0],
            [9.0, 9.0],
            None,
        )));
        assert_eq!(indeterminate.borrow().len(), 1);
        assert!(handler.is_moving());

        handler.handle_event(&drag_end([0.0, 0.0], [9.0, 9.0], &["a"]));
        assert_eq!(indeterminate.borrow().len(), 1);
        assert!(change.borrow().is_empty());
        assert!(!handler.is_moving());
    }

    #[test]
    fn drag_publishes_indeterminate_then_commits() {
        let (mut handler, indeterminate, change) = attach(FakeHost::default());
        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [10.0, 10.0],
            [20.0, 15.0],
            Some("shift"),
        )));
        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [10.0, 10.0],
            [30.0, 40.0],
            Some("shift"),
        )));
        assert_eq!(indeterminate.borrow().len(), 2);
        assert!(change.borrow().is_empty());

        handler.handle_event(&HostEvent::LayerSelectWithRectEnd(RectEndEvent {
            drag: drag([10.0, 10.0], [30.0, 40.0], Some("shift")),
            is_click: false,
            features: Some(vec![
                PickedFeature::new("l", "a"),
                PickedFeature::new("l", "b"),
            ]),
        }));
        assert!(!handler.is_moving());

        let events = change.borrow();
        assert_eq!(events.len(), 1);
        let SelectionEvent::Rectangle(r) = &events[0] else {
            panic!("expected rectangle event");
        };
        assert_eq!(r.action, SelectionAction::Add);
        assert_eq!(r.start_position, [10.0, 10.0]);
        assert_eq!(r.end_position, [30.0, 40.0]);
        assert_eq!(r.rectangle.width, 20.0);
        assert_eq!(r.rectangle.height, 30.0);
        assert_eq!(r.features.len(), 2);
    }

    #[test]
    fn imagery_select_dispatches_replace() {
        let (mut handler, _, change) = attach(host_with_imagery());
        handler.handle_event(&HostEvent::Select {
            layer_id: Some("mvt-layer".into()),
        });

        let events = change.borrow();
        assert_eq!(events.len(), 1);
        let SelectionEvent::Imagery(e) = &events[0] else {
            panic!("expected imagery event");
        };
        assert_eq!(e.action, SelectionAction::Replace);
        assert_eq!(e.object.layer_id, "mvt-layer");
        assert_eq!(
            e.object.feature,
            Some(PickedFeature::new("mvt-layer", "tile-feature"))
        );
    }

    #[test]
    fn non_imagery_layers_are_ignored() {
        let (mut handler, _, change) = attach(host_with_imagery());
        handler.handle_event(&HostEvent::Select {
            layer_id: Some("geojson-layer".into()),
        });
        handler.handle_event(&HostEvent::Select {
            layer_id: Some("unknown".into()),
        });
        handler.handle_event(&HostEvent::Select { layer_id: None });
        assert!(change.borrow().is_empty());
    }

    #[test]
    fn disallowed_imagery_leaves_rectangles_alone() {
        let (mut handler, _, change) = attach(host_with_imagery());
        handler.set_allowed_events(AllowedEvents {
            imagery: false,
            ..AllowedEvents::default()
        });
        handler.handle_event(&HostEvent::Select {
            layer_id: Some("mvt-layer".into()),
        });
        assert!(change.borrow().is_empty());

        handler.handle_event(&HostEvent::LayerSelectWithRectMove(drag(
            [0.0, 0.0],
            [8.0, 8.0],
            None,
        )));
        handler.handle_event(&drag_end([0.0, 0.0], [8.0, 8.0], &["a"]));

        let kinds: Vec<_> = change.borrow().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![SelectionEventKind::Rectangle]);
    }

    #[test]
    fn imagery_pick_suppresses_rectangle_until_next_frame() {
        let (mut handler, _, change) = attach(host_with_imagery());
        handler.handle_event(&HostEvent::Select {
            layer_id: Some("mvt-layer".into()),
        });
        handler.handle_event(&HostEvent::LayerSelectWithRectEnd(RectEndEvent {
            drag: drag([0.0, 0.0], [8.0, 8.0], None),
            is_click: false,
            features: Some(vec![PickedFeature::new("l", "a")]),
        }));
        handler.handle_event(&click_end([1.0, 1.0], None, None));

        let kinds: Vec<_> = change.borrow().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![SelectionEventKind::Imagery]);

        handler.on_animation_frame(Frame::new(1, 16.0));
        handler.handle_event(&click_end([1.0, 1.0], None, None));
        let kinds: Vec<_> = change.borrow().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![SelectionEventKind::Imagery, SelectionEventKind::Point]
        );
    }
}
