//! Pointer / wheel gesture recognition.
//!
//! [`InputReducer`] turns raw events into camera [`Intent`]s. It knows
//! nothing about the camera itself, so it can be driven from tests or from
//! any event source:
//!
//! - one pointer down and moving: `Pan` per move
//! - two pointers: `Pan` for midpoint movement plus `Zoom` about the midpoint
//! - wheel: a single `Zoom` about the cursor
//! - a release that barely moved: `Click`
//! - a release after a fast drag: `Pan`s from [`InputReducer::tick`] until the
//!   glide decays

use crate::config::InputConfig;
use crate::models::{Point, Vector};

pub type PointerId = i32;

/// Milliseconds per frame at 60 Hz; friction is expressed per frame.
const FRAME_MS: f64 = 1000.0 / 60.0;

/// A release this long after the last move means the pointer had stopped.
const STALE_SAMPLE_MS: f64 = 100.0;

/// Pinch baselines shorter than this (px) are too noisy to zoom from.
const MIN_PINCH_DISTANCE: f64 = 1.0;

/// Raw input in screen space. Times are milliseconds on any monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        id: PointerId,
        position: Point,
        time_ms: f64,
    },
    PointerMove {
        id: PointerId,
        position: Point,
        time_ms: f64,
    },
    PointerUp {
        id: PointerId,
        position: Point,
        time_ms: f64,
    },
    PointerCancel {
        id: PointerId,
    },
    Wheel {
        position: Point,
        delta_y: f64,
    },
}

/// A requested camera change, or a click to hit-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Pan(Vector),
    Zoom { pivot: Point, factor: f64 },
    Click(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Dragging,
    Pinching,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Point,
    time_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct PinchBaseline {
    distance: f64,
    midpoint: Point,
}

impl PinchBaseline {
    fn between(a: Point, b: Point) -> Self {
        PinchBaseline {
            distance: a.distance(b),
            midpoint: a.midpoint(b),
        }
    }
}

/// State for one gesture, from the first pointer down to the last pointer up.
#[derive(Debug, Clone)]
struct PointerSession {
    /// Active pointers in press order with their last known position.
    pointers: Vec<(PointerId, Point)>,
    start: Point,
    max_travel: f64,
    pinched: bool,
    pinch: Option<PinchBaseline>,
    /// The two most recent single-pointer move samples, oldest first.
    samples: [Option<Sample>; 2],
}

impl PointerSession {
    fn new(id: PointerId, position: Point) -> Self {
        PointerSession {
            pointers: vec![(id, position)],
            start: position,
            max_travel: 0.0,
            pinched: false,
            pinch: None,
            samples: [None, None],
        }
    }

    fn index_of(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|(p, _)| *p == id)
    }

    fn pinch_pair(&self) -> Option<(Point, Point)> {
        match self.pointers.as_slice() {
            [(_, a), (_, b), ..] => Some((*a, *b)),
            _ => None,
        }
    }

    fn reset_pinch(&mut self) {
        self.pinch = self.pinch_pair().map(|(a, b)| PinchBaseline::between(a, b));
    }

    fn record_sample(&mut self, position: Point, time_ms: f64) {
        self.samples = [self.samples[1], Some(Sample { position, time_ms })];
    }

    /// Release velocity in px/ms, or `None` if the pointer had come to rest.
    fn release_velocity(&self, release_ms: f64) -> Option<Vector> {
        let [Some(prev), Some(last)] = self.samples else {
            return None;
        };
        let dt = last.time_ms - prev.time_ms;
        if dt <= 0.0 || release_ms - last.time_ms > STALE_SAMPLE_MS {
            return None;
        }
        Some((last.position - prev.position) * (1.0 / dt))
    }
}

#[derive(Debug, Clone, Copy)]
struct Inertia {
    velocity: Vector,
    last_tick_ms: f64,
}

#[derive(Debug, Clone)]
pub struct InputReducer {
    config: InputConfig,
    session: Option<PointerSession>,
    inertia: Option<Inertia>,
}

impl InputReducer {
    pub fn new(config: InputConfig) -> Self {
        InputReducer {
            config,
            session: None,
            inertia: None,
        }
    }

    pub fn gesture(&self) -> Gesture {
        match self.session.as_ref().map(|s| s.pointers.len()) {
            None | Some(0) => Gesture::Idle,
            Some(1) => Gesture::Dragging,
            Some(_) => Gesture::Pinching,
        }
    }

    pub fn is_gliding(&self) -> bool {
        self.inertia.is_some()
    }

    pub fn cancel_inertia(&mut self) {
        self.inertia = None;
    }

    pub fn handle(&mut self, event: InputEvent) -> Vec<Intent> {
        match event {
            InputEvent::PointerDown { id, position, .. } => {
                self.pointer_down(id, position);
                Vec::new()
            }
            InputEvent::PointerMove {
                id,
                position,
                time_ms,
            } => self.pointer_move(id, position, time_ms),
            InputEvent::PointerUp {
                id,
                position,
                time_ms,
            } => self.pointer_up(id, position, time_ms),
            InputEvent::PointerCancel { id } => {
                self.remove_pointer(id);
                Vec::new()
            }
            InputEvent::Wheel { position, delta_y } => self.wheel(position, delta_y),
        }
    }

    /// Advance the post-drag glide to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Option<Intent> {
        let inertia = self.inertia.as_mut()?;
        let dt = now_ms - inertia.last_tick_ms;
        if dt <= 0.0 {
            return None;
        }
        let delta = inertia.velocity * dt;
        inertia.velocity = inertia.velocity * self.config.inertia.friction.powf(dt / FRAME_MS);
        inertia.last_tick_ms = now_ms;
        if inertia.velocity.length() < self.config.inertia.min_speed {
            self.inertia = None;
        }
        Some(Intent::Pan(delta))
    }

    fn pointer_down(&mut self, id: PointerId, position: Point) {
        self.inertia = None;
        let Some(session) = self.session.as_mut() else {
            self.session = Some(PointerSession::new(id, position));
            return;
        };
        if let Some(i) = session.index_of(id) {
            session.pointers[i].1 = position;
            return;
        }
        session.pointers.push((id, position));
        if session.pointers.len() == 2 {
            session.pinched = true;
            session.samples = [None, None];
            session.reset_pinch();
        }
    }

    fn pointer_move(&mut self, id: PointerId, position: Point, time_ms: f64) -> Vec<Intent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let Some(i) = session.index_of(id) else {
            return Vec::new();
        };
        let previous = session.pointers[i].1;
        session.pointers[i].1 = position;

        if session.pointers.len() == 1 {
            session.max_travel = session.max_travel.max(position.distance(session.start));
            session.record_sample(position, time_ms);
            let delta = (position - previous) * self.config.drag_sensitivity;
            return if delta == Vector::ZERO {
                Vec::new()
            } else {
                vec![Intent::Pan(delta)]
            };
        }

        // Pointers beyond the first two don't steer the pinch.
        if i > 1 {
            return Vec::new();
        }
        let Some((a, b)) = session.pinch_pair() else {
            return Vec::new();
        };
        let current = PinchBaseline::between(a, b);
        let mut intents = Vec::new();
        if let Some(old) = session.pinch {
            // Two-finger pan follows the same sensitivity as a one-finger drag.
            let shift = (current.midpoint - old.midpoint) * self.config.drag_sensitivity;
            if shift != Vector::ZERO {
                intents.push(Intent::Pan(shift));
            }
            if old.distance >= MIN_PINCH_DISTANCE
                && current.distance > 0.0
                && current.distance != old.distance
            {
                let factor = (current.distance / old.distance).powf(self.config.pinch_sensitivity);
                intents.push(Intent::Zoom {
                    pivot: current.midpoint,
                    factor,
                });
            }
        }
        session.pinch = Some(current);
        intents
    }

    fn pointer_up(&mut self, id: PointerId, position: Point, time_ms: f64) -> Vec<Intent> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        if session.index_of(id).is_none() {
            return Vec::new();
        }
        let travel = session.max_travel.max(position.distance(session.start));
        let is_click = !session.pinched && travel <= self.config.click_threshold;
        let velocity = session.release_velocity(time_ms);

        if self.remove_pointer(id) > 0 {
            return Vec::new();
        }
        if is_click {
            return vec![Intent::Click(position)];
        }
        if self.config.inertia.enabled {
            if let Some(v) = velocity.map(|v| v * self.config.drag_sensitivity) {
                if v.length() >= self.config.inertia.min_speed {
                    self.inertia = Some(Inertia {
                        velocity: v,
                        last_tick_ms: time_ms,
                    });
                }
            }
        }
        Vec::new()
    }

    /// Drop `id` from the gesture; returns how many pointers remain.
    fn remove_pointer(&mut self, id: PointerId) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        let Some(i) = session.index_of(id) else {
            return session.pointers.len();
        };
        session.pointers.remove(i);
        let remaining = session.pointers.len();
        match remaining {
            0 => self.session = None,
            1 => {
                // The survivor carries on as a plain drag from where it is.
                session.pinch = None;
                session.samples = [None, None];
            }
            _ if i < 2 => session.reset_pinch(),
            _ => {}
        }
        remaining
    }

    fn wheel(&mut self, position: Point, delta_y: f64) -> Vec<Intent> {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return Vec::new();
        }
        let factor = (-delta_y * self.config.wheel_sensitivity).exp();
        vec![Intent::Zoom {
            pivot: position,
            factor,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reducer() -> InputReducer {
        InputReducer::new(InputConfig::default())
    }

    fn down(id: PointerId, x: f64, y: f64, t: f64) -> InputEvent {
        InputEvent::PointerDown {
            id,
            position: Point::new(x, y),
            time_ms: t,
        }
    }

    fn mv(id: PointerId, x: f64, y: f64, t: f64) -> InputEvent {
        InputEvent::PointerMove {
            id,
            position: Point::new(x, y),
            time_ms: t,
        }
    }

    fn up(id: PointerId, x: f64, y: f64, t: f64) -> InputEvent {
        InputEvent::PointerUp {
            id,
            position: Point::new(x, y),
            time_ms: t,
        }
    }

    #[test]
    fn test_drag_emits_pan_deltas() {
        let mut input = reducer();
        assert!(input.handle(down(1, 100.0, 100.0, 0.0)).is_empty());
        assert_eq!(input.gesture(), Gesture::Dragging);
        assert_eq!(
            input.handle(mv(1, 150.0, 80.0, 16.0)),
            vec![Intent::Pan(Vector::new(50.0, -20.0))]
        );
        assert_eq!(
            input.handle(mv(1, 155.0, 80.0, 32.0)),
            vec![Intent::Pan(Vector::new(5.0, 0.0))]
        );
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut input = reducer();
        assert!(input.handle(mv(1, 10.0, 10.0, 0.0)).is_empty());
        assert_eq!(input.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_small_movement_is_a_click() {
        let mut input = reducer();
        input.handle(down(1, 100.0, 100.0, 0.0));
        input.handle(mv(1, 102.0, 101.0, 10.0));
        let intents = input.handle(up(1, 102.0, 101.0, 20.0));
        assert_eq!(intents, vec![Intent::Click(Point::new(102.0, 101.0))]);
        assert_eq!(input.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_drag_release_is_not_a_click() {
        let mut input = reducer();
        input.handle(down(1, 100.0, 100.0, 0.0));
        input.handle(mv(1, 140.0, 100.0, 10.0));
        // Came back near the start, but the gesture already travelled.
        input.handle(mv(1, 101.0, 100.0, 20.0));
        let intents = input.handle(up(1, 101.0, 100.0, 400.0));
        assert!(intents.iter().all(|i| !matches!(i, Intent::Click(_))));
    }

    #[test]
    fn test_pinch_zooms_about_midpoint() {
        let mut input = reducer();
        input.handle(down(1, 100.0, 100.0, 0.0));
        input.handle(down(2, 200.0, 100.0, 5.0));
        assert_eq!(input.gesture(), Gesture::Pinching);

        let intents = input.handle(mv(2, 300.0, 100.0, 16.0));
        assert_eq!(
            intents,
            vec![
                Intent::Pan(Vector::new(50.0, 0.0)),
                Intent::Zoom {
                    pivot: Point::new(200.0, 100.0),
                    factor: 2.0
                },
            ]
        );
    }

    #[test]
    fn test_pinch_release_falls_back_to_drag() {
        let mut input = reducer();
        input.handle(down(1, 100.0, 100.0, 0.0));
        input.handle(down(2, 200.0, 100.0, 5.0));
        input.handle(mv(2, 250.0, 100.0, 16.0));
        assert!(input.handle(up(1, 100.0, 100.0, 30.0)).is_empty());
        assert_eq!(input.gesture(), Gesture::Dragging);

        assert_eq!(
            input.handle(mv(2, 260.0, 110.0, 40.0)),
            vec![Intent::Pan(Vector::new(10.0, 10.0))]
        );
        // Never a click once the gesture has pinched.
        assert!(input.handle(up(2, 260.0, 110.0, 500.0)).is_empty());
        assert_eq!(input.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_third_pointer_does_not_steer_pinch() {
        let mut input = reducer();
        input.handle(down(1, 0.0, 0.0, 0.0));
        input.handle(down(2, 100.0, 0.0, 0.0));
        input.handle(down(3, 500.0, 500.0, 0.0));
        assert!(input.handle(mv(3, 600.0, 600.0, 10.0)).is_empty());

        // Lifting one of the pair promotes pointer 3 into the pinch.
        input.handle(up(1, 0.0, 0.0, 20.0));
        assert_eq!(input.gesture(), Gesture::Pinching);
        let intents = input.handle(mv(2, 100.0, 0.0, 30.0));
        assert!(intents.is_empty());
    }

    #[test]
    fn test_wheel_direction() {
        let mut input = reducer();
        let pivot = Point::new(10.0, 20.0);
        let zoom_in = input.handle(InputEvent::Wheel {
            position: pivot,
            delta_y: -100.0,
        });
        let zoom_out = input.handle(InputEvent::Wheel {
            position: pivot,
            delta_y: 100.0,
        });
        match (zoom_in.as_slice(), zoom_out.as_slice()) {
            (
                [Intent::Zoom { pivot: p1, factor: f_in }],
                [Intent::Zoom { pivot: p2, factor: f_out }],
            ) => {
                assert_eq!(*p1, pivot);
                assert_eq!(*p2, pivot);
                assert!(*f_in > 1.0);
                assert!(*f_out < 1.0);
                assert!((f_in * f_out - 1.0).abs() < 1e-12);
            }
            other => panic!("unexpected intents {other:?}"),
        }
        assert_eq!(input.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_inertia_glides_and_decays() {
        let mut input = reducer();
        input.handle(down(1, 0.0, 0.0, 0.0));
        input.handle(mv(1, 10.0, 0.0, 16.0));
        input.handle(mv(1, 20.0, 0.0, 32.0));
        assert!(input.handle(up(1, 20.0, 0.0, 40.0)).is_empty());
        assert!(input.is_gliding());

        let Some(Intent::Pan(first)) = input.tick(56.0) else {
            panic!("expected a glide pan");
        };
        assert!((first.x - 10.0).abs() < 1e-9);
        assert!(first.y.abs() < 1e-9);

        let mut last = first.x;
        let mut now = 56.0;
        let mut ticks = 0;
        while let Some(Intent::Pan(d)) = input.tick(now + 16.0) {
            now += 16.0;
            assert!(d.x < last);
            last = d.x;
            ticks += 1;
            assert!(ticks < 1000, "glide never stopped");
        }
        assert!(!input.is_gliding());
    }

    #[test]
    fn test_pointer_down_cancels_inertia() {
        let mut input = reducer();
        input.handle(down(1, 0.0, 0.0, 0.0));
        input.handle(mv(1, 30.0, 0.0, 16.0));
        input.handle(mv(1, 60.0, 0.0, 32.0));
        input.handle(up(1, 60.0, 0.0, 40.0));
        assert!(input.is_gliding());
        input.handle(down(7, 5.0, 5.0, 50.0));
        assert!(!input.is_gliding());
        assert_eq!(input.tick(66.0), None);
    }

    #[test]
    fn test_stale_release_has_no_inertia() {
        let mut input = reducer();
        input.handle(down(1, 0.0, 0.0, 0.0));
        input.handle(mv(1, 30.0, 0.0, 16.0));
        input.handle(mv(1, 60.0, 0.0, 32.0));
        input.handle(up(1, 60.0, 0.0, 600.0));
        assert!(!input.is_gliding());
    }

    #[test]
    fn test_inertia_can_be_disabled() {
        let mut config = InputConfig::default();
        config.inertia.enabled = false;
        let mut input = InputReducer::new(config);
        input.handle(down(1, 0.0, 0.0, 0.0));
        input.handle(mv(1, 30.0, 0.0, 16.0));
        input.handle(mv(1, 60.0, 0.0, 32.0));
        input.handle(up(1, 60.0, 0.0, 40.0));
        assert!(!input.is_gliding());
    }

    #[test]
    fn test_cancel_never_clicks() {
        let mut input = reducer();
        input.handle(down(1, 10.0, 10.0, 0.0));
        assert!(input.handle(InputEvent::PointerCancel { id: 1 }).is_empty());
        assert_eq!(input.gesture(), Gesture::Idle);
        assert!(input.handle(up(1, 10.0, 10.0, 5.0)).is_empty());
    }

    #[test]
    fn test_drag_sensitivity_scales_pan() {
        let config = InputConfig {
            drag_sensitivity: 2.0,
            ..InputConfig::default()
        };
        let mut input = InputReducer::new(config);
        input.handle(down(1, 0.0, 0.0, 0.0));
        assert_eq!(
            input.handle(mv(1, 5.0, -3.0, 10.0)),
            vec![Intent::Pan(Vector::new(10.0, -6.0))]
        );
    }

    #[test]
    fn test_pinch_sensitivity_is_an_exponent() {
        let config = InputConfig {
            pinch_sensitivity: 0.5,
            ..InputConfig::default()
        };
        let mut input = InputReducer::new(config);
        input.handle(down(1, 100.0, 100.0, 0.0));
        input.handle(down(2, 200.0, 100.0, 5.0));

        // Finger distance doubles.
        let intents = input.handle(mv(2, 300.0, 100.0, 16.0));
        let factor = intents.iter().find_map(|i| match i {
            Intent::Zoom { factor, .. } => Some(*factor),
            _ => None,
        });
        let factor = factor.expect("pinch should zoom");
        assert!((factor - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_two_finger_pan_uses_drag_sensitivity() {
        let config = InputConfig {
            drag_sensitivity: 2.0,
            pinch_sensitivity: 0.5,
            ..InputConfig::default()
        };
        let mut input = InputReducer::new(config);
        input.handle(down(1, 100.0, 100.0, 0.0));
        input.handle(down(2, 200.0, 100.0, 5.0));

        // Both fingers slide 10px down, one after the other.
        let mut intents = input.handle(mv(1, 100.0, 110.0, 16.0));
        intents.extend(input.handle(mv(2, 200.0, 110.0, 20.0)));
        let total = intents.iter().fold(Vector::ZERO, |acc, i| match i {
            Intent::Pan(d) => acc + *d,
            _ => acc,
        });
        assert!(total.x.abs() < 1e-12);
        assert!((total.y - 20.0).abs() < 1e-12);
    }
}
