//! Camera controller: pan, zoom, momentum and eased reconciliation.
//!
//! # Responsibility
//! - Own the authoritative `target` transform and the animated `current` one.
//! - Translate pointer/wheel gestures and focus requests into `target`.
//! - Advance `current` toward `target` one frame at a time.
//!
//! # Invariants
//! - Screen point = world point * k + (x, y).
//! - `target.k` stays within `[min_scale, max_scale]`.
//! - Auto-fit runs at most once per controller.
//! - Non-finite gesture input is ignored; `target` stays finite.
//! - Camera state is ephemeral and never serialized.

pub mod animation;

use crate::config::CameraConfig;
use crate::layout::{Bounds, Point};
use std::collections::HashMap;

const SCALE_EPSILON: f64 = 1e-4;

/// Pan/zoom transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Viewport size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Inertial pan/zoom camera.
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    target: Transform,
    current: Transform,
    velocity: Point,
    dragging: bool,
    viewport: Option<Viewport>,
    auto_fit_done: bool,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            target: Transform::IDENTITY,
            current: Transform::IDENTITY,
            velocity: Point::default(),
            dragging: false,
            viewport: None,
            auto_fit_done: false,
        }
    }

    /// User intent.
    pub fn target(&self) -> Transform {
        self.target
    }

    /// Rendered, animated transform.
    pub fn current(&self) -> Transform {
        self.current
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Records the viewport size; non-positive sizes are ignored.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Some(Viewport { width, height });
        }
    }

    /// Starts a drag unless the pointer landed on a node.
    ///
    /// Returns whether dragging started.
    pub fn pointer_down(&mut self, on_node: bool) -> bool {
        if on_node {
            return false;
        }
        self.dragging = true;
        self.velocity = Point::default();
        true
    }

    /// Applies a raw pointer delta while dragging.
    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        if !self.dragging || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.target.x += dx;
        self.target.y += dy;
        self.velocity = Point::new(dx, dy);
    }

    /// Ends a drag; recorded velocity carries on as momentum.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Zooms `target` exponentially around the screen point `anchor`.
    pub fn wheel(&mut self, delta_y: f64, anchor: Point) {
        if !delta_y.is_finite() || !is_finite_point(anchor) {
            return;
        }
        let world = self.target.screen_to_world(anchor);
        let k = (self.target.k * (-delta_y * self.config.wheel_zoom_rate).exp())
            .clamp(self.config.min_scale, self.config.max_scale);
        self.target = Transform {
            x: anchor.x - world.x * k,
            y: anchor.y - world.y * k,
            k,
        };
    }

    /// Centers `world` in the viewport at the current target scale.
    ///
    /// Returns `false` when no viewport is known yet.
    pub fn focus_point(&mut self, world: Point) -> bool {
        let Some(viewport) = self.viewport else {
            return false;
        };
        if !is_finite_point(world) {
            return false;
        }
        let center = viewport.center();
        self.target.x = center.x - world.x * self.target.k;
        self.target.y = center.y - world.y * self.target.k;
        self.velocity = Point::default();
        true
    }

    /// Centers the node `id` using a layout position map.
    ///
    /// Returns `false` for unknown ids or a missing viewport.
    pub fn focus_node(&mut self, id: &str, positions: &HashMap<String, Point>) -> bool {
        match positions.get(id) {
            Some(point) => self.focus_point(*point),
            None => false,
        }
    }

    /// Centers the bounding box of `positions` the first time it can.
    ///
    /// Skipped for good once the camera has left the identity transform.
    pub fn auto_fit<'a>(&mut self, positions: impl IntoIterator<Item = &'a Point>) -> bool {
        if self.auto_fit_done {
            return false;
        }
        let Some(viewport) = self.viewport else {
            return false;
        };
        let Some(bounds) = Bounds::from_points(positions.into_iter().copied()) else {
            return false;
        };
        self.auto_fit_done = true;
        if !self.current.is_identity() || !self.target.is_identity() {
            return false;
        }
        let center = bounds.center();
        let screen = viewport.center();
        self.target.x = screen.x - center.x * self.target.k;
        self.target.y = screen.y - center.y * self.target.k;
        true
    }

    /// Returns whether another frame would change anything.
    pub fn needs_frame(&self) -> bool {
        !self.is_settled() || (!self.dragging && self.has_momentum())
    }

    /// Advances one animation frame. Returns [`needs_frame`](Self::needs_frame)
    /// after the step.
    pub fn step(&mut self) -> bool {
        if !self.dragging {
            if self.has_momentum() {
                self.target.x += self.velocity.x;
                self.target.y += self.velocity.y;
                self.velocity.x *= self.config.momentum_decay;
                self.velocity.y *= self.config.momentum_decay;
            } else {
                self.velocity = Point::default();
            }
        }

        let ease = self.config.translate_ease;
        self.current.x += (self.target.x - self.current.x) * ease;
        self.current.y += (self.target.y - self.current.y) * ease;
        self.current.k += (self.target.k - self.current.k) * self.config.scale_ease;
        if self.is_settled() {
            self.current = self.target;
        }
        self.needs_frame()
    }

    /// Jumps `current` onto `target` and drops momentum.
    pub fn settle(&mut self) {
        self.velocity = Point::default();
        self.current = self.target;
    }

    fn has_momentum(&self) -> bool {
        let threshold = self.config.momentum_threshold;
        self.velocity.x.abs() > threshold || self.velocity.y.abs() > threshold
    }

    fn is_settled(&self) -> bool {
        let epsilon = self.config.settle_epsilon;
        (self.target.x - self.current.x).abs() < epsilon
            && (self.target.y - self.current.y).abs() < epsilon
            && (self.target.k - self.current.k).abs() < SCALE_EPSILON
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

fn is_finite_point(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}
