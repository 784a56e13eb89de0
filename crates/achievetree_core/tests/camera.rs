use achievetree_core::camera::animation::{AnimationLoop, FrameScheduler};
use achievetree_core::config::{CameraConfig, LayoutConfig};
use achievetree_core::{compute_layout, default_tree, CameraController, Point, Transform};
use proptest::prelude::*;

/// Scheduler that records what the loop asked for.
#[derive(Default)]
struct RecordingScheduler {
    next: u32,
    requested: Vec<u32>,
    cancelled: Vec<u32>,
}

impl FrameScheduler for RecordingScheduler {
    type Handle = u32;

    fn request_frame(&mut self) -> u32 {
        self.next += 1;
        self.requested.push(self.next);
        self.next
    }

    fn cancel_frame(&mut self, handle: u32) {
        self.cancelled.push(handle);
    }
}

proptest! {
    #[test]
    fn wheel_keeps_anchor_fixed(
        start_k in 0.3f64..2.5,
        start_x in -500.0f64..500.0,
        start_y in -500.0f64..500.0,
        delta in -800.0f64..800.0,
        ax in 0.0f64..1200.0,
        ay in 0.0f64..900.0,
    ) {
        let mut camera = CameraController::default();
        camera.set_viewport(1200.0, 900.0);
        camera.wheel(
            (start_k.ln()) / -CameraConfig::default().wheel_zoom_rate,
            Point::new(0.0, 0.0),
        );
        camera.pointer_down(false);
        camera.pointer_move(start_x, start_y);
        camera.pointer_up();

        let anchor = Point::new(ax, ay);
        let before = camera.target().screen_to_world(anchor);
        camera.wheel(delta, anchor);
        let after = camera.target().screen_to_world(anchor);

        prop_assert!((before.x - after.x).abs() < 1e-6);
        prop_assert!((before.y - after.y).abs() < 1e-6);
        prop_assert!(camera.target().k >= 0.25 && camera.target().k <= 2.8);
    }
}

#[test]
fn auto_fit_centers_layout_once() {
    let layout = compute_layout(&default_tree(), &LayoutConfig::default());
    let bounds = layout.bounds().unwrap();
    let mut camera = CameraController::default();

    // No viewport yet: nothing happens and the latch stays open.
    assert!(!camera.auto_fit(layout.positions().values()));

    camera.set_viewport(1000.0, 500.0);
    assert!(camera.auto_fit(layout.positions().values()));
    let center = camera.target().world_to_screen(bounds.center());
    assert!((center.x - 500.0).abs() < 1e-9);
    assert!((center.y - 250.0).abs() < 1e-9);

    camera.settle();
    let fitted = camera.target();
    assert!(!camera.auto_fit(layout.positions().values()));
    assert_eq!(camera.target(), fitted);
}

#[test]
fn auto_fit_skips_moved_camera() {
    let layout = compute_layout(&default_tree(), &LayoutConfig::default());
    let mut camera = CameraController::default();
    camera.wheel(-50.0, Point::new(10.0, 10.0));
    camera.set_viewport(1000.0, 500.0);
    let before = camera.target();
    assert!(!camera.auto_fit(layout.positions().values()));
    assert_eq!(camera.target(), before);
}

#[test]
fn animation_loop_rearms_until_settled_then_stops() {
    let mut camera = CameraController::default();
    let mut scheduler = RecordingScheduler::default();
    let mut animation = AnimationLoop::new();

    assert!(!animation.ensure_running(&camera, &mut scheduler));
    assert!(scheduler.requested.is_empty());

    camera.set_viewport(800.0, 600.0);
    camera.focus_point(Point::new(100.0, 100.0));
    assert!(animation.ensure_running(&camera, &mut scheduler));
    assert!(animation.ensure_running(&camera, &mut scheduler));
    assert_eq!(scheduler.requested.len(), 1);

    let mut frames = 0;
    while animation.on_frame(&mut camera, &mut scheduler) {
        frames += 1;
        assert!(frames < 1_000);
    }
    assert!(!animation.is_running());
    assert_eq!(camera.current(), camera.target());
    assert_eq!(scheduler.requested.len(), frames + 1);
    assert!(scheduler.cancelled.is_empty());
}

#[test]
fn stop_cancels_pending_frame() {
    let mut camera = CameraController::default();
    let mut scheduler = RecordingScheduler::default();
    let mut animation = AnimationLoop::new();
    camera.set_viewport(800.0, 600.0);
    camera.focus_point(Point::new(-40.0, 25.0));

    animation.ensure_running(&camera, &mut scheduler);
    animation.stop(&mut scheduler);
    assert_eq!(scheduler.cancelled, vec![1]);
    assert!(!animation.is_running());

    camera.settle();
    assert_eq!(camera.current(), camera.target());
    assert_ne!(camera.target(), Transform::IDENTITY);
}
