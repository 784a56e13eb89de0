//! Self-re-arming animation loop.
//!
//! # Responsibility
//! - Keep at most one frame callback pending for a camera.
//! - Re-arm after each frame only while the camera still needs frames.
//!
//! # Invariants
//! - `ensure_running` is idempotent: a pending frame is never duplicated.
//! - `stop` releases the pending handle through the scheduler.

use super::CameraController;

/// Host facility that runs a callback on the next display frame.
pub trait FrameScheduler {
    type Handle;

    /// Requests one future call to [`AnimationLoop::on_frame`].
    fn request_frame(&mut self) -> Self::Handle;

    /// Withdraws a previously requested frame.
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Animation loop state: the pending frame handle, if any.
#[derive(Debug)]
pub struct AnimationLoop<H> {
    pending: Option<H>,
}

impl<H> Default for AnimationLoop<H> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<H> AnimationLoop<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a frame is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules a frame if the camera needs one and none is pending.
    ///
    /// Returns whether a frame is pending afterwards.
    pub fn ensure_running<S>(&mut self, camera: &CameraController, scheduler: &mut S) -> bool
    where
        S: FrameScheduler<Handle = H>,
    {
        if self.pending.is_none() && camera.needs_frame() {
            self.pending = Some(scheduler.request_frame());
        }
        self.is_running()
    }

    /// Frame callback: steps the camera once and re-arms while unconverged.
    ///
    /// Returns whether another frame was scheduled.
    pub fn on_frame<S>(&mut self, camera: &mut CameraController, scheduler: &mut S) -> bool
    where
        S: FrameScheduler<Handle = H>,
    {
        self.pending = None;
        if camera.step() {
            self.pending = Some(scheduler.request_frame());
        }
        self.is_running()
    }

    /// Cancels the pending frame, if any.
    pub fn stop<S>(&mut self, scheduler: &mut S)
    where
        S: FrameScheduler<Handle = H>,
    {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }
}

/// Scheduler for hosts that poll: requested frames are queued as tickets the
/// host drains and answers by calling back into the loop.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_ticket: u64,
    queued: Vec<u64>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets requested and not yet taken or cancelled.
    pub fn queued(&self) -> &[u64] {
        &self.queued
    }

    /// Removes and returns the oldest queued ticket.
    pub fn take_next(&mut self) -> Option<u64> {
        if self.queued.is_empty() {
            None
        } else {
            Some(self.queued.remove(0))
        }
    }
}

impl FrameScheduler for FrameQueue {
    type Handle = u64;

    fn request_frame(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.queued.push(ticket);
        ticket
    }

    fn cancel_frame(&mut self, handle: u64) {
        self.queued.retain(|ticket| *ticket != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimationLoop, FrameQueue};
    use crate::camera::CameraController;
    use crate::layout::Point;

    #[test]
    fn idle_camera_schedules_nothing() {
        let camera = CameraController::default();
        let mut queue = FrameQueue::new();
        let mut animation = AnimationLoop::new();
        assert!(!animation.ensure_running(&camera, &mut queue));
        assert!(queue.queued().is_empty());
    }

    #[test]
    fn loop_rearms_until_converged_then_stops() {
        let mut camera = CameraController::default();
        camera.set_viewport(400.0, 400.0);
        camera.focus_point(Point::new(0.0, 0.0));

        let mut queue = FrameQueue::new();
        let mut animation = AnimationLoop::new();
        assert!(animation.ensure_running(&camera, &mut queue));
        assert!(animation.ensure_running(&camera, &mut queue));
        assert_eq!(queue.queued().len(), 1);

        let mut frames = 0;
        while queue.take_next().is_some() {
            animation.on_frame(&mut camera, &mut queue);
            frames += 1;
            assert!(frames < 10_000);
        }
        assert!(!animation.is_running());
        assert_eq!(camera.current(), camera.target());
    }

    #[test]
    fn stop_cancels_pending_frame() {
        let mut camera = CameraController::default();
        camera.set_viewport(400.0, 400.0);
        camera.focus_point(Point::new(50.0, 0.0));

        let mut queue = FrameQueue::new();
        let mut animation = AnimationLoop::new();
        animation.ensure_running(&camera, &mut queue);
        animation.stop(&mut queue);
        assert!(!animation.is_running());
        assert!(queue.queued().is_empty());
    }
}
