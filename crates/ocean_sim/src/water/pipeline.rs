//! Ordering protocol for the two water compute stages.
//!
//! A frame moves `HeightPending -> NormalsPending -> Ready`. Each transition
//! records its dispatch followed by a barrier, so the normals stage can only be
//! recorded after the height writes are visible, and a [`WaterReady`] token
//! (required by the water draw) only exists once both barriers are recorded.
//! The token is stamped with the backend and frame that produced it, so a draw
//! can refuse a token left over from another frame or another backend.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use super::lattice::workgroup_count;

/// Backend that records the water stages.
pub trait WaterCompute {
    /// Write the height component of every vertex for `time`.
    fn dispatch_heights(&mut self, time: f32, groups: [u32; 2]);
    /// Write every normal from the visible heights.
    fn dispatch_normals(&mut self, groups: [u32; 2]);
    /// Make all prior stage writes complete and visible to later stages.
    fn barrier(&mut self);
    /// Identity of the backend and its latest height frame.
    fn stamp(&self) -> WaterStamp;
}

static NEXT_BACKEND_ID: AtomicU64 = AtomicU64::new(1);

/// Fresh identity for a water backend, unique within the process.
pub fn next_backend_id() -> u64 {
    NEXT_BACKEND_ID.fetch_add(1, Ordering::Relaxed)
}

/// Which backend, and which of its frames, a [`WaterReady`] token belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaterStamp {
    pub backend: u64,
    pub frame: u64,
}

/// Heights not yet dispatched this frame.
pub struct HeightPending;
/// Heights written and visible; normals not yet dispatched.
pub struct NormalsPending;
/// Both stages written and visible.
pub struct Ready;

/// One frame's pass through the water stages.
#[must_use = "a water frame must be driven to `finish` before the water is drawn"]
pub struct WaterFrame<'a, B: WaterCompute + ?Sized, S> {
    backend: &'a mut B,
    groups: [u32; 2],
    _state: PhantomData<S>,
}

/// Proof that the water buffers are safe to read for drawing this frame.
#[derive(Debug)]
pub struct WaterReady {
    stamp: WaterStamp,
}

impl WaterReady {
    pub fn stamp(&self) -> WaterStamp {
        self.stamp
    }

    /// True when the token comes from the backend's current frame.
    pub fn is_current(&self, current: WaterStamp) -> bool {
        self.stamp == current
    }
}

impl<'a, B: WaterCompute + ?Sized> WaterFrame<'a, B, HeightPending> {
    pub fn begin(backend: &'a mut B, grid_res: u32) -> Self {
        let groups = workgroup_count(grid_res);
        Self {
            backend,
            groups: [groups, groups],
            _state: PhantomData,
        }
    }

    pub fn dispatch_heights(self, time: f32) -> WaterFrame<'a, B, NormalsPending> {
        let WaterFrame { backend, groups, .. } = self;
        backend.dispatch_heights(time, groups);
        backend.barrier();
        WaterFrame {
            backend,
            groups,
            _state: PhantomData,
        }
    }
}

impl<'a, B: WaterCompute + ?Sized> WaterFrame<'a, B, NormalsPending> {
    pub fn dispatch_normals(self) -> WaterFrame<'a, B, Ready> {
        let WaterFrame { backend, groups, .. } = self;
        backend.dispatch_normals(groups);
        backend.barrier();
        WaterFrame {
            backend,
            groups,
            _state: PhantomData,
        }
    }
}

impl<'a, B: WaterCompute + ?Sized> WaterFrame<'a, B, Ready> {
    pub fn finish(self) -> WaterReady {
        WaterReady {
            stamp: self.backend.stamp(),
        }
    }
}

impl<'a, B: WaterCompute + ?Sized, S> WaterFrame<'a, B, S> {
    /// Workgroups per axis for this lattice.
    pub fn groups(&self) -> [u32; 2] {
        self.groups
    }
}

/// Record a full water frame: heights, barrier, normals, barrier.
pub fn run_water_frame<B: WaterCompute + ?Sized>(backend: &mut B, grid_res: u32, time: f32) -> WaterReady {
    WaterFrame::begin(backend, grid_res)
        .dispatch_heights(time)
        .dispatch_normals()
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        frame: u64,
    }

    impl WaterCompute for Recorder {
        fn dispatch_heights(&mut self, time: f32, groups: [u32; 2]) {
            self.frame += 1;
            self.calls.push(format!("heights({time},{}x{})", groups[0], groups[1]));
        }

        fn dispatch_normals(&mut self, groups: [u32; 2]) {
            self.calls.push(format!("normals({}x{})", groups[0], groups[1]));
        }

        fn barrier(&mut self) {
            self.calls.push("barrier".to_string());
        }

        fn stamp(&self) -> WaterStamp {
            WaterStamp { backend: 0, frame: self.frame }
        }
    }

    #[test]
    fn test_frame_records_in_order() {
        let mut recorder = Recorder::default();
        let _ready = run_water_frame(&mut recorder, 32, 2.5);
        assert_eq!(
            recorder.calls,
            vec!["heights(2.5,2x2)", "barrier", "normals(2x2)", "barrier"]
        );
    }

    #[test]
    fn test_groups_round_up() {
        let mut recorder = Recorder::default();
        let frame = WaterFrame::begin(&mut recorder, 33);
        assert_eq!(frame.groups(), [3, 3]);
        let _ = frame.dispatch_heights(0.0).dispatch_normals().finish();
    }

    #[test]
    fn test_token_goes_stale_next_frame() {
        let mut recorder = Recorder::default();
        let first = run_water_frame(&mut recorder, 16, 0.0);
        assert!(first.is_current(recorder.stamp()));
        let second = run_water_frame(&mut recorder, 16, 0.1);
        assert!(!first.is_current(recorder.stamp()));
        assert!(second.is_current(recorder.stamp()));
        assert_eq!(second.stamp().frame, 2);
    }

    #[test]
    fn test_backend_ids_unique() {
        let a = next_backend_id();
        let b = next_backend_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_trait_object_backend() {
        let mut recorder = Recorder::default();
        {
            let backend: &mut dyn WaterCompute = &mut recorder;
            let _ready = run_water_frame(backend, 4, 0.0);
        }
        assert_eq!(recorder.calls.len(), 4);
    }
}
