//! Frame-based sprite animation.
//!
//! An animation plays one clip at a time: a contiguous range of frame
//! numbers advanced on a timer. Each user (weapon, enemy, decal) defines its
//! clip names as an enum implementing [`ClipSet`].

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// A contiguous frame range played at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub start_frame: u32,
    pub end_frame: u32,
    /// Seconds per frame.
    pub frame_time: f32,
}

impl Clip {
    pub const fn new(start_frame: u32, end_frame: u32, frame_time: f32) -> Self {
        Self {
            start_frame,
            end_frame,
            frame_time,
        }
    }

    /// A single-frame clip that never advances or finishes.
    pub const fn still(frame: u32) -> Self {
        Self::new(frame, frame, 0.0)
    }

    pub fn is_static(&self) -> bool {
        self.start_frame >= self.end_frame
    }

    pub fn frame_count(&self) -> u32 {
        self.end_frame.saturating_sub(self.start_frame) + 1
    }
}

/// A closed set of named clips.
pub trait ClipSet: Copy + Eq + Debug {
    fn clip(self) -> Clip;
}

/// Playback state for one clip set.
#[derive(Debug, Clone)]
pub struct Animation<C: ClipSet> {
    current: C,
    frame: u32,
    timer: f32,
    finished: bool,
}

impl<C: ClipSet> Animation<C> {
    pub fn new(clip: C) -> Self {
        Self {
            current: clip,
            frame: clip.clip().start_frame,
            timer: 0.0,
            finished: false,
        }
    }

    /// Switch clips, restarting at the new clip's first frame.
    pub fn set_clip(&mut self, clip: C) {
        self.current = clip;
        self.frame = clip.clip().start_frame;
        self.timer = 0.0;
        self.finished = false;
    }

    /// Advance by `delta` seconds.
    ///
    /// Steps one frame each time the accumulated time exceeds the clip's
    /// frame time. Stepping past the last frame wraps to the first and
    /// raises the finished flag, which only lasts until the next call.
    pub fn advance(&mut self, delta: f32) {
        self.finished = false;

        let clip = self.current.clip();
        if clip.is_static() {
            return;
        }

        if clip.frame_time <= 0.0 {
            self.step(&clip);
            return;
        }

        self.timer += delta;
        while self.timer > clip.frame_time {
            self.timer -= clip.frame_time;
            self.step(&clip);
        }
    }

    fn step(&mut self, clip: &Clip) {
        if self.frame >= clip.end_frame {
            self.frame = clip.start_frame;
            self.finished = true;
        } else {
            self.frame += 1;
        }
    }

    pub fn clip(&self) -> C {
        self.current
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Zero-based frame index within the current clip.
    pub fn frame_offset(&self) -> u32 {
        self.frame.saturating_sub(self.current.clip().start_frame)
    }
}
