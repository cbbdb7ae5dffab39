use foundation::time::Time;

/// Frame metadata handed to every per-frame update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Engine time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// Fixed-step frame: `time = index * dt_s`.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Frame with an externally measured clock (variable step hosts).
    pub fn at(index: u64, dt_s: f64, time: Time) -> Self {
        Self { index, dt_s, time }
    }

    pub fn next(self) -> Self {
        Self::at(self.index + 1, self.dt_s, self.time.after(self.dt_s))
    }
}

/// Lets a per-frame update run at most once per frame index.
///
/// Hosts may call the update from several places in the same frame (a main
/// loop plus a late-update hook); only the first call does any work.
#[derive(Debug, Default, Clone)]
pub struct FrameGuard {
    last: Option<u64>,
}

impl FrameGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `frame` has not been processed yet and marks it.
    pub fn enter(&mut self, frame: Frame) -> bool {
        if self.last == Some(frame.index) {
            return false;
        }
        self.last = Some(frame.index);
        true
    }

    pub fn last_index(&self) -> Option<u64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameGuard};
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 0.25);
        assert_eq!(a, Frame::new(10, 0.25));
        assert_eq!(a.time, Time(2.5));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f1 = Frame::at(4, 0.5, Time(10.0)).next();
        assert_eq!(f1.index, 5);
        assert_eq!(f1.time, Time(10.5));
    }

    #[test]
    fn guard_admits_each_index_once() {
        let mut guard = FrameGuard::new();
        let f = Frame::new(3, 0.1);
        assert!(guard.enter(f));
        assert!(!guard.enter(f));
        assert!(guard.enter(f.next()));
        assert_eq!(guard.last_index(), Some(4));

        guard.reset();
        assert!(guard.enter(f));
    }
}
