use crate::commands::{Command, MAX_PLAYBACK_LOOPS, MAX_PLAYBACK_SPEED};
use crate::errors::PanelError;
use crate::{Gripper, RobotStatus, ServoId};

/// Per-operator view of the controller.
///
/// Owns the cached [`RobotStatus`] snapshot and the dispatch policy derived
/// from it: redundant-send suppression and the local guards for the
/// recording/playback buttons. One `Session` per panel process; it is
/// constructed in `main` and threaded through the render/poll cycle, never
/// shared globally.
///
/// The cache is only ever replaced wholesale by [`Session::apply_snapshot`]
/// from a successful status poll. Command responses echo the same shape but
/// are not written back here; the next poll is the authority.
#[derive(Debug, Clone, Default)]
pub struct Session {
    status: RobotStatus,
    synced: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Last server-confirmed snapshot (controller boot defaults until the
    /// first successful poll).
    pub fn status(&self) -> &RobotStatus {
        &self.status
    }

    /// Whether at least one poll has succeeded since startup.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Replace the whole cached snapshot with a fresh server response.
    pub fn apply_snapshot(&mut self, status: RobotStatus) {
        self.status = status;
        self.synced = true;
    }

    /// True when `value` differs from the confirmed angle, i.e. a
    /// `set_servo` command would actually change something.
    pub fn servo_differs(&self, servo: ServoId, value: u8) -> bool {
        servo.angle_in(&self.status) != value
    }

    /// True when `value` differs from the confirmed gripper state.
    pub fn gripper_differs(&self, value: Gripper) -> bool {
        self.status.gripper != value
    }

    // Recording and playback are mutually exclusive controller modes, so
    // entering either is blocked while the other is active. These guards are
    // best effort from the cached snapshot; the controller enforces the real
    // rules.

    pub fn can_start_recording(&self) -> bool {
        !self.status.is_recording && !self.status.is_playing
    }

    pub fn can_stop_recording(&self) -> bool {
        self.status.is_recording
    }

    pub fn can_play(&self) -> bool {
        !self.status.is_playing && !self.status.is_recording
    }

    pub fn can_stop_playback(&self) -> bool {
        self.status.is_playing
    }
}

/// Loop count and speed the operator has dialed in for the next replay.
///
/// Stepped from the panel and turned into a single `play_recording` command
/// on dispatch. Speed moves in 0.5 increments across 0.0..=10.0 with 5.0 as
/// normal speed; loops are kept within 1..=100.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSelection {
    pub loops: u32,
    pub speed: f32,
}

impl Default for PlaybackSelection {
    fn default() -> Self {
        PlaybackSelection {
            loops: 1,
            speed: 5.0,
        }
    }
}

impl PlaybackSelection {
    const SPEED_STEP: f32 = 0.5;

    pub fn step_loops(&mut self, delta: i32) {
        let next = i64::from(self.loops) + i64::from(delta);
        self.loops = next.clamp(1, i64::from(MAX_PLAYBACK_LOOPS)) as u32;
    }

    /// Step the speed by `steps` half-units, staying on exact 0.5 marks.
    pub fn step_speed(&mut self, steps: i32) {
        let max_halves = (MAX_PLAYBACK_SPEED / Self::SPEED_STEP) as i32;
        let halves = (self.speed / Self::SPEED_STEP).round() as i32 + steps;
        self.speed = halves.clamp(0, max_halves) as f32 * Self::SPEED_STEP;
    }

    /// The command this selection dispatches.
    pub fn command(&self) -> Result<Command, PanelError> {
        Command::play_recording(self.loops, self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(servo1: u8, recording: bool, playing: bool) -> RobotStatus {
        RobotStatus {
            servo1,
            is_recording: recording,
            is_playing: playing,
            ..RobotStatus::default()
        }
    }

    #[test]
    fn snapshot_replaces_the_whole_cache() {
        let mut session = Session::new();
        assert!(!session.is_synced());

        let fresh = RobotStatus {
            servo1: 45,
            servo3: 10,
            gripper: Gripper::Hold,
            hand_detected: true,
            current_control: "Servo 4".to_string(),
            ..RobotStatus::default()
        };
        session.apply_snapshot(fresh.clone());
        assert!(session.is_synced());
        assert_eq!(session.status(), &fresh);

        // A later snapshot wins outright, nothing is merged.
        session.apply_snapshot(RobotStatus::default());
        assert_eq!(session.status(), &RobotStatus::default());
    }

    #[test]
    fn repeated_identical_snapshots_do_not_drift() {
        let mut session = Session::new();
        let fresh = snapshot(45, false, false);
        session.apply_snapshot(fresh.clone());
        let first = session.status().clone();
        session.apply_snapshot(fresh);
        assert_eq!(session.status(), &first);
    }

    #[test]
    fn equal_servo_value_is_suppressed() {
        let mut session = Session::new();
        session.apply_snapshot(snapshot(45, false, false));
        assert!(!session.servo_differs(ServoId::Servo1, 45));
        assert!(session.servo_differs(ServoId::Servo1, 46));
        // Other joints still sit at their default.
        assert!(!session.servo_differs(ServoId::Servo3, 90));
    }

    #[test]
    fn equal_gripper_value_is_suppressed() {
        let session = Session::new();
        assert!(!session.gripper_differs(Gripper::Release));
        assert!(session.gripper_differs(Gripper::Hold));
    }

    #[test]
    fn recording_guards_follow_the_snapshot() {
        let mut session = Session::new();
        assert!(session.can_start_recording());
        assert!(!session.can_stop_recording());

        session.apply_snapshot(snapshot(90, true, false));
        assert!(!session.can_start_recording());
        assert!(session.can_stop_recording());
        // Playback is blocked while recording.
        assert!(!session.can_play());
    }

    #[test]
    fn playback_guards_follow_the_snapshot() {
        let mut session = Session::new();
        assert!(session.can_play());
        assert!(!session.can_stop_playback());

        session.apply_snapshot(snapshot(90, false, true));
        assert!(!session.can_play());
        assert!(session.can_stop_playback());
        // Recording is blocked while playing.
        assert!(!session.can_start_recording());
    }

    #[test]
    fn playback_selection_steps_and_clamps() {
        let mut sel = PlaybackSelection::default();
        assert_eq!(sel.loops, 1);
        assert_eq!(sel.speed, 5.0);

        sel.step_loops(-5);
        assert_eq!(sel.loops, 1);
        sel.step_loops(2);
        assert_eq!(sel.loops, 3);
        sel.step_loops(500);
        assert_eq!(sel.loops, 100);

        sel.step_speed(5);
        assert_eq!(sel.speed, 7.5);
        sel.step_speed(100);
        assert_eq!(sel.speed, 10.0);
        sel.step_speed(-100);
        assert_eq!(sel.speed, 0.0);
    }

    #[test]
    fn playback_selection_builds_the_command() {
        let mut sel = PlaybackSelection::default();
        sel.step_loops(2);
        sel.step_speed(5);
        assert_eq!(
            sel.command(),
            Ok(Command::PlayRecording {
                loops: 3,
                speed: 7.5
            })
        );
    }
}
