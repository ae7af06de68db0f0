//! In-process stand-in for the robot controller firmware.
//!
//! Speaks the panel's HTTP contract: `GET /status`, `POST /command` and
//! `GET /video_feed`. The recording/playback transition rules live here; the
//! panel only mirrors them from the status snapshot.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use scara_api::{
    ActuatorDirection, Command, Gripper, RobotStatus, MAX_PLAYBACK_SPEED, MAX_SERVO_ANGLE,
};

pub type SharedSim = Arc<Mutex<RobotSim>>;

pub fn shared() -> SharedSim {
    Arc::new(Mutex::new(RobotSim::default()))
}

/// One captured pose on the tape.
#[derive(Debug, Clone, PartialEq)]
pub struct TapeFrame {
    pub servo1: u8,
    pub servo3: u8,
    pub servo4: u8,
    pub gripper: Gripper,
}

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Reject {
    /// Parameter outside the contract, HTTP 400.
    BadParameter(String),
    /// Command not legal in the current mode, HTTP 409.
    ModeConflict(String),
}

/// Everything a replay task needs, snapshotted at accept time so later tape
/// edits cannot affect a running replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayPlan {
    loops: u32,
    speed: f32,
    frames: Vec<TapeFrame>,
    generation: u64,
}

/// Mutable controller model behind the HTTP surface.
#[derive(Debug, Default)]
pub struct RobotSim {
    pub status: RobotStatus,
    pub tape: Vec<TapeFrame>,
    /// Loop count and speed of the most recently accepted play command.
    pub last_play: Option<(u32, f32)>,
    /// Most recent actuator direction, for inspection; the real hardware
    /// does not report this back either.
    pub last_actuator: Option<ActuatorDirection>,
    play_generation: u64,
}

impl RobotSim {
    /// Apply one command to the model.
    ///
    /// Returns a [`ReplayPlan`] when a playback was accepted and needs a
    /// background task, `Ok(None)` for everything else. Rejections leave the
    /// model untouched.
    pub fn apply(&mut self, command: &Command) -> Result<Option<ReplayPlan>, Reject> {
        match *command {
            Command::SetServo1 { value } => {
                self.status.servo1 = checked_angle(value)?;
                self.capture();
            }
            Command::SetServo3 { value } => {
                self.status.servo3 = checked_angle(value)?;
                self.capture();
            }
            Command::SetServo4 { value } => {
                self.status.servo4 = checked_angle(value)?;
                self.capture();
            }
            Command::LinearActuator { value } => {
                // Momentary axis, not part of the status snapshot.
                self.last_actuator = Some(value);
            }
            Command::Gripper { value } => {
                self.status.gripper = value;
                self.capture();
            }
            Command::ToggleGesture => {
                self.status.hand_gesture_enabled = !self.status.hand_gesture_enabled;
            }
            Command::StartRecording => {
                if self.status.is_recording {
                    return Err(Reject::ModeConflict("already recording".to_string()));
                }
                if self.status.is_playing {
                    return Err(Reject::ModeConflict(
                        "cannot record during playback".to_string(),
                    ));
                }
                self.tape.clear();
                self.status.is_recording = true;
            }
            Command::StopRecording => {
                if !self.status.is_recording {
                    return Err(Reject::ModeConflict("not recording".to_string()));
                }
                self.status.is_recording = false;
            }
            Command::PlayRecording { loops, speed } => {
                if loops < 1 {
                    return Err(Reject::BadParameter(
                        "loops must be at least 1".to_string(),
                    ));
                }
                if !speed.is_finite() || !(0.0..=MAX_PLAYBACK_SPEED).contains(&speed) {
                    return Err(Reject::BadParameter(format!(
                        "speed {} out of range 0.0-{}",
                        speed, MAX_PLAYBACK_SPEED
                    )));
                }
                if self.status.is_playing {
                    return Err(Reject::ModeConflict("already playing".to_string()));
                }
                if self.status.is_recording {
                    return Err(Reject::ModeConflict("stop recording first".to_string()));
                }
                if self.tape.is_empty() {
                    return Err(Reject::ModeConflict("nothing recorded".to_string()));
                }
                self.status.is_playing = true;
                self.last_play = Some((loops, speed));
                self.play_generation += 1;
                return Ok(Some(ReplayPlan {
                    loops,
                    speed,
                    frames: self.tape.clone(),
                    generation: self.play_generation,
                }));
            }
            Command::StopPlayback => {
                if !self.status.is_playing {
                    return Err(Reject::ModeConflict("not playing".to_string()));
                }
                self.status.is_playing = false;
            }
        }
        Ok(None)
    }

    /// While recording, every accepted pose command lands on the tape.
    fn capture(&mut self) {
        if self.status.is_recording {
            self.tape.push(TapeFrame {
                servo1: self.status.servo1,
                servo3: self.status.servo3,
                servo4: self.status.servo4,
                gripper: self.status.gripper,
            });
        }
    }
}

fn checked_angle(value: u8) -> Result<u8, Reject> {
    if value > MAX_SERVO_ANGLE {
        return Err(Reject::BadParameter(format!(
            "angle {} out of range 0-{}",
            value, MAX_SERVO_ANGLE
        )));
    }
    Ok(value)
}

pub fn router(sim: SharedSim) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/command", post(post_command))
        .route("/video_feed", get(get_video_feed))
        .with_state(sim)
}

async fn get_status(State(sim): State<SharedSim>) -> Json<RobotStatus> {
    Json(sim.lock().await.status.clone())
}

async fn post_command(
    State(sim): State<SharedSim>,
    Json(command): Json<Command>,
) -> Result<Json<RobotStatus>, (StatusCode, Json<serde_json::Value>)> {
    let (outcome, snapshot) = {
        let mut robot = sim.lock().await;
        let outcome = robot.apply(&command);
        (outcome, robot.status.clone())
    };
    match outcome {
        Ok(plan) => {
            debug!(command = command.name(), "command accepted");
            if let Some(plan) = plan {
                tokio::spawn(run_replay(Arc::clone(&sim), plan));
            }
            Ok(Json(snapshot))
        }
        Err(reject) => {
            warn!(command = command.name(), ?reject, "command rejected");
            let (code, message) = match reject {
                Reject::BadParameter(m) => (StatusCode::BAD_REQUEST, m),
                Reject::ModeConflict(m) => (StatusCode::CONFLICT, m),
            };
            Err((code, Json(json!({ "error": message }))))
        }
    }
}

async fn get_video_feed(State(sim): State<SharedSim>) -> impl IntoResponse {
    let status = sim.lock().await.status.clone();
    let frame = render_frame(&status);
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/bmp"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (StatusCode::OK, headers, frame)
}

/// Step the tape frames back into the live status until all loops finish or
/// a `stop_playback` clears the flag.
async fn run_replay(sim: SharedSim, plan: ReplayPlan) {
    let step = frame_delay(plan.speed);
    info!(
        loops = plan.loops,
        speed = plan.speed,
        frames = plan.frames.len(),
        "replay started"
    );
    'replay: for _ in 0..plan.loops {
        for frame in &plan.frames {
            tokio::time::sleep(step).await;
            let mut robot = sim.lock().await;
            if !robot.status.is_playing || robot.play_generation != plan.generation {
                info!("replay interrupted");
                break 'replay;
            }
            robot.status.servo1 = frame.servo1;
            robot.status.servo3 = frame.servo3;
            robot.status.servo4 = frame.servo4;
            robot.status.gripper = frame.gripper;
        }
    }
    let mut robot = sim.lock().await;
    // A newer replay owns the flag once the generation moves on.
    if robot.play_generation == plan.generation {
        robot.status.is_playing = false;
    }
}

/// Delay between replayed frames. Speed 5 is the recorded pace; the delay
/// scales inversely, with very low speeds clamped so 0 stays usable.
fn frame_delay(speed: f32) -> Duration {
    const BASE_MILLIS: f32 = 100.0;
    let factor = 5.0 / speed.clamp(0.25, MAX_PLAYBACK_SPEED);
    Duration::from_secs_f32(BASE_MILLIS * factor / 1000.0)
}

const FRAME_SIDE: usize = 64;

/// Render a small uncompressed BMP of the current pose.
///
/// Three horizontal bars grow with the joint angles, the background follows
/// the gripper state and a corner marker lights up while recording. Crude,
/// but every frame honestly reflects the model, which is what the panel's
/// cache-busting fetch is checking for.
pub fn render_frame(status: &RobotStatus) -> Vec<u8> {
    let row_bytes = FRAME_SIDE * 3; // 24-bit, width a multiple of 4 so no padding
    let image_size = row_bytes * FRAME_SIDE;
    let file_size = 54 + image_size;

    let mut bmp = Vec::with_capacity(file_size);
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&(file_size as u32).to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes()); // reserved
    bmp.extend_from_slice(&54u32.to_le_bytes()); // pixel data offset
    bmp.extend_from_slice(&40u32.to_le_bytes()); // BITMAPINFOHEADER
    bmp.extend_from_slice(&(FRAME_SIDE as i32).to_le_bytes());
    bmp.extend_from_slice(&(FRAME_SIDE as i32).to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes()); // planes
    bmp.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    bmp.extend_from_slice(&0u32.to_le_bytes()); // no compression
    bmp.extend_from_slice(&(image_size as u32).to_le_bytes());
    bmp.extend_from_slice(&2835u32.to_le_bytes()); // 72 dpi
    bmp.extend_from_slice(&2835u32.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes()); // palette colors
    bmp.extend_from_slice(&0u32.to_le_bytes()); // important colors

    let background: [u8; 3] = if status.gripper == Gripper::Hold {
        [40, 64, 40]
    } else {
        [40, 40, 40]
    };
    let bars = [
        (status.servo1, [220u8, 120u8, 40u8]),
        (status.servo3, [40, 180, 220]),
        (status.servo4, [120, 220, 120]),
    ];

    // Rows are stored bottom-up.
    for y in (0..FRAME_SIDE).rev() {
        for x in 0..FRAME_SIDE {
            let mut pixel = background;
            for (i, (angle, color)) in bars.iter().enumerate() {
                let top = 8 + i * 16;
                let len = FRAME_SIDE * usize::from(*angle) / usize::from(MAX_SERVO_ANGLE);
                if (top..top + 8).contains(&y) && x < len {
                    pixel = *color;
                }
            }
            if status.is_recording && y < 6 && x < 6 {
                pixel = [40, 40, 220]; // BGR red marker
            }
            bmp.extend_from_slice(&pixel);
        }
    }
    bmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_replaces_the_previous_tape() {
        let mut sim = RobotSim::default();
        assert_eq!(sim.apply(&Command::StartRecording), Ok(None));
        assert_eq!(sim.apply(&Command::SetServo1 { value: 10 }), Ok(None));
        assert_eq!(sim.apply(&Command::StopRecording), Ok(None));
        assert_eq!(sim.tape.len(), 1);

        sim.apply(&Command::StartRecording).unwrap();
        assert!(sim.tape.is_empty(), "a new recording starts a fresh tape");
    }

    #[test]
    fn pose_commands_land_on_the_tape_only_while_recording() {
        let mut sim = RobotSim::default();
        sim.apply(&Command::SetServo1 { value: 30 }).unwrap();
        assert!(sim.tape.is_empty());

        sim.apply(&Command::StartRecording).unwrap();
        sim.apply(&Command::SetServo3 { value: 60 }).unwrap();
        sim.apply(&Command::Gripper {
            value: Gripper::Hold,
        })
        .unwrap();
        assert_eq!(sim.tape.len(), 2);
        assert_eq!(sim.tape[1].gripper, Gripper::Hold);
        assert_eq!(sim.tape[1].servo3, 60);
    }

    #[test]
    fn mode_conflicts_are_rejected() {
        let mut sim = RobotSim::default();
        assert!(matches!(
            sim.apply(&Command::StopRecording),
            Err(Reject::ModeConflict(_))
        ));
        assert!(matches!(
            sim.apply(&Command::StopPlayback),
            Err(Reject::ModeConflict(_))
        ));

        sim.apply(&Command::StartRecording).unwrap();
        assert!(matches!(
            sim.apply(&Command::StartRecording),
            Err(Reject::ModeConflict(_))
        ));
        assert!(matches!(
            sim.apply(&Command::PlayRecording {
                loops: 1,
                speed: 5.0
            }),
            Err(Reject::ModeConflict(_))
        ));
    }

    #[test]
    fn playback_requires_a_tape() {
        let mut sim = RobotSim::default();
        assert_eq!(
            sim.apply(&Command::PlayRecording {
                loops: 1,
                speed: 5.0
            }),
            Err(Reject::ModeConflict("nothing recorded".to_string()))
        );
    }

    #[test]
    fn bad_parameters_are_rejected_without_side_effects() {
        let mut sim = RobotSim::default();
        assert!(matches!(
            sim.apply(&Command::SetServo1 { value: 200 }),
            Err(Reject::BadParameter(_))
        ));
        assert_eq!(sim.status.servo1, 90);

        sim.apply(&Command::StartRecording).unwrap();
        sim.apply(&Command::SetServo1 { value: 10 }).unwrap();
        sim.apply(&Command::StopRecording).unwrap();
        assert!(matches!(
            sim.apply(&Command::PlayRecording {
                loops: 0,
                speed: 5.0
            }),
            Err(Reject::BadParameter(_))
        ));
        assert!(matches!(
            sim.apply(&Command::PlayRecording {
                loops: 1,
                speed: 11.0
            }),
            Err(Reject::BadParameter(_))
        ));
        assert!(!sim.status.is_playing);
        assert_eq!(sim.last_play, None);
    }

    #[test]
    fn toggle_gesture_flips_every_time() {
        let mut sim = RobotSim::default();
        assert!(sim.status.hand_gesture_enabled);
        sim.apply(&Command::ToggleGesture).unwrap();
        assert!(!sim.status.hand_gesture_enabled);
        sim.apply(&Command::ToggleGesture).unwrap();
        assert!(sim.status.hand_gesture_enabled);
    }

    #[test]
    fn actuator_is_tracked_but_never_in_the_snapshot() {
        let mut sim = RobotSim::default();
        let before = sim.status.clone();
        sim.apply(&Command::LinearActuator {
            value: ActuatorDirection::Up,
        })
        .unwrap();
        assert_eq!(sim.last_actuator, Some(ActuatorDirection::Up));
        assert_eq!(sim.status, before);
    }

    #[tokio::test]
    async fn replay_applies_frames_and_clears_the_flag() {
        let sim = shared();
        let plan = {
            let mut robot = sim.lock().await;
            robot.apply(&Command::StartRecording).unwrap();
            robot.apply(&Command::SetServo1 { value: 15 }).unwrap();
            robot.apply(&Command::StopRecording).unwrap();
            robot.apply(&Command::SetServo1 { value: 90 }).unwrap();
            robot
                .apply(&Command::PlayRecording {
                    loops: 1,
                    speed: 10.0,
                })
                .unwrap()
                .unwrap()
        };
        assert!(sim.lock().await.status.is_playing);

        tokio::spawn(run_replay(Arc::clone(&sim), plan));
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if !sim.lock().await.status.is_playing {
                break;
            }
        }
        let robot = sim.lock().await;
        assert!(!robot.status.is_playing, "replay should finish on its own");
        assert_eq!(robot.status.servo1, 15, "tape pose was applied");
    }

    #[test]
    fn frame_is_a_valid_bmp() {
        let frame = render_frame(&RobotStatus::default());
        assert_eq!(&frame[0..2], b"BM");
        let declared = u32::from_le_bytes([frame[2], frame[3], frame[4], frame[5]]) as usize;
        assert_eq!(declared, frame.len());
        assert_eq!(frame.len(), 54 + FRAME_SIDE * FRAME_SIDE * 3);
    }

    #[test]
    fn frame_reflects_the_pose() {
        let mut status = RobotStatus::default();
        status.servo1 = 0;
        let zero = render_frame(&status);
        status.servo1 = 180;
        let full = render_frame(&status);
        assert_ne!(zero, full, "frames must change with the pose");
    }
}
