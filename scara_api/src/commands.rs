use serde::{Deserialize, Serialize};

use crate::errors::PanelError;
use crate::{ActuatorDirection, Gripper, ServoId};

/// Largest absolute angle accepted for any rotary joint.
pub const MAX_SERVO_ANGLE: u8 = 180;

/// Playback speed bounds: 0 is slowest, 5 normal, 10 fastest.
pub const MAX_PLAYBACK_SPEED: f32 = 10.0;

/// Upper bound the panel offers for the loop count. The wire contract only
/// requires `loops >= 1`; this is the input range of the original panel.
pub const MAX_PLAYBACK_LOOPS: u32 = 100;

/// One discrete command to the controller, `POST {base}/command`.
///
/// Serializes as `{"command": <name>, ...params}`; the variant renames below
/// are the wire names and must not change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    #[serde(rename = "set_servo_1")]
    SetServo1 { value: u8 },
    #[serde(rename = "set_servo_3")]
    SetServo3 { value: u8 },
    #[serde(rename = "set_servo_4")]
    SetServo4 { value: u8 },
    #[serde(rename = "linear_actuator")]
    LinearActuator { value: ActuatorDirection },
    #[serde(rename = "gripper")]
    Gripper { value: Gripper },
    #[serde(rename = "toggle_gesture")]
    ToggleGesture,
    #[serde(rename = "start_recording")]
    StartRecording,
    #[serde(rename = "stop_recording")]
    StopRecording,
    #[serde(rename = "play_recording")]
    PlayRecording { loops: u32, speed: f32 },
    #[serde(rename = "stop_playback")]
    StopPlayback,
}

impl Command {
    /// Absolute-angle command for one rotary joint.
    ///
    /// The angle is validated against [`MAX_SERVO_ANGLE`] and passed through
    /// exactly as given; the driver never clamps or rounds.
    pub fn set_servo(servo: ServoId, value: u8) -> Result<Command, PanelError> {
        if value > MAX_SERVO_ANGLE {
            return Err(PanelError::InvalidParameter(format!(
                "{} angle {} out of range 0-{}",
                servo.short_name(),
                value,
                MAX_SERVO_ANGLE
            )));
        }
        Ok(match servo {
            ServoId::Servo1 => Command::SetServo1 { value },
            ServoId::Servo3 => Command::SetServo3 { value },
            ServoId::Servo4 => Command::SetServo4 { value },
        })
    }

    /// Replay the captured motion `loops` times at the given speed.
    pub fn play_recording(loops: u32, speed: f32) -> Result<Command, PanelError> {
        if loops < 1 {
            return Err(PanelError::InvalidParameter(
                "playback loops must be at least 1".to_string(),
            ));
        }
        if !speed.is_finite() || !(0.0..=MAX_PLAYBACK_SPEED).contains(&speed) {
            return Err(PanelError::InvalidParameter(format!(
                "playback speed {} out of range 0.0-{}",
                speed, MAX_PLAYBACK_SPEED
            )));
        }
        Ok(Command::PlayRecording { loops, speed })
    }

    /// Wire name of this command, for logs and notices.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetServo1 { .. } => "set_servo_1",
            Command::SetServo3 { .. } => "set_servo_3",
            Command::SetServo4 { .. } => "set_servo_4",
            Command::LinearActuator { .. } => "linear_actuator",
            Command::Gripper { .. } => "gripper",
            Command::ToggleGesture => "toggle_gesture",
            Command::StartRecording => "start_recording",
            Command::StopRecording => "stop_recording",
            Command::PlayRecording { .. } => "play_recording",
            Command::StopPlayback => "stop_playback",
        }
    }
}
