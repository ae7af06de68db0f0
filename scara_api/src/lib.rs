use serde::{Deserialize, Serialize};

pub mod commands;
pub use commands::*;

pub mod drivers;
pub use drivers::*;

pub mod errors;
pub use errors::*;

pub mod session;
pub use session::*;

/// Gripper clamp state as reported and commanded on the wire.
///
/// The controller uses the exact strings `"Hold"` and `"Release"` in both
/// the status snapshot and the `gripper` command payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gripper {
    Hold,
    Release,
}

impl Gripper {
    pub fn display_name(&self) -> &'static str {
        match self {
            Gripper::Hold => "Hold (Grip)",
            Gripper::Release => "Release",
        }
    }
}

impl std::fmt::Display for Gripper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gripper::Hold => write!(f, "Hold"),
            Gripper::Release => write!(f, "Release"),
        }
    }
}

impl Default for Gripper {
    fn default() -> Self {
        Gripper::Release
    }
}

/// Direction value for the momentary linear actuator (the vertical axis).
///
/// Serialized lowercase to match the controller: `"up"`, `"stop"`, `"down"`.
/// The actuator keeps moving until a `stop` is sent, and its state is not
/// echoed back in [`RobotStatus`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorDirection {
    Up,
    Stop,
    Down,
}

impl ActuatorDirection {
    pub fn display_name(&self) -> &'static str {
        match self {
            ActuatorDirection::Up => "Up",
            ActuatorDirection::Stop => "Stop",
            ActuatorDirection::Down => "Down",
        }
    }
}

impl std::fmt::Display for ActuatorDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The three rotary joints addressable from the panel.
///
/// Servo 2 is the linear actuator and is driven through
/// [`Command::LinearActuator`] rather than an absolute angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoId {
    Servo1,
    Servo3,
    Servo4,
}

impl ServoId {
    /// All rotary joints, in panel order.
    pub fn all() -> [ServoId; 3] {
        [ServoId::Servo1, ServoId::Servo3, ServoId::Servo4]
    }

    /// Operator-facing label used by the panel.
    pub fn display_name(&self) -> &'static str {
        match self {
            ServoId::Servo1 => "Servo 1 (Base)",
            ServoId::Servo3 => "Servo 3 (Link 3)",
            ServoId::Servo4 => "Servo 4 (Link 4)",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            ServoId::Servo1 => "Servo 1",
            ServoId::Servo3 => "Servo 3",
            ServoId::Servo4 => "Servo 4",
        }
    }

    /// Last confirmed angle for this joint in a status snapshot.
    pub fn angle_in(&self, status: &RobotStatus) -> u8 {
        match self {
            ServoId::Servo1 => status.servo1,
            ServoId::Servo3 => status.servo3,
            ServoId::Servo4 => status.servo4,
        }
    }
}

impl std::fmt::Display for ServoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

fn default_angle() -> u8 {
    90
}

fn default_control() -> String {
    "Servo 1".to_string()
}

fn default_gesture_enabled() -> bool {
    true
}

/// Full status snapshot reported by the controller.
///
/// This is the shape of `GET /status` and of every `POST /command` response.
/// Field names are the wire names. Fields missing from a response fall back
/// to the same defaults the controller boots with, and unknown fields are
/// ignored, so the panel stays compatible with older and newer controllers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RobotStatus {
    #[serde(default = "default_angle")]
    pub servo1: u8,
    #[serde(default = "default_angle")]
    pub servo3: u8,
    #[serde(default = "default_angle")]
    pub servo4: u8,
    #[serde(default)]
    pub gripper: Gripper,
    #[serde(default)]
    pub hand_detected: bool,
    /// Joint label gesture input is currently mapped to, e.g. `"Servo 1"`.
    #[serde(default = "default_control")]
    pub current_control: String,
    #[serde(default)]
    pub is_recording: bool,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default = "default_gesture_enabled")]
    pub hand_gesture_enabled: bool,
}

impl Default for RobotStatus {
    fn default() -> Self {
        RobotStatus {
            servo1: default_angle(),
            servo3: default_angle(),
            servo4: default_angle(),
            gripper: Gripper::default(),
            hand_detected: false,
            current_control: default_control(),
            is_recording: false,
            is_playing: false,
            hand_gesture_enabled: default_gesture_enabled(),
        }
    }
}
