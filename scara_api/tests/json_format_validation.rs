/// Test to validate JSON serialization matches the controller's HTTP contract:
/// `POST /command` bodies are `{"command": <name>, ...params}` and
/// `GET /status` responses use the exact snake_case RobotStatus field names.
use scara_api::{ActuatorDirection, Command, Gripper, RobotStatus, ServoId};
use serde_json::json;

#[test]
fn test_set_servo_command_json_format() {
    let command = Command::set_servo(ServoId::Servo1, 45).unwrap();
    let json = serde_json::to_string(&command).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["command"], "set_servo_1");
    assert_eq!(value["value"], 45);
    // Exactly two keys: the tag and the angle.
    assert_eq!(value.as_object().unwrap().len(), 2);

    let command = Command::set_servo(ServoId::Servo3, 0).unwrap();
    let value = serde_json::to_value(&command).unwrap();
    assert_eq!(value["command"], "set_servo_3");
    assert_eq!(value["value"], 0);

    let command = Command::set_servo(ServoId::Servo4, 180).unwrap();
    let value = serde_json::to_value(&command).unwrap();
    assert_eq!(value["command"], "set_servo_4");
    assert_eq!(value["value"], 180);
}

#[test]
fn test_servo_value_passes_through_exactly() {
    // Every legal angle must serialize as-is, no clamping or rounding.
    for angle in 0..=180u8 {
        let command = Command::set_servo(ServoId::Servo1, angle).unwrap();
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(
            value["value"],
            json!(angle),
            "angle {} was not passed through unchanged",
            angle
        );
    }
}

#[test]
fn test_linear_actuator_command_json_format() {
    let command = Command::LinearActuator {
        value: ActuatorDirection::Up,
    };
    let value = serde_json::to_value(&command).unwrap();
    assert_eq!(value["command"], "linear_actuator");
    assert_eq!(value["value"], "up");

    let command = Command::LinearActuator {
        value: ActuatorDirection::Stop,
    };
    assert_eq!(serde_json::to_value(&command).unwrap()["value"], "stop");

    let command = Command::LinearActuator {
        value: ActuatorDirection::Down,
    };
    assert_eq!(serde_json::to_value(&command).unwrap()["value"], "down");
}

#[test]
fn test_gripper_command_json_format() {
    let command = Command::Gripper {
        value: Gripper::Hold,
    };
    let value = serde_json::to_value(&command).unwrap();
    assert_eq!(value["command"], "gripper");
    assert_eq!(value["value"], "Hold");

    let command = Command::Gripper {
        value: Gripper::Release,
    };
    assert_eq!(serde_json::to_value(&command).unwrap()["value"], "Release");
}

#[test]
fn test_bare_commands_json_format() {
    // Commands without parameters are a single-key object.
    let cases = [
        (Command::ToggleGesture, "toggle_gesture"),
        (Command::StartRecording, "start_recording"),
        (Command::StopRecording, "stop_recording"),
        (Command::StopPlayback, "stop_playback"),
    ];
    for (command, name) in cases {
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["command"], name);
        assert_eq!(
            value.as_object().unwrap().len(),
            1,
            "{} must carry no parameters",
            name
        );
    }
}

#[test]
fn test_play_recording_command_json_format() {
    let command = Command::play_recording(3, 7.5).unwrap();
    let value = serde_json::to_value(&command).unwrap();
    assert_eq!(
        value,
        json!({"command": "play_recording", "loops": 3, "speed": 7.5})
    );
}

#[test]
fn test_status_deserialization_from_controller_json() {
    let controller_json = r#"{
        "servo1": 45,
        "servo3": 90,
        "servo4": 90,
        "gripper": "Release",
        "hand_detected": false,
        "current_control": "Servo 1",
        "is_recording": false,
        "is_playing": false,
        "hand_gesture_enabled": true
    }"#;

    let status: RobotStatus = serde_json::from_str(controller_json).unwrap();

    assert_eq!(status.servo1, 45);
    assert_eq!(status.servo3, 90);
    assert_eq!(status.servo4, 90);
    assert_eq!(status.gripper, Gripper::Release);
    assert!(!status.hand_detected);
    assert_eq!(status.current_control, "Servo 1");
    assert!(!status.is_recording);
    assert!(!status.is_playing);
    assert!(status.hand_gesture_enabled);
}

#[test]
fn test_status_serialization_field_names() {
    let json = serde_json::to_string(&RobotStatus::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value.get("servo1").is_some(), "Missing servo1 field");
    assert!(value.get("servo3").is_some(), "Missing servo3 field");
    assert!(value.get("servo4").is_some(), "Missing servo4 field");
    assert!(value.get("gripper").is_some(), "Missing gripper field");
    assert!(
        value.get("hand_detected").is_some(),
        "Missing hand_detected field"
    );
    assert!(
        value.get("current_control").is_some(),
        "Missing current_control field"
    );
    assert!(
        value.get("is_recording").is_some(),
        "Missing is_recording field"
    );
    assert!(
        value.get("is_playing").is_some(),
        "Missing is_playing field"
    );
    assert!(
        value.get("hand_gesture_enabled").is_some(),
        "Missing hand_gesture_enabled field"
    );
}

#[test]
fn test_status_defaults_for_missing_fields() {
    // Controllers may omit fields; each falls back to its boot default.
    let status: RobotStatus = serde_json::from_str("{}").unwrap();
    assert_eq!(status, RobotStatus::default());
    assert_eq!(status.servo1, 90);
    assert_eq!(status.gripper, Gripper::Release);
    assert_eq!(status.current_control, "Servo 1");
    assert!(status.hand_gesture_enabled);

    let status: RobotStatus = serde_json::from_str(r#"{"servo1": 10}"#).unwrap();
    assert_eq!(status.servo1, 10);
    assert_eq!(status.servo3, 90);
}

#[test]
fn test_status_ignores_unknown_fields() {
    let status: RobotStatus =
        serde_json::from_str(r#"{"servo1": 12, "firmware": "2.4.1"}"#).unwrap();
    assert_eq!(status.servo1, 12);
}

#[test]
fn test_status_roundtrip_json() {
    // Serialization and deserialization are symmetric.
    let original = RobotStatus {
        servo1: 10,
        servo3: 170,
        servo4: 45,
        gripper: Gripper::Hold,
        hand_detected: true,
        current_control: "Servo 3".to_string(),
        is_recording: true,
        is_playing: false,
        hand_gesture_enabled: false,
    };

    let json = serde_json::to_string(&original).unwrap();
    let deserialized: RobotStatus = serde_json::from_str(&json).unwrap();

    assert_eq!(original, deserialized);
}

#[test]
fn test_command_deserialization_from_panel_json() {
    // The controller parses the same shapes the panel emits.
    let command: Command =
        serde_json::from_str(r#"{"command": "set_servo_1", "value": 45}"#).unwrap();
    assert_eq!(command, Command::SetServo1 { value: 45 });

    let command: Command = serde_json::from_str(r#"{"command": "start_recording"}"#).unwrap();
    assert_eq!(command, Command::StartRecording);

    let command: Command =
        serde_json::from_str(r#"{"command": "play_recording", "loops": 3, "speed": 7.5}"#)
            .unwrap();
    assert_eq!(
        command,
        Command::PlayRecording {
            loops: 3,
            speed: 7.5
        }
    );

    let command: Command =
        serde_json::from_str(r#"{"command": "linear_actuator", "value": "down"}"#).unwrap();
    assert_eq!(
        command,
        Command::LinearActuator {
            value: ActuatorDirection::Down
        }
    );
}
