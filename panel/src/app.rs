//! Panel state and the loop that drives it.
//!
//! One tokio task owns everything: a fixed interval performs the status poll
//! and camera probe, and key events dispatch commands inline. Polls and
//! commands are therefore strictly sequential; a slow request delays the
//! next cycle instead of overlapping it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use scara_api::{
    ActuatorDirection, Command, Gripper, PanelDriver, PanelError, PlaybackSelection, RobotStatus,
    ServoId, Session, VideoFrame, MAX_SERVO_ANGLE,
};

use crate::tui::Tui;
use crate::ui;

/// How long a notice stays on screen unless dismissed sooner.
const NOTICE_TTL: Duration = Duration::from_secs(8);
const MAX_NOTICES: usize = 5;

/// Controls the selection cursor can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Servo(ServoId),
    Loops,
    Speed,
}

impl Control {
    pub const ORDER: [Control; 5] = [
        Control::Servo(ServoId::Servo1),
        Control::Servo(ServoId::Servo3),
        Control::Servo(ServoId::Servo4),
        Control::Loops,
        Control::Speed,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn next(self) -> Control {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Control {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Transient, dismissible operator notice. Command failures surface here and
/// nowhere else; poll failures never do.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

/// Last observed state of the camera endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoHealth {
    Unknown,
    Live {
        content_type: String,
        size_bytes: usize,
    },
    Lost,
}

/// What a key press means, independent of whether it is currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextControl,
    PrevControl,
    Adjust(i32),
    CommitServo,
    RevertServo,
    Actuator(ActuatorDirection),
    SetGripper(Gripper),
    ToggleGesture,
    StartRecording,
    StopRecording,
    Play,
    StopPlayback,
    DismissNotice,
}

pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => Some(Action::NextControl),
        KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => Some(Action::PrevControl),
        KeyCode::Left => Some(Action::Adjust(-1)),
        KeyCode::Right => Some(Action::Adjust(1)),
        KeyCode::Enter => Some(Action::CommitServo),
        KeyCode::Esc => Some(Action::RevertServo),
        KeyCode::Char('u') => Some(Action::Actuator(ActuatorDirection::Up)),
        KeyCode::Char('d') => Some(Action::Actuator(ActuatorDirection::Down)),
        KeyCode::Char('x') => Some(Action::Actuator(ActuatorDirection::Stop)),
        KeyCode::Char('c') => Some(Action::SetGripper(Gripper::Hold)),
        KeyCode::Char('o') => Some(Action::SetGripper(Gripper::Release)),
        KeyCode::Char('g') => Some(Action::ToggleGesture),
        KeyCode::Char('r') => Some(Action::StartRecording),
        KeyCode::Char('s') => Some(Action::StopRecording),
        KeyCode::Char('p') => Some(Action::Play),
        KeyCode::Char('h') => Some(Action::StopPlayback),
        KeyCode::Char('m') => Some(Action::DismissNotice),
        _ => None,
    }
}

fn slot(servo: ServoId) -> usize {
    match servo {
        ServoId::Servo1 => 0,
        ServoId::Servo3 => 1,
        ServoId::Servo4 => 2,
    }
}

pub struct App {
    pub session: Session,
    pub selected: Control,
    /// Slider positions being edited, one per rotary joint, cleared once the
    /// controller confirms the same angle. Transient UI state, never
    /// authoritative.
    pub pending: [Option<u8>; 3],
    pub playback: PlaybackSelection,
    pub notices: VecDeque<Notice>,
    pub video: VideoHealth,
    /// Consecutive poll failures; the snapshot on screen is this many cycles
    /// stale.
    pub poll_failures: u32,
    pub last_command: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            selected: Control::Servo(ServoId::Servo1),
            pending: [None; 3],
            playback: PlaybackSelection::default(),
            notices: VecDeque::new(),
            video: VideoHealth::Unknown,
            poll_failures: 0,
            last_command: None,
            should_quit: false,
        }
    }

    /// Angle the gauge shows: the edit in progress, otherwise the last
    /// confirmed value.
    pub fn pending_angle(&self, servo: ServoId) -> u8 {
        self.pending[slot(servo)].unwrap_or_else(|| servo.angle_in(self.session.status()))
    }

    pub fn notice(&mut self, message: String) {
        self.notices.push_back(Notice {
            message,
            raised_at: Instant::now(),
        });
        if self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    fn expire_notices_at(&mut self, now: Instant) {
        self.notices
            .retain(|n| now.duration_since(n.raised_at) < NOTICE_TTL);
    }

    fn adjust_selected(&mut self, delta: i32) {
        match self.selected {
            Control::Servo(servo) => {
                let current = i32::from(self.pending_angle(servo));
                let next = (current + delta).clamp(0, i32::from(MAX_SERVO_ANGLE)) as u8;
                self.pending[slot(servo)] = Some(next);
            }
            Control::Loops => self.playback.step_loops(delta),
            Control::Speed => self.playback.step_speed(delta),
        }
    }

    /// Decide what, if anything, an action sends to the controller.
    ///
    /// Applies the local guards and the redundant-send suppression before a
    /// command is built, so everything that leaves this function is worth
    /// putting on the wire. Local-only actions mutate the UI state and
    /// return `None`.
    pub fn command_for_action(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::NextControl => {
                self.selected = self.selected.next();
                None
            }
            Action::PrevControl => {
                self.selected = self.selected.prev();
                None
            }
            Action::Adjust(delta) => {
                self.adjust_selected(delta);
                None
            }
            Action::RevertServo => {
                if let Control::Servo(servo) = self.selected {
                    self.pending[slot(servo)] = None;
                }
                None
            }
            Action::DismissNotice => {
                self.notices.pop_front();
                None
            }
            Action::CommitServo => {
                let Control::Servo(servo) = self.selected else {
                    return None;
                };
                let value = self.pending_angle(servo);
                if !self.session.servo_differs(servo, value) {
                    debug!(servo = servo.short_name(), value, "already at angle, not sent");
                    return None;
                }
                match Command::set_servo(servo, value) {
                    Ok(command) => Some(command),
                    Err(err) => {
                        self.notice(err.to_string());
                        None
                    }
                }
            }
            Action::Actuator(direction) => {
                // Momentary control, nothing confirmed to diff against.
                Some(Command::LinearActuator { value: direction })
            }
            Action::SetGripper(value) => {
                if !self.session.gripper_differs(value) {
                    debug!(%value, "gripper already in state, not sent");
                    return None;
                }
                Some(Command::Gripper { value })
            }
            Action::ToggleGesture => Some(Command::ToggleGesture),
            Action::StartRecording => self
                .session
                .can_start_recording()
                .then_some(Command::StartRecording),
            Action::StopRecording => self
                .session
                .can_stop_recording()
                .then_some(Command::StopRecording),
            Action::Play => {
                if !self.session.can_play() {
                    return None;
                }
                match self.playback.command() {
                    Ok(command) => Some(command),
                    Err(err) => {
                        self.notice(err.to_string());
                        None
                    }
                }
            }
            Action::StopPlayback => self
                .session
                .can_stop_playback()
                .then_some(Command::StopPlayback),
        }
    }

    /// Fold a poll result into the session. Failures stay silent: the stale
    /// snapshot keeps rendering and only the link indicator changes.
    pub fn apply_poll(&mut self, result: Result<RobotStatus, PanelError>) {
        match result {
            Ok(status) => {
                self.session.apply_snapshot(status);
                self.poll_failures = 0;
                self.reconcile_pending();
            }
            Err(err) => {
                self.poll_failures = self.poll_failures.saturating_add(1);
                debug!(error = %err, failures = self.poll_failures, "status poll failed");
            }
        }
    }

    /// Drop pending edits the controller has confirmed.
    fn reconcile_pending(&mut self) {
        for servo in ServoId::all() {
            if self.pending[slot(servo)] == Some(servo.angle_in(self.session.status())) {
                self.pending[slot(servo)] = None;
            }
        }
    }

    pub fn apply_frame(&mut self, result: Result<VideoFrame, PanelError>) {
        match result {
            Ok(frame) => {
                self.video = VideoHealth::Live {
                    size_bytes: frame.size_bytes(),
                    content_type: frame.content_type,
                };
            }
            Err(err) => {
                debug!(error = %err, "camera frame fetch failed");
                self.video = VideoHealth::Lost;
            }
        }
    }

    pub async fn on_tick(&mut self, driver: &PanelDriver) {
        self.apply_poll(driver.poll_status().await);
        self.apply_frame(driver.fetch_frame().await);
        self.expire_notices_at(Instant::now());
    }

    pub async fn on_key(&mut self, key: KeyEvent, driver: &PanelDriver) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        if let Some(command) = self.command_for_action(action) {
            self.dispatch(driver, command).await;
        }
    }

    async fn dispatch(&mut self, driver: &PanelDriver, command: Command) {
        let name = command.name();
        match driver.send_command(&command).await {
            Ok(status) => {
                // The echoed status is logged but not cached; the next poll
                // is the authority.
                debug!(command = name, ?status, "controller acknowledged");
                self.last_command = Some(name.to_string());
            }
            Err(err) => {
                warn!(command = name, error = %err, "command failed");
                self.notice(err.to_string());
            }
        }
    }

    pub async fn run(
        mut self,
        terminal: &mut Tui,
        driver: &PanelDriver,
        poll_period: Duration,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut ticks = tokio::time::interval(poll_period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut events = EventStream::new();

        info!(backend = %driver.config().base_url, "panel loop started");
        loop {
            terminal.draw(|f| ui::draw(f, &self))?;
            if self.should_quit {
                break;
            }
            tokio::select! {
                _ = ticks.tick() => {
                    self.on_tick(driver).await;
                }
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.on_key(key, driver).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
            }
        }
        Ok(())
    }
}
