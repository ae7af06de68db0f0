//! Rendering. Pure view of [`App`]; no state changes happen here.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use scara_api::{Gripper, ServoId, MAX_SERVO_ANGLE};

use crate::app::{App, Control, VideoHealth};

pub fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Connection header
            Constraint::Min(16),    // Control and status panels
            Constraint::Length(5),  // Notices
            Constraint::Length(8),  // Help panel
        ])
        .split(f.area());

    render_header(f, main_chunks[0], app);

    let data_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55), // Joints and motion controls
            Constraint::Percentage(45), // Modes and camera
        ])
        .split(main_chunks[1]);

    let control_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // One gauge per rotary joint
            Constraint::Length(4), // Actuator and gripper
            Constraint::Min(6),    // Recording and playback
        ])
        .split(data_chunks[0]);

    render_joints(f, control_chunks[0], app);
    render_actuator_gripper(f, control_chunks[1], app);
    render_recording(f, control_chunks[2], app);

    let status_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Controller modes
            Constraint::Length(5), // Camera
        ])
        .split(data_chunks[1]);

    render_modes(f, status_chunks[0], app);
    render_camera(f, status_chunks[1], app);

    render_notices(f, main_chunks[2], app);
    render_help_panel(f, main_chunks[3]);
}

fn render_header(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let link = if !app.session.is_synced() {
        Span::styled("WAITING FOR FIRST POLL", Style::default().fg(Color::DarkGray))
    } else if app.poll_failures == 0 {
        Span::styled("LIVE", Style::default().fg(Color::Green))
    } else {
        Span::styled(
            format!("STALE ({} missed polls)", app.poll_failures),
            Style::default().fg(Color::Yellow),
        )
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Link: ", Style::default().fg(Color::Cyan)),
        link,
        Span::raw("    "),
        Span::styled("Last command: ", Style::default().fg(Color::Cyan)),
        Span::raw(app.last_command.as_deref().unwrap_or("none")),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Robot Arm Panel"));
    f.render_widget(header, area);
}

fn render_joints(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    for (row, servo) in ServoId::all().into_iter().enumerate() {
        let selected = app.selected == Control::Servo(servo);
        let shown = app.pending_angle(servo);
        let live = servo.angle_in(app.session.status());

        let title = if selected {
            format!("▸ {}", servo.display_name())
        } else {
            format!("  {}", servo.display_name())
        };
        let border = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        // A yellow bar flags an uncommitted edit.
        let bar = if shown != live {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(border),
            )
            .gauge_style(bar)
            .ratio(f64::from(shown) / f64::from(MAX_SERVO_ANGLE))
            .label(format!("{}°  (live {}°)", shown, live));
        f.render_widget(gauge, rows[row]);
    }
}

fn render_actuator_gripper(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let gripper = app.session.status().gripper;
    let lines = vec![
        Line::from(vec![
            Span::styled("Actuator: ", Style::default().fg(Color::Cyan)),
            Span::raw("u=Up  x=Stop  d=Down  (momentary)"),
        ]),
        Line::from(vec![
            Span::styled("Gripper:  ", Style::default().fg(Color::Cyan)),
            Span::styled(
                gripper.display_name(),
                Style::default().fg(if gripper == Gripper::Hold {
                    Color::Green
                } else {
                    Color::Magenta
                }),
            ),
            Span::raw("   c=Hold  o=Release"),
        ]),
    ];
    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Axis 2 & Gripper"));
    f.render_widget(block, area);
}

fn render_recording(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let enabled = Style::default();
    let disabled = Style::default().fg(Color::DarkGray);
    let selected = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "r=Start Recording",
                if app.session.can_start_recording() { enabled } else { disabled },
            ),
            Span::raw("   "),
            Span::styled(
                "s=Stop Recording",
                if app.session.can_stop_recording() { enabled } else { disabled },
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "p=Play",
                if app.session.can_play() { enabled } else { disabled },
            ),
            Span::raw("   "),
            Span::styled(
                "h=Stop Playback",
                if app.session.can_stop_playback() { enabled } else { disabled },
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{} Loops: {}", marker(app.selected == Control::Loops), app.playback.loops),
                if app.selected == Control::Loops { selected } else { enabled },
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{} Speed: {:.1}", marker(app.selected == Control::Speed), app.playback.speed),
                if app.selected == Control::Speed { selected } else { enabled },
            ),
        ]),
    ];
    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Recording & Playback"));
    f.render_widget(block, area);
}

fn marker(selected: bool) -> &'static str {
    if selected {
        "▸"
    } else {
        " "
    }
}

fn render_modes(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let status = app.session.status();
    let lines = vec![
        Line::from(vec![
            Span::styled("Hand Detected: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                yes_no(status.hand_detected),
                Style::default().fg(if status.hand_detected {
                    Color::Green
                } else {
                    Color::DarkGray
                }),
            ),
        ]),
        Line::from(vec![
            Span::styled("Recording: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                on_off(status.is_recording),
                Style::default().fg(if status.is_recording {
                    Color::Red
                } else {
                    Color::DarkGray
                }),
            ),
        ]),
        Line::from(vec![
            Span::styled("Playing: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                on_off(status.is_playing),
                Style::default().fg(if status.is_playing {
                    Color::Green
                } else {
                    Color::DarkGray
                }),
            ),
        ]),
        Line::from(vec![
            Span::styled("Gestures: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                on_off(status.hand_gesture_enabled),
                Style::default().fg(if status.hand_gesture_enabled {
                    Color::Green
                } else {
                    Color::DarkGray
                }),
            ),
        ]),
        Line::from(vec![
            Span::styled("Gesture Target: ", Style::default().fg(Color::Cyan)),
            Span::raw(&status.current_control),
        ]),
    ];
    let block = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Controller Modes")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(block, area);
}

fn render_camera(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let lines = match &app.video {
        VideoHealth::Unknown => vec![Line::from(Span::styled(
            "connecting...",
            Style::default().fg(Color::DarkGray),
        ))],
        VideoHealth::Live {
            content_type,
            size_bytes,
        } => vec![Line::from(vec![
            Span::styled("LIVE ", Style::default().fg(Color::Green)),
            Span::raw(format!("{} ({} bytes)", content_type, size_bytes)),
        ])],
        VideoHealth::Lost => vec![
            Line::from(Span::styled("NO SIGNAL", Style::default().fg(Color::Red))),
            Line::from(Span::styled(
                "showing placeholder",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };
    let block = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Camera"));
    f.render_widget(block, area);
}

fn render_notices(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let items: Vec<ListItem> = if app.notices.is_empty() {
        vec![ListItem::new(Line::from(vec![Span::styled(
            "No notices",
            Style::default().fg(Color::Green),
        )]))]
    } else {
        app.notices
            .iter()
            .rev() // Show newest first
            .map(|notice| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("[{}s] ", notice.raised_at.elapsed().as_secs()),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled("⚠ ", Style::default().fg(Color::Red)),
                    Span::raw(notice.message.clone()),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Notices (m=dismiss)")
            .border_style(Style::default().fg(if app.notices.is_empty() {
                Color::Green
            } else {
                Color::Red
            })),
    );
    f.render_widget(list, area);
}

fn render_help_panel(f: &mut Frame, area: ratatui::layout::Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "Joints:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Tab/j=Next  Shift-Tab/k=Prev  Left/Right=Adjust  Enter=Send  Esc=Revert"),
        Line::from(Span::styled(
            "Motion:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  u=Actuator Up  d=Actuator Down  x=Actuator Stop  c=Grip  o=Release"),
        Line::from(Span::styled(
            "Other:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  g=Toggle Gestures  r/s=Record  p/h=Playback  m=Dismiss Notice  q=Quit"),
    ];
    let help_block = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help_block, area);
}
