use chrono::Local;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::app::{App, Controls, Screen};
use crate::config_form::{ConfigForm, FIELD_LABELS};
use crate::pomodoro::{Phase, RunState, SessionSnapshot, format_time};

pub fn draw(app: &App, frame: &mut Frame) {
    frame.render_widget(app, frame.area());
}

pub fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Work => Color::Red,
        Phase::ShortBreak => Color::Green,
        Phase::LongBreak => Color::Blue,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot();
        render_timer(&snapshot, self.controls(), area, buf);

        if let Some(banner) = self.banner {
            render_banner(banner, phase_color(snapshot.phase), area, buf);
        }
        if let Screen::Config(form) = &self.screen {
            render_config(form, area, buf);
        }
    }
}

fn render_timer(snapshot: &SessionSnapshot, controls: Controls, area: Rect, buf: &mut Buffer) {
    let color = phase_color(snapshot.phase);
    let block = Block::default()
        .title(" Pomodoro Timer ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(2),
        ])
        .split(inner);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    Paragraph::new(Span::styled(
        format!("{} {}", snapshot.phase.emoji(), snapshot.phase.as_str()),
        bold.fg(color),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(format_time(snapshot.remaining), bold))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Line::from(status_spans(snapshot)))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!(
            "short breaks {}/{}",
            snapshot.break_count, snapshot.config.short_breaks_before_long
        ),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Line::from(help_spans(snapshot, controls)))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

fn status_spans(snapshot: &SessionSnapshot) -> Vec<Span<'static>> {
    match snapshot.state {
        RunState::Running => {
            let left = chrono::Duration::from_std(snapshot.remaining)
                .unwrap_or_else(|_| chrono::Duration::zero());
            let ends = Local::now() + left;
            vec![
                Span::styled("running", Style::default().fg(Color::Green)),
                Span::raw(format!(" · ends at {}", ends.format("%H:%M"))),
            ]
        }
        RunState::Suspended => vec![Span::styled(
            "suspended",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )],
        RunState::Idle => vec![Span::styled(
            "idle",
            Style::default().add_modifier(Modifier::DIM),
        )],
    }
}

fn help_spans(snapshot: &SessionSnapshot, controls: Controls) -> Vec<Span<'static>> {
    let key = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
        };
        Span::styled(label, style)
    };
    vec![
        key("(w)ork", controls.start),
        Span::raw("  "),
        key("(b)reak", controls.start),
        Span::raw("  "),
        if snapshot.is_suspended() {
            key("(s) resume", controls.suspend)
        } else {
            key("(s)uspend", controls.suspend)
        },
        Span::raw("  "),
        key("(c)onfig", true),
        Span::raw("  "),
        key("(q)uit", true),
    ]
}

fn render_banner(message: &str, color: Color, area: Rect, buf: &mut Buffer) {
    let popup = centered(area, message.len() as u16 + 6, 3);
    Clear.render(popup, buf);
    Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .render(popup, buf);
}

fn render_config(form: &ConfigForm, area: Rect, buf: &mut Buffer) {
    let popup = centered(area, 50, FIELD_LABELS.len() as u16 + 6);
    Clear.render(popup, buf);

    let mut lines: Vec<Line> = FIELD_LABELS
        .iter()
        .zip(form.fields.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let focused = i == form.focused;
            let value_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!("{label:<26}")),
                Span::styled(
                    if focused {
                        format!("{value}_")
                    } else {
                        value.clone()
                    },
                    value_style,
                ),
            ])
        })
        .collect();

    lines.push(Line::raw(""));
    match &form.error {
        Some(error) => lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red))),
        None => lines.push(Line::styled(
            "enter save · esc cancel · tab next field",
            Style::default().add_modifier(Modifier::DIM),
        )),
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Configuration ")
                .borders(Borders::ALL),
        )
        .render(popup, buf);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
