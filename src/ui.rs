use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::format::{format_date, format_time, format_time_with_hours};
use crate::session::SessionState;
use crate::timer::PracticeTimer;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Pads a label with spaces so record rows line up despite mixed-width
/// Korean text.
fn pad_label(label: &str, width: usize) -> String {
    let current = label.width();
    format!("{}{}", label, " ".repeat(width.saturating_sub(current)))
}

fn record_lines(session: &SessionState, current: Option<usize>, goals_min: Option<&[i64]>) -> Vec<Line<'static>> {
    let labels: Vec<String> = session
        .step_records
        .iter()
        .enumerate()
        .map(|(idx, r)| match goals_min.and_then(|g| g.get(idx)) {
            Some(goal) => format!("{} ({}분 목표)", r.name, goal),
            None => r.name.clone(),
        })
        .collect();
    let label_width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    session
        .step_records
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(idx, (record, label))| {
            let label = pad_label(&label, label_width);
            if let (Some(end), Some(duration)) = (record.end_time, record.duration) {
                Line::from(vec![
                    Span::styled(format!("  ✔ {label}  "), Style::default().fg(Color::Green)),
                    Span::styled(
                        format!("{} 완료 · {} 소요", format_time(end), format_time(duration)),
                        Style::default().fg(Color::Green),
                    ),
                ])
            } else if current == Some(idx) {
                Line::from(vec![
                    Span::styled(
                        format!("  ▶ {label}  "),
                        Style::default().fg(Color::Blue).patch(bold()),
                    ),
                    Span::styled("진행 중", Style::default().fg(Color::Blue)),
                ])
            } else {
                Line::from(Span::styled(format!("  · {label}  대기 중"), dim()))
            }
        })
        .collect()
}

/// The running countdown screen.
pub struct TimerScreen<'a> {
    pub timer: &'a PracticeTimer,
    pub tip: &'static str,
}

impl Widget for TimerScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let timer = self.timer;
        let session = &timer.session;
        let overtime = timer.is_overtime();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // kind / subject / resumed badge
                Constraint::Length(2), // tip
                Constraint::Length(2), // countdown + overtime marker
                Constraint::Length(2), // progress gauge + label
                Constraint::Length(3), // current step + elapsed
                Constraint::Length(5), // step records
                Constraint::Min(0),
                Constraint::Length(1), // key help
            ])
            .split(area);

        let mut header = vec![
            Line::from(Span::styled(session.kind.clone(), bold())),
            Line::from(Span::raw(session.subject.clone())),
        ];
        if timer.is_resumed() {
            header.push(Line::from(Span::styled(
                "이어서 그리기",
                Style::default().fg(Color::Blue),
            )));
        }
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(vec![
            Line::from(Span::styled("단계별 팁", bold())),
            Line::from(Span::styled(
                self.tip,
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

        // Past zero the countdown shows how far over, in red.
        let shown = if overtime {
            timer.overtime_seconds()
        } else {
            timer.remaining_time()
        };
        let countdown_style = if overtime {
            Style::default().fg(Color::Red).patch(bold())
        } else {
            bold()
        };
        let mut countdown = vec![Line::from(Span::styled(format_time(shown), countdown_style))];
        if overtime {
            countdown.push(Line::from(Span::styled(
                "초과 시간",
                Style::default().fg(Color::Red),
            )));
        }
        Paragraph::new(countdown)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let progress = timer.progress();
        let gauge_color = if overtime { Color::Red } else { Color::Blue };
        let label = if overtime {
            "시간 초과".to_string()
        } else {
            format!("{}% 완료", (progress * 100.0).round())
        };
        Gauge::default()
            .ratio(progress)
            .gauge_style(Style::default().fg(gauge_color))
            .label(label)
            .render(chunks[3], buf);

        Paragraph::new(vec![
            Line::from(Span::raw("현재 단계")),
            Line::from(Span::styled(
                timer.current_step().name(),
                Style::default().fg(Color::Blue).patch(bold()),
            )),
            Line::from(Span::styled(
                format!("경과 시간: {}", format_time_with_hours(timer.elapsed())),
                dim(),
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        let goals_min: Vec<i64> = (0..session.step_records.len())
            .map(|i| (timer.goal_seconds(i) / 60.0).round() as i64)
            .collect();
        let mut records = vec![Line::from(Span::styled("단계별 진행 상황", bold()))];
        records.extend(record_lines(
            session,
            Some(timer.current_step_index()),
            Some(&goals_min),
        ));
        Paragraph::new(records).render(chunks[5], buf);

        Paragraph::new(Span::styled(
            "[enter] 현재 단계 완료   [p] 일시정지   [esc] 종료",
            dim(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
    }
}

/// The paused/finished detail screen.
pub struct DetailScreen<'a> {
    pub session: &'a SessionState,
    /// Exact remaining seconds carried over from the timer, when paused.
    pub remaining: Option<i64>,
    /// Query string a paused session can be resumed from.
    pub resume_query: Option<&'a str>,
}

impl DetailScreen<'_> {
    fn elapsed(&self) -> i64 {
        if self.session.is_finished {
            self.session.completed_duration()
        } else {
            match self.remaining {
                Some(remaining) => self.session.total_time - remaining,
                None => self.session.completed_duration(),
            }
        }
    }
}

impl Widget for DetailScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session;
        let elapsed = self.elapsed();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),  // title
                Constraint::Length(7),  // session info card
                Constraint::Length(5),  // step records
                Constraint::Length(4),  // resume hint
                Constraint::Min(0),
                Constraint::Length(1), // key help
            ])
            .split(area);

        let title = if session.is_finished {
            "세션 완료"
        } else {
            "세션 일시정지"
        };
        Paragraph::new(Span::styled(title, bold()))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let mut info = vec![
            Line::from(vec![
                Span::styled("유형  ", dim()),
                Span::styled(session.kind.clone(), bold()),
            ]),
            Line::from(vec![
                Span::styled("주제  ", dim()),
                Span::styled(session.subject.clone(), bold()),
            ]),
            Line::from(vec![
                Span::styled("총 시험 시간  ", dim()),
                Span::raw(format_time_with_hours(session.total_time)),
            ]),
        ];
        if session.is_finished {
            let over = elapsed - session.total_time;
            let mut spans = vec![
                Span::styled("실제 소요 시간  ", dim()),
                Span::styled(
                    format_time_with_hours(elapsed),
                    if over > 0 {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default().fg(Color::Green)
                    },
                ),
            ];
            if over > 0 {
                spans.push(Span::styled(
                    format!(" (+{})", format_time_with_hours(over)),
                    Style::default().fg(Color::Red),
                ));
            }
            info.push(Line::from(spans));
        } else {
            info.push(Line::from(vec![
                Span::styled("남은 시간  ", dim()),
                Span::styled(
                    format_time_with_hours(session.total_time - elapsed),
                    Style::default().fg(Color::Yellow),
                ),
            ]));
        }
        info.push(Line::from(vec![
            Span::styled("시작 날짜  ", dim()),
            Span::raw(format_date(session.started_at)),
        ]));
        Paragraph::new(info).render(chunks[1], buf);

        let current = if session.is_finished {
            None
        } else {
            Some(session.current_step_index())
        };
        let mut records = vec![Line::from(Span::styled("단계별 진행 기록", bold()))];
        records.extend(record_lines(session, current, None));
        Paragraph::new(records).render(chunks[2], buf);

        if let Some(query) = self.resume_query {
            Paragraph::new(vec![
                Line::from(Span::styled("다음에 이어서 그리려면:", dim())),
                Line::from(Span::raw(format!("easel --resume '{query}'"))),
            ])
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
        }

        let help = if session.is_finished {
            "[n] 새 세션   [esc] 종료"
        } else {
            "[c] 이어서 그리기   [n] 새 세션   [esc] 종료"
        };
        Paragraph::new(Span::styled(help, dim()))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DEFAULT_KIND, DEFAULT_SUBJECT};

    fn render_to_text<W: Widget>(widget: W, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let mut out = String::new();
        for y in 0..height {
            let mut x = 0;
            while x < width {
                let symbol = buf[(x, y)].symbol();
                out.push_str(symbol);
                // Wide graphemes occupy extra cells that the buffer leaves
                // blank; skip them so the text matches what is displayed.
                x += symbol.width().max(1) as u16;
            }
            out.push('\n');
        }
        out
    }

    fn session_with_first_done() -> SessionState {
        let mut s = SessionState::fresh(
            DEFAULT_SUBJECT.into(),
            DEFAULT_KIND.into(),
            3600,
            1_700_000_000_000,
        );
        s.step_records[0].end_time = Some(600);
        s.step_records[0].duration = Some(600);
        s
    }

    #[test]
    fn detail_screen_paused_shows_remaining_and_resume_hint() {
        let session = session_with_first_done();
        let text = render_to_text(
            DetailScreen {
                session: &session,
                remaining: Some(3000),
                resume_query: Some("subject=x"),
            },
            100,
            30,
        );
        assert!(text.contains("세션 일시정지"));
        // 3600 - 3000 remaining = 600 elapsed, so 50분 remain.
        assert!(text.contains("남은 시간"));
        assert!(text.contains("50분"));
        assert!(text.contains("--resume"));
        assert!(text.contains("진행 중"));
    }

    #[test]
    fn detail_screen_finished_shows_overtime_marker() {
        let mut session = session_with_first_done();
        session.is_finished = true;
        for r in session.step_records.iter_mut().skip(1) {
            r.end_time = Some(1);
            r.duration = Some(1200);
        }
        let text = render_to_text(
            DetailScreen {
                session: &session,
                remaining: None,
                resume_query: None,
            },
            100,
            30,
        );
        // 600 + 3*1200 = 4200s elapsed vs 3600 total.
        assert!(text.contains("세션 완료"));
        assert!(text.contains("1시간 10분"));
        assert!(text.contains("(+10분)"));
        assert!(!text.contains("--resume"));
    }

    #[test]
    fn timer_screen_renders_goal_and_tip() {
        let mut timer = PracticeTimer::new(
            DEFAULT_SUBJECT.into(),
            DEFAULT_KIND.into(),
            3600,
            vec![None; 4],
            Box::new(crate::events::NullSink),
        );
        let tip = timer.current_tip();
        let text = render_to_text(TimerScreen { timer: &timer, tip }, 110, 30);
        assert!(text.contains("단계별 팁"));
        assert!(text.contains("(15분 목표)"));
        assert!(text.contains("현재 단계"));
        assert!(text.contains("1:00:00"));
    }

    #[test]
    fn timer_screen_overtime_display() {
        let mut timer = PracticeTimer::new(
            DEFAULT_SUBJECT.into(),
            DEFAULT_KIND.into(),
            60,
            vec![None; 4],
            Box::new(crate::events::NullSink),
        );
        timer.session.started_at = crate::util::now_ms() - 70_000;
        timer.on_tick();
        let tip = timer.current_tip();
        let text = render_to_text(TimerScreen { timer: &timer, tip }, 110, 30);
        assert!(text.contains("0:10"));
        assert!(text.contains("초과 시간"));
        assert!(text.contains("시간 초과"));
    }
}
