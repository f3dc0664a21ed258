use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use easel::events::{MemorySink, SessionEvent};
use easel::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use easel::session::Step;
use easel::timer::{PracticeTimer, TimerStatus};

// Headless integration using the internal runtime + timer without a TTY.
// Drives a complete four-step session via Runner/TestEventSource.
#[test]
fn headless_full_session_completes() {
    let sink = Arc::new(MemorySink::new());
    let mut timer = PracticeTimer::new(
        "풍경 그리기".to_string(),
        "사고의 전환".to_string(),
        3600,
        vec![None; 4],
        Box::new(sink.clone()),
    );
    timer.notify_start(&[None; 4]);

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    // One "complete step" keypress per phase.
    for _ in 0..4 {
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )))
        .unwrap();
    }

    for _ in 0..100u32 {
        match runner.step() {
            AppEvent::Tick => timer.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.code == KeyCode::Enter {
                    timer.complete_current_step();
                    if !timer.is_running() {
                        break;
                    }
                }
            }
        }
    }

    assert_eq!(timer.status(), TimerStatus::Finished);
    assert!(timer.session.is_finished);
    assert!(timer.session.step_records.iter().all(|r| r.is_complete()));

    // start, three step completions, then the session completion.
    let events = sink.events();
    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], SessionEvent::SessionStart { .. }));
    assert!(matches!(events[1], SessionEvent::StepComplete { .. }));
    assert!(matches!(
        events.last(),
        Some(SessionEvent::SessionComplete { .. })
    ));
}

#[test]
fn headless_ticks_drive_the_countdown() {
    let mut timer = PracticeTimer::resume(
        {
            let mut s = easel::session::SessionState::fresh(
                "정물".to_string(),
                "사고의 전환".to_string(),
                600,
                easel::util::now_ms(),
            );
            s.step_records[0].end_time = Some(60);
            s.step_records[0].duration = Some(60);
            s
        },
        vec![None; 4],
        Box::new(easel::events::NullSink),
    );
    assert_eq!(timer.current_step(), Step::Color);
    assert_eq!(timer.remaining_time(), 540);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

    for _ in 0..10u32 {
        if let AppEvent::Tick = runner.step() {
            timer.on_tick();
        }
    }

    // A continued session counts down one second per tick, regardless of
    // how fast the ticks actually arrived.
    assert_eq!(timer.remaining_time(), 530);
    assert_eq!(timer.elapsed(), 70);
}
