//! Per-step coaching tips, shown above the countdown.
//!
//! Each step has a default list and an overtime list. A tip is drawn once
//! on entering a step (or on first crossing into overtime within it) and
//! held until the next such transition, so redraws never re-roll.

use rand::seq::SliceRandom;

use crate::session::Step;

const SKETCH_DEFAULT: &[&str] = &[
    "주제를 잘 표현할 수 있는 아이디어인지 판단해!",
    "주제부가 가장 눈에 띄어야 해. 전체 비율은 바닥에 놓고 멀리서 한 번 봐봐.",
    "주제부는 디테일하게, 배경은 채색하면서 잡아도 돼.",
];
const SKETCH_OVERTIME: &[&str] =
    &["스케치 오래했어. 채색 시간을 아껴야 하니까, 디테일은 다음 단계에서 마무리해!"];

const COLOR_DEFAULT: &[&str] = &[
    "주제부는 맑고 쨍하게! 가장 눈에 들어와야 해.",
    "방금 만든 물감 색으로 바를 수 있는 곳들부터 빠르게 채워!",
    "덩어리감(양감)부터 잡아줘. 초벌은 빠르게, 정확하게!",
    "가장 밝은 화이트 영역은 남겨두고 칠해도 좋아.",
];
const COLOR_OVERTIME: &[&str] = &["시간 부족해! 디테일보단 덩어리 먼저. 묘사에서 정리하면 돼."];

const DETAIL_DEFAULT: &[&str] = &[
    "묘사는 주제부가 가장 디테일해야 해!",
    "질감 표현이 핵심이야. 물성, 표면에 집중해봐.",
    "채색 단계에서 지저분한 부분 정리하면서 묘사해. 두 번 일 하지 마!",
];
const DETAIL_OVERTIME: &[&str] = &["묘사 너무 오래 했어. 정리할 시간 생각해서 마무리하자."];

const ORGANIZE_DEFAULT: &[&str] = &[
    "바닥에 놓고 전체 그림 느낌 한 번 더 봐봐.",
    "지저분한 라인 있으면 깔끔하게 정리!",
    "주제부 아닌 곳이 더 눈에 띈다면, 마카로 눌러줘.",
    "화이트, 블랙을 잘 조절해서 주제부 강조!",
];
const ORGANIZE_OVERTIME: &[&str] = &["더 만지면 무너질 수도 있어. 정리하고 멈추자!"];

fn tip_list(step: Step, is_overtime: bool) -> &'static [&'static str] {
    match (step, is_overtime) {
        (Step::Sketch, false) => SKETCH_DEFAULT,
        (Step::Sketch, true) => SKETCH_OVERTIME,
        (Step::Color, false) => COLOR_DEFAULT,
        (Step::Color, true) => COLOR_OVERTIME,
        (Step::Detail, false) => DETAIL_DEFAULT,
        (Step::Detail, true) => DETAIL_OVERTIME,
        (Step::Organize, false) => ORGANIZE_DEFAULT,
        (Step::Organize, true) => ORGANIZE_OVERTIME,
    }
}

fn pick(list: &'static [&'static str]) -> &'static str {
    list.choose(&mut rand::thread_rng()).copied().unwrap_or("")
}

/// Uniform random tip for the step and overtime state. Empty string, not
/// an error, when the list has no entries.
pub fn select_tip(step: Step, is_overtime: bool) -> &'static str {
    pick(tip_list(step, is_overtime))
}

/// Holds the current tip and the (step index, overtime) key it was drawn
/// for, so the same state never re-rolls across renders.
#[derive(Debug, Default)]
pub struct TipState {
    last_key: Option<(usize, bool)>,
    current: &'static str,
}

impl TipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-rolls only when the step changed or overtime was just entered,
    /// mirroring the transition rule the timer screen always had.
    pub fn refresh(&mut self, step_index: usize, step: Step, is_overtime: bool) -> &'static str {
        let transition = match self.last_key {
            None => true,
            Some((prev_step, prev_overtime)) => {
                prev_step != step_index || (is_overtime && !prev_overtime)
            }
        };
        if transition {
            self.current = select_tip(step, is_overtime);
            self.last_key = Some((step_index, is_overtime));
        }
        self.current
    }

    pub fn current(&self) -> &'static str {
        self.current
    }
}
