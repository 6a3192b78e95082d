//! Scripted-clock scenarios for the round state machine. No camera, no
//! models: frames are synthesized and time is advanced by hand.

use std::time::{Duration, Instant};

use rustyhands::classifier::classify;
use rustyhands::inference::synthetic_pose;
use rustyhands::opponent::OpponentChooser;
use rustyhands::outcome::{resolve, Outcome};
use rustyhands::round::{Phase, RoundEvent, RoundMachine, RoundTiming};
use rustyhands::types::{Classification, HandLandmarks, Symbol};

const DWELL: u32 = 3;

fn timing() -> RoundTiming {
    RoundTiming {
        countdown: Duration::from_secs(3),
        capture_window: Duration::from_secs(2),
        resolved_display: Duration::from_secs(1),
        cooldown: Duration::from_millis(500),
    }
}

fn machine(seed: u64) -> RoundMachine<rand::rngs::StdRng> {
    RoundMachine::new(timing(), DWELL, OpponentChooser::seeded(seed))
}

fn pose_frame(pose: Symbol, at: Instant) -> Classification {
    let hand = HandLandmarks::from_points(synthetic_pose(pose, 320.0, 240.0, 200.0)).unwrap();
    classify(&hand, at)
}

/// Step the machine with `n` frames of the given pose, ~30fps apart,
/// returning the last event seen and the clock after the final frame.
fn feed(
    m: &mut RoundMachine<rand::rngs::StdRng>,
    start: Instant,
    pose: Option<Symbol>,
    n: u32,
) -> (Option<RoundEvent>, Instant) {
    let mut last = None;
    let mut now = start;
    for i in 0..n {
        now = start + Duration::from_millis(33 * i as u64);
        let class = match pose {
            Some(p) => pose_frame(p, now),
            None => Classification::no_hand(now),
        };
        if let Some(e) = m.step(now, &class) {
            last = Some(e);
        }
    }
    (last, now)
}

#[test]
fn happy_round_scores_exactly_once() {
    let mut m = machine(11);
    let t0 = Instant::now();

    // Hand appears: countdown starts.
    let (event, _) = feed(&mut m, t0, Some(Symbol::Rock), 1);
    assert_eq!(event, Some(RoundEvent::RoundStarted));
    assert!(matches!(m.phase(), Phase::Countdown { .. }));

    // Keep the hand up past the countdown deadline.
    let after_countdown = t0 + Duration::from_millis(3100);
    let event = m.step(after_countdown, &pose_frame(Symbol::Rock, after_countdown));
    assert_eq!(event, Some(RoundEvent::CaptureOpened));

    // Hold Rock through the dwell window.
    let (event, _) = feed(&mut m, after_countdown + Duration::from_millis(33), Some(Symbol::Rock), DWELL);
    let Some(RoundEvent::Resolved {
        human,
        opponent,
        outcome,
    }) = event
    else {
        panic!("expected a resolution, got {:?}", event);
    };

    assert_eq!(human, Symbol::Rock);
    let opp = opponent.expect("a scored round binds an opponent symbol");
    assert_ne!(opp, Symbol::Unknown);
    assert_eq!(outcome, resolve(Symbol::Rock, opp));
    assert_ne!(outcome, Outcome::NoDecision);

    // Exactly one counter moved.
    assert_eq!(m.tally().total_scored(), 1);
}

#[test]
fn hand_lost_during_countdown_aborts_without_scoring() {
    let mut m = machine(2);
    let t0 = Instant::now();

    feed(&mut m, t0, Some(Symbol::Paper), 5);
    assert!(matches!(m.phase(), Phase::Countdown { .. }));

    let t1 = t0 + Duration::from_secs(1);
    let event = m.step(t1, &Classification::no_hand(t1));
    assert_eq!(event, Some(RoundEvent::CountdownAborted));
    assert_eq!(m.phase(), Phase::Idle);
    assert_eq!(m.tally().total_scored(), 0);
}

#[test]
fn capture_timeout_resolves_no_decision() {
    let mut m = machine(3);
    let t0 = Instant::now();

    feed(&mut m, t0, Some(Symbol::Rock), 1);
    let after_countdown = t0 + Duration::from_millis(3100);
    m.step(after_countdown, &pose_frame(Symbol::Rock, after_countdown));
    assert!(matches!(m.phase(), Phase::Capture { .. }));

    // The hand stays visible but never settles on a classifiable pose.
    let (_, _) = feed(
        &mut m,
        after_countdown + Duration::from_millis(33),
        Some(Symbol::Unknown),
        10,
    );

    // Window elapses.
    let late = after_countdown + Duration::from_millis(2100);
    let event = m.step(late, &pose_frame(Symbol::Unknown, late));
    assert_eq!(
        event,
        Some(RoundEvent::Resolved {
            human: Symbol::Unknown,
            opponent: None,
            outcome: Outcome::NoDecision,
        })
    );
    assert_eq!(m.tally().total_scored(), 0);
}

#[test]
fn flicker_during_capture_restarts_dwell() {
    let mut m = machine(4);
    let t0 = Instant::now();

    feed(&mut m, t0, Some(Symbol::Scissors), 1);
    let t1 = t0 + Duration::from_millis(3100);
    m.step(t1, &pose_frame(Symbol::Scissors, t1));

    // Two scissors frames, an Unknown flicker, then two more: not enough
    // for a dwell of three.
    let mut now = t1;
    for pose in [
        Symbol::Scissors,
        Symbol::Scissors,
        Symbol::Unknown,
        Symbol::Scissors,
        Symbol::Scissors,
    ] {
        now += Duration::from_millis(33);
        let event = m.step(now, &pose_frame(pose, now));
        assert_eq!(event, None, "dwell must not complete across a flicker");
    }

    // A third consecutive frame completes it.
    now += Duration::from_millis(33);
    let event = m.step(now, &pose_frame(Symbol::Scissors, now));
    assert!(matches!(
        event,
        Some(RoundEvent::Resolved {
            human: Symbol::Scissors,
            ..
        })
    ));
}

#[test]
fn pre_capture_dwell_does_not_leak_into_capture() {
    let mut m = machine(5);
    let t0 = Instant::now();

    // Hold a perfect Rock all through the countdown.
    feed(&mut m, t0, Some(Symbol::Rock), 30);
    let t1 = t0 + Duration::from_millis(3100);
    let event = m.step(t1, &pose_frame(Symbol::Rock, t1));
    assert_eq!(event, Some(RoundEvent::CaptureOpened));

    // The very next frame must not already resolve; the capture dwell
    // starts fresh.
    let t2 = t1 + Duration::from_millis(33);
    let event = m.step(t2, &pose_frame(Symbol::Rock, t2));
    assert_eq!(event, None);
}

#[test]
fn resolved_cools_down_then_next_round_runs() {
    let mut m = machine(6);
    let t0 = Instant::now();

    feed(&mut m, t0, Some(Symbol::Paper), 1);
    let t1 = t0 + Duration::from_millis(3100);
    m.step(t1, &pose_frame(Symbol::Paper, t1));
    feed(&mut m, t1 + Duration::from_millis(33), Some(Symbol::Paper), DWELL);
    assert!(matches!(m.phase(), Phase::Resolved { .. }));
    assert_eq!(m.tally().total_scored(), 1);

    // Display period ends, cooldown runs, machine returns to Idle even with
    // the hand still in frame.
    let t2 = t1 + Duration::from_millis(1300);
    m.step(t2, &pose_frame(Symbol::Paper, t2));
    assert!(matches!(m.phase(), Phase::Cooldown { .. }));
    let t3 = t2 + Duration::from_millis(600);
    m.step(t3, &pose_frame(Symbol::Paper, t3));
    // The lingering hand starts the next countdown from Idle on this step or
    // the next; either way a full second round must be playable.
    let t4 = t3 + Duration::from_millis(33);
    m.step(t4, &pose_frame(Symbol::Paper, t4));
    assert!(matches!(m.phase(), Phase::Countdown { .. }));

    let t5 = t4 + Duration::from_millis(3100);
    m.step(t5, &pose_frame(Symbol::Paper, t5));
    feed(&mut m, t5 + Duration::from_millis(33), Some(Symbol::Paper), DWELL);
    assert_eq!(m.tally().total_scored(), 2);
}

#[test]
fn abort_is_idempotent_and_never_touches_the_tally() {
    let mut m = machine(7);
    let t0 = Instant::now();

    // Abort from Idle is a no-op.
    assert_eq!(m.abort(), None);

    // Abort mid-capture.
    feed(&mut m, t0, Some(Symbol::Rock), 1);
    let t1 = t0 + Duration::from_millis(3100);
    m.step(t1, &pose_frame(Symbol::Rock, t1));
    assert!(matches!(m.phase(), Phase::Capture { .. }));
    assert_eq!(m.abort(), Some(RoundEvent::RoundReset));
    assert_eq!(m.phase(), Phase::Idle);
    assert_eq!(m.abort(), None);
    assert_eq!(m.tally().total_scored(), 0);
}

#[test]
fn reset_scores_is_idempotent_in_any_phase() {
    let mut m = machine(8);
    let t0 = Instant::now();

    // Score one round.
    feed(&mut m, t0, Some(Symbol::Rock), 1);
    let t1 = t0 + Duration::from_millis(3100);
    m.step(t1, &pose_frame(Symbol::Rock, t1));
    feed(&mut m, t1 + Duration::from_millis(33), Some(Symbol::Rock), DWELL);
    assert_eq!(m.tally().total_scored(), 1);

    m.reset_scores();
    assert_eq!(m.tally().total_scored(), 0);
    m.reset_scores();
    assert_eq!(m.tally().total_scored(), 0);
    // Machine still mid-round and functional.
    assert!(matches!(m.phase(), Phase::Resolved { .. }));
}

#[test]
fn snapshot_reports_remaining_time() {
    let mut m = machine(9);
    let t0 = Instant::now();

    feed(&mut m, t0, Some(Symbol::Rock), 1);
    let snap = m.snapshot(t0 + Duration::from_secs(1));
    assert!(matches!(snap.phase, Phase::Countdown { .. }));
    // 3s countdown started at t0; about 2s left.
    assert!(snap.remaining <= Duration::from_secs(2));
    assert!(snap.remaining > Duration::from_millis(1800));

    // After the deadline the remaining time saturates at zero.
    let snap = m.snapshot(t0 + Duration::from_secs(10));
    assert_eq!(snap.remaining, Duration::ZERO);
}
