//! A full trading day driven through `SessionController`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use studio_panel::config::AppConfig;
use studio_panel::engine::session::SessionController;
use studio_panel::strategy::{ClassifierMode, Suggestion};
use studio_panel::types::{BlockReason, LockReason, Outcome, PanelError, Period, Signal};

fn controller(mode: ClassifierMode) -> SessionController {
    let mut cfg = AppConfig::default();
    cfg.classifier.mode = mode;
    SessionController::new(&cfg)
}

#[test]
fn test_rules_day_goal_lock_and_rollover() {
    let mut ctl = controller(ClassifierMode::Rules);
    ctl.configure(dec!(100), dec!(90), dec!(1.96)).unwrap();

    for o in [Outcome::Away, Outcome::Home, Outcome::Home, Outcome::Home, Outcome::Home] {
        ctl.record_outcome(o).unwrap();
    }
    let analysis = ctl.classify();
    assert_eq!(analysis.reading.pattern, "long streak");
    assert_eq!(analysis.suggestion.as_ref().and_then(Suggestion::side), Some(Outcome::Away));

    // Ten wins of 3.00 reach the 30.00 period goal exactly.
    for i in 0..10 {
        let report = ctl.settle(true).unwrap();
        if i < 9 {
            assert!(report.settlement.locked.is_none());
        } else {
            assert_eq!(report.settlement.locked, Some(LockReason::GoalHit));
        }
    }

    let snap = ctl.snapshot();
    assert_eq!(snap.goal_progress, 1.0);
    assert_eq!(snap.analysis.suggestion, Some(Suggestion::Locked));
    assert!(snap.lock_message.is_some());
    assert_eq!(
        ctl.record_outcome(Outcome::Home).unwrap_err(),
        PanelError::Blocked(BlockReason::Locked(LockReason::GoalHit))
    );

    let change = ctl.advance_period();
    assert_eq!(change.to, Period::Afternoon);
    assert_eq!(change.closing_profit, dec!(30.00));
    let ledger = ctl.session().ledger.as_ref().unwrap();
    assert_eq!(ledger.balance, dec!(130.00));
    assert_eq!(ledger.period_profit, Decimal::ZERO);
    assert!(ctl.record_outcome(Outcome::Tie).is_ok());
}

#[test]
fn test_stop_loss_then_closed_day() {
    let mut ctl = controller(ClassifierMode::Rules);
    ctl.configure(dec!(100), dec!(158.4), dec!(1.96)).unwrap();

    ctl.settle(false).unwrap();
    let report = ctl.settle(false).unwrap();
    assert_eq!(report.settlement.balance, dec!(89.00));
    assert_eq!(report.settlement.locked, Some(LockReason::StopLossHit));
    assert!(ctl.settle(true).is_err());

    ctl.advance_period();
    ctl.advance_period();
    let change = ctl.advance_period();
    assert_eq!(change.to, Period::Closed);
    let change = ctl.advance_period();
    assert!(change.is_terminal());
    assert_eq!(ctl.session().period, Period::Closed);

    // Closed does not block recording.
    assert!(ctl.record_outcome(Outcome::Home).is_ok());
}

#[test]
fn test_frequency_previous_signal_flow() {
    let mut ctl = controller(ClassifierMode::Frequency);
    ctl.configure(dec!(200), dec!(60), dec!(1.96)).unwrap();

    // First round: nothing to back yet.
    let m = ctl.record_outcome(Outcome::Away).unwrap();
    assert!(!m.awaiting_settlement);

    // [A] → 100% Away, so the next round follows an entry on Away.
    let m = ctl.record_outcome(Outcome::Home).unwrap();
    assert!(m.awaiting_settlement);
    assert_eq!(
        ctl.record_outcome(Outcome::Home).unwrap_err(),
        PanelError::Blocked(BlockReason::ResultPending)
    );
    let report = ctl.settle(false).unwrap();
    assert_eq!(report.backed, Some(Outcome::Away));
    assert_eq!(ctl.session().previous_signal, Some(Outcome::Away));

    // [A, H]: Home wins the tie-break at 50%, previous signal disagrees.
    let analysis = ctl.classify();
    assert_eq!(analysis.reading.signal, Signal::Back(Outcome::Home));
    assert_eq!(analysis.reading.confidence, 45.0);
    assert_eq!(analysis.suggestion, Some(Suggestion::Wait));

    ctl.advance_period();
    assert!(ctl.session().previous_signal.is_none());
    assert_eq!(ctl.classify().reading.confidence, 50.0);
}

#[test]
fn test_reset_and_reconfigure() {
    let mut ctl = controller(ClassifierMode::Frequency);
    ctl.configure(dec!(100), dec!(90), dec!(1.96)).unwrap();
    ctl.record_outcome(Outcome::Home).unwrap();
    let old_id = ctl.session().id;

    ctl.reset_all();
    assert_ne!(ctl.session().id, old_id);
    assert!(!ctl.snapshot().configured);
    assert!(ctl.classify().suggestion.is_none());

    let summary = ctl.configure(dec!(50), dec!(30), dec!(2.0)).unwrap();
    assert_eq!(summary.period_goal, dec!(10));
    assert_eq!(summary.stake, dec!(1.00));
    assert_eq!(summary.stop_loss, dec!(5.0));
}
