//! Save, restore and continue a session.

use rust_decimal_macros::dec;

use studio_panel::config::AppConfig;
use studio_panel::engine::session::SessionController;
use studio_panel::storage;
use studio_panel::types::{Outcome, Period};

fn temp_path() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("studio_it_session_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

#[test]
fn test_resume_continues_where_it_stopped() {
    let cfg = AppConfig::default();
    let path = temp_path();

    let mut ctl = SessionController::new(&cfg);
    ctl.configure(dec!(100), dec!(90), dec!(1.96)).unwrap();
    for o in [Outcome::Home, Outcome::Home, Outcome::Away] {
        ctl.record_outcome(o).unwrap();
        if ctl.session().pending.is_some() {
            ctl.settle(true).unwrap();
        }
    }
    ctl.advance_period();
    storage::save_session(ctl.session(), Some(&path)).unwrap();

    let restored = storage::load_session(Some(&path)).unwrap().unwrap();
    let mut resumed = SessionController::with_session(&cfg, restored);

    assert_eq!(resumed.session().id, ctl.session().id);
    assert_eq!(resumed.session().period, Period::Afternoon);
    assert_eq!(resumed.session().history, ctl.session().history);
    assert_eq!(resumed.classify().reading, ctl.classify().reading);

    let ledger = resumed.session().ledger.as_ref().unwrap();
    assert_eq!(ledger.balance, ctl.session().ledger.as_ref().unwrap().balance);
    assert_eq!(ledger.stakes.stake, dec!(3.12));

    assert!(resumed.record_outcome(Outcome::Tie).is_ok());
    storage::delete_session(Some(&path)).unwrap();
}
