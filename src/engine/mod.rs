//! Session engine: the ledger, the period sequence and the controller that
//! drives both from user commands.

pub mod ledger;
pub mod period;
pub mod session;
