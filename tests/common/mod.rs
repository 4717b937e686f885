// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use fiscus::application::LedgerService;
use fiscus::remote::SequenceSource;

/// Service whose remote draws replay the given sequence.
pub fn scripted_service(draws: impl IntoIterator<Item = i64>) -> LedgerService {
    LedgerService::with_source(Arc::new(SequenceSource::new(draws)))
}

/// Standard fixture: "checking" at 100.00 and "savings" at 50.00, remote
/// draws scripted.
pub fn funded_service(draws: impl IntoIterator<Item = i64>) -> Result<LedgerService> {
    let mut service = scripted_service(draws);
    service.open_account("checking", 10000)?;
    service.open_account("savings", 5000)?;
    Ok(service)
}
