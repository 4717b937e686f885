mod common;

use anyhow::Result;
use common::scripted_service;
use fiscus::application::OpOutcome;
use fiscus::io::{ScriptReport, parse_script};

#[tokio::test]
async fn test_script_run_end_to_end() -> Result<()> {
    let script = "\
# seed the ledger
open checking 100.00
open savings 50.00

deposit checking 25.00
transfer checking savings 50.00
withdraw savings 10.00
";
    let lines = parse_script(script)?;
    let mut service = scripted_service([]);
    let records = service.run_script(&lines).await;

    assert_eq!(records.len(), 5);
    assert!(records
        .iter()
        .all(|record| matches!(record.outcome, OpOutcome::Applied { .. })));

    assert_eq!(service.balance("checking")?, 7500);
    assert_eq!(service.balance("savings")?, 9000);

    Ok(())
}

#[tokio::test]
async fn test_rejected_operation_is_recorded_and_run_continues() -> Result<()> {
    let script = "\
open checking 100.00
withdraw checking 200.00
deposit checking 5.00
";
    let lines = parse_script(script)?;
    let mut service = scripted_service([]);
    let records = service.run_script(&lines).await;

    assert_eq!(records.len(), 3);
    match &records[1].outcome {
        OpOutcome::Rejected { error } => {
            assert_eq!(error, "insufficient funds: balance 100.00, requested 200.00");
        }
        other => panic!("expected a rejected record, got {:?}", other),
    }
    // The failed withdrawal changed nothing; the following deposit applied.
    assert_eq!(service.balance("checking")?, 10500);

    Ok(())
}

#[tokio::test]
async fn test_script_sync_uses_the_injected_source() -> Result<()> {
    let script = "\
open checking 100.00
sync checking
";
    let lines = parse_script(script)?;
    let mut service = scripted_service([4200, 1]);
    let records = service.run_script(&lines).await;

    assert!(matches!(
        records[1].outcome,
        OpOutcome::Applied { balance_cents: 4200 }
    ));
    assert_eq!(service.balance("checking")?, 4200);

    Ok(())
}

#[tokio::test]
async fn test_report_renders_run_results() -> Result<()> {
    let script = "\
open checking 100.00
withdraw checking 200.00
";
    let lines = parse_script(script)?;
    let mut service = scripted_service([]);
    let records = service.run_script(&lines).await;
    let report = ScriptReport::new(records, service.balances());

    let mut csv = Vec::new();
    assert_eq!(report.write_csv(&mut csv)?, 2);
    let csv = String::from_utf8(csv)?;
    assert!(csv.contains("withdraw checking 200.00"));
    assert!(csv.contains("rejected"));

    let mut json = Vec::new();
    report.write_json(&mut json)?;
    let value: serde_json::Value = serde_json::from_slice(&json)?;
    assert_eq!(value["balances"][0]["account"], "checking");
    assert_eq!(value["balances"][0]["balance_cents"], 10000);

    Ok(())
}
