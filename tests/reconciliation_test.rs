mod common;

use anyhow::Result;
use common::funded_service;
use fiscus::application::AppError;
use fiscus::domain::AccountError;

#[tokio::test]
async fn test_successful_sync_overwrites_balance() -> Result<()> {
    // Draws: remote balance 50 cents, then a successful flip.
    let service = funded_service([50, 1])?;

    assert_eq!(service.synchronize("checking").await?, 50);
    assert_eq!(service.balance("checking")?, 50);

    Ok(())
}

#[tokio::test]
async fn test_failed_sync_leaves_balance_unchanged() -> Result<()> {
    let service = funded_service([5000, 0])?;

    let err = service.synchronize("checking").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Account(AccountError::SynchronizationFailed)
    ));
    assert_eq!(service.balance("checking")?, 10000);

    Ok(())
}

#[tokio::test]
async fn test_sync_has_exactly_two_outcomes() -> Result<()> {
    // Whatever the flip, the balance is either the fetched value (success)
    // or the previous one (failure) - never anything else.
    for flip in [0, 1] {
        let service = funded_service([777, flip])?;
        match service.synchronize("checking").await {
            Ok(balance) => {
                assert_eq!(balance, 777);
                assert_eq!(service.balance("checking")?, 777);
            }
            Err(err) => {
                assert!(matches!(
                    err,
                    AppError::Account(AccountError::SynchronizationFailed)
                ));
                assert_eq!(service.balance("checking")?, 10000);
            }
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_repeated_syncs_consume_draws_in_order() -> Result<()> {
    let service = funded_service([100, 1, 200, 0, 300, 1])?;

    assert_eq!(service.synchronize("checking").await?, 100);

    assert!(service.synchronize("checking").await.is_err());
    assert_eq!(service.balance("checking")?, 100);

    assert_eq!(service.synchronize("checking").await?, 300);

    Ok(())
}

#[tokio::test]
async fn test_retry_policy_belongs_to_the_caller() -> Result<()> {
    // Two failures, then success: each attempt is a fresh, independent fetch.
    let service = funded_service([1, 0, 2, 0, 4200, 1])?;

    let mut attempts = 0;
    let balance = loop {
        attempts += 1;
        match service.synchronize("checking").await {
            Ok(balance) => break balance,
            Err(_) if attempts < 5 => continue,
            Err(err) => return Err(err.into()),
        }
    };

    assert_eq!(attempts, 3);
    assert_eq!(balance, 4200);

    Ok(())
}
