use crate::application::ledger::MortgageLedger;
use crate::domain::application::MortgageApplication;
use crate::domain::mortgage::MortgageNumber;
use crate::domain::patch::MortgagePatch;
use crate::error::{MortgageError, Result};
use crate::infrastructure::codec;
use tracing::debug;

/// Dispatches named operations to the ledger service.
///
/// Arguments arrive as strings, as a ledger transport hands them over;
/// results are returned as encoded JSON.
pub struct Router {
    ledger: MortgageLedger,
}

impl Router {
    pub fn new(ledger: MortgageLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &MortgageLedger {
        &self.ledger
    }

    /// Runs `function` with `args`. Operations without a result return an
    /// empty buffer.
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        debug!(function, args = args.len(), "invoke");
        match function {
            "init" => {
                expect_args(function, args, 0)?;
                self.ledger.init().await?;
                Ok(Vec::new())
            }
            "createApplication" | "create_Mortgage_application" => {
                expect_args(function, args, 1)?;
                let application: MortgageApplication = codec::decode_payload(&args[0])?;
                let number = self.ledger.create_application(application).await?;
                codec::encode(&number)
            }
            "amendMortgage" => {
                expect_args(function, args, 1)?;
                let patch: MortgagePatch = codec::decode_payload(&args[0])?;
                let record = self.ledger.amend_mortgage(patch).await?;
                codec::encode(&record)
            }
            "getMortgage" => {
                expect_args(function, args, 1)?;
                let record = self.ledger.get_mortgage(parse_number(&args[0])?).await?;
                codec::encode(&record)
            }
            "getPortfolio" => {
                expect_args(function, args, 0)?;
                codec::encode(&self.ledger.get_portfolio().await?)
            }
            "getAllMortgages" => {
                expect_args(function, args, 0)?;
                codec::encode(&self.ledger.get_all_mortgages().await?)
            }
            "read" => {
                expect_args(function, args, 1)?;
                self.ledger.read(&args[0]).await
            }
            "reconcile" => {
                expect_args(function, args, 0)?;
                codec::encode(&self.ledger.reconcile().await?)
            }
            _ => Err(MortgageError::Validation(format!(
                "Received unknown function invocation: {}",
                function
            ))),
        }
    }
}

fn expect_args(function: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(MortgageError::Validation(format!(
            "Incorrect number of arguments for {}: expected {}, got {}",
            function,
            expected,
            args.len()
        )))
    }
}

fn parse_number(raw: &str) -> Result<MortgageNumber> {
    raw.trim()
        .parse()
        .map_err(|_| MortgageError::Validation(format!("Invalid mortgage number '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::domain::mortgage::{MortgageRecord, Ownership, Stage};
    use crate::domain::portfolio::PortfolioIndex;
    use crate::infrastructure::in_memory::InMemoryLedgerStore;

    async fn router() -> Router {
        let ledger = MortgageLedger::new(
            Box::new(InMemoryLedgerStore::new()),
            LedgerConfig::default(),
        );
        let router = Router::new(ledger);
        router.invoke("init", &[]).await.unwrap();
        router
    }

    fn arg(value: &str) -> Vec<String> {
        vec![value.to_string()]
    }

    #[tokio::test]
    async fn test_full_lifecycle_through_router() {
        let router = router().await;

        let created = router
            .invoke(
                "createApplication",
                &arg(r#"{"customerName": "Ada", "reqLoanAmount": 500000}"#),
            )
            .await
            .unwrap();
        assert_eq!(created, b"1000001");

        router
            .invoke(
                "amendMortgage",
                &arg(r#"{"mortgageNumber": 1000001, "mortgageStage": "approved"}"#),
            )
            .await
            .unwrap();
        let amended = router
            .invoke(
                "amendMortgage",
                &arg(r#"{"mortgageNumber": 1000001, "ownershipcost": 400000}"#),
            )
            .await
            .unwrap();
        let record: MortgageRecord = serde_json::from_slice(&amended).unwrap();
        assert_eq!(record.stage, Stage::Disbursed);
        assert_eq!(record.ownership, Ownership::LendingBank);

        let portfolio = router.invoke("getPortfolio", &[]).await.unwrap();
        let portfolio: PortfolioIndex = serde_json::from_slice(&portfolio).unwrap();
        assert_eq!(portfolio.get(1000001).unwrap().stage, Stage::Disbursed);

        let all = router.invoke("getAllMortgages", &[]).await.unwrap();
        let all: Vec<MortgageRecord> = serde_json::from_slice(&all).unwrap();
        assert_eq!(all, vec![record.clone()]);

        let raw = router.invoke("read", &arg("1000001")).await.unwrap();
        assert_eq!(serde_json::from_slice::<MortgageRecord>(&raw).unwrap(), record);
    }

    #[tokio::test]
    async fn test_get_mortgage_is_repeatable() {
        let router = router().await;
        router
            .invoke(
                "create_Mortgage_application",
                &arg(r#"{"customerName": "Ada", "reqLoanAmount": 500000}"#),
            )
            .await
            .unwrap();

        let first = router.invoke("getMortgage", &arg("1000001")).await.unwrap();
        let second = router.invoke("getMortgage", &arg("1000001")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_argument_errors_are_validation_errors() {
        let router = router().await;

        let cases: Vec<(&str, Vec<String>)> = vec![
            ("createApplication", vec![]),
            ("createApplication", arg("{not json")),
            ("amendMortgage", arg(r#"{"mortgageNumber": 1000001, "mortgageStage": "closed"}"#)),
            ("getMortgage", arg("abc")),
            ("getPortfolio", arg("extra")),
            ("transferMortgage", vec![]),
        ];
        for (function, args) in cases {
            let result = router.invoke(function, &args).await;
            assert!(
                matches!(result, Err(MortgageError::Validation(_))),
                "{} {:?} should be rejected, got {:?}",
                function,
                args,
                result
            );
        }
        assert!(router.ledger().get_portfolio().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_mortgage_is_not_found() {
        let router = router().await;
        assert!(matches!(
            router.invoke("getMortgage", &arg("1000001")).await,
            Err(MortgageError::NotFound(_))
        ));
    }
}
