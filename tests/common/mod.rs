use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn application_json(name: &str, requested: i64) -> String {
    format!(
        r#"{{"customerName": "{}", "reqLoanAmount": {}, "rateofInterest": 0.05, "mortgageDuration": 730, "propertyValuation": 600000, "creditScore": 720, "financialWorth": 500000}}"#,
        name, requested
    )
}

/// Writes a replay script: init, `applications` intakes, then random
/// approvals, disbursals and payments against them.
pub fn generate_script(path: &Path, applications: usize, amendments: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = rand::thread_rng();

    wtr.write_record(["function", "argument"])?;
    wtr.write_record(["init", ""])?;
    for i in 1..=applications {
        let requested = rng.gen_range(50_000..900_000);
        wtr.write_record([
            "createApplication",
            &application_json(&format!("Customer {}", i), requested),
        ])?;
    }

    for _ in 0..amendments {
        let number = 1_000_000 + rng.gen_range(1..=applications);
        let patch = match rng.gen_range(0..4) {
            0 => format!(r#"{{"mortgageNumber": {}, "mortgageStage": "APPROVED"}}"#, number),
            1 => format!(
                r#"{{"mortgageNumber": {}, "ownershipcost": {}}}"#,
                number,
                rng.gen_range(10_000..500_000)
            ),
            2 => format!(
                r#"{{"mortgageNumber": {}, "lastPaymentAmount": {}}}"#,
                number,
                rng.gen_range(1_000..100_000)
            ),
            _ => format!(
                r#"{{"mortgageNumber": {}, "mortgageStage": "DISBURSED_READY_TO_SELL"}}"#,
                number
            ),
        };
        wtr.write_record(["amendMortgage", &patch])?;
    }

    wtr.flush()?;
    Ok(())
}
