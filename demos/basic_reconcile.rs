//! Basic reconciliation example

use statement_reconciler::logging::init_logging;
use statement_reconciler::{
    Configuration, ImportRunner, LedgerSnapshot, MemoryLedger, MemoryStatements, Money,
    RawOperation, Statement,
};

const LEDGER: &str = r#"{
    "serverTimestamp": 1704412800,
    "instrument": [
        {"id": 1, "title": "US Dollar", "shortTitle": "USD"},
        {"id": 2, "title": "Euro", "shortTitle": "EUR"},
        {"id": 3, "title": "Serbian Dinar", "shortTitle": "RSD"}
    ],
    "account": [
        {"id": "00000000-0000-0000-0000-0000000000a1", "title": "Raiffeizen B RSD", "instrument": 3},
        {"id": "00000000-0000-0000-0000-0000000000a2", "title": "Raiffeizen B EUR", "instrument": 2},
        {"id": "00000000-0000-0000-0000-0000000000a3", "title": "Raiffeizen B USD", "instrument": 1},
        {"id": "00000000-0000-0000-0000-0000000000c1", "title": "Wallet RSD", "instrument": 3},
        {"id": "00000000-0000-0000-0000-0000000000c2", "title": "Wallet EUR", "instrument": 2},
        {"id": "00000000-0000-0000-0000-0000000000d1", "title": "Deel", "instrument": 1}
    ]
}"#;

fn line(
    customer: &str,
    amount: &str,
    currency: &str,
    reference: &str,
    description: &str,
) -> Result<RawOperation, Box<dyn std::error::Error>> {
    let today = chrono::Utc::now().format("%d.%m.%Y").to_string();
    Ok(RawOperation::new(
        customer,
        amount.parse::<Money>()?,
        currency,
        reference,
        today,
        description,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    println!("🏦 Statement Reconciler - Basic Example\n");

    let config = Configuration::from_toml_str(include_str!("../config.example.toml"))?;
    let ledger = MemoryLedger::new(LedgerSnapshot::from_json(LEDGER)?);

    let statements = MemoryStatements::new(vec![
        Statement::new(
            "265-EUR",
            vec![
                line("RAIFFEISEN BANKA", "-200", "EUR", "FX-1", "Otkup deviza po kursu 117.15")?,
                line("Hetzner Online", "-39.90", "EUR", "", "Server rent")?,
            ],
        ),
        Statement::new(
            "265-RSD",
            vec![
                line("", "23430", "RSD", "FX-1", "Dinarska protivvrednost")?,
                line("MAXI 0112", "-4312.75", "RSD", "", "Purchase")?,
                line("BANKOMAT TERAZIJE", "-10000", "RSD", "", "Card 4111******0042")?,
            ],
        ),
        Statement::new(
            "265-USD",
            vec![line("DEEL INC", "3150", "USD", "PAY-12", "Monthly payroll")?],
        ),
    ]);

    let mut runner = ImportRunner::new(config, ledger.clone(), statements);

    // 1. Preview what would be imported
    println!("🔍 Previewing import...");
    let preview = runner.preview().await?;
    for operation in &preview.new_operations {
        println!("  • {}", operation);
    }
    println!();

    // 2. Run the import
    println!("📥 Importing...");
    let summary = runner.run().await?;
    println!(
        "  ✓ Submitted {} transactions ({} duplicates, {} exchanges)",
        summary.report.diff.len(),
        summary.report.stats.duplicates,
        summary.report.stats.transitions
    );
    println!("\n📄 Submitted diff:\n{}\n", summary.report.diff.to_json()?);

    // 3. Running again finds nothing new
    println!("🔁 Running again...");
    let again = runner.run().await?;
    println!(
        "  ✓ New: {}, already imported: {}",
        again.report.stats.new_operations, again.report.stats.already_imported
    );

    println!("\n✅ Done, {} submission(s) in total", ledger.submissions()?.len());
    Ok(())
}
