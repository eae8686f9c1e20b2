//! End-to-end small business walkthrough

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ledger_core::{
    AccountingEngine, EntryType, LineItem, MemoryStore, NewInvoice, NewTransaction,
    TransactionFilter,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Ledger Core - Small Business Example\n");

    let mut engine = AccountingEngine::new(MemoryStore::new());
    let organization = Uuid::new_v4();
    let bookkeeper = Uuid::new_v4();

    // 1. Seed the default chart of accounts
    println!("📊 Seeding Chart of Accounts...");
    let seeded = engine.seed_accounts(organization).await?;
    println!("  ✓ Seeded {seeded} accounts\n");

    // 2. Record some business transactions
    println!("💰 Recording Business Transactions...");
    let rent = engine
        .accounts()
        .get_by_code(organization, "6810")
        .await?
        .expect("default chart has a rent account");

    engine
        .create_transaction(
            organization,
            NewTransaction {
                account_id: Some(rent.id),
                transaction_date: date(2024, 4, 1),
                amount: BigDecimal::from(2400),
                description: "April office rent".to_string(),
                reference: Some("RENT-APR".to_string()),
                entry_type: EntryType::Debit,
                category: Some("Occupancy".to_string()),
            },
            bookkeeper,
        )
        .await?;
    println!("  ✓ Recorded: office rent of $2,400\n");

    // 3. Invoice a customer and collect payment
    println!("🧾 Invoicing...");
    let invoice = engine
        .create_invoice(NewInvoice {
            organization_id: organization,
            invoice_number: None,
            customer_name: "Wattle & Co".to_string(),
            customer_email: Some("accounts@wattle.example".to_string()),
            customer_address: None,
            issue_date: date(2024, 4, 5),
            due_date: date(2024, 5, 5),
            subtotal: None,
            tax_amount: None,
            total: None,
            status: None,
            line_items: vec![LineItem {
                description: "Website redesign".to_string(),
                quantity: BigDecimal::from(1),
                unit_price: BigDecimal::from(5000),
                amount: BigDecimal::from(5000),
                tax_rate: None,
            }],
            notes: Some("Payable within 30 days".to_string()),
        })
        .await?;
    println!(
        "  ✓ Created {}: subtotal ${}, GST ${}, total ${}",
        invoice.invoice_number, invoice.subtotal, invoice.tax_amount, invoice.total
    );

    engine.send_invoice(organization, invoice.id).await?;
    let paid = engine
        .pay_invoice(organization, invoice.id, bookkeeper)
        .await?;
    println!("  ✓ {} marked {:?} and posted to sales\n", paid.invoice_number, paid.status);

    // 4. Reports
    println!("📈 Reports...");
    let pnl = engine
        .profit_loss(organization, date(2024, 4, 1), date(2024, 6, 30))
        .await?;
    println!(
        "  P&L Q2: revenue ${}, expenses ${}, net ${} (margin {}%)",
        pnl.revenue.total, pnl.expenses.total, pnl.net_profit, pnl.profit_margin
    );

    let cash = engine
        .cash_flow(organization, date(2024, 4, 1), date(2024, 6, 30))
        .await?;
    println!(
        "  Cash flow Q2: in ${}, out ${}, closing ${}",
        cash.total_inflow, cash.total_outflow, cash.closing_balance
    );

    let summary = engine.tax_summary(organization, "Q2-2024").await?;
    println!(
        "  GST Q2: collected ${}, paid ${}, net ${} (due {})",
        summary.sales.gst_collected, summary.purchases.gst_paid, summary.net_gst,
        summary.gst_due_date
    );

    // 5. Prepare and lodge the BAS
    println!("\n🏛  BAS...");
    let statement = engine.calculate_bas(organization, "Q2-2024").await?;
    engine.mark_bas_ready(organization, statement.id).await?;
    let lodged = engine.lodge_bas(organization, statement.id).await?;
    let payload = engine.bas_payload(organization, statement.id).await?;
    println!(
        "  ✓ {} lodged ({:?}): G1 ${}, G21 ${}",
        lodged.period, lodged.status, payload.g1, payload.g21
    );

    let ledger_page = engine
        .list_transactions(organization, TransactionFilter::default())
        .await?;
    println!("\n📒 Ledger now holds {} transactions", ledger_page.total);

    Ok(())
}
