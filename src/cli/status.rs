use crate::db::get_connection;
use crate::error::Result;
use crate::models::STATUS_FAILED;
use crate::settings::get_data_dir;
use crate::store;

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    let db_path = data_dir.join("masroof.db");

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;

        let invoices: i64 = conn.query_row("SELECT count(*) FROM invoices", [], |r| r.get(0))?;
        let failed: i64 = conn.query_row(
            "SELECT count(*) FROM invoices WHERE extraction_status = ?1",
            [STATUS_FAILED],
            |r| r.get(0),
        )?;
        let rules: i64 = conn.query_row("SELECT count(*) FROM category_rules", [], |r| r.get(0))?;
        let cycles: i64 = conn.query_row("SELECT count(*) FROM budget_cycles", [], |r| r.get(0))?;

        println!();
        println!("Invoices:          {invoices}");
        println!("Failed extraction: {failed}");
        println!("Rules:             {rules}");
        println!("Cycles:            {cycles}");

        match store::get_active_cycle(&conn)? {
            Some(cycle) => println!("Active cycle:      {} (started {})", cycle.id, cycle.start_date),
            None => println!("Active cycle:      none"),
        }
    } else {
        println!();
        println!("Database not found. Run `masroof init` to set up.");
    }

    Ok(())
}
