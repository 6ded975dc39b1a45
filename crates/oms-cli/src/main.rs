use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oms")]
#[command(about = "Order management service CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Print connectivity + schema presence.
    Status,

    /// Apply SQL migrations.
    Migrate,

    /// Reset the store to the fixed four-order sample set.
    /// Guardrail: refuses when the store already holds orders unless --yes is provided.
    Seed {
        /// Acknowledge that seeding deletes every existing order and line item.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = oms_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = oms_db::status(&pool).await?;
                    println!("db_ok={} has_orders_table={}", s.ok, s.has_orders_table);
                }
                DbCmd::Migrate => {
                    oms_db::migrate(&pool).await?;
                    println!("migrations applied");
                }
                DbCmd::Seed { yes } => {
                    let s = oms_db::status(&pool).await?;
                    if !s.has_orders_table {
                        anyhow::bail!("orders table missing; run `oms db migrate` first");
                    }

                    // Seeding is the only deletion path in the system; make the
                    // operator acknowledge it on a non-empty store.
                    let n = oms_db::count_orders(&pool).await?;
                    if n > 0 && !yes {
                        anyhow::bail!(
                            "REFUSING SEED: store holds {} order(s); seeding deletes them all. Re-run with: `oms db seed --yes`",
                            n
                        );
                    }

                    let seeded = oms_db::seed::reset_and_seed(&pool).await?;
                    for o in &seeded {
                        println!(
                            "seeded order_id={} customer={:?} status={} items={} total={:.2}",
                            o.order.id,
                            o.order.customer_name,
                            o.order.status.as_str(),
                            o.order_line_items.len(),
                            o.total()
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
