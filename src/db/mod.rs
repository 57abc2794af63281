use std::time::Duration;

use log::{info, warn};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::{QueryBuilder, Row};

use crate::categorize;
use crate::categorize::Category;
use crate::config::DatabaseConfig;
use crate::transaction::CanonicalTransaction;

/// Rows per INSERT statement. PostgreSQL caps bind parameters at 65535
/// and each row binds nine values.
const INSERT_CHUNK: usize = 1000;

const SCHEMA: &str = "\
CREATE TABLE bank_transactions (
    id BIGSERIAL PRIMARY KEY,
    trans_date DATE,
    value_date DATE,
    description TEXT,
    debit NUMERIC,
    credit NUMERIC,
    balance NUMERIC,
    channel TEXT,
    transaction_reference TEXT,
    counterparty TEXT
)";

pub(crate) struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with the configured host, port and credentials.
    pub(crate) async fn connect(config: &DatabaseConfig) -> Result<Database, sqlx::Error> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.dbname)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(parse_ssl_mode(&config.sslmode));

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        info!("Connected to {}:{}/{}", config.host, config.port, config.dbname);
        Ok(Database { pool })
    }

    /// Replace the entire dataset: drop, recreate and bulk-insert inside a
    /// single transaction, so readers never observe a dropped or
    /// half-loaded table.
    pub(crate) async fn replace_all(
        &self,
        transactions: &[CanonicalTransaction],
    ) -> Result<(), sqlx::Error> {
        let mut ordered: Vec<&CanonicalTransaction> = transactions.iter().collect();
        // Ascending date order, undated rows last; the sort is stable so
        // file order breaks ties.
        ordered.sort_by_key(|t| (t.trans_date.is_none(), t.trans_date));

        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS bank_transactions")
            .execute(&mut *tx)
            .await?;
        sqlx::query(SCHEMA).execute(&mut *tx).await?;

        for chunk in ordered.chunks(INSERT_CHUNK) {
            let mut builder = QueryBuilder::<sqlx::Postgres>::new(
                "INSERT INTO bank_transactions \
                 (trans_date, value_date, description, debit, credit, balance, \
                  channel, transaction_reference, counterparty) ",
            );
            builder.push_values(chunk, |mut row, t| {
                row.push_bind(t.trans_date)
                    .push_bind(t.value_date)
                    .push_bind(t.description.as_str())
                    .push_bind(t.debit)
                    .push_bind(t.credit)
                    .push_bind(t.balance)
                    .push_bind(t.channel.as_str())
                    .push_bind(t.transaction_reference.as_deref())
                    .push_bind(t.counterparty.as_deref());
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!(
            "Loaded {} transactions into bank_transactions",
            transactions.len()
        );
        Ok(())
    }

    /// Read the full dataset back in ascending date order and re-derive
    /// each record's category. The result is the process-wide immutable
    /// snapshot: build it once and share it across all aggregation calls.
    pub(crate) async fn load_snapshot(&self) -> Result<Vec<CanonicalTransaction>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT trans_date, value_date, description, debit, credit, balance, \
             channel, transaction_reference, counterparty \
             FROM bank_transactions ORDER BY trans_date",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut transactions = Vec::with_capacity(rows.len());
        for row in rows {
            transactions.push(CanonicalTransaction {
                trans_date: row.try_get("trans_date")?,
                value_date: row.try_get("value_date")?,
                description: row
                    .try_get::<Option<String>, _>("description")?
                    .unwrap_or_default(),
                debit: row
                    .try_get::<Option<Decimal>, _>("debit")?
                    .unwrap_or(Decimal::ZERO),
                credit: row
                    .try_get::<Option<Decimal>, _>("credit")?
                    .unwrap_or(Decimal::ZERO),
                balance: row.try_get("balance")?,
                channel: row
                    .try_get::<Option<String>, _>("channel")?
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                transaction_reference: row.try_get("transaction_reference")?,
                counterparty: row.try_get("counterparty")?,
                category: Category::Other,
            });
        }
        categorize::apply(&mut transactions);

        Ok(transactions)
    }
}

fn parse_ssl_mode(raw: &str) -> PgSslMode {
    match raw.trim().to_lowercase().as_str() {
        "disable" => PgSslMode::Disable,
        "allow" => PgSslMode::Allow,
        "prefer" => PgSslMode::Prefer,
        "require" => PgSslMode::Require,
        "verify-ca" => PgSslMode::VerifyCa,
        "verify-full" => PgSslMode::VerifyFull,
        other => {
            warn!("Unknown sslmode {other:?}, falling back to require");
            PgSslMode::Require
        }
    }
}
