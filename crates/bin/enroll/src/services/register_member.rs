//! Register member — schema-validated, transaction-wrapped enrollment.

use std::sync::LazyLock;

use serde_json::{Map, Value};
use sqlx::SqlitePool;

use operon_adapter_schema_json::{FieldRule, Kind, Schema};
use operon_adapter_txn_sqlite_sqlx::SqliteTransactionProvider;
use operon_core::descriptor::Descriptor;
use operon_core::errors::ServiceError;
use operon_core::lifecycle::Lifecycle;
use operon_core::ports::transaction::Verdict;
use operon_core::service::Service;

use crate::operator::Operator;

const CREATE_MEMBERS: &str = r"
    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        display_name TEXT NOT NULL,
        founding INTEGER NOT NULL DEFAULT 0,
        joined_at TEXT NOT NULL
    )
";

const INSERT_MEMBER: &str = r"
    INSERT INTO members (email, display_name, founding, joined_at)
    VALUES (?, ?, ?, ?)
";

/// Create the members table when it does not exist yet.
///
/// # Errors
///
/// Returns the underlying database error.
pub async fn ensure_members_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_MEMBERS).execute(pool).await?;
    Ok(())
}

static DESCRIPTOR: LazyLock<Descriptor<RegisterMember>> = LazyLock::new(|| {
    let schema: Schema<Operator> = Schema::builder()
        .field(
            FieldRule::required("email")
                .kind(Kind::String)
                .filled()
                .trimmed()
                .ensure("must contain '@'", |value, _operator| {
                    value.as_str().is_some_and(|email| email.contains('@'))
                }),
        )
        .field(FieldRule::optional("display_name").kind(Kind::String).trimmed())
        .field(
            FieldRule::optional("founding")
                .kind(Kind::Boolean)
                .ensure("requires an administrator", |value, operator: &Operator| {
                    !value.as_bool().unwrap_or(false) || operator.admin
                }),
        )
        .build()
        .expect("member schema should compile");

    Descriptor::builder()
        .schema(schema)
        .on_success_named("announce", RegisterMember::announce)
        .on_fail_named("report_rejection", RegisterMember::report_rejection)
        .build()
});

/// Enroll a new member.
///
/// Validates the raw arguments against the member schema, inserts the row
/// inside an ambient transaction, and rolls back (settling failed) when the
/// email is already registered.
pub struct RegisterMember {
    lifecycle: Lifecycle<Operator>,
    provider: SqliteTransactionProvider,
    member_id: Option<i64>,
}

impl RegisterMember {
    /// Construct the service; validation runs here.
    #[must_use]
    pub fn new(
        operator: Operator,
        arguments: Map<String, Value>,
        provider: SqliteTransactionProvider,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::initialize::<Self>(operator, arguments),
            provider,
            member_id: None,
        }
    }

    /// Row id of the enrolled member after a successful run.
    #[must_use]
    pub fn member_id(&self) -> Option<i64> {
        self.member_id
    }

    fn announce(&mut self) -> Result<(), ServiceError> {
        tracing::info!(
            member = ?self.member_id,
            operator = %self.context().name,
            "member registered"
        );
        Ok(())
    }

    fn report_rejection(&mut self) -> Result<(), ServiceError> {
        tracing::warn!(
            fields = self.errors().len(),
            operator = %self.context().name,
            "member registration rejected"
        );
        Ok(())
    }
}

impl Service for RegisterMember {
    type Context = Operator;

    fn descriptor() -> &'static Descriptor<Self> {
        &DESCRIPTOR
    }

    fn lifecycle(&self) -> &Lifecycle<Operator> {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle<Operator> {
        &mut self.lifecycle
    }

    async fn call(&mut self) -> Result<(), ServiceError> {
        let provider = self.provider.clone();
        let email: String = self.arg_as("email")?;
        let display_name: Option<String> = self.arg_as("display_name")?;
        let founding: Option<bool> = self.arg_as("founding")?;

        let display_name = display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let joined_at = operon_core::time::now().to_rfc3339();
        let pool = provider.pool().clone();

        self.within_transaction(&provider, async move |svc: &mut Self| {
            let inserted = sqlx::query(INSERT_MEMBER)
                .bind(&email)
                .bind(&display_name)
                .bind(founding.unwrap_or(false))
                .bind(&joined_at)
                .execute(&pool)
                .await;

            match inserted {
                Ok(done) => {
                    svc.member_id = Some(done.last_insert_rowid());
                    Ok(Verdict::Commit(()))
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    svc.record_error("email", "is already registered");
                    Ok(Verdict::Rollback)
                }
                Err(err) => Err(ServiceError::domain(err)),
            }
        })
        .await?;
        Ok(())
    }
}
