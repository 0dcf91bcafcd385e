use rand::Rng;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::newsletter::Newsletter;
use crate::domain::subscriber_email::SubscriberEmail;

const TOKEN_LENGTH: usize = 30;

/// Postgres access for the subscriber lifecycle and the newsletter read path.
#[derive(Clone)]
pub struct Store {
    db_pool: PgPool,
}

impl Store {
    pub fn new(db_pool: PgPool) -> Store {
        Store { db_pool }
    }

    /// Create a pending subscription and return its confirmation token.
    /// Signing up twice with the same address keeps a single row and rotates
    /// the token, so the most recent confirmation email always wins.
    #[tracing::instrument(name = "Signup for the newsletter", skip(self))]
    pub async fn signup_for_newsletter(
        &self,
        email: &SubscriberEmail,
    ) -> Result<String, sqlx::Error> {
        let token = generate_signup_token();

        sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers (email, token)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET token = excluded.token, updated_at = now()
            "#,
        )
        .bind(email.as_ref())
        .bind(&token)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(token)
    }

    /// Resolve a confirmation token. `Ok(None)` means the token matches no
    /// pending signup (bad token); on a match the record becomes confirmed
    /// and the token is consumed, so a second confirm is a bad token too.
    #[tracing::instrument(name = "Confirm a newsletter signup", skip(self))]
    pub async fn confirm_newsletter_signup(
        &self,
        token: &str,
    ) -> Result<Option<SubscriberEmail>, sqlx::Error> {
        // A consumed token is stored as the empty string and must never match
        if token.is_empty() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET status = 'confirmed', token = '', updated_at = now()
            WHERE token = $1
            RETURNING email
            "#,
        )
        .bind(token)
        .map(|row: PgRow| SubscriberEmail::parse(row.get("email")).unwrap())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })
    }

    #[tracing::instrument(name = "Get a newsletter by id", skip(self))]
    pub async fn get_newsletter(&self, id: Uuid) -> Result<Option<Newsletter>, sqlx::Error> {
        sqlx::query(
            r#"
            SELECT id, title, content, published_at
            FROM newsletters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .map(map_newsletter_row)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })
    }

    #[tracing::instrument(name = "Get all newsletters", skip(self))]
    pub async fn get_newsletters(&self) -> Result<Vec<Newsletter>, sqlx::Error> {
        sqlx::query(
            r#"
            SELECT id, title, content, published_at
            FROM newsletters
            ORDER BY published_at DESC
            "#,
        )
        .map(map_newsletter_row)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })
    }
}

fn map_newsletter_row(row: PgRow) -> Newsletter {
    Newsletter {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        published_at: row.get("published_at"),
    }
}

fn generate_signup_token() -> String {
    let mut rng = rand::thread_rng();

    std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(TOKEN_LENGTH)
        .collect()
}
