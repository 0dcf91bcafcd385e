use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::jobs::GiftCreator;

const GIFT_SUFFIX_LENGTH: usize = 10;

/// Produces the welcome gift for a newly confirmed subscriber: a uniquely
/// named artifact persisted before the welcome email may reference it.
pub struct GiftGenerator {
    db_pool: PgPool,
    base_url: String,
}

impl GiftGenerator {
    pub fn new(db_pool: PgPool, base_url: String) -> GiftGenerator {
        GiftGenerator { db_pool, base_url }
    }

    #[tracing::instrument(name = "Create and save a newsletter gift", skip(self))]
    async fn create_gift(&self, seed: &str) -> Result<String, sqlx::Error> {
        let name = format!("{}-{}", seed, generate_gift_suffix());
        let url = format!("{}/gifts/{}", self.base_url, name);

        sqlx::query(
            r#"
            INSERT INTO newsletter_gifts (id, name, url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&url)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(url)
    }
}

impl GiftCreator for GiftGenerator {
    async fn create_and_save_newsletter_gift(
        &self,
        seed: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let url = self.create_gift(seed).await?;

        Ok(url)
    }
}

fn generate_gift_suffix() -> String {
    let mut rng = rand::thread_rng();

    std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(GIFT_SUFFIX_LENGTH)
        .collect()
}
