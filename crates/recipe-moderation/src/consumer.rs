//! Moderation queue consumer
//!
//! Claims submission records from the durable publish queue, applies the
//! validation gate, moves the recipe's lifecycle state, and triggers
//! notifications. Delivery is at-least-once: only settled records are
//! acknowledged, and anything transient leaves the record claimable for a
//! later poll. The lifecycle-state guard makes redelivered records no-ops.

use crate::validator::ContentValidator;
use recipe_cache::{PublishQueue, QueueRecord, UserProfile, UserProfileCache};
use recipe_core::{
    DomainError, Recipe, RecipeRepository, RecipeStepRepository, UserRepository,
};
use recipe_gateway::NotificationRouter;
use std::sync::Arc;

/// How a claimed record was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Fully processed: state moved and notifications triggered
    Processed,
    /// Dropped without side effects (sentinel, malformed, gone, already settled)
    Skipped,
    /// Left unacknowledged for redelivery on a later poll
    Retry,
}

impl RecordOutcome {
    /// Whether the poll loop should acknowledge the record
    #[must_use]
    pub fn should_ack(self) -> bool {
        !matches!(self, Self::Retry)
    }
}

/// Consumer over the recipe publish queue
pub struct ModerationConsumer {
    queue: PublishQueue,
    recipes: Arc<dyn RecipeRepository>,
    steps: Arc<dyn RecipeStepRepository>,
    users: Arc<dyn UserRepository>,
    profiles: UserProfileCache,
    validator: ContentValidator,
    router: Arc<NotificationRouter>,
    batch_size: usize,
}

impl ModerationConsumer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: PublishQueue,
        recipes: Arc<dyn RecipeRepository>,
        steps: Arc<dyn RecipeStepRepository>,
        users: Arc<dyn UserRepository>,
        profiles: UserProfileCache,
        validator: ContentValidator,
        router: Arc<NotificationRouter>,
        batch_size: usize,
    ) -> Self {
        Self {
            queue,
            recipes,
            steps,
            users,
            profiles,
            validator,
            router,
            batch_size,
        }
    }

    /// Idempotent startup: make sure the stream and consumer group exist.
    ///
    /// An already-existing group is success; any other failure is logged as
    /// a warning and startup continues, since the read path surfaces the
    /// same problem as a recoverable `NOGROUP`.
    pub async fn init(&self) {
        if let Err(e) = self.queue.ensure_group().await {
            tracing::warn!(error = %e, "Consumer group initialization failed");
        }
    }

    /// One polling cycle: claim a batch and settle each record in order.
    pub async fn poll_once(&self) {
        let records = match self.queue.read_batch(self.batch_size, 500).await {
            Ok(records) => records,
            Err(e) => {
                let message = e.to_string();
                if message.contains("NOGROUP") {
                    // Cold-start race: the group may not exist yet
                    tracing::debug!("Consumer group not ready: {message}");
                } else {
                    tracing::error!(error = %message, "Failed to read from publish queue");
                }
                return;
            }
        };

        if records.is_empty() {
            return;
        }

        tracing::debug!(count = records.len(), "Claimed queue records");

        for record in records {
            let outcome = self.process_record(&record).await;
            if outcome.should_ack() {
                if let Err(e) = self.queue.ack(&record.id).await {
                    tracing::error!(entry_id = %record.id, error = %e, "Failed to acknowledge record");
                }
            }
        }
    }

    /// Settle a single record and report how.
    pub async fn process_record(&self, record: &QueueRecord) -> RecordOutcome {
        if record.init {
            tracing::debug!(entry_id = %record.id, "Skipping bootstrap sentinel");
            return RecordOutcome::Skipped;
        }

        let Some((recipe_id, user_id)) = record.fields() else {
            tracing::warn!(entry_id = %record.id, "Malformed queue record, dropping");
            return RecordOutcome::Skipped;
        };

        match self.moderate(recipe_id, user_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // No ack: the record stays claimable and is retried later
                tracing::error!(recipe_id, error = %e, "Failed to process recipe");
                RecordOutcome::Retry
            }
        }
    }

    /// Run the gate against one recipe and persist the verdict.
    async fn moderate(&self, recipe_id: i64, user_id: i64) -> Result<RecordOutcome, DomainError> {
        let Some(mut recipe) = self.recipes.find_by_id(recipe_id).await? else {
            tracing::warn!(recipe_id, "Recipe no longer exists, dropping record");
            return Ok(RecordOutcome::Skipped);
        };

        // Redelivery guard: anything already moved on was settled elsewhere
        if !recipe.is_processing() {
            tracing::debug!(recipe_id, status = %recipe.status, "Recipe not in processing state, skipping");
            return Ok(RecordOutcome::Skipped);
        }

        let steps = self.steps.find_by_recipe(recipe_id).await?;
        let result = self.validator.validate(&recipe, &steps);

        if result.passed {
            self.accept(&mut recipe, user_id).await?;
        } else {
            let reason = result.reason.unwrap_or_default();
            self.reject(&mut recipe, user_id, &reason).await?;
        }

        Ok(RecordOutcome::Processed)
    }

    /// Pre-screening passed: hand the recipe to moderators.
    async fn accept(&self, recipe: &mut Recipe, user_id: i64) -> Result<(), DomainError> {
        recipe.mark_pending();
        self.recipes.update(recipe).await?;

        let author_name = self.resolve_author_name(user_id).await?;

        self.router
            .recipe_submitted(user_id, recipe.id, &recipe.title);
        self.router
            .new_recipe_pending(
                recipe.id,
                &recipe.title,
                user_id,
                &author_name,
                recipe.cover_image.clone(),
            )
            .await;

        tracing::info!(
            recipe_id = recipe.id,
            title = %recipe.title,
            "Recipe passed pre-screening, queued for review"
        );
        Ok(())
    }

    /// Pre-screening failed: return the recipe to the author's drafts.
    async fn reject(
        &self,
        recipe: &mut Recipe,
        user_id: i64,
        reason: &str,
    ) -> Result<(), DomainError> {
        recipe.return_to_draft(format!("Automated check: {reason}"));
        self.recipes.update(recipe).await?;

        self.router
            .recipe_rejected(user_id, recipe.id, &recipe.title, Some(reason));

        tracing::info!(
            recipe_id = recipe.id,
            reason,
            "Recipe failed pre-screening, returned to draft"
        );
        Ok(())
    }

    /// Resolve the author's display name, read-through the profile cache.
    ///
    /// Cache errors degrade to a repository read; a vanished account falls
    /// back to a generated name so the moderator notice still reads.
    async fn resolve_author_name(&self, user_id: i64) -> Result<String, DomainError> {
        match self.profiles.get(user_id).await {
            Ok(Some(profile)) => return Ok(profile.name),
            Ok(None) => {}
            Err(e) => tracing::debug!(user_id, error = %e, "Profile cache read failed"),
        }

        match self.users.find_by_id(user_id).await? {
            Some(user) => {
                let profile = UserProfile::from(&user);
                if let Err(e) = self.profiles.put(&profile).await {
                    tracing::debug!(user_id, error = %e, "Profile cache write failed");
                }
                Ok(profile.name)
            }
            None => Ok(format!("user{user_id}")),
        }
    }
}

impl std::fmt::Debug for ModerationConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationConsumer")
            .field("queue", &self.queue)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
