//! Event catalog.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use eventz_common::{AppError, AppResult, IdGenerator};
use eventz_db::{
    entities::{
        event::{self, EventStatus},
        ticket_tier::{self, TicketType},
    },
    repositories::{EventFilter, EventRepository, TicketTierRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

/// A ticket tier as submitted by the organizer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TicketTierInput {
    #[serde(rename = "type")]
    pub tier_type: TicketType,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(range(min = 0))]
    pub price: i64,

    #[validate(range(min = 1))]
    pub quantity: i32,

    /// Only honored on update. Clamped to `quantity`.
    #[validate(range(min = 0))]
    pub available: Option<i32>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Input for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 10_000))]
    pub description: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(length(min = 1, max = 16))]
    pub start_time: String,

    #[validate(length(min = 1, max = 16))]
    pub end_time: String,

    #[validate(length(min = 1, max = 300))]
    pub location: String,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[serde(default)]
    pub media_urls: Vec<String>,

    #[validate(range(min = 1))]
    pub capacity: i32,

    #[validate(length(min = 1), nested)]
    pub tickets: Vec<TicketTierInput>,
}

/// Input for updating an event. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 10_000))]
    pub description: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 16))]
    pub start_time: Option<String>,

    #[validate(length(min = 1, max = 16))]
    pub end_time: Option<String>,

    #[validate(length(min = 1, max = 300))]
    pub location: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    pub media_urls: Option<Vec<String>>,

    #[validate(range(min = 1))]
    pub capacity: Option<i32>,

    /// Replaces every tier when present.
    #[validate(nested)]
    pub tickets: Option<Vec<TicketTierInput>>,
}

/// An event with its tiers, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWithTiers {
    pub event: event::Model,
    pub tiers: Vec<ticket_tier::Model>,
}

/// Event service for business logic.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    tier_repo: TicketTierRepository,
    id_gen: IdGenerator,
}

/// Check tier rules against the event capacity.
fn validate_tiers(tiers: &[TicketTierInput], capacity: i32) -> AppResult<()> {
    let mut seen = HashSet::new();
    for tier in tiers {
        if !seen.insert(tier.tier_type) {
            return Err(AppError::Validation(format!(
                "Duplicate ticket type {}",
                tier.tier_type.as_str()
            )));
        }
        if tier.price < 0 {
            return Err(AppError::Validation("Ticket price cannot be negative".to_string()));
        }
        if tier.quantity <= 0 {
            return Err(AppError::Validation(
                "Ticket quantity must be positive".to_string(),
            ));
        }
    }

    let total: i64 = tiers.iter().map(|t| i64::from(t.quantity)).sum();
    if total > i64::from(capacity) {
        return Err(AppError::Validation(format!(
            "Total ticket quantity ({total}) exceeds event capacity ({capacity})"
        )));
    }

    Ok(())
}

fn validate_dates(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::Validation(
            "End date cannot be before start date".to_string(),
        ));
    }
    Ok(())
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub fn new(event_repo: EventRepository, tier_repo: TicketTierRepository) -> Self {
        Self {
            event_repo,
            tier_repo,
            id_gen: IdGenerator::new(),
        }
    }

    fn tier_models(
        &self,
        event_id: &str,
        tiers: &[TicketTierInput],
        keep_available: bool,
    ) -> Vec<ticket_tier::ActiveModel> {
        tiers
            .iter()
            .zip(0..)
            .map(|(tier, position)| {
                let available = if keep_available {
                    tier.available.unwrap_or(tier.quantity).clamp(0, tier.quantity)
                } else {
                    tier.quantity
                };
                ticket_tier::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    event_id: Set(event_id.to_string()),
                    tier_type: Set(tier.tier_type),
                    name: Set(tier.name.trim().to_string()),
                    price: Set(tier.price),
                    quantity: Set(tier.quantity),
                    available: Set(available),
                    description: Set(tier.description.clone()),
                    position: Set(position),
                }
            })
            .collect()
    }

    /// Create an event in draft state.
    pub async fn create(
        &self,
        organizer_id: &str,
        input: CreateEventInput,
    ) -> AppResult<EventWithTiers> {
        input.validate()?;
        validate_dates(input.start_date, input.end_date)?;
        validate_tiers(&input.tickets, input.capacity)?;

        let event_id = self.id_gen.generate();
        let tiers = self.tier_models(&event_id, &input.tickets, false);

        let model = event::ActiveModel {
            id: Set(event_id.clone()),
            organizer_id: Set(organizer_id.to_string()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            location: Set(input.location),
            city: Set(input.city),
            category: Set(input.category),
            media_urls: Set(json!(input.media_urls)),
            capacity: Set(input.capacity),
            status: Set(EventStatus::Draft),
            total_registrations: Set(0),
            total_revenue: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let event = self.event_repo.create_with_tiers(model, tiers).await?;
        info!(event_id = %event.id, organizer_id = %organizer_id, "Event created");

        let tiers = self.tier_repo.find_by_event(&event.id).await?;
        Ok(EventWithTiers { event, tiers })
    }

    /// Public listing, published events by default.
    pub async fn list(&self, filter: &EventFilter) -> AppResult<Vec<EventWithTiers>> {
        let events = self.event_repo.list(filter).await?;
        self.attach_tiers(events).await
    }

    pub async fn get(&self, event_id: &str) -> AppResult<EventWithTiers> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let tiers = self.tier_repo.find_by_event(&event.id).await?;
        Ok(EventWithTiers { event, tiers })
    }

    /// Events of one organizer, newest first.
    pub async fn my_events(&self, organizer_id: &str) -> AppResult<Vec<EventWithTiers>> {
        let events = self.event_repo.find_by_organizer(organizer_id).await?;
        self.attach_tiers(events).await
    }

    /// Load an event, failing unless `organizer_id` owns it.
    pub async fn owned_event(&self, organizer_id: &str, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.organizer_id != organizer_id {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }
        Ok(event)
    }

    pub async fn update(
        &self,
        organizer_id: &str,
        event_id: &str,
        input: UpdateEventInput,
    ) -> AppResult<EventWithTiers> {
        input.validate()?;

        let current = self.owned_event(organizer_id, event_id).await?;

        let start_date = input.start_date.unwrap_or(current.start_date);
        let end_date = input.end_date.unwrap_or(current.end_date);
        validate_dates(start_date, end_date)?;

        let capacity = input.capacity.unwrap_or(current.capacity);
        match &input.tickets {
            Some(tickets) => validate_tiers(tickets, capacity)?,
            None if input.capacity.is_some() => {
                let existing: i64 = self
                    .tier_repo
                    .find_by_event(event_id)
                    .await?
                    .iter()
                    .map(|t| i64::from(t.quantity))
                    .sum();
                if existing > i64::from(capacity) {
                    return Err(AppError::Validation(format!(
                        "Total ticket quantity ({existing}) exceeds event capacity ({capacity})"
                    )));
                }
            }
            None => {}
        }

        let tiers = input
            .tickets
            .as_deref()
            .map(|tickets| self.tier_models(event_id, tickets, true));

        let mut active: event::ActiveModel = current.into();
        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(start_time) = input.start_time {
            active.start_time = Set(start_time);
        }
        if let Some(end_time) = input.end_time {
            active.end_time = Set(end_time);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(media_urls) = input.media_urls {
            active.media_urls = Set(json!(media_urls));
        }
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);
        active.capacity = Set(capacity);
        active.updated_at = Set(Some(Utc::now().into()));

        let event = self.event_repo.update_with_tiers(active, tiers).await?;
        let tiers = self.tier_repo.find_by_event(&event.id).await?;
        Ok(EventWithTiers { event, tiers })
    }

    pub async fn delete(&self, organizer_id: &str, event_id: &str) -> AppResult<()> {
        self.owned_event(organizer_id, event_id).await?;
        self.event_repo.delete(event_id).await?;
        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }

    pub async fn publish(&self, organizer_id: &str, event_id: &str) -> AppResult<event::Model> {
        self.set_status(organizer_id, event_id, EventStatus::Published)
            .await
    }

    pub async fn unpublish(&self, organizer_id: &str, event_id: &str) -> AppResult<event::Model> {
        self.set_status(organizer_id, event_id, EventStatus::Unpublished)
            .await
    }

    pub async fn mark_completed(
        &self,
        organizer_id: &str,
        event_id: &str,
    ) -> AppResult<event::Model> {
        self.set_status(organizer_id, event_id, EventStatus::Completed)
            .await
    }

    async fn set_status(
        &self,
        organizer_id: &str,
        event_id: &str,
        status: EventStatus,
    ) -> AppResult<event::Model> {
        self.owned_event(organizer_id, event_id).await?;
        let event = self.event_repo.set_status(event_id, status).await?;
        info!(event_id = %event_id, status = ?status, "Event status changed");
        Ok(event)
    }

    async fn attach_tiers(&self, events: Vec<event::Model>) -> AppResult<Vec<EventWithTiers>> {
        let ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let mut by_event: HashMap<String, Vec<ticket_tier::Model>> = HashMap::new();
        for tier in self.tier_repo.find_by_events(&ids).await? {
            by_event.entry(tier.event_id.clone()).or_default().push(tier);
        }

        Ok(events
            .into_iter()
            .map(|event| {
                let tiers = by_event.remove(&event.id).unwrap_or_default();
                EventWithTiers { event, tiers }
            })
            .collect())
    }
}
