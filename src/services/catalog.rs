//! # Profession Catalog Service
//!
//! Read access to professions and their ladders, admin maintenance of
//! professions, and the one-shot seeding of the static catalog shipped in
//! `data/catalog.json`.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::{
    NewProfession, Objective, Profession, ProfessionUpdate, ProgressionTier, RecommendedQuest,
};
use crate::store::Store;

const CATALOG_JSON: &str = include_str!("../../data/catalog.json");

/// Static catalog shipped with the binary.
#[derive(Debug)]
pub struct SeedCatalog {
    pub professions: Vec<Profession>,
    pub tiers: Vec<ProgressionTier>,
}

#[derive(Deserialize)]
struct SeedFile {
    professions: Vec<Profession>,
    tiers: Vec<SeedTier>,
}

/// Tier as written in the catalog file. Its objective comes from the text.
#[derive(Deserialize)]
struct SeedTier {
    profession_slug: String,
    niveau: i32,
    titre: String,
    icon: String,
    objectif: String,
    reward: String,
    order_index: i32,
}

impl From<SeedTier> for ProgressionTier {
    fn from(tier: SeedTier) -> Self {
        ProgressionTier {
            objective: Objective::from_objectif(&tier.objectif),
            profession_slug: tier.profession_slug,
            niveau: tier.niveau,
            titre: tier.titre,
            icon: tier.icon,
            objectif: tier.objectif,
            reward: tier.reward,
            order_index: tier.order_index,
        }
    }
}

impl SeedCatalog {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: SeedFile = serde_json::from_str(content)?;
        Ok(Self {
            professions: file.professions,
            tiers: file.tiers.into_iter().map(ProgressionTier::from).collect(),
        })
    }

    /// The catalog embedded at compile time.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        Self::from_json(CATALOG_JSON)
    }
}

/// Outcome of [`CatalogService::seed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadySeeded,
    Seeded { professions: usize, tiers: usize },
}

pub struct CatalogService;

impl CatalogService {
    /// Inserts the static catalog unless any profession already exists.
    ///
    /// The check is on existence only: a store holding a partial catalog is
    /// left as is.
    #[instrument(skip_all, err)]
    pub async fn seed(store: &dyn Store, catalog: &SeedCatalog) -> AppResult<SeedOutcome> {
        let existing = store.count_professions().await?;
        if existing > 0 {
            info!(existing, "Professions already seeded");
            return Ok(SeedOutcome::AlreadySeeded);
        }

        store.insert_professions(&catalog.professions).await?;
        info!(count = catalog.professions.len(), "Seeded professions");

        store.insert_tiers(&catalog.tiers).await?;
        info!(count = catalog.tiers.len(), "Seeded progression tiers");

        Ok(SeedOutcome::Seeded {
            professions: catalog.professions.len(),
            tiers: catalog.tiers.len(),
        })
    }

    /// Active professions sorted by `order_index`.
    pub async fn list_active(store: &dyn Store) -> AppResult<Vec<Profession>> {
        Ok(store.list_professions(true).await?)
    }

    /// Looks up a profession, active or not.
    pub async fn get_by_slug(store: &dyn Store, slug: &str) -> AppResult<Profession> {
        store.get_profession(slug).await?.ok_or_else(|| {
            warn!(%slug, "Profession not found");
            AppError::NotFound("Profession not found")
        })
    }

    /// Looks up a profession that users may select.
    pub async fn get_active(store: &dyn Store, slug: &str) -> AppResult<Profession> {
        let profession = Self::get_by_slug(store, slug).await?;
        if !profession.is_active {
            warn!(%slug, "Profession is inactive");
            return Err(AppError::NotFound("Profession not found"));
        }
        Ok(profession)
    }

    pub async fn tiers_for(store: &dyn Store, slug: &str) -> AppResult<Vec<ProgressionTier>> {
        Ok(store.list_tiers(slug).await?)
    }

    #[instrument(skip_all, fields(slug = %new.slug), err)]
    pub async fn create(store: &dyn Store, new: NewProfession) -> AppResult<Profession> {
        let profession = Profession::from(new);
        store.insert_profession(&profession).await?;
        info!("Profession created");
        Ok(profession)
    }

    #[instrument(skip(store, update), err)]
    pub async fn update(
        store: &dyn Store,
        slug: &str,
        update: ProfessionUpdate,
    ) -> AppResult<Profession> {
        let mut profession = Self::get_by_slug(store, slug).await?;
        update.apply(&mut profession);

        if !store.update_profession(&profession).await? {
            return Err(AppError::NotFound("Profession not found"));
        }
        info!("Profession updated");
        Ok(profession)
    }

    /// Sets or clears (`None`) the admin quest list of a profession.
    #[instrument(skip(store, quests), err)]
    pub async fn set_quest_override(
        store: &dyn Store,
        slug: &str,
        quests: Option<Vec<RecommendedQuest>>,
    ) -> AppResult<Profession> {
        let mut profession = Self::get_by_slug(store, slug).await?;
        profession.quest_override = quests;

        if !store.update_profession(&profession).await? {
            return Err(AppError::NotFound("Profession not found"));
        }
        info!(
            overridden = profession.quest_override.is_some(),
            "Profession quest list updated"
        );
        Ok(profession)
    }
}
