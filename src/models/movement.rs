// src/models/movement.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::validator::{Validator, is_unique};

/// Represents the 'movements' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movement {
    pub id: i64,

    #[serde(skip)]
    pub created_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub details: MovementDetails,

    /// Starts at 1 and is incremented on every successful update.
    pub version: i32,
}

/// The client-editable part of a movement.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementDetails {
    pub name: String,
    pub description: String,
    pub image: String,
    /// Tutorial links (videos, blog posts).
    pub tutorials: Vec<String>,
    /// Categories such as "vault" or "climb".
    pub skilltype: Vec<String>,
    pub muscles: Vec<String>,
    /// Beginner, Intermediate or Advanced.
    pub difficulty: String,
    pub equipments: Vec<String>,
    #[serde(rename = "prerequisite")]
    pub prerequisites: Vec<String>,
}

/// Search parameters for listing movements. Empty values match everything.
#[derive(Debug, Clone, Default)]
pub struct MovementSearch {
    /// Full-text match on the name.
    pub name: String,
    /// Case-insensitive equality.
    pub difficulty: String,
    /// The movement must carry every listed value.
    pub skilltype: Vec<String>,
    pub muscles: Vec<String>,
    pub equipments: Vec<String>,
}

/// DTO for a partial update. Absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovementRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tutorials: Option<Vec<String>>,
    pub skilltype: Option<Vec<String>>,
    pub muscles: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub equipments: Option<Vec<String>>,
    #[serde(rename = "prerequisite")]
    pub prerequisites: Option<Vec<String>>,
    /// Version the client last read; a mismatch is an edit conflict.
    pub version: Option<i32>,
}

impl UpdateMovementRequest {
    pub fn apply(self, details: &mut MovementDetails) {
        if let Some(name) = self.name {
            details.name = name;
        }
        if let Some(description) = self.description {
            details.description = description;
        }
        if let Some(image) = self.image {
            details.image = image;
        }
        if let Some(tutorials) = self.tutorials {
            details.tutorials = tutorials;
        }
        if let Some(skilltype) = self.skilltype {
            details.skilltype = skilltype;
        }
        if let Some(muscles) = self.muscles {
            details.muscles = muscles;
        }
        if let Some(difficulty) = self.difficulty {
            details.difficulty = difficulty;
        }
        if let Some(equipments) = self.equipments {
            details.equipments = equipments;
        }
        if let Some(prerequisites) = self.prerequisites {
            details.prerequisites = prerequisites;
        }
    }
}

pub fn validate_movement(v: &mut Validator, input: &MovementDetails) {
    v.check(input.name.is_empty(), "name", "must be provided");
    v.check(input.name.len() > 256, "name", "must not be more than 256 bytes long");

    v.check(input.description.is_empty(), "description", "must be provided");
    v.check(input.image.is_empty(), "image", "must be provided");
    v.check(input.difficulty.is_empty(), "difficulty", "must be provided");

    v.check(input.tutorials.is_empty(), "tutorials", "must be provided");
    v.check(input.skilltype.is_empty(), "skilltype", "must be provided");
    v.check(input.muscles.is_empty(), "muscles", "must be provided");
    v.check(input.equipments.is_empty(), "equipments", "must be provided");

    for (key, values) in [
        ("tutorials", &input.tutorials),
        ("skilltype", &input.skilltype),
        ("muscles", &input.muscles),
        ("equipments", &input.equipments),
        ("prerequisites", &input.prerequisites),
    ] {
        v.check(!is_unique(values), key, "must not contain duplicate values");
    }
}
