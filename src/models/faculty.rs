use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};
use crate::types::ApprovalStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacultyType {
    Internal,
    External,
}

impl FacultyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacultyType::Internal => "internal",
            FacultyType::External => "external",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseHandled {
    pub course_name: String,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub sessions: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: Uuid,
    pub faculty_type: FacultyType,
    pub name: String,
    pub cadre: Option<String>,
    pub year_of_allotment: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub photo_url: Option<String>,
    pub institution: Option<String>,
    pub domain_knowledge: Vec<String>,
    pub areas_of_expertise: Vec<String>,
    pub courses_handled: Vec<CourseHandled>,
    pub publications: Vec<Publication>,
    pub awards: Vec<String>,
    pub other_responsibilities: Vec<String>,
    pub status: ApprovalStatus,
    pub entered_by: String,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Faculty {
    const COLLECTION: Collection = Collection::Faculty;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Body of `POST /api/faculty/save` and `PUT /api/faculty/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct FacultyInput {
    pub faculty_type: FacultyType,
    pub name: String,
    #[serde(default)]
    pub cadre: Option<String>,
    #[serde(default)]
    pub year_of_allotment: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub domain_knowledge: Vec<String>,
    #[serde(default)]
    pub areas_of_expertise: Vec<String>,
    #[serde(default)]
    pub courses_handled: Vec<CourseHandled>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(default)]
    pub other_responsibilities: Vec<String>,
}
