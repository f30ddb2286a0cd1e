use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{
    ensure_pending, record_rejection, require_text, trim_optional, Actor, ServiceContext,
    ServiceError, ServiceResult,
};
use crate::models::{Faculty, FacultyInput, FacultyType, RejectedAsset, RejectionSource};
use crate::store::{DocFilter, Repository};
use crate::types::ApprovalStatus;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacultyFilter {
    pub faculty_type: Option<FacultyType>,
    pub status: Option<ApprovalStatus>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive match against any domain knowledge entry
    pub domain: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl FacultyFilter {
    fn matches(&self, faculty: &Faculty) -> bool {
        let name_ok = match &self.name {
            Some(needle) => faculty.name.to_lowercase().contains(&needle.trim().to_lowercase()),
            None => true,
        };
        let domain_ok = match &self.domain {
            Some(domain) => {
                let domain = domain.trim().to_lowercase();
                faculty
                    .domain_knowledge
                    .iter()
                    .any(|d| d.to_lowercase().contains(&domain))
            }
            None => true,
        };
        name_ok && domain_ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacultyStats {
    pub total: usize,
    pub internal: usize,
    pub external: usize,
    pub pending: usize,
    pub approved: usize,
}

/// Faculty profiles and their verification
#[derive(Clone)]
pub struct FacultyService {
    faculty: Repository<Faculty>,
    rejected: Repository<RejectedAsset>,
}

impl FacultyService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            faculty: ctx.repo(),
            rejected: ctx.repo(),
        }
    }

    pub async fn save_faculty(&self, input: FacultyInput, actor: &Actor) -> ServiceResult<Faculty> {
        let now = Utc::now();
        let mut faculty = Faculty {
            id: Uuid::new_v4(),
            faculty_type: input.faculty_type,
            name: String::new(),
            cadre: None,
            year_of_allotment: None,
            email: None,
            mobile_number: None,
            photo_url: None,
            institution: None,
            domain_knowledge: vec![],
            areas_of_expertise: vec![],
            courses_handled: vec![],
            publications: vec![],
            awards: vec![],
            other_responsibilities: vec![],
            status: ApprovalStatus::Pending,
            entered_by: actor.name.clone(),
            approved_by: None,
            created_at: now,
            updated_at: now,
        };
        apply_input(&mut faculty, input)?;
        self.faculty.insert(&faculty).await?;

        info!(faculty = %faculty.id, user = %actor.name, "Faculty profile saved for verification");
        Ok(faculty)
    }

    /// Any edit sends the profile back for verification
    pub async fn update_faculty(&self, id: Uuid, input: FacultyInput, actor: &Actor) -> ServiceResult<Faculty> {
        let mut faculty = self.faculty.select_404(id).await?;
        apply_input(&mut faculty, input)?;
        faculty.status = ApprovalStatus::Pending;
        faculty.approved_by = None;
        faculty.updated_at = Utc::now();
        self.faculty.replace(&faculty).await?;

        info!(faculty = %id, user = %actor.name, "Faculty profile updated");
        Ok(faculty)
    }

    pub async fn approve_faculty(&self, id: Uuid, actor: &Actor) -> ServiceResult<Faculty> {
        let mut faculty = self.faculty.select_404(id).await?;
        ensure_pending(faculty.status, "Faculty", id)?;

        faculty.status = ApprovalStatus::Approved;
        faculty.approved_by = Some(actor.name.clone());
        faculty.updated_at = Utc::now();
        self.faculty.replace(&faculty).await?;

        info!(faculty = %id, user = %actor.name, "Faculty profile approved");
        Ok(faculty)
    }

    pub async fn reject_faculty(&self, id: Uuid, remarks: &str, actor: &Actor) -> ServiceResult<RejectedAsset> {
        let faculty = self.faculty.select_404(id).await?;
        ensure_pending(faculty.status, "Faculty", id)?;

        let record = record_rejection(&self.rejected, RejectionSource::Faculty, id, &faculty, remarks, actor).await?;
        self.faculty.delete(id).await?;

        info!(faculty = %id, user = %actor.name, "Faculty profile rejected");
        Ok(record)
    }

    pub async fn delete_faculty(&self, id: Uuid, actor: &Actor) -> ServiceResult<()> {
        if !self.faculty.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Faculty {} not found", id)));
        }
        info!(faculty = %id, user = %actor.name, "Faculty profile deleted");
        Ok(())
    }

    pub async fn get_faculty(&self, id: Uuid) -> ServiceResult<Faculty> {
        Ok(self.faculty.select_404(id).await?)
    }

    pub async fn list_faculty(&self, filter: &FacultyFilter) -> ServiceResult<Vec<Faculty>> {
        let stored = DocFilter::new()
            .eq_opt("faculty_type", filter.faculty_type.map(|t| t.as_str()))
            .eq_opt("status", filter.status.map(|s| s.as_str()));

        // name and domain are substring matches, so paging happens after them
        Ok(self
            .faculty
            .select_any(&stored)
            .await?
            .into_iter()
            .filter(|f| filter.matches(f))
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect())
    }

    pub async fn faculty_stats(&self) -> ServiceResult<FacultyStats> {
        let all = self.faculty.select_any(&DocFilter::new()).await?;
        let mut stats = FacultyStats {
            total: all.len(),
            ..Default::default()
        };
        for f in &all {
            match f.faculty_type {
                FacultyType::Internal => stats.internal += 1,
                FacultyType::External => stats.external += 1,
            }
            match f.status {
                ApprovalStatus::Pending => stats.pending += 1,
                ApprovalStatus::Approved => stats.approved += 1,
                ApprovalStatus::Rejected => {}
            }
        }
        Ok(stats)
    }
}

fn apply_input(faculty: &mut Faculty, input: FacultyInput) -> ServiceResult<()> {
    let institution = trim_optional(input.institution);
    if input.faculty_type == FacultyType::External && institution.is_none() {
        return Err(ServiceError::Validation(
            "Institution is required for external faculty".to_string(),
        ));
    }
    if input.courses_handled.iter().any(|c| c.course_name.trim().is_empty()) {
        return Err(ServiceError::Validation("Course name is required".to_string()));
    }

    faculty.faculty_type = input.faculty_type;
    faculty.name = require_text(&input.name, "Name")?;
    faculty.cadre = trim_optional(input.cadre);
    faculty.year_of_allotment = trim_optional(input.year_of_allotment);
    faculty.email = trim_optional(input.email);
    faculty.mobile_number = trim_optional(input.mobile_number);
    faculty.photo_url = trim_optional(input.photo_url);
    faculty.institution = institution;
    faculty.domain_knowledge = clean_list(input.domain_knowledge);
    faculty.areas_of_expertise = clean_list(input.areas_of_expertise);
    faculty.courses_handled = input.courses_handled;
    faculty.publications = input.publications;
    faculty.awards = clean_list(input.awards);
    faculty.other_responsibilities = clean_list(input.other_responsibilities);
    Ok(())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
