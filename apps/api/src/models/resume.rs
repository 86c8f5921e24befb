use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    #[default]
    Complete,
    /// Fallback row for a document whose extraction failed; only provenance is set.
    Incomplete,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Complete => "complete",
            ExtractionStatus::Incomplete => "incomplete",
        }
    }
}

/// One structured result per source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    // Core identity
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    // Professional summary
    pub summary: String,
    pub current_role: Option<String>,
    pub experience: Option<u32>,
    // Skills
    pub skills: Vec<String>,
    pub programming_languages: Vec<String>,
    pub frameworks_tools: Vec<String>,
    pub databases: Vec<String>,
    // Experience
    pub companies: Vec<String>,
    pub job_titles: Vec<String>,
    pub responsibilities: Vec<String>,
    // Education
    pub highest_education: Option<String>,
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub graduation_year: Option<u32>,
    // Projects
    pub projects: Vec<String>,
    pub project_domains: Vec<String>,
    pub certifications: Vec<String>,
    pub links: Vec<String>,
    // ATS intelligence
    pub keywords: Vec<String>,
    pub role_fit: Option<String>,
    pub ats_score: Option<u8>,
    // Provenance
    pub file_name: String,
    pub extraction_status: ExtractionStatus,
}

/// Borrowed view of one model-extracted field, addressed by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Integer(Option<i64>),
    List(&'a [String]),
}

impl ResumeRecord {
    /// Fallback row for a document that could not be extracted.
    pub fn incomplete(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            extraction_status: ExtractionStatus::Incomplete,
            ..Default::default()
        }
    }

    /// Looks up a model-extracted field by its schema name.
    /// Provenance fields are not addressable here.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "fullname" => FieldValue::Text(self.fullname.as_deref()),
            "email" => FieldValue::Text(self.email.as_deref()),
            "phone" => FieldValue::Text(self.phone.as_deref()),
            "location" => FieldValue::Text(self.location.as_deref()),
            "summary" => FieldValue::Text(Some(self.summary.as_str()).filter(|s| !s.is_empty())),
            "current_role" => FieldValue::Text(self.current_role.as_deref()),
            "experience" => FieldValue::Integer(self.experience.map(i64::from)),
            "skills" => FieldValue::List(&self.skills),
            "programming_languages" => FieldValue::List(&self.programming_languages),
            "frameworks_tools" => FieldValue::List(&self.frameworks_tools),
            "databases" => FieldValue::List(&self.databases),
            "companies" => FieldValue::List(&self.companies),
            "job_titles" => FieldValue::List(&self.job_titles),
            "responsibilities" => FieldValue::List(&self.responsibilities),
            "highest_education" => FieldValue::Text(self.highest_education.as_deref()),
            "degree" => FieldValue::Text(self.degree.as_deref()),
            "institution" => FieldValue::Text(self.institution.as_deref()),
            "graduation_year" => FieldValue::Integer(self.graduation_year.map(i64::from)),
            "projects" => FieldValue::List(&self.projects),
            "project_domains" => FieldValue::List(&self.project_domains),
            "certifications" => FieldValue::List(&self.certifications),
            "links" => FieldValue::List(&self.links),
            "keywords" => FieldValue::List(&self.keywords),
            "role_fit" => FieldValue::Text(self.role_fit.as_deref()),
            "ats_score" => FieldValue::Integer(self.ats_score.map(i64::from)),
            _ => return None,
        };
        Some(value)
    }

    /// Sets a text field. Returns false if `name` is not a text field.
    pub fn set_text(&mut self, name: &str, value: Option<String>) -> bool {
        let slot = match name {
            "fullname" => &mut self.fullname,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "location" => &mut self.location,
            "current_role" => &mut self.current_role,
            "highest_education" => &mut self.highest_education,
            "degree" => &mut self.degree,
            "institution" => &mut self.institution,
            "role_fit" => &mut self.role_fit,
            "summary" => {
                self.summary = value.unwrap_or_default();
                return true;
            }
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Sets an integer field. Values that do not fit the field's storage are dropped.
    /// Returns false if `name` is not an integer field.
    pub fn set_integer(&mut self, name: &str, value: Option<i64>) -> bool {
        match name {
            "experience" => self.experience = value.and_then(|v| u32::try_from(v).ok()),
            "graduation_year" => self.graduation_year = value.and_then(|v| u32::try_from(v).ok()),
            "ats_score" => self.ats_score = value.and_then(|v| u8::try_from(v).ok()),
            _ => return false,
        }
        true
    }

    /// Sets a list field. Returns false if `name` is not a list field.
    pub fn set_list(&mut self, name: &str, value: Vec<String>) -> bool {
        let slot = match name {
            "skills" => &mut self.skills,
            "programming_languages" => &mut self.programming_languages,
            "frameworks_tools" => &mut self.frameworks_tools,
            "databases" => &mut self.databases,
            "companies" => &mut self.companies,
            "job_titles" => &mut self.job_titles,
            "responsibilities" => &mut self.responsibilities,
            "projects" => &mut self.projects,
            "project_domains" => &mut self.project_domains,
            "certifications" => &mut self.certifications,
            "links" => &mut self.links,
            "keywords" => &mut self.keywords,
            _ => return false,
        };
        *slot = value;
        true
    }
}
