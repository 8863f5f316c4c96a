//! CV record types.
//!
//! Field names follow the JSON documents the site already stores, hence the
//! camelCase renames.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    pub personal_info: PersonalInfo,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<SkillCategory>,
    pub projects: Vec<Project>,
    pub courses: Vec<Course>,
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub photo: String,
    pub summary: String,
    pub links: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub portfolio: String,
    pub linkedin: String,
    pub github: String,
    pub youtube: String,
    pub instagram: String,
    pub artstation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub id: String,
    pub position: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub responsibilities: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub degree: String,
    pub institution: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: SkillLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: String,
    pub category: String,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub completed_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageLevel {
    Beginner,
    Intermediate,
    Advanced,
    Native,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub level: LanguageLevel,
}

/// Top-level section of a CV, addressable by updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    PersonalInfo,
    WorkExperience,
    Education,
    Skills,
    Projects,
    Courses,
    Languages,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::PersonalInfo,
        Section::WorkExperience,
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Courses,
        Section::Languages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::PersonalInfo => "personalInfo",
            Section::WorkExperience => "workExperience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Courses => "courses",
            Section::Languages => "languages",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Section must be one of: {}",
                    Section::ALL.map(Section::as_str).join(", ")
                )
            })
    }
}

/// Validated replacement content for one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    PersonalInfo(PersonalInfo),
    WorkExperience(Vec<WorkExperience>),
    Education(Vec<Education>),
    Skills(Vec<SkillCategory>),
    Projects(Vec<Project>),
    Courses(Vec<Course>),
    Languages(Vec<Language>),
}

impl SectionData {
    pub fn section(&self) -> Section {
        match self {
            SectionData::PersonalInfo(_) => Section::PersonalInfo,
            SectionData::WorkExperience(_) => Section::WorkExperience,
            SectionData::Education(_) => Section::Education,
            SectionData::Skills(_) => Section::Skills,
            SectionData::Projects(_) => Section::Projects,
            SectionData::Courses(_) => Section::Courses,
            SectionData::Languages(_) => Section::Languages,
        }
    }

    /// Overwrite the matching section of `cv`.
    pub fn apply_to(self, cv: &mut CvData) {
        match self {
            SectionData::PersonalInfo(v) => cv.personal_info = v,
            SectionData::WorkExperience(v) => cv.work_experience = v,
            SectionData::Education(v) => cv.education = v,
            SectionData::Skills(v) => cv.skills = v,
            SectionData::Projects(v) => cv.projects = v,
            SectionData::Courses(v) => cv.courses = v,
            SectionData::Languages(v) => cv.languages = v,
        }
    }
}

/// Body of a section update request: `{ "section": ..., "data": ... }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CvUpdate {
    pub section: String,
    pub data: serde_json::Value,
}
