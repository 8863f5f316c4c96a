//! Section validation for CV updates.
//!
//! A section is first deserialized into its typed form (shape, enums,
//! required fields), then checked against the content rules below. All rule
//! violations are collected before reporting.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::cv::model::{
    Course, Education, Language, PersonalInfo, Project, Section, SectionData, SkillCategory,
    WorkExperience,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvValidationError {
    #[error("{0}")]
    UnknownSection(String),

    #[error("Validation failed for section {section}: {message}")]
    Invalid { section: Section, message: String },
}

/// Parse and validate `data` as the content of `section`.
pub fn validate_section(section: &str, data: Value) -> Result<SectionData, CvValidationError> {
    let section: Section = section.parse().map_err(CvValidationError::UnknownSection)?;

    let mut rules = Rules::default();
    let parsed = match section {
        Section::PersonalInfo => {
            let info: PersonalInfo = parse(section, data)?;
            check_personal_info(&mut rules, &info);
            SectionData::PersonalInfo(info)
        }
        Section::WorkExperience => {
            let items: Vec<WorkExperience> = parse(section, data)?;
            for (i, job) in items.iter().enumerate() {
                check_work_experience(&mut rules, &format!("[{}]", i), job);
            }
            SectionData::WorkExperience(items)
        }
        Section::Education => {
            let items: Vec<Education> = parse(section, data)?;
            for (i, entry) in items.iter().enumerate() {
                let at = format!("[{}]", i);
                rules.required(&at, "id", &entry.id);
                rules.min_len(&at, "degree", &entry.degree, 5);
                rules.min_len(&at, "institution", &entry.institution, 3);
                rules.min_len(&at, "startDate", &entry.start_date, 4);
                rules.min_len(&at, "endDate", &entry.end_date, 4);
            }
            SectionData::Education(items)
        }
        Section::Skills => {
            let items: Vec<SkillCategory> = parse(section, data)?;
            for (i, category) in items.iter().enumerate() {
                let at = format!("[{}]", i);
                rules.required(&at, "id", &category.id);
                rules.min_len(&at, "category", &category.category, 3);
                if category.skills.is_empty() {
                    rules.fail(&at, "skills", "at least one skill is required");
                }
                for (j, skill) in category.skills.iter().enumerate() {
                    let at = format!("{}.skills[{}]", at, j);
                    rules.min_len(&at, "name", &skill.name, 2);
                    if skill.years.is_some_and(|y| y < 0.0) {
                        rules.fail(&at, "years", "must be non-negative");
                    }
                }
            }
            SectionData::Skills(items)
        }
        Section::Projects => {
            let items: Vec<Project> = parse(section, data)?;
            for (i, project) in items.iter().enumerate() {
                check_project(&mut rules, &format!("[{}]", i), project);
            }
            SectionData::Projects(items)
        }
        Section::Courses => {
            let items: Vec<Course> = parse(section, data)?;
            for (i, course) in items.iter().enumerate() {
                let at = format!("[{}]", i);
                rules.required(&at, "id", &course.id);
                rules.min_len(&at, "name", &course.name, 5);
                rules.min_len(&at, "provider", &course.provider, 3);
                rules.min_len(&at, "completedDate", &course.completed_date, 4);
                if let Some(url) = &course.certificate_url {
                    rules.url(&at, "certificateUrl", url);
                }
            }
            SectionData::Courses(items)
        }
        Section::Languages => {
            let items: Vec<Language> = parse(section, data)?;
            for (i, language) in items.iter().enumerate() {
                let at = format!("[{}]", i);
                rules.required(&at, "id", &language.id);
                rules.min_len(&at, "name", &language.name, 2);
            }
            SectionData::Languages(items)
        }
    };

    rules.finish(section)?;
    Ok(parsed)
}

fn parse<T: DeserializeOwned>(section: Section, data: Value) -> Result<T, CvValidationError> {
    serde_json::from_value(data).map_err(|e| CvValidationError::Invalid {
        section,
        message: e.to_string(),
    })
}

fn check_personal_info(rules: &mut Rules, info: &PersonalInfo) {
    rules.min_len("", "name", &info.name, 2);
    rules.min_len("", "title", &info.title, 5);
    rules.email("", "email", &info.email);
    rules.min_len("", "phone", &info.phone, 10);
    rules.min_len("", "location", &info.location, 3);
    rules.url("", "photo", &info.photo);
    rules.min_len("", "summary", &info.summary, 50);

    let links = &info.links;
    for (field, value) in [
        ("links.portfolio", &links.portfolio),
        ("links.linkedin", &links.linkedin),
        ("links.github", &links.github),
        ("links.youtube", &links.youtube),
        ("links.instagram", &links.instagram),
        ("links.artstation", &links.artstation),
    ] {
        rules.url("", field, value);
    }
}

fn check_work_experience(rules: &mut Rules, at: &str, job: &WorkExperience) {
    rules.required(at, "id", &job.id);
    rules.min_len(at, "position", &job.position, 3);
    rules.min_len(at, "company", &job.company, 2);
    rules.min_len(at, "startDate", &job.start_date, 4);
    rules.min_len(at, "endDate", &job.end_date, 4);
    for line in &job.responsibilities {
        rules.min_len(at, "responsibilities", line, 10);
    }
    for line in &job.achievements {
        rules.min_len(at, "achievements", line, 10);
    }
}

fn check_project(rules: &mut Rules, at: &str, project: &Project) {
    rules.required(at, "id", &project.id);
    rules.min_len(at, "name", &project.name, 3);
    rules.min_len(at, "description", &project.description, 20);
    for tech in &project.technologies {
        rules.min_len(at, "technologies", tech, 2);
    }
    if let Some(github) = &project.github {
        rules.url(at, "github", github);
    }
    if let Some(url) = &project.url {
        rules.url(at, "url", url);
    }
    rules.min_len(at, "startDate", &project.start_date, 4);
    if let Some(end) = &project.end_date {
        rules.min_len(at, "endDate", end, 4);
    }
    for line in &project.achievements {
        rules.min_len(at, "achievements", line, 10);
    }
}

#[derive(Default)]
struct Rules {
    problems: Vec<String>,
}

impl Rules {
    fn fail(&mut self, at: &str, field: &str, message: &str) {
        let path = if at.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", at, field)
        };
        self.problems.push(format!("{} {}", path, message));
    }

    fn required(&mut self, at: &str, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.fail(at, field, "is required");
        }
    }

    fn min_len(&mut self, at: &str, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.fail(at, field, &format!("must be at least {} characters", min));
        }
    }

    fn url(&mut self, at: &str, field: &str, value: &str) {
        if url::Url::parse(value).is_err() {
            self.fail(at, field, "must be a valid URL");
        }
    }

    fn email(&mut self, at: &str, field: &str, value: &str) {
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.fail(at, field, "must be a valid email");
        }
    }

    fn finish(self, section: Section) -> Result<(), CvValidationError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(CvValidationError::Invalid {
                section,
                message: self.problems.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::model::SkillLevel;
    use serde_json::json;

    #[test]
    fn valid_skills_section_parses() {
        let data = json!([{
            "id": "lang",
            "category": "Languages",
            "skills": [
                { "name": "Rust", "level": "Expert", "years": 6 },
                { "name": "Go", "level": "Advanced" }
            ]
        }]);
        let SectionData::Skills(categories) = validate_section("skills", data).unwrap() else {
            panic!("wrong section");
        };
        assert_eq!(categories[0].skills[0].level, SkillLevel::Expert);
        assert_eq!(categories[0].skills[1].years, None);
    }

    #[test]
    fn unknown_section_lists_the_valid_ones() {
        let err = validate_section("hobbies", json!([])).unwrap_err();
        assert!(matches!(err, CvValidationError::UnknownSection(_)));
        assert!(err.to_string().contains("personalInfo, workExperience"));
    }

    #[test]
    fn shape_errors_name_the_section() {
        let err = validate_section("languages", json!([{ "id": "en", "name": "English", "level": "Fluent" }]))
            .unwrap_err();
        assert!(err.to_string().starts_with("Validation failed for section languages"));
    }

    #[test]
    fn rule_violations_are_collected() {
        let data = json!([{
            "id": "",
            "category": "X",
            "skills": []
        }]);
        let CvValidationError::Invalid { section, message } =
            validate_section("skills", data).unwrap_err()
        else {
            panic!("expected rule violations");
        };
        assert_eq!(section, Section::Skills);
        assert_eq!(
            message,
            "[0].id is required; [0].category must be at least 3 characters; \
             [0].skills at least one skill is required"
        );
    }

    #[test]
    fn personal_info_checks_urls_and_email() {
        let data = json!({
            "name": "Ada Lovelace",
            "title": "Analyst",
            "email": "ada@example",
            "phone": "+44 20 7946 0000",
            "location": "London",
            "photo": "not a url",
            "summary": "Mathematician and writer, known for work on the Analytical Engine.",
            "links": {
                "portfolio": "https://ada.example.org",
                "linkedin": "https://linkedin.com/in/ada",
                "github": "https://github.com/ada",
                "youtube": "https://youtube.com/@ada",
                "instagram": "https://instagram.com/ada",
                "artstation": "https://artstation.com/ada"
            }
        });
        let err = validate_section("personalInfo", data).unwrap_err().to_string();
        assert!(err.contains("email must be a valid email"), "{}", err);
        assert!(err.contains("photo must be a valid URL"), "{}", err);
        assert!(!err.contains("links."), "{}", err);
    }

    #[test]
    fn shipped_seed_passes_every_section_rule() {
        let seed: Value = serde_json::from_str(include_str!("../../config/cv.json")).unwrap();
        for section in Section::ALL {
            let data = seed[section.as_str()].clone();
            assert!(
                validate_section(section.as_str(), data).is_ok(),
                "section {} failed",
                section
            );
        }
    }
}
