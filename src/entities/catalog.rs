use serde::{Deserialize, Serialize};

use super::{lenient, ICON_LIMIT, IMAGE_LIMIT};
use crate::form::{FieldSpec, FormDraft, FormSchema};
use crate::resource::Resource;

/// Top-level topic area ("Solar Energy", "EV Technology", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const DOMAIN_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::text("name").required(),
    FieldSpec::text("slug"),
    FieldSpec::text("description"),
    FieldSpec::flag("isActive"),
    FieldSpec::file("image", IMAGE_LIMIT),
] };

impl Resource for Domain {
    const PATH: &'static str = "domain";
    const LABEL: &'static str = "Domain";
    const SCHEMA: &'static FormSchema = &DOMAIN_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    // A domain is its own scope.
    fn domain_id(&self) -> i64 { self.id }

    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.slug.as_str(), self.description.as_str()]
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("name", self.name.as_str())
            .prefill("slug", self.slug.as_str())
            .prefill("description", self.description.as_str())
            .prefill("isActive", self.is_active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub fee: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub discount_fee: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub lessons: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const COURSE_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("slug"),
    FieldSpec::text("description"),
    FieldSpec::text("duration"),
    FieldSpec::number("fee"),
    FieldSpec::number("discountFee"),
    FieldSpec::number("lessons"),
    FieldSpec::flag("isActive"),
    FieldSpec::file("image", IMAGE_LIMIT),
] };

impl Resource for Course {
    const PATH: &'static str = "courses";
    const LABEL: &'static str = "Course";
    const SCHEMA: &'static FormSchema = &COURSE_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.id }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.slug.as_str(), self.duration.as_str()]
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("title", self.title.as_str())
            .prefill("slug", self.slug.as_str())
            .prefill("description", self.description.as_str())
            .prefill("duration", self.duration.as_str())
            .prefill("fee", self.fee)
            .prefill("discountFee", self.discount_fee)
            .prefill("lessons", self.lessons)
            .prefill("isActive", self.is_active)
    }
}

/// Syllabus module of a course; `topics` lists its lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub order: i64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const MODULE_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("description"),
    FieldSpec::number("order"),
    FieldSpec::json("topics"),
    FieldSpec::flag("isActive"),
] };

impl Resource for Module {
    const PATH: &'static str = "modules";
    const LABEL: &'static str = "Module";
    const SCHEMA: &'static FormSchema = &MODULE_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.title.as_str(), self.description.as_str()];
        out.extend(self.topics.iter().map(String::as_str));
        out
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("description", self.description.as_str())
            .prefill("order", self.order)
            .prefill("topics", serde_json::json!(self.topics))
            .prefill("isActive", self.is_active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const CERTIFICATE_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("description"),
    FieldSpec::flag("isActive"),
    FieldSpec::file("image", IMAGE_LIMIT),
] };

impl Resource for Certificate {
    const PATH: &'static str = "certificate";
    const LABEL: &'static str = "Certificate";
    const SCHEMA: &'static FormSchema = &CERTIFICATE_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> { vec![self.title.as_str(), self.description.as_str()] }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("description", self.description.as_str())
            .prefill("isActive", self.is_active)
    }
}

/// Technology logo shown in a course's "tools you'll learn" strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub order: i64,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const TECH_STACK_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("name").required(),
    FieldSpec::number("order"),
    FieldSpec::flag("isActive"),
    FieldSpec::file("icon", ICON_LIMIT),
] };

impl Resource for TechStack {
    const PATH: &'static str = "tech-stack";
    const LABEL: &'static str = "Tech stack icon";
    const SCHEMA: &'static FormSchema = &TECH_STACK_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> { vec![self.name.as_str()] }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("name", self.name.as_str())
            .prefill("order", self.order)
            .prefill("isActive", self.is_active)
    }
}
