use serde::{Deserialize, Serialize};

use super::{lenient, IMAGE_LIMIT};
use crate::form::{FieldSpec, FormDraft, FormSchema};
use crate::resource::Resource;

/// "About us" section with an image gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const ABOUT_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("subtitle"),
    FieldSpec::text("description").required(),
    FieldSpec::flag("isActive"),
    FieldSpec::json("existingImages").companion(),
    FieldSpec::files("images", IMAGE_LIMIT),
] };

impl Resource for About {
    const PATH: &'static str = "about";
    const LABEL: &'static str = "About section";
    const SCHEMA: &'static FormSchema = &ABOUT_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.subtitle.as_str(), self.description.as_str()]
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("subtitle", self.subtitle.as_str())
            .prefill("description", self.description.as_str())
            .prefill("isActive", self.is_active)
            .prefill("existingImages", serde_json::json!(self.images))
    }
}

/// Landing-page hero banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub button_text: String,
    #[serde(default)]
    pub button_link: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const HERO_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("subtitle"),
    FieldSpec::text("description"),
    FieldSpec::text("buttonText"),
    FieldSpec::text("buttonLink"),
    FieldSpec::flag("isActive"),
    FieldSpec::json("existingImages").companion(),
    FieldSpec::files("images", IMAGE_LIMIT),
] };

impl Resource for Hero {
    const PATH: &'static str = "hero";
    const LABEL: &'static str = "Hero banner";
    const SCHEMA: &'static FormSchema = &HERO_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.subtitle.as_str(), self.button_text.as_str()]
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("subtitle", self.subtitle.as_str())
            .prefill("description", self.description.as_str())
            .prefill("buttonText", self.button_text.as_str())
            .prefill("buttonLink", self.button_link.as_str())
            .prefill("isActive", self.is_active)
            .prefill("existingImages", serde_json::json!(self.images))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub priority: i64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const NOTICE_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("content").required(),
    FieldSpec::text("link"),
    FieldSpec::number("priority"),
    FieldSpec::flag("isActive"),
] };

impl Resource for Notice {
    const PATH: &'static str = "notices";
    const LABEL: &'static str = "Notice";
    const SCHEMA: &'static FormSchema = &NOTICE_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> { vec![self.title.as_str(), self.content.as_str()] }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("content", self.content.as_str())
            .prefill("link", self.link.clone())
            .prefill("priority", self.priority)
            .prefill("isActive", self.is_active)
    }
}

/// One question/answer pair of the site's FAQ chatbot script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqChat {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub order: i64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const FAQ_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("question").required(),
    FieldSpec::text("answer").required(),
    FieldSpec::json("keywords"),
    FieldSpec::number("order"),
    FieldSpec::flag("isActive"),
] };

impl Resource for FaqChat {
    const PATH: &'static str = "faq-chat";
    const LABEL: &'static str = "FAQ entry";
    const SCHEMA: &'static FormSchema = &FAQ_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.question.as_str(), self.answer.as_str()];
        out.extend(self.keywords.iter().map(String::as_str));
        out
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("question", self.question.as_str())
            .prefill("answer", self.answer.as_str())
            .prefill("keywords", serde_json::json!(self.keywords))
            .prefill("order", self.order)
            .prefill("isActive", self.is_active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeShort {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub order: i64,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const SHORT_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("videoUrl").required(),
    FieldSpec::number("order"),
    FieldSpec::flag("isActive"),
    FieldSpec::file("thumbnail", IMAGE_LIMIT),
] };

impl Resource for YoutubeShort {
    const PATH: &'static str = "youtube-short";
    const LABEL: &'static str = "YouTube short";
    const SCHEMA: &'static FormSchema = &SHORT_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> { vec![self.title.as_str(), self.video_url.as_str()] }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("videoUrl", self.video_url.as_str())
            .prefill("order", self.order)
            .prefill("isActive", self.is_active)
    }
}
