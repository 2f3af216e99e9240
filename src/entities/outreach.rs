use serde::{Deserialize, Serialize};

use super::{lenient, Step, IMAGE_LIMIT};
use crate::form::{FieldSpec, FormDraft, FormSchema};
use crate::resource::Resource;

/// Testimonial from a placed student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSuccess {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub review: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rating: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const STUDENT_SUCCESS_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("name").required(),
    FieldSpec::text("role"),
    FieldSpec::text("company"),
    FieldSpec::text("review").required(),
    FieldSpec::number("rating"),
    FieldSpec::flag("isActive"),
    FieldSpec::file("image", IMAGE_LIMIT),
] };

impl Resource for StudentSuccess {
    const PATH: &'static str = "student-success";
    const LABEL: &'static str = "Testimonial";
    const SCHEMA: &'static FormSchema = &STUDENT_SUCCESS_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.role.as_str(), self.company.as_str(), self.review.as_str()]
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("name", self.name.as_str())
            .prefill("role", self.role.as_str())
            .prefill("company", self.company.as_str())
            .prefill("review", self.review.as_str())
            .prefill("rating", self.rating)
            .prefill("isActive", self.is_active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerImpact {
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
    #[serde(default, deserialize_with = "lenient::list")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const CAREER_IMPACT_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("description"),
    FieldSpec::json("steps"),
    FieldSpec::flag("isActive"),
] };

impl Resource for CareerImpact {
    const PATH: &'static str = "career-impact";
    const LABEL: &'static str = "Career impact";
    const SCHEMA: &'static FormSchema = &CAREER_IMPACT_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.title.as_str(), self.description.as_str()];
        out.extend(self.steps.iter().map(|s| s.title.as_str()));
        out
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("title", self.title.as_str())
            .prefill("description", self.description.as_str())
            .prefill("steps", serde_json::json!(self.steps))
            .prefill("isActive", self.is_active)
    }
}

/// "How to enroll" card: an illustration plus ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollCard {
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
    #[serde(default, deserialize_with = "lenient::list")]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const ENROLL_CARD_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("title").required(),
    FieldSpec::text("description"),
    FieldSpec::json("steps").companion(),
    FieldSpec::flag("isActive"),
    FieldSpec::file("image", IMAGE_LIMIT),
] };

impl Resource for EnrollCard {
    const PATH: &'static str = "enroll-cards";
    const LABEL: &'static str = "Enroll card";
    const SCHEMA: &'static FormSchema = &ENROLL_CARD_FORM;

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
            .prefill("steps", serde_json::json!(self.steps))
            .prefill("isActive", self.is_active)
    }
}

/// Enquiry submitted through the public site's enrollment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub domain_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub course_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    /// Follow-up state, e.g. `pending` or `contacted`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

const ENROLLMENT_FORM: FormSchema = FormSchema { fields: &[
    FieldSpec::number("domainId"),
    FieldSpec::number("courseId"),
    FieldSpec::text("name").required(),
    FieldSpec::text("email").required(),
    FieldSpec::text("phone"),
    FieldSpec::text("message"),
    FieldSpec::text("status"),
    FieldSpec::flag("isActive"),
] };

impl Resource for Enrollment {
    const PATH: &'static str = "enrollments";
    const LABEL: &'static str = "Enrollment request";
    const SCHEMA: &'static FormSchema = &ENROLLMENT_FORM;

    fn id(&self) -> i64 { self.id }
    fn is_active(&self) -> bool { self.is_active }
    fn set_active(&mut self, active: bool) { self.is_active = active; }
    fn domain_id(&self) -> i64 { self.domain_id }
    fn course_id(&self) -> i64 { self.course_id }

    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str(), self.status.as_str()]
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(Self::SCHEMA)
            .prefill("domainId", self.domain_id)
            .prefill("courseId", self.course_id)
            .prefill("name", self.name.as_str())
            .prefill("email", self.email.as_str())
            .prefill("phone", self.phone.as_str())
            .prefill("message", self.message.as_str())
            .prefill("status", self.status.as_str())
            .prefill("isActive", self.is_active)
    }
}

/// One bulk email send. An empty recipient list means every enrollment request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmail {
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl BulkEmail {
    pub const PATH: &'static str = "bulk-email";

    /// Subject and body must be non-blank; recipients must look like addresses.
    pub fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject is required".into());
        }
        if self.message.trim().is_empty() {
            return Err("message is required".into());
        }
        if let Some(bad) = self.recipients.iter().find(|r| !looks_like_email(r)) {
            return Err(format!("`{bad}` is not an email address"));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((user, host)) => {
            !user.is_empty() && host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_email_validation() {
        let mut mail = BulkEmail {
            subject: "Batch starts Monday".into(),
            message: "See you".into(),
            recipients: vec![],
        };
        assert!(mail.validate().is_ok());
        mail.recipients = vec!["a@b.co".into(), "nope".into()];
        assert_eq!(mail.validate().unwrap_err(), "`nope` is not an email address");
        mail.recipients.clear();
        mail.subject = "  ".into();
        assert!(mail.validate().is_err());
    }

    #[test]
    fn enrollment_accepts_stringly_scalars() {
        let e: Enrollment = serde_json::from_str(
            r#"{"id":5,"name":"Asha","email":"asha@example.com","courseId":"3","status":"pending",
                "createdAt":"2024-06-01T10:00:00Z","isActive":"true"}"#,
        )
        .unwrap();
        assert_eq!(e.course_id, 3);
        assert!(e.is_active);
        assert_eq!(e.created_at.as_deref(), Some("2024-06-01T10:00:00Z"));
    }
}
