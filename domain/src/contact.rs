use serde_json::{Value, json};

/// Inquiry categories offered by the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryType {
    Course,
    Membership,
    Partnership,
    Event,
    Technical,
    Feedback,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl InquiryType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "course" => Some(InquiryType::Course),
            "membership" => Some(InquiryType::Membership),
            "partnership" => Some(InquiryType::Partnership),
            "event" => Some(InquiryType::Event),
            "technical" => Some(InquiryType::Technical),
            "feedback" => Some(InquiryType::Feedback),
            "other" => Some(InquiryType::Other),
            _ => None,
        }
    }

    pub fn priority(self) -> Priority {
        match self {
            InquiryType::Technical | InquiryType::Partnership => Priority::High,
            InquiryType::Feedback => Priority::Low,
            _ => Priority::Normal,
        }
    }

    /// Placeholder suggestion shown in the subject field when a type is
    /// selected and the subject is still empty.
    pub fn suggested_subject(self) -> Option<&'static str> {
        match self {
            InquiryType::Course => Some("課程相關諮詢"),
            InquiryType::Membership => Some("會員權益問題"),
            InquiryType::Partnership => Some("合作提案"),
            InquiryType::Event => Some("活動報名諮詢"),
            InquiryType::Technical => Some("技術問題反映"),
            InquiryType::Feedback => Some("意見回饋"),
            InquiryType::Other => None,
        }
    }
}

/// Priority for a raw inquiry-type value; unknown types are normal.
pub fn priority_for(raw: &str) -> Priority {
    InquiryType::parse(raw).map_or(Priority::Normal, InquiryType::priority)
}

/// Contact page fields.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub inquiry_type: String,
    pub subject: String,
    pub message: String,
    pub contact_methods: Vec<String>,
    pub agree_privacy: bool,
    pub subscribe_updates: bool,
}

impl ContactForm {
    /// Row for the `contact_forms` table. `member_id` is attached when the
    /// submitter is signed in.
    pub fn record(&self, member_id: Option<&str>) -> Value {
        json!({
            "member_id": member_id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "company": self.company,
            "subject": self.subject,
            "message": self.message,
            "form_type": self.inquiry_type,
            "status": "new",
            "priority": priority_for(&self.inquiry_type).as_str(),
        })
    }
}
