use crate::core::retry::{classify, RetryConfig, RetryDecision};
use crate::domain::model::{EnquiryDraft, EnquiryRequest, Facility};
use crate::domain::ports::LanguageModel;
use crate::utils::error::ScoutError;

pub const DEFAULT_SUBJECT: &str = "Enquiry for Optometrist Position";
const MAX_REVIEWS_IN_PROMPT: usize = 3;

/// 用語言模型產生求職信；任何失敗都退回固定範本
pub struct EnquiryDrafter<L: LanguageModel> {
    model: L,
    model_name: String,
    retry: RetryConfig,
}

impl<L: LanguageModel> EnquiryDrafter<L> {
    pub fn new(model: L, model_name: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            retry,
        }
    }

    pub async fn draft(&self, request: &EnquiryRequest, facility: Option<&Facility>) -> EnquiryDraft {
        let prompt = build_prompt(request, facility);

        match self.generate_with_retry(&prompt).await {
            Some(text) => {
                let draft = parse_draft(&text);
                if draft.enquiry.is_empty() {
                    // 只有主旨沒有內文
                    tracing::warn!("Model reply has no body, using the template enquiry");
                    return EnquiryDraft {
                        subject: draft.subject,
                        ..fallback_draft(request)
                    };
                }
                draft
            }
            None => {
                tracing::warn!("Falling back to the template enquiry");
                fallback_draft(request)
            }
        }
    }

    async fn generate_with_retry(&self, prompt: &str) -> Option<String> {
        for attempt in 0..self.retry.max_attempts {
            let error = match self.model.generate(&self.model_name, prompt).await {
                Ok(text) if !text.trim().is_empty() => return Some(text),
                Ok(_) => ScoutError::UpstreamResponseError {
                    provider: "Gemini".to_string(),
                    message: "empty text".to_string(),
                },
                Err(e) => e,
            };

            let is_last = attempt + 1 >= self.retry.max_attempts;
            match classify(&error) {
                RetryDecision::Backoff if !is_last => {
                    let delay = self.retry.backoff_delay(attempt);
                    tracing::warn!(
                        "⏳ Rate limited (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        self.retry.max_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Immediate if !is_last => {
                    tracing::warn!(
                        "Enquiry generation attempt {}/{} failed: {}",
                        attempt + 1,
                        self.retry.max_attempts,
                        error
                    );
                }
                RetryDecision::Stop => {
                    tracing::error!("❌ Enquiry generation stopped: {}", error);
                    return None;
                }
                _ => {
                    tracing::error!(
                        "❌ Enquiry generation failed after {} attempts: {}",
                        self.retry.max_attempts,
                        error
                    );
                    return None;
                }
            }
        }
        None
    }
}

pub fn build_prompt(request: &EnquiryRequest, facility: Option<&Facility>) -> String {
    let name = request.facility_name.as_deref().unwrap_or_default();
    let address = request.facility_address.as_deref().unwrap_or_default();
    let or_default = |value: &Option<String>, default: &str| -> String {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    let mut prompt = format!(
        "Generate a professional enquiry email for an optometrist/ophthalmologist position at {name} located at {address}.\n\
         \n\
         Context:\n\
         - Facility: {name}\n\
         - Address: {address}\n\
         - Phone: {phone}\n\
         - Website: {website}\n\
         - Experience Level: {experience}\n\
         - Specialties: {specialties}\n\
         - Additional Message: {message}\n",
        phone = or_default(&request.facility_phone, "Not provided"),
        website = or_default(&request.facility_website, "Not provided"),
        experience = request.user_experience.as_deref().unwrap_or_default(),
        specialties = request
            .specialties_joined()
            .unwrap_or_else(|| "General".to_string()),
        message = or_default(&request.user_message, "None"),
    );

    if let Some(facility) = facility {
        prompt.push_str(&facility_context(facility));
    }

    prompt.push_str(
        "\nRequirements:\n\
         1. Professional and courteous tone\n\
         2. Include relevant medical terminology\n\
         3. Mention specific experience level and specialties\n\
         4. Request information about available positions\n\
         5. Include contact information for follow-up\n\
         6. Keep it concise but comprehensive\n\
         \n\
         Please provide:\n\
         1. A professional subject line\n\
         2. A well-structured email body\n",
    );

    prompt
}

fn facility_context(facility: &Facility) -> String {
    let services = if facility.types.is_empty() {
        "Eye care services".to_string()
    } else {
        facility.types.join(", ")
    };

    let mut features = Vec::new();
    if let Some(rating) = facility.rating {
        features.push(format!("Rated {}/5 stars", rating));
    }
    if facility.opening_hours.as_ref().map(|h| h.open_now).unwrap_or(false) {
        features.push("Currently open".to_string());
    }
    if facility.phone.is_some() {
        features.push("Phone consultation available".to_string());
    }
    if facility.website.is_some() {
        features.push("Online presence".to_string());
    }

    let feedback = facility
        .reviews
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(|reviews| {
            reviews
                .iter()
                .take(MAX_REVIEWS_IN_PROMPT)
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_else(|| "Well-established eye care facility".to_string());

    format!(
        "- Clinic Services: {}\n- Clinic Features: {}\n- Clinic Positive Feedback: {}\n",
        services,
        features.join(", "),
        feedback
    )
}

pub fn parse_draft(text: &str) -> EnquiryDraft {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    match lines.first() {
        Some(first) if first.to_lowercase().contains("subject:") => {
            let subject = strip_subject_marker(first);
            EnquiryDraft {
                subject: if subject.is_empty() {
                    DEFAULT_SUBJECT.to_string()
                } else {
                    subject
                },
                enquiry: lines[1..].join("\n").trim().to_string(),
            }
        }
        _ => EnquiryDraft {
            subject: DEFAULT_SUBJECT.to_string(),
            enquiry: lines.join("\n").trim().to_string(),
        },
    }
}

fn strip_subject_marker(line: &str) -> String {
    const MARKER: &str = "subject:";
    let start = line.char_indices().map(|(i, _)| i).find(|&i| {
        line.get(i..i + MARKER.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(MARKER))
    });

    let rest = match start {
        Some(i) => &line[i + MARKER.len()..],
        None => line,
    };
    // 模型常用 **Subject:** 的粗體格式
    rest.trim().trim_matches('*').trim().to_string()
}

pub fn fallback_draft(request: &EnquiryRequest) -> EnquiryDraft {
    let name = request.facility_name.as_deref().unwrap_or("your facility");
    let experience = request.user_experience.as_deref().unwrap_or("qualified");
    let specialties = request
        .specialties_joined()
        .unwrap_or_else(|| "general optometry".to_string());

    EnquiryDraft {
        subject: DEFAULT_SUBJECT.to_string(),
        enquiry: format!(
            "Dear Hiring Manager,\n\n\
             I am writing to express my interest in optometrist opportunities at {name}.\n\n\
             I am a {experience} optometrist with expertise in {specialties}.\n\n\
             Please let me know if there are any available positions that match my qualifications.\n\n\
             Thank you for your consideration.\n\n\
             Best regards,\n\
             [Your Name]"
        ),
    }
}
