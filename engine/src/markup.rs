//! Markup helpers and bilingual labels
//!
//! Pages render to plain HTML strings. Every value that comes from the
//! dataset, a result document or user input goes through [`escape_html`].

use sdk::types::NOT_AVAILABLE;

/// Literal UI strings shown by the pages
pub mod labels {
    pub const NO_RESULTS: &str = "មិនមានលទ្ធផល";
    pub const ENGLISH_NAME: &str = "ឈ្មោះជាភាសាអង់គ្លេស";
    pub const ESTABLISHED: &str = "ឆ្នាំបង្កើត";
    pub const ESTABLISHED_IN: &str = "បង្កើតឆ្នាំ";
    pub const TUITION: &str = "ថ្លៃសិក្សា";
    pub const PER_YEAR: &str = "/ឆ្នាំ";
    pub const GENERAL_INFO: &str = "ព័ត៌មានទូទៅ";
    pub const LOCATION: &str = "ទីតាំង";
    pub const TOTAL_MAJORS: &str = "ចំនួនជំនាញសរុប";
    pub const FACULTIES_AND_MAJORS: &str = "មហាវិទ្យាល័យ និងជំនាញ";
    pub const CONTACT: &str = "ទំនាក់ទំនង";
    pub const PHONE: &str = "ទូរស័ព្ទ";
    pub const EMAIL: &str = "អ៊ីមែល";
    pub const WEBSITE: &str = "គេហទំព័រ";
    pub const ADMISSION: &str = "តម្រូវការចូលរៀន";
    pub const SHARE: &str = "ចែករំលែក";
    pub const ALL_LOCATIONS: &str = "ទីតាំងទាំងអស់";
    pub const SEARCH_PLACEHOLDER: &str = "ស្វែងរកសាកលវិទ្យាល័យ...";
    pub const PICK_INSTITUTION_FIRST: &str = "-- ជ្រើសរើសសាកលវិទ្យាល័យមុន --";
    pub const PICK_CATEGORY: &str = "-- ជ្រើសរើសជំនាញ --";
    pub const PICK_INSTITUTION: &str = "-- ជ្រើសរើសសាកលវិទ្យាល័យ --";
    pub const YEARLY_TUITION: &str = "ថ្លៃសិក្សាប្រចាំឆ្នាំ";
    pub const YEARLY_LIVING: &str = "ថ្លៃស្នាក់នៅប្រចាំឆ្នាំ";
    pub const YEARLY_TOTAL: &str = "សរុបប្រចាំឆ្នាំ";
    pub const PROGRAM_TOTAL: &str = "សរុបសម្រាប់កម្មវិធីសិក្សា";
    pub const CALCULATE: &str = "គណនា";
    pub const NEXT: &str = "បន្ទាប់";
    pub const SUBMIT: &str = "ស្វែងរកសាកលវិទ្យាល័យ";
    pub const LOADING: &str = "កំពុងវិភាគ...";
    pub const SCHOLARSHIP: &str = "អាហារូបករណ៍";
    pub const LIVING_COST: &str = "ថ្លៃស្នាក់នៅប្រចាំខែ";
    pub const YEARS: &str = "រយៈពេលសិក្សា (ឆ្នាំ)";
    pub const BUDGET: &str = "ថវិកាអតិបរមាប្រចាំឆ្នាំ";
    pub const ENGLISH_LEVEL: &str = "កម្រិតភាសាអង់គ្លេស";
    pub const FIELD_QUESTION: &str = "តើអ្នកចាប់អារម្មណ៍លើផ្នែកសិក្សាណា?";
    pub const LOCATION_QUESTION: &str = "តើអ្នកចង់សិក្សានៅទីណា?";
    pub const CAREER_QUESTION: &str = "តើគោលដៅអាជីពរបស់អ្នកជាអ្វី?";
    pub const RETURN_TO_BOT: &str = "Return to Telegram Bot";
    pub const PROFILE_UNAVAILABLE: &str = "Profile information not available.";
    pub const NO_RECOMMENDATIONS: &str = "No recommendations found based on your profile.";
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped optional text, "N/A" when absent or empty
pub fn text_or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Optional displayable value, "N/A" when absent
pub fn value_or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| escape_html(&v.to_string()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Plain number as written in the dataset: integral values lose the ".0"
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Rounded whole currency amount with thousands separators, e.g. `$23,400`
pub fn format_money(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// `<option>` element, optionally selected
pub fn option(value: &str, text: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(text)
    )
}

/// Inline style hiding an element unless it is the active one
pub fn display_style(visible: bool, shown_as: &str) -> String {
    format!(
        r#"style="display: {}""#,
        if visible { shown_as } else { "none" }
    )
}
