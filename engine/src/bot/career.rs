//! Career path explorer
//!
//! Static table of entry, mid and senior roles with salary bands for each
//! career field, rendered as plain bot replies by `/career`.

/// One seniority level within a career path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareerLevel {
    pub title: &'static str,
    pub roles: &'static str,
    pub salary: &'static str,
}

/// Career outlook for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareerPath {
    /// Field key the user picks
    pub field: &'static str,
    pub title: &'static str,
    pub entry_level: CareerLevel,
    pub mid_level: CareerLevel,
    pub senior_level: CareerLevel,
    pub future_trend: &'static str,
}

impl CareerPath {
    pub fn levels(&self) -> [&CareerLevel; 3] {
        [&self.entry_level, &self.mid_level, &self.senior_level]
    }
}

pub static CAREER_PATHS: [CareerPath; 3] = [
    CareerPath {
        field: "បច្ចេកវិទ្យា",
        title: "🚀 ស្វែងយល់ពីអាជីពក្នុងវិស័យបច្ចេកវិទ្យា",
        entry_level: CareerLevel {
            title: "កម្រិតដំបូង (0-2 ឆ្នាំ)",
            roles: "Software Developer, IT Support, QA Tester",
            salary: "$400 - $700",
        },
        mid_level: CareerLevel {
            title: "កម្រិតកណ្តាល (3-5 ឆ្នាំ)",
            roles: "Senior Developer, DevOps Engineer, Project Manager",
            salary: "$800 - $1,500",
        },
        senior_level: CareerLevel {
            title: "កម្រិតខ្ពស់ (5+ ឆ្នាំ)",
            roles: "Tech Lead, IT Manager, Solutions Architect",
            salary: "$1,500+",
        },
        future_trend: "ជំនាញ FinTech, E-commerce និង Data Science កំពុងមានតម្រូវការខ្ពស់។",
    },
    CareerPath {
        field: "ធុរកិច្ច",
        title: "📈 ស្វែងយល់ពីអាជីពក្នុងវិស័យធុរកិច្ច",
        entry_level: CareerLevel {
            title: "កម្រិតដំបូង (0-2 ឆ្នាំ)",
            roles: "Marketing Officer, Accountant, HR Assistant",
            salary: "$350 - $600",
        },
        mid_level: CareerLevel {
            title: "កម្រិតកណ្តាល (3-5 ឆ្នាំ)",
            roles: "Senior Accountant, Marketing Manager, Operations Manager",
            salary: "$700 - $1,400",
        },
        senior_level: CareerLevel {
            title: "កម្រិតខ្ពស់ (5+ ឆ្នាំ)",
            roles: "Finance Director, Head of Marketing, COO",
            salary: "$1,400+",
        },
        future_trend: "ជំនាញ Digital Marketing និង Data Analysis for Business កំពុងមានតម្រូវការខ្លាំង។",
    },
    CareerPath {
        field: "សុខាភិបាល",
        title: "🩺 ស្វែងយល់ពីអាជីពក្នុងវិស័យសុខាភិបាល",
        entry_level: CareerLevel {
            title: "កម្រិតដំបូង",
            roles: "គិលានុបដ្ឋាក, ជំនួយការមន្ទីរពិសោធន៍",
            salary: "$300 - $550",
        },
        mid_level: CareerLevel {
            title: "កម្រិតកណ្តាល",
            roles: "ប្រធានគិលានុបដ្ឋាក, អ្នកឯកទេសមន្ទីរពិសោធន៍, វេជ្ជបណ្ឌិតទូទៅ",
            salary: "$600 - $1,200+",
        },
        senior_level: CareerLevel {
            title: "កម្រិតខ្ពស់",
            roles: "ប្រធានផ្នែក, វេជ្ជបណ្ឌិតឯកទេស, អ្នកគ្រប់គ្រងមន្ទីរពេទ្យ",
            salary: "ប្រែប្រួលខ្លាំង",
        },
        future_trend: "វិស័យសុខភាពសាធារណៈ និងការគ្រប់គ្រងប្រព័ន្ធសុខាភិបាលកំពុងរីកចម្រើន។",
    },
];

/// Look up a career path by its field key
pub fn find(field: &str) -> Option<&'static CareerPath> {
    let field = field.trim();
    CAREER_PATHS.iter().find(|path| path.field == field)
}

/// Reply listing the available fields
pub fn career_menu() -> String {
    let mut text = String::from("សូមជ្រើសរើសវិស័យអាជីពដែលអ្នកចាប់អារម្មណ៍:\n");
    for path in &CAREER_PATHS {
        text.push_str(&format!("\n/career {}", path.field));
    }
    text
}

/// Reply describing one career path
pub fn format_career_path(path: &CareerPath) -> String {
    let mut text = format!("{}\n\n", path.title);
    for level in path.levels() {
        text.push_str(&format!(
            "{}:\n  - តួនាទី: {}\n  - ប្រាក់ខែ: {}\n\n",
            level.title, level.roles, level.salary
        ));
    }
    text.push_str(&format!("Trend: {}", path.future_trend));
    text
}

/// Reply for `/career [field]`
pub fn career_reply(argument: &str) -> String {
    if argument.trim().is_empty() {
        return career_menu();
    }
    match find(argument) {
        Some(path) => format_career_path(path),
        None => format!("រកមិនឃើញព័ត៌មានអាជីពសម្រាប់ '{}'\n\n{}", argument.trim(), career_menu()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_unique() {
        for (i, path) in CAREER_PATHS.iter().enumerate() {
            assert!(CAREER_PATHS[i + 1..].iter().all(|other| other.field != path.field));
        }
    }

    #[test]
    fn test_find_trims_input() {
        assert_eq!(find(" ធុរកិច្ច ").map(|p| p.entry_level.salary), Some("$350 - $600"));
        assert!(find("Agriculture").is_none());
    }

    #[test]
    fn test_menu_lists_every_field() {
        let menu = career_reply("");
        for path in &CAREER_PATHS {
            assert!(menu.contains(&format!("/career {}", path.field)));
        }
    }

    #[test]
    fn test_path_shows_all_levels() {
        let text = career_reply("បច្ចេកវិទ្យា");
        assert!(text.starts_with("🚀"));
        assert!(text.contains("Software Developer, IT Support, QA Tester"));
        assert!(text.contains("$800 - $1,500"));
        assert!(text.contains("Tech Lead"));
        assert!(text.ends_with("កំពុងមានតម្រូវការខ្ពស់។"));
    }

    #[test]
    fn test_unknown_field_falls_back_to_menu() {
        let text = career_reply("Agriculture");
        assert!(text.contains("'Agriculture'"));
        assert!(text.contains("/career សុខាភិបាល"));
    }
}
