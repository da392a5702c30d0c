//! Category-dependent severity vocabulary.
//!
//! Severity codes depend on the wound etiology. The mapping is an ordered
//! rule table evaluated top to bottom; the first rule whose predicate accepts
//! the (normalized) category wins. Categories no rule accepts have no
//! applicable severity and the severity field is hidden.

/// One selectable severity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SeverityOption {
    /// Code stored on the annotation
    pub value: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> SeverityOption {
    SeverityOption { value, label }
}

/// Value of the single entry offered for categories that explicitly take no severity.
pub const NO_SEVERITY: &str = "no_severity";

const DIABETIC_FOOT: &[SeverityOption] = &[
    opt("grade_1", "Grade 1"),
    opt("grade_2", "Grade 2"),
    opt("grade_3", "Grade 3"),
    opt("grade_4", "Grade 4"),
    opt("grade_5", "Grade 5"),
    opt("partial_thickness", "Partial Thickness"),
    opt("full_thickness", "Full Thickness"),
];

const PRESSURE_STAGES: &[SeverityOption] = &[
    opt("stage_1", "Stage 1"),
    opt("stage_2", "Stage 2"),
    opt("stage_3", "Stage 3"),
    opt("stage_4", "Stage 4"),
];

const BURN_DEGREES: &[SeverityOption] = &[
    opt("1st_degree", "1st Degree"),
    opt("2nd_degree", "2nd Degree"),
    opt("3rd_degree", "3rd Degree"),
    opt("4th_degree", "4th Degree"),
];

const THICKNESS: &[SeverityOption] = &[
    opt("partial_thickness", "Partial Thickness"),
    opt("full_thickness", "Full Thickness"),
];

const NOT_APPLICABLE: &[SeverityOption] = &[opt(NO_SEVERITY, "No Severity")];

/// Categories graded by tissue thickness, in normalized form.
const THICKNESS_CATEGORIES: &[&str] = &[
    "surgical",
    "autoimmune",
    "trauma",
    "infectious abcess",
    "cyst lesion",
    "vasculitus",
    "malignant",
    "masd",
    "chronic skin ulcer",
];

/// Categories that take the `no_severity` sentinel, in normalized form.
/// `dermatololical` is the spelling used by the deployed vocabulary.
const NO_SEVERITY_CATEGORIES: &[&str] = &[
    "stoma",
    "fistula sinus tract",
    "dermatological",
    "dermatololical",
    "calciphylaxis",
    "edema related",
];

struct SeverityRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    options: &'static [SeverityOption],
}

fn is_diabetic_foot(c: &str) -> bool {
    c.contains("diabetic") && c.contains("foot")
}

fn is_pressure(c: &str) -> bool {
    c.contains("pressure")
}

fn is_burn(c: &str) -> bool {
    c == "burn"
}

fn is_thickness_graded(c: &str) -> bool {
    c.contains("bite") || THICKNESS_CATEGORIES.contains(&c)
}

fn is_without_severity(c: &str) -> bool {
    NO_SEVERITY_CATEGORIES.contains(&c)
}

const RULES: &[SeverityRule] = &[
    SeverityRule {
        name: "diabetic foot",
        matches: is_diabetic_foot,
        options: DIABETIC_FOOT,
    },
    SeverityRule {
        name: "pressure",
        matches: is_pressure,
        options: PRESSURE_STAGES,
    },
    SeverityRule {
        name: "burn",
        matches: is_burn,
        options: BURN_DEGREES,
    },
    SeverityRule {
        name: "thickness",
        matches: is_thickness_graded,
        options: THICKNESS,
    },
    SeverityRule {
        name: "not applicable",
        matches: is_without_severity,
        options: NOT_APPLICABLE,
    },
];

/// Lowercase, treat `/`, `-` and `_` as spaces, collapse whitespace.
fn normalize_category(category: &str) -> String {
    category
        .to_lowercase()
        .replace(['/', '-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered severity options valid for `category`.
///
/// An empty slice means no severity applies.
pub fn severity_options_for(category: &str) -> &'static [SeverityOption] {
    let normalized = normalize_category(category);
    if normalized.is_empty() {
        return &[];
    }
    match RULES.iter().find(|rule| (rule.matches)(&normalized)) {
        Some(rule) => {
            log::trace!("Category '{}' matched severity rule '{}'", category, rule.name);
            rule.options
        }
        None => &[],
    }
}

/// Whether `severity` may be stored with `category`. The empty value always may.
pub fn is_valid_severity(category: &str, severity: &str) -> bool {
    severity.is_empty()
        || severity_options_for(category)
            .iter()
            .any(|o| o.value == severity)
}

/// Keep `severity` if the category allows it, otherwise reset it to empty.
pub fn reconcile_severity(category: &str, severity: &str) -> String {
    if is_valid_severity(category, severity) {
        severity.to_string()
    } else {
        log::debug!(
            "Severity '{}' not valid for category '{}', clearing",
            severity,
            category
        );
        String::new()
    }
}
