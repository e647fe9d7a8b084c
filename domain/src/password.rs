/// Ordinal strength label shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLevel {
    pub fn label(self) -> &'static str {
        match self {
            StrengthLevel::Weak => "弱",
            StrengthLevel::Medium => "中等",
            StrengthLevel::Strong => "強",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            StrengthLevel::Weak => "weak",
            StrengthLevel::Medium => "medium",
            StrengthLevel::Strong => "strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: u8,
    pub level: StrengthLevel,
}

/// Score a password 0–5: one point each for length ≥ 8, a lowercase letter,
/// an uppercase letter, a digit, and a non-alphanumeric character.
/// Recomputed on every keystroke; never stored.
pub fn strength(password: &str) -> PasswordStrength {
    let mut score = 0u8;

    if password.chars().count() >= 8 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let level = match score {
        0..=2 => StrengthLevel::Weak,
        3 | 4 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };

    PasswordStrength { score, level }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_is_weak() {
        let s = strength("");
        assert_eq!(s.score, 0);
        assert_eq!(s.level, StrengthLevel::Weak);
    }

    #[test]
    fn each_criterion_scores_one_point() {
        assert_eq!(strength("abc").score, 1); // lowercase only
        assert_eq!(strength("abc1").score, 2); // + digit
        assert_eq!(strength("Abc1").score, 3); // + uppercase
        assert_eq!(strength("Abc1!").score, 4); // + symbol
        assert_eq!(strength("Abc12345!").score, 5); // + length
    }

    #[test]
    fn score_is_monotone_in_criteria() {
        // Each password satisfies a superset of the previous one's criteria.
        let ladder = ["", "a", "a1", "aB1", "aB1!", "aB1!aB1!"];
        let scores: Vec<u8> = ladder.iter().map(|p| strength(p).score).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn score_maps_to_level() {
        assert_eq!(strength("ab").level, StrengthLevel::Weak); // 1
        assert_eq!(strength("demo123").level, StrengthLevel::Weak); // 2
        assert_eq!(strength("Abcd123").level, StrengthLevel::Medium); // 3
        assert_eq!(strength("Abcd1234").level, StrengthLevel::Medium); // 4
        assert_eq!(strength("Abcd1234!").level, StrengthLevel::Strong); // 5
    }

    #[test]
    fn labels_match_levels() {
        assert_eq!(StrengthLevel::Weak.label(), "弱");
        assert_eq!(StrengthLevel::Medium.label(), "中等");
        assert_eq!(StrengthLevel::Strong.label(), "強");
        assert_eq!(StrengthLevel::Strong.css_class(), "strong");
    }
}
