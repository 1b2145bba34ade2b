use spellgrid_core::CardAbilities;

const CONDITIONAL_WORDS: &[&str] = &["if", "may", "has", "whenever", "while", "when"];
const CONDITIONAL_PHRASES: &[&str] = &["as long as"];

/// Reads keyword abilities and movement/range modifiers out of rules text.
///
/// Text is split into clauses at `.`, `,`, `;` and line breaks. Clauses that
/// read as conditions ("if", "may", "whenever" ...) grant nothing.
pub fn parse_abilities(rules_text: &str) -> CardAbilities {
    let mut abilities = CardAbilities::default();
    for clause in rules_text.split(['.', ',', ';', '\n', '\r']) {
        let clause = clause.trim();
        if clause.is_empty() || is_conditional(clause) {
            continue;
        }
        if let Some(delta) = modifier(clause, "Movement") {
            abilities.movement = abilities.movement.saturating_add(delta);
        }
        if let Some(delta) = modifier(clause, "Range") {
            abilities.range = abilities.range.saturating_add(delta);
        }
        let flags: [(&str, &mut bool); 10] = [
            ("Airborne", &mut abilities.airborne),
            ("Submerge", &mut abilities.submerge),
            ("Burrowing", &mut abilities.burrowing),
            ("Stealth", &mut abilities.stealth),
            ("Lethal", &mut abilities.lethal),
            ("Waterbound", &mut abilities.waterbound),
            ("Landbound", &mut abilities.landbound),
            ("Voidwalk", &mut abilities.voidwalk),
            ("Spellcaster", &mut abilities.spellcaster),
            ("Ranged", &mut abilities.ranged),
        ];
        for (keyword, flag) in flags {
            if clause.contains(keyword) {
                *flag = true;
            }
        }
    }
    abilities
}

fn is_conditional(clause: &str) -> bool {
    let lower = clause.to_ascii_lowercase();
    if CONDITIONAL_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return true;
    }
    lower
        .split(|c: char| !c.is_ascii_alphabetic())
        .any(|word| CONDITIONAL_WORDS.contains(&word))
}

/// Signed integer right after `keyword`, e.g. `Movement +2` or `Range-1`.
fn modifier(clause: &str, keyword: &str) -> Option<i32> {
    let (_, rest) = clause.split_once(keyword)?;
    let rest = rest.trim_start();
    let digits_start = usize::from(rest.starts_with(['+', '-']));
    let digits = rest[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest.len(), |end| end + digits_start);
    if digits == digits_start {
        return None;
    }
    rest[..digits].trim_start_matches('+').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_set_flags() {
        let abilities = parse_abilities("Airborne, Lethal. Spellcaster");
        assert!(abilities.airborne);
        assert!(abilities.lethal);
        assert!(abilities.spellcaster);
        assert!(!abilities.stealth);
        assert_eq!(abilities.movement, 1);
        assert_eq!(abilities.range, 1);
    }

    #[test]
    fn conditional_clauses_grant_nothing() {
        let abilities = parse_abilities(
            "If you control a tower this gains Airborne. May become Stealth while submerged",
        );
        assert!(!abilities.airborne);
        assert!(!abilities.stealth);
        let abilities = parse_abilities("Burrowing as long as it stands on earth");
        assert!(!abilities.burrowing);
    }

    #[test]
    fn conditional_words_match_whole_words_only() {
        // "Thief" contains "if" but is not a condition.
        let abilities = parse_abilities("Thief gains Submerge");
        assert!(abilities.submerge);
        let abilities = parse_abilities("Stealthy thief gets Stealth");
        assert!(abilities.stealth);
    }

    #[test]
    fn movement_and_range_modifiers_add_to_the_base() {
        let abilities = parse_abilities("Movement +2. Range +1\nRanged");
        assert_eq!(abilities.movement, 3);
        assert_eq!(abilities.range, 2);
        assert!(abilities.ranged);
        let abilities = parse_abilities("Movement-1");
        assert_eq!(abilities.movement, 0);
        let abilities = parse_abilities("Movement bonus");
        assert_eq!(abilities.movement, 1);
    }

    #[test]
    fn huge_modifiers_saturate() {
        let abilities = parse_abilities("Movement +2147483647. Movement +5");
        assert_eq!(abilities.movement, i32::MAX);
        let abilities = parse_abilities("Range -2147483648; Range -1");
        assert_eq!(abilities.range, i32::MIN);
        // Too long for an i32 at all: ignored.
        let abilities = parse_abilities("Movement +99999999999");
        assert_eq!(abilities.movement, 1);
    }

    #[test]
    fn empty_text_is_default() {
        assert_eq!(parse_abilities(""), CardAbilities::default());
    }
}
