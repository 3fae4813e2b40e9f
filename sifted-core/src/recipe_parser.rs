//! Recipe parsing module.
//!
//! Parses raw extracted text (a line/section oriented document: title line,
//! optional yield/time lines, an `Ingredients:` section, a `Steps:` section,
//! optional `Notes:`) into a [`NormalizedRecipe`].

use std::sync::LazyLock;

use crate::error::ParseError;
use crate::types::{Ingredient, NormalizedRecipe};

/// A recoverable problem with a single ingredient line. The line is dropped
/// from the recipe but preserved here for diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub line: String,
    pub reason: String,
}

/// Result of a successful parse: the recipe plus any per-line warnings.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub recipe: NormalizedRecipe,
    pub warnings: Vec<ParseWarning>,
}

/// Common cooking units (lowercase for matching).
/// Sorted by length at runtime (longest first) to avoid partial matches
/// (e.g., "tablespoons" must match before "tbsp").
static UNITS_SORTED: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut units = UNITS_RAW.to_vec();
    units.sort_by(|a, b| b.len().cmp(&a.len()));
    units
});

const UNITS_RAW: &[&str] = &[
    // Volume - US
    "fluid ounces",
    "fluid ounce",
    "tablespoons",
    "tablespoon",
    "teaspoons",
    "teaspoon",
    "quarts",
    "quart",
    "pints",
    "pint",
    "cups",
    "cup",
    "tbsp",
    "tsp",
    "fl oz",
    "qt",
    "pt",
    // Volume - Metric
    "milliliters",
    "milliliter",
    "liters",
    "liter",
    "ml",
    "l",
    // Weight
    "kilograms",
    "kilogram",
    "ounces",
    "ounce",
    "pounds",
    "pound",
    "grams",
    "gram",
    "lbs",
    "lb",
    "oz",
    "kg",
    "g",
    // Count/Size
    "packages",
    "package",
    "bunches",
    "pinches",
    "slices",
    "sticks",
    "cloves",
    "pieces",
    "bunch",
    "clove",
    "pinch",
    "slice",
    "stick",
    "piece",
    "cans",
    "can",
    "jars",
    "jar",
];

/// Section the line scanner is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Ingredients,
    Steps,
    Notes,
}

/// Parse raw extracted text into a normalized recipe.
///
/// Unparseable ingredient lines are dropped with a warning; parsing fails
/// only when a required field (title, ingredients, steps) is missing after
/// best-effort recovery.
pub fn parse_recipe(raw: &str) -> Result<ParseOutcome, ParseError> {
    let mut title: Option<String> = None;
    let mut yield_: Option<String> = None;
    let mut total_time: Option<String> = None;
    let mut ingredients: Vec<Ingredient> = Vec::new();
    let mut steps: Vec<String> = Vec::new();
    let mut note_lines: Vec<String> = Vec::new();
    let mut warnings: Vec<ParseWarning> = Vec::new();

    let mut section = Section::Preamble;

    for raw_line in raw.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(next) = section_header(line) {
            section = next;
            continue;
        }

        match section {
            Section::Preamble => {
                if let Some(rest) = strip_prefix_ci(line, "yield:") {
                    yield_ = non_empty(rest);
                } else if let Some(rest) = strip_prefix_ci(line, "total time:") {
                    total_time = non_empty(rest);
                } else if let Some(rest) = strip_prefix_ci(line, "time:") {
                    total_time = non_empty(rest);
                } else if title.is_none() {
                    title = Some(line.to_string());
                }
                // Anything else before the first section header is ignored.
            }
            Section::Ingredients => {
                let item = strip_bullet(line);
                if item.is_empty() {
                    continue;
                }
                match parse_ingredient_line(item) {
                    Ok(ingredient) => ingredients.push(ingredient),
                    Err(reason) => warnings.push(ParseWarning {
                        line: line.to_string(),
                        reason,
                    }),
                }
            }
            Section::Steps => {
                let step = strip_step_marker(line);
                if !step.is_empty() {
                    steps.push(step.to_string());
                }
            }
            Section::Notes => {
                note_lines.push(line.to_string());
            }
        }
    }

    let title = title.ok_or(ParseError::MissingField("title"))?;
    if ingredients.is_empty() {
        return Err(ParseError::MissingField("ingredients"));
    }
    if steps.is_empty() {
        return Err(ParseError::MissingField("steps"));
    }

    let notes = if note_lines.is_empty() {
        None
    } else {
        Some(note_lines.join("\n"))
    };

    Ok(ParseOutcome {
        recipe: NormalizedRecipe {
            title,
            yield_,
            total_time,
            ingredients,
            steps,
            notes,
        },
        warnings,
    })
}

/// Recognize a section header line like "Ingredients:" or "Steps:".
fn section_header(line: &str) -> Option<Section> {
    let lower = line.trim_end_matches(':').trim().to_lowercase();
    if !line.ends_with(':') {
        return None;
    }
    match lower.as_str() {
        "ingredients" => Some(Section::Ingredients),
        "steps" | "instructions" | "directions" | "method" => Some(Section::Steps),
        "notes" => Some(Section::Notes),
        _ => None,
    }
}

/// Case-insensitive prefix strip, returning the trimmed remainder.
fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Strip a leading list bullet ("-", "*", "•") from an ingredient line.
fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '*', '•']).trim()
}

/// Strip a leading step marker: "1)", "2.", "3:" or a bullet.
fn strip_step_marker(line: &str) -> &str {
    let without_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() < line.len() {
        // Had leading digits; require a marker character after them.
        if let Some(rest) = without_digits.strip_prefix([')', '.', ':']) {
            return rest.trim();
        }
        return line.trim();
    }
    strip_bullet(line)
}

/// Parse one ingredient line: `[qty] [unit] name[, modifier]`.
///
/// Returns a human-readable reason when the line cannot be salvaged; the
/// caller records it as a warning and drops the line.
fn parse_ingredient_line(line: &str) -> Result<Ingredient, String> {
    let (qty, rest) = parse_quantity(line)?;
    let (unit, rest) = extract_unit(&rest);

    // Modifier is free text after the first comma.
    let (name_part, modifier) = match rest.find(',') {
        Some(idx) => {
            let modifier = rest[idx + 1..].trim();
            (
                rest[..idx].trim().to_string(),
                non_empty(modifier),
            )
        }
        None => (rest.trim().to_string(), None),
    };

    if name_part.is_empty() {
        return Err("no ingredient name".to_string());
    }

    Ok(Ingredient {
        qty,
        unit,
        name: name_part,
        modifier,
    })
}

/// Extract a quantity from the beginning of a line, converting fractions and
/// mixed numbers to decimal ("1 1/2" -> 1.5). Returns the quantity (if any)
/// and the remaining text.
///
/// A malformed numeric (e.g. a zero denominator) is an error rather than a
/// guess: fail closed and let the caller drop the line.
fn parse_quantity(s: &str) -> Result<(Option<f64>, String), String> {
    let s = s.trim();
    let words: Vec<&str> = s.split_whitespace().collect();

    // Mixed number: "1 1/2"
    if words.len() >= 2 && is_integer(words[0]) {
        if let Some(frac) = parse_fraction(words[1])? {
            let whole: f64 = words[0]
                .parse()
                .map_err(|_| format!("bad whole number: {}", words[0]))?;
            let rest = words[2..].join(" ");
            return Ok((Some(whole + frac), rest));
        }
    }

    if let Some(first) = words.first() {
        // Bare fraction: "1/2"
        if let Some(frac) = parse_fraction(first)? {
            let rest = words[1..].join(" ");
            return Ok((Some(frac), rest));
        }

        // Integer or decimal: "2", "2.5"
        if first.chars().all(|c| c.is_ascii_digit() || c == '.') && *first != "." {
            let qty: f64 = first
                .parse()
                .map_err(|_| format!("bad quantity: {}", first))?;
            let rest = words[1..].join(" ");
            return Ok((Some(qty), rest));
        }
    }

    Ok((None, s.to_string()))
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse "n/d" into a decimal. Returns Ok(None) when the token is not shaped
/// like a fraction, Err when it is but the denominator is zero.
fn parse_fraction(s: &str) -> Result<Option<f64>, String> {
    let Some(slash) = s.find('/') else {
        return Ok(None);
    };
    let (num, den) = (&s[..slash], &s[slash + 1..]);
    if !is_integer(num) || !is_integer(den) {
        return Ok(None);
    }
    let num: f64 = num.parse().map_err(|_| format!("bad fraction: {}", s))?;
    let den: f64 = den.parse().map_err(|_| format!("bad fraction: {}", s))?;
    if den == 0.0 {
        return Err(format!("zero denominator: {}", s));
    }
    Ok(Some(num / den))
}

/// Extract a unit from the beginning of a string.
/// Returns (unit, remaining_string).
fn extract_unit(s: &str) -> (Option<String>, String) {
    let s = s.trim();
    let s_lower = s.to_lowercase();

    for &unit in UNITS_SORTED.iter() {
        if s_lower.starts_with(unit) {
            // Make sure it's a word boundary
            let after = &s[unit.len()..];
            if after.is_empty()
                || after.starts_with(|c: char| c.is_whitespace() || c == '.' || c == ',')
            {
                let remaining = after.trim_start_matches('.').trim();
                return (Some(unit.to_string()), remaining.to_string());
            }
        }
    }

    (None, s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_ingredient() {
        let result = parse_ingredient_line("2 cups flour").unwrap();
        assert_eq!(result.qty, Some(2.0));
        assert_eq!(result.unit, Some("cups".to_string()));
        assert_eq!(result.name, "flour");
        assert_eq!(result.modifier, None);
    }

    #[test]
    fn test_mixed_number_becomes_decimal() {
        let result = parse_ingredient_line("1 1/2 cups all-purpose flour").unwrap();
        assert_eq!(result.qty, Some(1.5));
        assert_eq!(result.unit, Some("cups".to_string()));
        assert_eq!(result.name, "all-purpose flour");
    }

    #[test]
    fn test_bare_fraction() {
        let result = parse_ingredient_line("1/2 tsp salt").unwrap();
        assert_eq!(result.qty, Some(0.5));
        assert_eq!(result.unit, Some("tsp".to_string()));
        assert_eq!(result.name, "salt");
    }

    #[test]
    fn test_decimal_quantity() {
        let result = parse_ingredient_line("2.5 oz cream cheese").unwrap();
        assert_eq!(result.qty, Some(2.5));
        assert_eq!(result.unit, Some("oz".to_string()));
        assert_eq!(result.name, "cream cheese");
    }

    #[test]
    fn test_no_unit() {
        let result = parse_ingredient_line("3 eggs").unwrap();
        assert_eq!(result.qty, Some(3.0));
        assert_eq!(result.unit, None);
        assert_eq!(result.name, "eggs");
    }

    #[test]
    fn test_no_quantity() {
        let result = parse_ingredient_line("salt").unwrap();
        assert_eq!(result.qty, None);
        assert_eq!(result.unit, None);
        assert_eq!(result.name, "salt");
    }

    #[test]
    fn test_modifier_after_comma() {
        let result = parse_ingredient_line("3 ripe bananas, mashed").unwrap();
        assert_eq!(result.qty, Some(3.0));
        assert_eq!(result.name, "ripe bananas");
        assert_eq!(result.modifier, Some("mashed".to_string()));
    }

    #[test]
    fn test_zero_denominator_is_unparseable() {
        assert!(parse_ingredient_line("1/0 cup sugar").is_err());
    }

    #[test]
    fn test_unit_without_name_is_unparseable() {
        assert!(parse_ingredient_line("2 cups").is_err());
    }

    #[test]
    fn test_unit_requires_word_boundary() {
        // "gallon" must not match the "g" unit mid-word; "eggs" is a name.
        let result = parse_ingredient_line("2 eggs").unwrap();
        assert_eq!(result.unit, None);
        assert_eq!(result.name, "eggs");
    }

    #[test]
    fn test_parse_full_document() {
        let raw = "Banana Bread\n\
                   Yield: 1 loaf\n\
                   Time: 1h 10m\n\
                   \n\
                   Ingredients:\n\
                   - 1 1/2 cups all-purpose flour\n\
                   - 1 egg, beaten\n\
                   \n\
                   Steps:\n\
                   1) Mix.\n\
                   2) Bake.\n\
                   \n\
                   Notes:\n\
                   Freezes well.";
        let outcome = parse_recipe(raw).unwrap();
        let recipe = outcome.recipe;
        assert_eq!(recipe.title, "Banana Bread");
        assert_eq!(recipe.yield_, Some("1 loaf".to_string()));
        assert_eq!(recipe.total_time, Some("1h 10m".to_string()));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.steps, vec!["Mix.", "Bake."]);
        assert_eq!(recipe.notes, Some("Freezes well.".to_string()));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let raw = "Ingredients:\n- 1 egg\nSteps:\n1) Cook.";
        assert!(matches!(
            parse_recipe(raw),
            Err(ParseError::MissingField("title"))
        ));
    }

    #[test]
    fn test_missing_steps_is_fatal() {
        let raw = "Omelette\nIngredients:\n- 2 eggs";
        assert!(matches!(
            parse_recipe(raw),
            Err(ParseError::MissingField("steps"))
        ));
    }

    #[test]
    fn test_bad_lines_warn_but_do_not_fail() {
        let raw = "Omelette\n\
                   Ingredients:\n\
                   - 2 eggs\n\
                   - 1/0 cup milk\n\
                   Steps:\n\
                   1) Cook.";
        let outcome = parse_recipe(raw).unwrap();
        assert_eq!(outcome.recipe.ingredients.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].reason.contains("zero denominator"));
    }

    #[test]
    fn test_all_lines_dropped_is_fatal() {
        let raw = "Omelette\n\
                   Ingredients:\n\
                   - 1/0 cup milk\n\
                   Steps:\n\
                   1) Cook.";
        assert!(matches!(
            parse_recipe(raw),
            Err(ParseError::MissingField("ingredients"))
        ));
    }

    #[test]
    fn test_step_order_preserved() {
        let raw = "Soup\n\
                   Ingredients:\n\
                   - 1 onion\n\
                   Steps:\n\
                   3) Third.\n\
                   1) First.\n\
                   2) Second.";
        // Markers are cosmetic; document order wins.
        let outcome = parse_recipe(raw).unwrap();
        assert_eq!(outcome.recipe.steps, vec!["Third.", "First.", "Second."]);
    }

    #[test]
    fn test_bulleted_steps() {
        let raw = "Soup\nIngredients:\n- 1 onion\nSteps:\n- Chop.\n- Simmer.";
        let outcome = parse_recipe(raw).unwrap();
        assert_eq!(outcome.recipe.steps, vec!["Chop.", "Simmer."]);
    }

    #[test]
    fn test_instructions_header_synonym() {
        let raw = "Soup\nIngredients:\n- 1 onion\nInstructions:\n1) Simmer.";
        let outcome = parse_recipe(raw).unwrap();
        assert_eq!(outcome.recipe.steps, vec!["Simmer."]);
    }
}
