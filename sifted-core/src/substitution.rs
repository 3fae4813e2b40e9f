//! Substitution engine: rewrites a recipe's ingredients against an ordered
//! rule catalog and records an audit entry for every substitution applied.
//!
//! The catalog is data, not code: rules can be loaded from JSON and swapped
//! without touching the matching algorithm. Matching is substring-based over
//! the trimmed, lower-cased ingredient name; the first rule that matches
//! wins, so overlapping keywords resolve by catalog order.

use serde::{Deserialize, Serialize};

use crate::types::{Ingredient, NormalizedRecipe};

/// Audit entry for one applied substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedSubstitution {
    /// Ingredient name before replacement
    pub ingredient_name: String,
    pub suggested_product: String,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    pub rationale: String,
}

/// One entry in the ordered rule catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRule {
    /// Any-of substring matchers, compared against the normalized name.
    pub keywords: Vec<String>,
    /// Name the matched ingredient is rewritten to.
    pub replacement: String,
    pub brand: String,
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub rationale: String,
}

impl SubstitutionRule {
    fn matches(&self, normalized_name: &str) -> bool {
        self.keywords.iter().any(|k| normalized_name.contains(k.as_str()))
    }
}

/// Ordered, first-match-wins rule catalog. Immutable once constructed;
/// intended to be loaded at startup and shared across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCatalog {
    rules: Vec<SubstitutionRule>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<SubstitutionRule>) -> Self {
        Self { rules }
    }

    /// Load a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    /// First rule whose keywords match the ingredient name, if any.
    pub fn first_match(&self, name: &str) -> Option<&SubstitutionRule> {
        let normalized = name.trim().to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&normalized))
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        canadian_catalog()
    }
}

/// Built-in catalog of Canadian gluten-free products.
pub fn canadian_catalog() -> RuleCatalog {
    RuleCatalog::new(vec![
        SubstitutionRule {
            keywords: vec![
                "all-purpose flour".to_string(),
                "wheat flour".to_string(),
                "flour".to_string(),
            ],
            replacement: "gluten-free 1:1 baking flour".to_string(),
            brand: "PC".to_string(),
            product: "Gluten-Free 1:1 Baking Flour".to_string(),
            url: Some("https://www.presidentschoice.ca/".to_string()),
            rationale: "1:1 GF flour maintains texture without changing ratios.".to_string(),
        },
        SubstitutionRule {
            keywords: vec!["soy sauce".to_string()],
            replacement: "gluten-free tamari".to_string(),
            brand: "San-J".to_string(),
            product: "Tamari Gluten Free".to_string(),
            url: Some("https://san-j.com/".to_string()),
            rationale: "Tamari is gluten-free and keeps the same flavour profile.".to_string(),
        },
        SubstitutionRule {
            keywords: vec!["spaghetti".to_string(), "pasta".to_string()],
            replacement: "gluten-free spaghetti".to_string(),
            brand: "Catelli".to_string(),
            product: "Gluten Free Spaghetti".to_string(),
            url: Some("https://www.catelli.ca/".to_string()),
            rationale: "Catelli GF pasta has excellent texture and cooks similarly to regular pasta."
                .to_string(),
        },
    ])
}

/// Convert a recipe by applying the catalog to each ingredient in order.
///
/// Pure: the input is never mutated. Matched ingredients have only their
/// `name` replaced; quantity, unit, and modifier pass through unchanged.
/// Unmatched ingredients produce no audit entry.
pub fn convert(
    recipe: &NormalizedRecipe,
    catalog: &RuleCatalog,
) -> (NormalizedRecipe, Vec<AppliedSubstitution>) {
    let mut substitutions = Vec::new();

    let ingredients: Vec<Ingredient> = recipe
        .ingredients
        .iter()
        .map(|ingredient| match catalog.first_match(&ingredient.name) {
            Some(rule) => {
                substitutions.push(AppliedSubstitution {
                    ingredient_name: ingredient.name.clone(),
                    suggested_product: rule.product.clone(),
                    brand: rule.brand.clone(),
                    product_url: rule.url.clone(),
                    rationale: rule.rationale.clone(),
                });
                Ingredient {
                    name: rule.replacement.clone(),
                    ..ingredient.clone()
                }
            }
            None => ingredient.clone(),
        })
        .collect();

    let converted = NormalizedRecipe {
        ingredients,
        ..recipe.clone()
    };

    (converted, substitutions)
}
