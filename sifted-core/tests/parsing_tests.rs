//! Integration tests for the documented section grammar.

use sifted_core::{parse_recipe, ParseError};

#[test]
fn test_banana_bread_scenario() {
    let raw = "Banana Bread\n\
               Ingredients:\n\
               - 1 1/2 cups all-purpose flour\n\
               - 1 egg\n\
               Steps:\n\
               1) Mix.\n\
               2) Bake.";

    let outcome = parse_recipe(raw).expect("scenario A must parse");
    let recipe = outcome.recipe;

    assert_eq!(recipe.title, "Banana Bread");

    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[0].qty, Some(1.5));
    assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("cups"));
    assert_eq!(recipe.ingredients[0].name, "all-purpose flour");
    assert_eq!(recipe.ingredients[1].qty, Some(1.0));
    assert_eq!(recipe.ingredients[1].unit, None);
    assert_eq!(recipe.ingredients[1].name, "egg");

    assert_eq!(recipe.steps, vec!["Mix.", "Bake."]);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_full_document_with_yield_time_and_notes() {
    let raw = "Example Banana Bread\n\
               Yield: 1 loaf\n\
               Time: 1h 10m\n\
               \n\
               Ingredients:\n\
               - 1 tsp baking soda\n\
               - 3 ripe bananas, mashed\n\
               - 1/2 cup butter, melted\n\
               \n\
               Steps:\n\
               1) Preheat oven to 350F.\n\
               2) Bake 55-60 minutes.\n\
               \n\
               Notes:\n\
               Use overripe bananas.";

    let recipe = parse_recipe(raw).unwrap().recipe;
    assert_eq!(recipe.title, "Example Banana Bread");
    assert_eq!(recipe.yield_.as_deref(), Some("1 loaf"));
    assert_eq!(recipe.total_time.as_deref(), Some("1h 10m"));

    assert_eq!(recipe.ingredients.len(), 3);
    assert_eq!(recipe.ingredients[1].name, "ripe bananas");
    assert_eq!(recipe.ingredients[1].modifier.as_deref(), Some("mashed"));
    assert_eq!(recipe.ingredients[2].qty, Some(0.5));
    assert_eq!(recipe.ingredients[2].unit.as_deref(), Some("cup"));
    assert_eq!(recipe.ingredients[2].name, "butter");
    assert_eq!(recipe.ingredients[2].modifier.as_deref(), Some("melted"));

    assert_eq!(
        recipe.steps,
        vec!["Preheat oven to 350F.", "Bake 55-60 minutes."]
    );
    assert_eq!(recipe.notes.as_deref(), Some("Use overripe bananas."));
}

#[test]
fn test_required_fields_never_partially_null() {
    // Every grammar-level failure is a named missing field, never a recipe
    // with an empty required field.
    let cases: &[(&str, &str)] = &[
        ("", "title"),
        ("Ingredients:\n- 1 egg\nSteps:\n1) Cook.", "title"),
        ("Toast\nSteps:\n1) Toast.", "ingredients"),
        ("Toast\nIngredients:\n- 1 slice bread", "steps"),
    ];

    for (raw, field) in cases {
        match parse_recipe(raw) {
            Err(ParseError::MissingField(missing)) => {
                assert_eq!(missing, *field, "input: {:?}", raw)
            }
            Ok(outcome) => panic!(
                "expected MissingField({}), got {:?} for {:?}",
                field, outcome.recipe, raw
            ),
        }
    }
}

#[test]
fn test_quantity_forms() {
    let raw = "Quantities\n\
               Ingredients:\n\
               - 2 cups water\n\
               - 2.5 oz cheese\n\
               - 3/4 cup sugar\n\
               - 1 1/2 tsp vanilla\n\
               - salt\n\
               Steps:\n\
               1) Combine.";

    let recipe = parse_recipe(raw).unwrap().recipe;
    let quantities: Vec<Option<f64>> = recipe.ingredients.iter().map(|i| i.qty).collect();
    assert_eq!(
        quantities,
        vec![Some(2.0), Some(2.5), Some(0.75), Some(1.5), None]
    );
}
