//! End-to-end use cases against the in-memory store.

use larder_core::{
    DietTag, InMemoryRecipeStore, IngredientSpec, PageRequest, RecipeBase, RecipeDraft,
    RecipeError, RecipeId, RecipeService, RecipeStore, Sort, StepSpec, Unit,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Barrier};
use std::thread;

fn setup() -> (Arc<InMemoryRecipeStore>, RecipeService) {
    let store = Arc::new(InMemoryRecipeStore::new());
    let service = RecipeService::new(store.clone());
    (store, service)
}

fn base(title: &str, tags: &[DietTag], categories: &[&str]) -> RecipeBase {
    RecipeBase {
        title: title.to_string(),
        description: None,
        prep_minutes: 10,
        cook_minutes: 20,
        tags: tags.iter().copied().collect(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
    }
}

fn ingredient(name: &str, grams: i64) -> IngredientSpec {
    IngredientSpec {
        name: name.to_string(),
        amount: Decimal::new(grams, 0),
        unit: Unit::G,
    }
}

fn step(position: i32, text: &str) -> StepSpec {
    StepSpec {
        position,
        text: text.to_string(),
    }
}

fn create(service: &RecipeService, base: RecipeBase) -> RecipeId {
    service
        .create(RecipeDraft {
            base,
            ingredients: vec![ingredient("rice", 200), ingredient("tofu", 150)],
            steps: vec![step(1, "cook rice"), step(2, "fry tofu")],
        })
        .unwrap()
        .id()
        .unwrap()
}

#[test]
fn create_with_two_baselines_persists_nothing() {
    let (store, service) = setup();

    let err = service
        .create(RecipeDraft {
            base: base("Confused", &[DietTag::Vegan, DietTag::Vegetarian], &[]),
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, RecipeError::InvalidArgument(_)));
    assert_eq!(store.count(), 0);
    assert_eq!(store.write_count(), 0);
}

#[test]
fn create_then_read_projection() {
    let (_, service) = setup();
    let id = create(
        &service,
        base("Tofu Bowl", &[DietTag::Vegan, DietTag::GlutenFree], &["Bowls"]),
    );

    let view = service.find_one(id).unwrap();
    assert_eq!(view.id, id);
    assert_eq!(view.total_minutes, 30);
    assert_eq!(view.baseline_tag, Some(DietTag::Vegan));
    assert_eq!(view.tags, vec![DietTag::Vegan, DietTag::GlutenFree]);
    let names: Vec<_> = view.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["rice", "tofu"]);
}

#[test]
fn update_base_leaves_children_untouched() {
    let (_, service) = setup();
    let id = create(&service, base("Stew", &[DietTag::Vegan], &[]));
    let before = service.find_one(id).unwrap();

    service
        .update_base(id, base("Beef Stew", &[DietTag::Omnivore], &["Winter"]))
        .unwrap();

    let after = service.find_one(id).unwrap();
    assert_eq!(after.title, "Beef Stew");
    assert_eq!(after.tags, vec![DietTag::Omnivore]);
    assert_eq!(after.categories, vec!["Winter".to_string()]);
    assert_eq!(after.ingredients, before.ingredients);
    assert_eq!(after.steps, before.steps);
}

#[test]
fn update_base_with_two_baselines_changes_nothing() {
    let (store, service) = setup();
    let id = create(&service, base("Stew", &[DietTag::Vegan], &[]));
    let writes = store.write_count();
    let before = service.find_one(id).unwrap();

    let err = service
        .update_base(id, base("Stew", &[DietTag::Vegan, DietTag::Omnivore], &[]))
        .unwrap_err();

    assert!(matches!(err, RecipeError::InvalidArgument(_)));
    assert_eq!(store.write_count(), writes);
    assert_eq!(service.find_one(id).unwrap(), before);
}

#[test]
fn replace_steps_sorts_by_position() {
    let (_, service) = setup();
    let id = create(&service, base("Toast", &[], &[]));

    service
        .replace_steps(id, vec![step(2, "b"), step(1, "a")])
        .unwrap();

    let view = service.find_one(id).unwrap();
    let steps: Vec<_> = view
        .steps
        .iter()
        .map(|s| (s.position, s.text.as_str()))
        .collect();
    assert_eq!(steps, vec![(1, "a"), (2, "b")]);
}

#[test]
fn replace_steps_keeps_duplicate_positions_in_input_order() {
    let (_, service) = setup();
    let id = create(&service, base("Toast", &[], &[]));

    service
        .replace_steps(id, vec![step(3, "x"), step(1, "first"), step(1, "second")])
        .unwrap();

    let view = service.find_one(id).unwrap();
    let texts: Vec<_> = view.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "x"]);
}

#[test]
fn replace_ingredients_is_full_replacement() {
    let (store, service) = setup();
    let id = create(&service, base("Curry", &[], &[]));
    let old_ids: Vec<_> = service
        .find_one(id)
        .unwrap()
        .ingredients
        .iter()
        .map(|i| i.id)
        .collect();

    service
        .replace_ingredients(id, vec![ingredient("lentils", 300)])
        .unwrap();

    let stored = store.find_by_id(id).unwrap().unwrap();
    assert_eq!(stored.ingredients().len(), 1);
    let fresh = &stored.ingredients()[0];
    assert_eq!(fresh.name(), "lentils");
    assert_eq!(fresh.recipe_id(), Some(id));
    assert!(!old_ids.contains(&fresh.id().unwrap()));
}

#[test]
fn update_full_replaces_everything() {
    let (_, service) = setup();
    let id = create(&service, base("Salad", &[DietTag::Vegan], &["Summer"]));

    service
        .update_full(
            id,
            RecipeDraft {
                base: base("Fish Salad", &[DietTag::Pescetarian, DietTag::LowCarb], &[]),
                ingredients: vec![ingredient("tuna", 120)],
                steps: vec![step(5, "mix"), step(1, "drain")],
            },
        )
        .unwrap();

    let view = service.find_one(id).unwrap();
    assert_eq!(view.title, "Fish Salad");
    assert_eq!(view.baseline_tag, Some(DietTag::Pescetarian));
    assert!(view.categories.is_empty());
    assert_eq!(view.ingredients.len(), 1);
    let texts: Vec<_> = view.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["drain", "mix"]);
}

#[test]
fn search_counts_multi_field_match_once() {
    let (_, service) = setup();
    let both = create(&service, base("Poke Bowl", &[], &["Bowls", "Bowl food"]));
    create(&service, base("Ramen Bowl", &[], &[]));
    create(&service, base("Granola", &[], &["Breakfast bowls"]));
    create(&service, base("Pancakes", &[], &["Breakfast"]));

    let page = service
        .find_paged(Some("bowl"), &PageRequest::default())
        .unwrap();

    assert_eq!(page.total_elements, 3);
    assert_eq!(page.content.len(), 3);
    assert_eq!(page.content.iter().filter(|r| r.id == both).count(), 1);
}

#[test]
fn blank_query_lists_everything() {
    let (_, service) = setup();
    for title in ["A", "B", "C"] {
        create(&service, base(title, &[], &[]));
    }

    for query in [None, Some(""), Some("   ")] {
        let page = service.find_paged(query, &PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 3);
    }
}

#[test]
fn paging_metadata() {
    let (_, service) = setup();
    for i in 0..5 {
        create(&service, base(&format!("Recipe {}", i), &[], &[]));
    }

    let page = service
        .find_paged(None, &PageRequest::new(2, 2, Sort::default()))
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.number, 2);
    assert_eq!(page.total_pages, 3);
    assert!(page.last);
}

#[test]
fn missing_recipe_is_not_found_everywhere() {
    let (_, service) = setup();
    let ghost = RecipeId::new(999);

    assert!(matches!(service.find_one(ghost), Err(RecipeError::NotFound(id)) if id == ghost));
    assert!(matches!(
        service.update_base(ghost, base("x", &[], &[])),
        Err(RecipeError::NotFound(_))
    ));
    assert!(matches!(
        service.replace_ingredients(ghost, vec![]),
        Err(RecipeError::NotFound(_))
    ));
    assert!(matches!(
        service.replace_steps(ghost, vec![]),
        Err(RecipeError::NotFound(_))
    ));
    assert!(matches!(service.delete(ghost), Err(RecipeError::NotFound(_))));
}

#[test]
fn delete_removes_recipe_and_second_delete_is_not_found() {
    let (store, service) = setup();
    let id = create(&service, base("Soup", &[], &[]));

    service.delete(id).unwrap();

    assert!(!store.exists_by_id(id).unwrap());
    assert!(matches!(service.find_one(id), Err(RecipeError::NotFound(_))));
    assert!(matches!(service.delete(id), Err(RecipeError::NotFound(_))));
}

#[test]
fn concurrent_deletes_of_one_recipe_succeed_once() {
    let (store, service) = setup();
    let id = create(&service, base("Stew", &[], &[]));

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                service.delete(id)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(RecipeError::NotFound(missing)) if *missing == id)));
    assert_eq!(store.count(), 0);
}
