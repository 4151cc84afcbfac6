//! Seed data shared by store-backed unit tests.

use tempfile::TempDir;

use super::{init_database, Repository};
use crate::models::{CreateRecipeRequest, CreateUserRequest, EntityRef, UserRole};

/// Open a fresh database in a temporary directory.
pub async fn create_test_repo() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to init DB");
    (Repository::new(pool), temp_dir)
}

/// Ids of a small seeded catalog.
///
/// Recipes, in creation order:
/// - Green Borscht: Soup, by olena, potato + sorrel, empty collaborator list
/// - Red Borscht: Soup, by olena, beetroot + potato, taras collaborates
/// - Syrniki: Dessert, by taras, no ingredients, collaborators absent
pub struct TestCatalog {
    pub olena: i64,
    pub taras: i64,
    pub main_course: i64,
    pub dessert: i64,
    pub ukrainian: i64,
    pub beetroot: i64,
    pub potato: i64,
    pub sorrel: i64,
    pub green_borscht: i64,
    pub red_borscht: i64,
    pub syrniki: i64,
}

impl TestCatalog {
    pub async fn seed(repo: &Repository) -> Self {
        let olena = create_user(repo, "olena").await;
        let taras = create_user(repo, "taras").await;
        let main_course = repo.create_type("Main Course").await.unwrap().id;
        let dessert = repo.create_type("Dessert").await.unwrap().id;
        let ukrainian = repo.create_cuisine("Ukrainian").await.unwrap().id;
        let beetroot = repo.create_ingredient("Beetroot").await.unwrap().id;
        let potato = repo.create_ingredient("Potato").await.unwrap().id;
        let sorrel = repo.create_ingredient("Sorrel").await.unwrap().id;

        let green_borscht = repo
            .create_recipe(&CreateRecipeRequest {
                description: "Sorrel soup with eggs".to_string(),
                category: "Soup".to_string(),
                ingredients: refs(&[potato, sorrel]),
                users: Some(Vec::new()),
                ..request("Green Borscht", olena, main_course, ukrainian)
            })
            .await
            .unwrap();

        let red_borscht = repo
            .create_recipe(&CreateRecipeRequest {
                description: "Beet and cabbage soup".to_string(),
                category: "Soup".to_string(),
                ingredients: refs(&[beetroot, potato]),
                users: Some(refs(&[taras])),
                ..request("Red Borscht", olena, main_course, ukrainian)
            })
            .await
            .unwrap();

        let syrniki = repo
            .create_recipe(&CreateRecipeRequest {
                description: "Cottage cheese pancakes".to_string(),
                category: "Dessert".to_string(),
                ..request("Syrniki", taras, dessert, ukrainian)
            })
            .await
            .unwrap();

        Self {
            olena,
            taras,
            main_course,
            dessert,
            ukrainian,
            beetroot,
            potato,
            sorrel,
            green_borscht,
            red_borscht,
            syrniki,
        }
    }

    /// A minimal valid creation request authored by olena.
    pub fn request(&self, title: &str) -> CreateRecipeRequest {
        request(title, self.olena, self.main_course, self.ukrainian)
    }

    /// Add `count` plain recipes titled "Recipe 1", "Recipe 2", ...
    pub async fn add_numbered_recipes(&self, repo: &Repository, count: usize) {
        for n in 1..=count {
            repo.create_recipe(&self.request(&format!("Recipe {}", n)))
                .await
                .unwrap();
        }
    }
}

async fn create_user(repo: &Repository, username: &str) -> i64 {
    repo.create_user(&CreateUserRequest {
        username: username.to_string(),
        email: Some(format!("{}@example.com", username)),
        role: UserRole::User,
    })
    .await
    .unwrap()
    .id
}

fn request(title: &str, author: i64, recipe_type: i64, cuisine: i64) -> CreateRecipeRequest {
    CreateRecipeRequest {
        title: title.to_string(),
        description: String::new(),
        instructions: "Cook it".to_string(),
        image: None,
        prep_time: 15,
        cook_time: 30,
        servings: 4,
        category: "Main Course".to_string(),
        author: EntityRef { id: author },
        recipe_type: EntityRef { id: recipe_type },
        cuisine: EntityRef { id: cuisine },
        ingredients: Vec::new(),
        users: None,
    }
}

fn refs(ids: &[i64]) -> Vec<EntityRef> {
    ids.iter().map(|&id| EntityRef { id }).collect()
}
