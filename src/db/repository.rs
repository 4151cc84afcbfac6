//! Database repository for recipes and their reference data.
//!
//! Aggregate reads run inside a single transaction so every recipe is built
//! from one consistent snapshot. Writes use transactions for atomicity.

use std::collections::BTreeSet;

use sqlx::error::ErrorKind;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateRecipeRequest, CreateUserRequest, Cuisine, Ingredient, Recipe, RecipeType, User,
    UserRole,
};
use crate::search::RecipePredicate;

/// Recipe row joined with its author, type and cuisine.
const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.title, r.description, r.instructions, r.image,
           r.prep_time, r.cook_time, r.servings, r.category,
           u.id AS author_id, u.username AS author_username, u.email AS author_email,
           u.password_hash AS author_password_hash, u.role AS author_role,
           t.id AS type_id, t.name AS type_name,
           c.id AS cuisine_id, c.name AS cuisine_name
    FROM recipes r
    JOIN users u ON u.id = r.author_id
    JOIN recipe_types t ON t.id = r.type_id
    JOIN cuisines c ON c.id = r.cuisine_id
    WHERE r.id = ?"#;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, role FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| user_from_row(row, "")))
    }

    /// Register a new user. Credentials are provisioned by the auth system.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let result = sqlx::query("INSERT INTO users (username, email, role) VALUES (?, ?, ?)")
            .bind(&request.username)
            .bind(&request.email)
            .bind(request.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                constraint_error(e, ErrorKind::UniqueViolation, || {
                    AppError::Validation(format!(
                        "Username {} is already taken",
                        request.username
                    ))
                })
            })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: None,
            role: request.role,
        })
    }

    // ==================== REFERENCE DATA ====================

    /// List all recipe types by name.
    pub async fn list_types(&self) -> Result<Vec<RecipeType>, AppError> {
        let rows = self.list_named("recipe_types").await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| RecipeType { id, name })
            .collect())
    }

    /// Create a recipe type.
    pub async fn create_type(&self, name: &str) -> Result<RecipeType, AppError> {
        let id = self.insert_named("recipe_types", "Type", name).await?;
        Ok(RecipeType {
            id,
            name: name.to_string(),
        })
    }

    /// List all cuisines by name.
    pub async fn list_cuisines(&self) -> Result<Vec<Cuisine>, AppError> {
        let rows = self.list_named("cuisines").await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Cuisine { id, name })
            .collect())
    }

    /// Create a cuisine.
    pub async fn create_cuisine(&self, name: &str) -> Result<Cuisine, AppError> {
        let id = self.insert_named("cuisines", "Cuisine", name).await?;
        Ok(Cuisine {
            id,
            name: name.to_string(),
        })
    }

    /// List all ingredients by name.
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, AppError> {
        let rows = self.list_named("ingredients").await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Ingredient { id, name })
            .collect())
    }

    /// Create an ingredient.
    pub async fn create_ingredient(&self, name: &str) -> Result<Ingredient, AppError> {
        let id = self.insert_named("ingredients", "Ingredient", name).await?;
        Ok(Ingredient {
            id,
            name: name.to_string(),
        })
    }

    async fn list_named(&self, table: &'static str) -> Result<Vec<(i64, String)>, AppError> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name, id", table);
        let rows = sqlx::query_as::<_, (i64, String)>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_named(
        &self,
        table: &'static str,
        label: &str,
        name: &str,
    ) -> Result<i64, AppError> {
        let sql = format!("INSERT INTO {} (name) VALUES (?)", table);
        let result = sqlx::query(&sql)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                constraint_error(e, ErrorKind::UniqueViolation, || {
                    AppError::Validation(format!("{} {} already exists", label, name))
                })
            })?;
        Ok(result.last_insert_rowid())
    }

    // ==================== RECIPE OPERATIONS ====================

    /// Count all recipes.
    pub async fn count_recipes(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Get a recipe aggregate by ID.
    pub async fn get_recipe(&self, id: i64) -> Result<Option<Recipe>, AppError> {
        let mut tx = self.pool.begin().await?;
        let recipe = load_recipe(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(recipe)
    }

    /// List a window of recipes in ascending id order.
    pub async fn list_recipes(&self, offset: i64, limit: i64) -> Result<Vec<Recipe>, AppError> {
        let mut tx = self.pool.begin().await?;

        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM recipes ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;

        let recipes = load_recipes(&mut *tx, &ids).await?;
        tx.commit().await?;
        Ok(recipes)
    }

    /// Find every recipe matching a predicate, in ascending id order.
    pub async fn find_recipes(&self, predicate: &RecipePredicate) -> Result<Vec<Recipe>, AppError> {
        let mut tx = self.pool.begin().await?;
        let ids = matching_recipe_ids(&mut *tx, predicate).await?;
        let recipes = load_recipes(&mut *tx, &ids).await?;
        tx.commit().await?;
        Ok(recipes)
    }

    /// Insert a recipe with its ingredient and collaborator links.
    ///
    /// The id comes from SQLite's allocation during the insert. Any dangling
    /// reference aborts the whole transaction.
    pub async fn create_recipe(&self, request: &CreateRecipeRequest) -> Result<i64, AppError> {
        let ingredient_ids: BTreeSet<i64> = request.ingredients.iter().map(|i| i.id).collect();
        let user_ids: BTreeSet<i64> = request.users.iter().flatten().map(|u| u.id).collect();

        // First statement is a write so the transaction never has to upgrade a read lock
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"INSERT INTO recipes (
                title, description, instructions, image,
                prep_time, cook_time, servings, category,
                author_id, type_id, cuisine_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.instructions)
        .bind(&request.image)
        .bind(request.prep_time)
        .bind(request.cook_time)
        .bind(request.servings)
        .bind(&request.category)
        .bind(request.author.id)
        .bind(request.recipe_type.id)
        .bind(request.cuisine.id)
        .execute(&mut *tx)
        .await;

        let recipe_id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_violation(&e, ErrorKind::ForeignKeyViolation) => {
                return Err(match missing_parent(&mut *tx, request).await? {
                    Some((field, id)) => AppError::invalid_reference(field, id),
                    None => e.into(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        for ingredient_id in &ingredient_ids {
            sqlx::query("INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES (?, ?)")
                .bind(recipe_id)
                .bind(*ingredient_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    constraint_error(e, ErrorKind::ForeignKeyViolation, || {
                        AppError::invalid_reference("ingredient", *ingredient_id)
                    })
                })?;
        }

        for user_id in &user_ids {
            sqlx::query("INSERT INTO recipe_users (recipe_id, user_id) VALUES (?, ?)")
                .bind(recipe_id)
                .bind(*user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    constraint_error(e, ErrorKind::ForeignKeyViolation, || {
                        AppError::invalid_reference("user", *user_id)
                    })
                })?;
        }

        tx.commit().await?;

        Ok(recipe_id)
    }
}

// Helper functions for aggregate loading

async fn matching_recipe_ids(
    conn: &mut SqliteConnection,
    predicate: &RecipePredicate,
) -> Result<Vec<i64>, sqlx::Error> {
    let query = match predicate {
        p if p.matches_everything() => {
            sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM recipes ORDER BY id")
        }
        RecipePredicate::TitleContains(text) => {
            return text_matches(conn, "SELECT id, title FROM recipes ORDER BY id", text).await;
        }
        RecipePredicate::DescriptionContains(text) => {
            let sql = "SELECT id, description FROM recipes ORDER BY id";
            return text_matches(conn, sql, text).await;
        }
        RecipePredicate::IngredientTextContains(text) => {
            let sql = r#"SELECT ri.recipe_id, i.name
               FROM recipe_ingredients ri
               JOIN ingredients i ON i.id = ri.ingredient_id
               ORDER BY ri.recipe_id"#;
            return text_matches(conn, sql, text).await;
        }
        RecipePredicate::ById(id) => {
            sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM recipes WHERE id = ?").bind(*id)
        }
        RecipePredicate::Category(category) => sqlx::query_scalar::<Sqlite, i64>(
            "SELECT id FROM recipes WHERE category = ? ORDER BY id",
        )
        .bind(category.as_str()),
        RecipePredicate::AuthorId(id) => sqlx::query_scalar::<Sqlite, i64>(
            "SELECT id FROM recipes WHERE author_id = ? ORDER BY id",
        )
        .bind(*id),
        RecipePredicate::TypeId(id) => sqlx::query_scalar::<Sqlite, i64>(
            "SELECT id FROM recipes WHERE type_id = ? ORDER BY id",
        )
        .bind(*id),
        RecipePredicate::CuisineId(id) => sqlx::query_scalar::<Sqlite, i64>(
            "SELECT id FROM recipes WHERE cuisine_id = ? ORDER BY id",
        )
        .bind(*id),
        RecipePredicate::IngredientId(id) => sqlx::query_scalar::<Sqlite, i64>(
            "SELECT recipe_id FROM recipe_ingredients WHERE ingredient_id = ? ORDER BY recipe_id",
        )
        .bind(*id),
    };

    query.fetch_all(&mut *conn).await
}

/// Ids from `(recipe_id, text)` rows ordered by recipe id whose text contains
/// `needle`, ignoring case.
///
/// SQLite's `lower()` folds ASCII only, so folding happens here with full
/// Unicode case mapping.
async fn text_matches(
    conn: &mut SqliteConnection,
    sql: &str,
    needle: &str,
) -> Result<Vec<i64>, sqlx::Error> {
    let needle = needle.to_lowercase();
    let rows = sqlx::query_as::<_, (i64, String)>(sql)
        .fetch_all(&mut *conn)
        .await?;

    let mut ids: Vec<i64> = rows
        .into_iter()
        .filter(|(_, text)| text.to_lowercase().contains(&needle))
        .map(|(id, _)| id)
        .collect();
    ids.dedup();
    Ok(ids)
}

async fn load_recipes(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<Recipe>, sqlx::Error> {
    let mut recipes = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(recipe) = load_recipe(conn, *id).await? {
            recipes.push(recipe);
        }
    }
    Ok(recipes)
}

async fn load_recipe(conn: &mut SqliteConnection, id: i64) -> Result<Option<Recipe>, sqlx::Error> {
    let Some(row) = sqlx::query(RECIPE_SELECT)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let users: Vec<User> = sqlx::query(
        r#"SELECT u.id, u.username, u.email, u.password_hash, u.role
           FROM recipe_users ru
           JOIN users u ON u.id = ru.user_id
           WHERE ru.recipe_id = ?
           ORDER BY u.id"#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(|row| user_from_row(row, ""))
    .collect();

    let ingredients: Vec<Ingredient> = sqlx::query_as::<_, (i64, String)>(
        r#"SELECT i.id, i.name
           FROM recipe_ingredients ri
           JOIN ingredients i ON i.id = ri.ingredient_id
           WHERE ri.recipe_id = ?
           ORDER BY i.id"#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|(id, name)| Ingredient { id, name })
    .collect();

    Ok(Some(Recipe {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        instructions: row.get("instructions"),
        image: row.get("image"),
        prep_time: row.get("prep_time"),
        cook_time: row.get("cook_time"),
        servings: row.get("servings"),
        category: row.get("category"),
        author: user_from_row(&row, "author_"),
        recipe_type: RecipeType {
            id: row.get("type_id"),
            name: row.get("type_name"),
        },
        cuisine: Cuisine {
            id: row.get("cuisine_id"),
            name: row.get("cuisine_name"),
        },
        users: Some(users),
        ingredients,
    }))
}

fn user_from_row(row: &SqliteRow, prefix: &str) -> User {
    let column = |name: &str| format!("{}{}", prefix, name);
    let id: i64 = row.get(column("id").as_str());
    let role: String = row.get(column("role").as_str());
    let role = UserRole::from_str(&role).unwrap_or_else(|| {
        tracing::warn!("User {} has unknown role {:?}, treating as USER", id, role);
        UserRole::default()
    });

    User {
        id,
        username: row.get(column("username").as_str()),
        email: row.get(column("email").as_str()),
        password_hash: row.get(column("password_hash").as_str()),
        role,
    }
}

/// First of author, type and cuisine that a recipe row would point at but
/// that does not exist.
async fn missing_parent(
    conn: &mut SqliteConnection,
    request: &CreateRecipeRequest,
) -> Result<Option<(&'static str, i64)>, sqlx::Error> {
    let parents = [
        ("author", "users", request.author.id),
        ("type", "recipe_types", request.recipe_type.id),
        ("cuisine", "cuisines", request.cuisine.id),
    ];

    for (field, table, id) in parents {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table);
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        if !exists {
            return Ok(Some((field, id)));
        }
    }

    Ok(None)
}

fn is_violation(err: &sqlx::Error, kind: ErrorKind) -> bool {
    match err {
        sqlx::Error::Database(db_err) => match kind {
            ErrorKind::UniqueViolation => db_err.is_unique_violation(),
            ErrorKind::ForeignKeyViolation => db_err.is_foreign_key_violation(),
            _ => false,
        },
        _ => false,
    }
}

/// Translate a constraint violation of `kind` into a domain error; anything
/// else is a store failure.
fn constraint_error(
    err: sqlx::Error,
    kind: ErrorKind,
    on_violation: impl FnOnce() -> AppError,
) -> AppError {
    if is_violation(&err, kind) {
        on_violation()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::create_test_repo;
    use crate::models::EntityRef;

    fn recipe_request(author: i64, recipe_type: i64, cuisine: i64) -> CreateRecipeRequest {
        CreateRecipeRequest {
            title: "Varenyky".to_string(),
            description: "Dumplings".to_string(),
            instructions: "Fold and boil".to_string(),
            image: None,
            prep_time: 40,
            cook_time: 10,
            servings: 4,
            category: "Main Course".to_string(),
            author: EntityRef { id: author },
            recipe_type: EntityRef { id: recipe_type },
            cuisine: EntityRef { id: cuisine },
            ingredients: Vec::new(),
            users: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_load_recipe() {
        let (repo, _temp_dir) = create_test_repo().await;
        let author = repo
            .create_user(&CreateUserRequest {
                username: "olena".to_string(),
                email: None,
                role: UserRole::Admin,
            })
            .await
            .unwrap();
        let recipe_type = repo.create_type("Main Course").await.unwrap();
        let cuisine = repo.create_cuisine("Ukrainian").await.unwrap();
        let potato = repo.create_ingredient("Potato").await.unwrap();

        let mut request = recipe_request(author.id, recipe_type.id, cuisine.id);
        // Duplicate ingredient refs collapse to one link
        request.ingredients = vec![EntityRef { id: potato.id }, EntityRef { id: potato.id }];

        let id = repo.create_recipe(&request).await.unwrap();
        let recipe = repo.get_recipe(id).await.unwrap().unwrap();

        assert_eq!(recipe.title, "Varenyky");
        assert_eq!(recipe.author.role, UserRole::Admin);
        assert_eq!(recipe.recipe_type.name, "Main Course");
        assert_eq!(recipe.ingredients, vec![potato]);
        assert_eq!(recipe.users, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_dangling_ingredient_rolls_back() {
        let (repo, _temp_dir) = create_test_repo().await;
        let author = repo
            .create_user(&CreateUserRequest {
                username: "olena".to_string(),
                email: None,
                role: UserRole::User,
            })
            .await
            .unwrap();
        let recipe_type = repo.create_type("Dessert").await.unwrap();
        let cuisine = repo.create_cuisine("Ukrainian").await.unwrap();

        let mut request = recipe_request(author.id, recipe_type.id, cuisine.id);
        request.ingredients = vec![EntityRef { id: 999 }];

        let err = repo.create_recipe(&request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReference { .. }));
        assert_eq!(repo.count_recipes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dangling_cuisine_is_invalid_reference() {
        let (repo, _temp_dir) = create_test_repo().await;
        let author = repo
            .create_user(&CreateUserRequest {
                username: "olena".to_string(),
                email: None,
                role: UserRole::User,
            })
            .await
            .unwrap();
        let recipe_type = repo.create_type("Dessert").await.unwrap();

        let err = repo
            .create_recipe(&recipe_request(author.id, recipe_type.id, 77))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidReference { field: "cuisine", id: 77, .. }
        ));
        assert_eq!(repo.count_recipes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_reference_name_is_validation_error() {
        let (repo, _temp_dir) = create_test_repo().await;
        repo.create_cuisine("Georgian").await.unwrap();

        let err = repo.create_cuisine("Georgian").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reference_lists_are_sorted_by_name() {
        let (repo, _temp_dir) = create_test_repo().await;
        repo.create_ingredient("Salt").await.unwrap();
        repo.create_ingredient("Dill").await.unwrap();
        repo.create_ingredient("Garlic").await.unwrap();

        let names: Vec<String> = repo
            .list_ingredients()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Dill", "Garlic", "Salt"]);
    }

    #[tokio::test]
    async fn test_unknown_stored_role_loads_as_user() {
        let (repo, _temp_dir) = create_test_repo().await;
        let id = sqlx::query("INSERT INTO users (username, role) VALUES ('mykola', 'CHEF')")
            .execute(&repo.pool)
            .await
            .unwrap()
            .last_insert_rowid();

        let user = repo.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.username, "mykola");
        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let (repo, _temp_dir) = create_test_repo().await;
        assert!(repo.get_user(5).await.unwrap().is_none());
    }
}
