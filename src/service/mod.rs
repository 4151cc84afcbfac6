//! Recipe service: the single entry point the request layer talks to.
//!
//! Reads are delegated to [`RecipeSearch`]; creation validates the author,
//! lets the store assign the id, and returns the re-read full view.

use std::sync::Arc;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{CreateRecipeRequest, FullView, ListingView};
use crate::search::{RecipePredicate, RecipeSearch};

#[derive(Clone)]
pub struct RecipeService {
    repo: Arc<Repository>,
    search: RecipeSearch,
}

impl RecipeService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            search: RecipeSearch::new(repo.clone()),
            repo,
        }
    }

    /// Create a recipe and return its full view.
    ///
    /// Fails with `InvalidReference` when the author, type, cuisine, an
    /// ingredient or a collaborator does not exist. Nothing is written then.
    pub async fn create_recipe(&self, request: &CreateRecipeRequest) -> Result<FullView, AppError> {
        let author_id = request.author.id;
        if self.repo.get_user(author_id).await?.is_none() {
            return Err(AppError::invalid_reference("author", author_id));
        }

        let id = self.repo.create_recipe(request).await?;
        tracing::info!("Created recipe {} by author {}", id, author_id);

        self.search
            .by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Recipe {} missing after creation", id)))
    }

    pub async fn get_recipe(&self, id: i64) -> Result<Option<FullView>, AppError> {
        self.search.by_id(id).await
    }

    pub async fn list_recipes(&self, page: u32, size: u32) -> Result<Vec<ListingView>, AppError> {
        self.search.list(page, size).await
    }

    pub async fn search(&self, predicate: &RecipePredicate) -> Result<Vec<FullView>, AppError> {
        self.search.resolve(predicate).await
    }

    pub async fn find_by_title(&self, text: &str) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::TitleContains(text.to_string())).await
    }

    pub async fn find_by_description(&self, text: &str) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::DescriptionContains(text.to_string())).await
    }

    pub async fn find_by_ingredient_text(&self, text: &str) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::IngredientTextContains(text.to_string())).await
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::Category(category.to_string())).await
    }

    pub async fn find_by_author(&self, author_id: i64) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::AuthorId(author_id)).await
    }

    pub async fn find_by_type(&self, type_id: i64) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::TypeId(type_id)).await
    }

    pub async fn find_by_cuisine(&self, cuisine_id: i64) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::CuisineId(cuisine_id)).await
    }

    pub async fn find_by_ingredient(&self, ingredient_id: i64) -> Result<Vec<FullView>, AppError> {
        self.search(&RecipePredicate::IngredientId(ingredient_id)).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::db::fixtures::{create_test_repo, TestCatalog};
    use crate::models::EntityRef;

    #[tokio::test]
    async fn test_create_recipe_returns_full_view() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let service = RecipeService::new(Arc::new(repo));

        let created = service
            .create_recipe(&CreateRecipeRequest {
                ingredients: vec![
                    EntityRef { id: catalog.sorrel },
                    EntityRef { id: catalog.beetroot },
                ],
                users: Some(vec![EntityRef { id: catalog.taras }]),
                ..catalog.request("Holubtsi")
            })
            .await
            .unwrap();

        assert_eq!(created.title, "Holubtsi");
        assert_eq!(created.author.id, catalog.olena);
        assert_eq!(created.recipe_type.id, catalog.main_course);
        assert_eq!(created.users.unwrap()[0].username, "taras");
        assert_eq!(
            created.ingredients.iter().map(|i| i.id).collect::<HashSet<_>>(),
            HashSet::from([catalog.sorrel, catalog.beetroot])
        );

        let fetched = service.get_recipe(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Holubtsi");
    }

    #[tokio::test]
    async fn test_create_without_collaborators_reports_null_users() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let service = RecipeService::new(Arc::new(repo));

        let created = service
            .create_recipe(&catalog.request("Kulish"))
            .await
            .unwrap();
        assert!(created.users.is_none());
    }

    #[tokio::test]
    async fn test_unknown_author_is_invalid_reference() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let repo = Arc::new(repo);
        let service = RecipeService::new(repo.clone());
        let before = repo.count_recipes().await.unwrap();

        let err = service
            .create_recipe(&CreateRecipeRequest {
                author: EntityRef { id: 4040 },
                ..catalog.request("Orphan")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidReference { .. }));
        assert_eq!(repo.count_recipes().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_type_is_invalid_reference() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let repo = Arc::new(repo);
        let service = RecipeService::new(repo.clone());
        let before = repo.count_recipes().await.unwrap();

        let err = service
            .create_recipe(&CreateRecipeRequest {
                recipe_type: EntityRef { id: 4040 },
                ..catalog.request("Mystery")
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidReference { field: "type", id: 4040, .. }
        ));
        assert_eq!(repo.count_recipes().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_collaborator_leaves_no_partial_recipe() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let repo = Arc::new(repo);
        let service = RecipeService::new(repo.clone());

        let err = service
            .create_recipe(&CreateRecipeRequest {
                users: Some(vec![EntityRef { id: 4040 }]),
                ..catalog.request("Lonely")
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidReference { field: "user", id: 4040, .. }
        ));
        assert!(service.find_by_title("Lonely").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creations_get_distinct_ids() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let repo = Arc::new(repo);
        let service = RecipeService::new(repo.clone());

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let service = service.clone();
                let request = CreateRecipeRequest {
                    ingredients: vec![EntityRef { id: catalog.potato }],
                    ..catalog.request(&format!("Parallel {}", n))
                };
                tokio::spawn(async move { service.create_recipe(&request).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let created = handle.await.unwrap().unwrap();
            assert!(ids.insert(created.id), "duplicate id {}", created.id);
        }

        assert_eq!(ids.len(), 16);
        assert_eq!(repo.count_recipes().await.unwrap(), 3 + 16);
    }

    #[tokio::test]
    async fn test_named_finders_delegate_to_predicates() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        let service = RecipeService::new(Arc::new(repo));

        assert_eq!(service.find_by_title("syr").await.unwrap().len(), 1);
        assert_eq!(service.find_by_description("SOUP").await.unwrap().len(), 2);
        assert_eq!(service.find_by_ingredient_text("sorrel").await.unwrap().len(), 1);
        assert_eq!(service.find_by_category("Dessert").await.unwrap().len(), 1);
        assert_eq!(service.find_by_author(catalog.olena).await.unwrap().len(), 2);
        assert_eq!(service.find_by_type(catalog.main_course).await.unwrap().len(), 2);
        assert_eq!(service.find_by_cuisine(catalog.ukrainian).await.unwrap().len(), 3);
        assert_eq!(
            service.find_by_ingredient(catalog.sorrel).await.unwrap()[0].id,
            catalog.green_borscht
        );
    }

    #[tokio::test]
    async fn test_list_recipes_pages_over_25() {
        let (repo, _temp_dir) = create_test_repo().await;
        let catalog = TestCatalog::seed(&repo).await;
        catalog.add_numbered_recipes(&repo, 22).await;
        let service = RecipeService::new(Arc::new(repo));

        assert_eq!(service.list_recipes(0, 10).await.unwrap().len(), 10);
        assert_eq!(service.list_recipes(2, 10).await.unwrap().len(), 5);
        assert!(service.list_recipes(3, 10).await.unwrap().is_empty());
    }
}
