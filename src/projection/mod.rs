//! Pure mappings from a stored recipe aggregate to its response shapes.

use crate::models::{FullView, ListingView, Recipe, User, UserView};

/// Strip credentials and role from a user.
pub fn to_user_view(user: &User) -> UserView {
    UserView {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

/// Scalar-only shape used by listings.
pub fn to_listing_view(recipe: &Recipe) -> ListingView {
    ListingView {
        id: recipe.id,
        title: recipe.title.clone(),
        description: recipe.description.clone(),
        image: recipe.image.clone(),
        prep_time: recipe.prep_time,
        cook_time: recipe.cook_time,
        servings: recipe.servings,
        category: recipe.category.clone(),
    }
}

/// Shape with author, type, cuisine, collaborators and ingredients resolved.
pub fn to_full_view(recipe: &Recipe) -> FullView {
    let ListingView {
        id,
        title,
        description,
        image,
        prep_time,
        cook_time,
        servings,
        category,
    } = to_listing_view(recipe);

    FullView {
        id,
        title,
        description,
        instructions: recipe.instructions.clone(),
        image,
        prep_time,
        cook_time,
        servings,
        category,
        author: to_user_view(&recipe.author),
        recipe_type: recipe.recipe_type.clone(),
        cuisine: recipe.cuisine.clone(),
        users: collaborator_views(recipe.users.as_deref()),
        ingredients: recipe.ingredients.clone(),
    }
}

/// Absent and empty collaborator sets both collapse to `None`.
fn collaborator_views(users: Option<&[User]>) -> Option<Vec<UserView>> {
    let users = users.filter(|u| !u.is_empty())?;

    let mut views: Vec<UserView> = users.iter().map(to_user_view).collect();
    views.sort_by_key(|v| v.id);
    views.dedup_by_key(|v| v.id);
    Some(views)
}
