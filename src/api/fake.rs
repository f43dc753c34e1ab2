//! In-memory [`RecipeApi`] for unit tests.

use super::{ApiError, NewRecipe, Recipe, RecipeApi, RecipePage};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn recipe(id: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: format!("Recipe {id}"),
        ingredients: vec!["garam".into()],
        steps: vec!["aduk".into()],
        image: format!("https://cdn.example.com/{id}.jpg"),
        author: None,
        created_at: None,
    }
}

pub(crate) fn page(ids: &[&str], total_pages: u32) -> RecipePage {
    RecipePage {
        recipes: ids.iter().map(|id| recipe(id)).collect(),
        total_pages,
    }
}

fn server_error(message: Option<&str>) -> ApiError {
    ApiError::Server {
        status: 500,
        message: message.map(str::to_string),
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pages: Mutex<HashMap<u32, RecipePage>>,
    failing_pages: Mutex<HashSet<u32>>,
    mine: Mutex<Option<Vec<Recipe>>>,
    failing_deletes: Mutex<HashMap<String, Option<String>>>,
    create_failure: Mutex<Option<Option<String>>>,
    pub page_calls: Mutex<Vec<u32>>,
    pub mine_calls: Mutex<usize>,
    pub created: Mutex<Vec<NewRecipe>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_page(self, number: u32, data: RecipePage) -> Self {
        self.pages.lock().unwrap().insert(number, data);
        self
    }

    pub fn set_page(&self, number: u32, data: RecipePage) {
        self.pages.lock().unwrap().insert(number, data);
    }

    pub fn fail_page(&self, number: u32) {
        self.failing_pages.lock().unwrap().insert(number);
    }

    pub fn with_mine(self, recipes: Vec<Recipe>) -> Self {
        *self.mine.lock().unwrap() = Some(recipes);
        self
    }

    pub fn fail_delete(&self, id: &str, message: Option<&str>) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(id.to_string(), message.map(str::to_string));
    }

    pub fn fail_create(&self, message: Option<&str>) {
        *self.create_failure.lock().unwrap() = Some(message.map(str::to_string));
    }

    pub fn page_calls(&self) -> Vec<u32> {
        self.page_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeApi for FakeApi {
    async fn list_page(&self, page: u32, _limit: u32) -> Result<RecipePage, ApiError> {
        self.page_calls.lock().unwrap().push(page);
        if self.failing_pages.lock().unwrap().contains(&page) {
            return Err(server_error(Some("page unavailable")));
        }
        self.pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .ok_or_else(|| server_error(None))
    }

    async fn list_mine(&self) -> Result<Vec<Recipe>, ApiError> {
        *self.mine_calls.lock().unwrap() += 1;
        self.mine
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| server_error(None))
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError> {
        self.created.lock().unwrap().push(recipe.clone());
        if let Some(message) = self.create_failure.lock().unwrap().clone() {
            return Err(server_error(message.as_deref()));
        }
        let mut created = self::recipe("new");
        created.title = recipe.title.clone();
        created.ingredients = recipe.ingredients.clone();
        created.steps = recipe.steps.clone();
        Ok(created)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.deleted.lock().unwrap().push(id.to_string());
        if let Some(message) = self.failing_deletes.lock().unwrap().get(id) {
            return Err(server_error(message.as_deref()));
        }
        Ok(())
    }
}
