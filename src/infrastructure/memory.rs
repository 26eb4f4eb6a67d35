//! Process-local repository implementations.
//!
//! Used when no database is configured and by the integration tests. Data
//! lives for the lifetime of the process. Each table sits behind one
//! [`RwLock`], so uniqueness checks and inserts are atomic per table.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::entities::{
    FileFilter, NewProduct, NewStoredFile, NewUser, Product, ProductPatch, StoredFile, User,
    UserPatch,
};
use crate::domain::repositories::{FileRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use serde_json::json;

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn page<T: Clone>(rows: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    rows.skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn duplicate_user() -> AppError {
    AppError::conflict("Username or email already exists", json!({}))
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut table = self.table.write().await;

        if table
            .rows
            .values()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(duplicate_user());
        }

        let now = Utc::now();
        let user = User {
            id: table.allocate_id(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            age: new_user.age,
            roles: new_user.roles,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|u| u.is_active).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.is_active && u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.is_active && u.email == email)
            .cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError> {
        let table = self.table.read().await;
        Ok(page(
            table.rows.values().filter(|u| u.is_active).cloned(),
            offset,
            limit,
        ))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|u| u.is_active).count() as i64)
    }

    async fn search(&self, term: &str, limit: i64) -> Result<Vec<User>, AppError> {
        let table = self.table.read().await;
        let mut users: Vec<User> = table
            .rows
            .values()
            .filter(|u| u.is_active && (contains_ci(&u.username, term) || contains_ci(&u.email, term)))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        let mut table = self.table.write().await;

        let taken = table.rows.values().any(|u| {
            u.id != id
                && (patch.username.as_deref() == Some(u.username.as_str())
                    || patch.email.as_deref() == Some(u.email.as_str()))
        });
        if taken {
            return Err(duplicate_user());
        }

        let Some(user) = table.rows.get_mut(&id).filter(|u| u.is_active) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(age) = patch.age {
            user.age = age;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|u| u.is_active) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_roles(&self, id: i64, roles: Vec<String>) -> Result<Option<User>, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).filter(|u| u.is_active).map(|user| {
            user.roles = roles;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn touch_last_login(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if let Some(user) = table.rows.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|u| u.is_active) {
            Some(user) => {
                user.is_active = false;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    table: RwLock<Table<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let product = Product {
            id: table.allocate_id(),
            name: new_product.name,
            description: new_product.description,
            price_cents: new_product.price_cents,
            stock_quantity: new_product.stock_quantity,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|p| p.is_active).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, AppError> {
        let table = self.table.read().await;
        Ok(page(
            table.rows.values().filter(|p| p.is_active).cloned(),
            offset,
            limit,
        ))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|p| p.is_active).count() as i64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|p| {
                p.is_active
                    && (contains_ci(&p.name, term)
                        || p.description.as_deref().is_some_and(|d| contains_ci(d, term)))
            })
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).filter(|p| p.is_active).map(|product| {
            product.name = patch.name;
            product.description = patch.description;
            product.price_cents = patch.price_cents;
            product.stock_quantity = patch.stock_quantity;
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|p| p.is_active) {
            Some(product) => {
                product.is_active = false;
                product.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn adjust_stock(&self, id: i64, delta: i32) -> Result<Option<Product>, AppError> {
        let mut table = self.table.write().await;
        let Some(product) = table.rows.get_mut(&id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        match product.stock_quantity.checked_add(delta) {
            Some(quantity) if quantity >= 0 => {
                product.stock_quantity = quantity;
                product.updated_at = Utc::now();
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    table: RwLock<Table<StoredFile>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn visible<'a>(
        rows: impl Iterator<Item = &'a StoredFile>,
        filter: &'a FileFilter,
        viewer_id: i64,
    ) -> impl Iterator<Item = &'a StoredFile> {
        rows.filter(move |f| !f.is_deleted && f.is_visible_to(viewer_id) && filter.matches(f))
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn create(&self, new_file: NewStoredFile) -> Result<StoredFile, AppError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|f| f.stored_file_name == new_file.stored_file_name)
        {
            return Err(AppError::conflict("Stored file name already used", json!({})));
        }

        let file = StoredFile {
            id: table.allocate_id(),
            file_name: new_file.file_name,
            original_file_name: new_file.original_file_name,
            stored_file_name: new_file.stored_file_name,
            content_type: new_file.content_type,
            file_size: new_file.file_size,
            description: new_file.description,
            category: new_file.category,
            is_public: new_file.is_public,
            checksum: new_file.checksum,
            uploaded_by: new_file.uploaded_by,
            uploaded_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        };
        table.rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFile>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|f| !f.is_deleted).cloned())
    }

    async fn list(
        &self,
        filter: &FileFilter,
        viewer_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoredFile>, AppError> {
        let table = self.table.read().await;
        // Newest first: ids grow with upload time.
        Ok(page(
            Self::visible(table.rows.values().rev(), filter, viewer_id).cloned(),
            offset,
            limit,
        ))
    }

    async fn count(&self, filter: &FileFilter, viewer_id: i64) -> Result<i64, AppError> {
        let table = self.table.read().await;
        Ok(Self::visible(table.rows.values(), filter, viewer_id).count() as i64)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id).filter(|f| !f.is_deleted) {
            Some(file) => {
                file.is_deleted = true;
                file.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
