//! Product CRUD. The `score` column is only written by the vote ledger and by
//! the creation vote inserted alongside each new product.

use curio_db::Database;
use curio_db::models::ProductRow;
use curio_types::api::{NewProduct, ProductPatch};
use curio_types::models::{Product, ProductId, UserId};
use tracing::info;

use crate::error::{CoreError, CoreResult, require_user};
use crate::validate;

pub fn create_product(
    db: &Database,
    acting: Option<UserId>,
    input: &NewProduct,
) -> CoreResult<Product> {
    let owner = require_user(acting)?;
    let product = validate::product(input)?;

    let id = db.insert_product(owner, &product)?;
    info!("Product {} '{}' created by user {}", id, product.title, owner);
    get_product(db, id)
}

pub fn get_product(db: &Database, product_id: ProductId) -> CoreResult<Product> {
    db.get_product(product_id)?
        .map(ProductRow::into_product)
        .ok_or_else(|| CoreError::not_found("product", product_id))
}

/// Featured first, then newest first.
pub fn list_products(db: &Database) -> CoreResult<Vec<Product>> {
    Ok(db
        .list_products()?
        .into_iter()
        .map(ProductRow::into_product)
        .collect())
}

pub fn list_products_by_user(db: &Database, user_id: UserId) -> CoreResult<Vec<Product>> {
    if db.get_user_by_id(user_id)?.is_none() {
        return Err(CoreError::not_found("user", user_id));
    }
    Ok(db
        .list_products_by_user(user_id)?
        .into_iter()
        .map(ProductRow::into_product)
        .collect())
}

pub fn update_product(
    db: &Database,
    acting: Option<UserId>,
    product_id: ProductId,
    patch: ProductPatch,
) -> CoreResult<Product> {
    let user_id = require_user(acting)?;
    let current = get_product(db, product_id)?;
    if current.user_id != user_id {
        return Err(CoreError::forbidden("only the owner can edit this product"));
    }

    let patch = validate::product_patch(&patch)?;
    if !db.update_product(product_id, &patch)? {
        return Err(CoreError::not_found("product", product_id));
    }
    info!("Product {} updated by user {}", product_id, user_id);
    get_product(db, product_id)
}

pub fn delete_product(
    db: &Database,
    acting: Option<UserId>,
    product_id: ProductId,
) -> CoreResult<()> {
    let user_id = require_user(acting)?;
    let current = get_product(db, product_id)?;
    if current.user_id != user_id {
        return Err(CoreError::forbidden("only the owner can delete this product"));
    }

    if !db.delete_product(product_id)? {
        return Err(CoreError::not_found("product", product_id));
    }
    info!("Product {} deleted by user {}", product_id, user_id);
    Ok(())
}

/// Toggles homepage promotion. Called on behalf of the payment collaborator,
/// never from a user session.
pub fn set_featured(db: &Database, product_id: ProductId, featured: bool) -> CoreResult<Product> {
    if !db.set_featured(product_id, featured)? {
        return Err(CoreError::not_found("product", product_id));
    }
    info!("Product {} featured={}", product_id, featured);
    get_product(db, product_id)
}
